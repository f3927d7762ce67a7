//! Persisted cart store.
//!
//! The store owns one immutable [`CartSnapshot`] at a time. A mutation reads
//! the current snapshot, validates against the catalog, writes the next cart
//! to storage and only then publishes it. Mutations are serialized through a
//! single writer lock held for the whole read-validate-write sequence, so
//! concurrent calls never lose each other's updates. Readers never wait on
//! the writer.

use std::sync::Arc;

use rocket_cache::Cache;
use tokio::sync::{watch, Mutex};

use crate::cart::{Cart, CartItem};
use crate::error::{CartError, CartOperation};
use crate::ids::ProductId;
use crate::ports::{Catalog, Notifier};

/// Storage key the cart is persisted under.
pub const CART_STORAGE_KEY: &str = "@RocketShoes:cart";

/// A committed cart value and its version.
///
/// Version 0 is the value loaded from storage; each committed mutation
/// increments it by one.
#[derive(Debug, Clone, PartialEq)]
pub struct CartSnapshot {
    pub version: u64,
    pub cart: Arc<Cart>,
}

/// Arguments of [`CartStore::update_product_amount`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    pub amount: i64,
}

/// The cart store. Build one and pass it to whatever needs the cart.
pub struct CartStore {
    catalog: Arc<dyn Catalog>,
    storage: Cache,
    notifier: Arc<dyn Notifier>,
    state: watch::Sender<CartSnapshot>,
    writer: Mutex<()>,
}

impl CartStore {
    /// Create the store, loading the persisted cart.
    ///
    /// A missing value starts an empty cart. So does an unreadable one; it
    /// is logged and overwritten by the next successful mutation.
    pub fn load(
        catalog: Arc<dyn Catalog>,
        storage: Cache,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let cart = match storage.get::<Vec<CartItem>>(CART_STORAGE_KEY) {
            Ok(Some(items)) => {
                let loaded = items.len();
                let cart = Cart::from_items(items);
                if cart.len() != loaded {
                    tracing::warn!(
                        loaded,
                        kept = cart.len(),
                        "dropped invalid lines from persisted cart"
                    );
                }
                cart
            }
            Ok(None) => Cart::new(),
            Err(e) => {
                tracing::warn!(error = %e, key = CART_STORAGE_KEY, "persisted cart unreadable, starting empty");
                Cart::new()
            }
        };

        tracing::debug!(items = cart.len(), "cart store loaded");

        let (state, _) = watch::channel(CartSnapshot {
            version: 0,
            cart: Arc::new(cart),
        });

        Self {
            catalog,
            storage,
            notifier,
            state,
            writer: Mutex::new(()),
        }
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> CartSnapshot {
        self.state.borrow().clone()
    }

    /// The current cart.
    pub fn cart(&self) -> Arc<Cart> {
        Arc::clone(&self.state.borrow().cart)
    }

    /// Observe every committed snapshot.
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.state.subscribe()
    }

    /// Number of distinct products in the cart.
    pub fn cart_size(&self) -> usize {
        self.state.borrow().cart.len()
    }

    /// Quantity held for a product (0 if absent).
    pub fn amount_of(&self, product_id: ProductId) -> i64 {
        self.state.borrow().cart.amount_of(product_id)
    }

    /// The catalog this store validates against.
    pub fn catalog(&self) -> &dyn Catalog {
        self.catalog.as_ref()
    }

    /// Add one unit of a product.
    ///
    /// Failures go to the notifier and yield `None`; the cart is unchanged.
    pub async fn add_product(&self, product_id: ProductId) -> Option<CartSnapshot> {
        self.try_add_product(product_id)
            .await
            .map_err(|e| self.report(CartOperation::Add, product_id, &e))
            .ok()
    }

    /// Remove a product's line.
    ///
    /// Failures go to the notifier and yield `None`; the cart is unchanged.
    pub async fn remove_product(&self, product_id: ProductId) -> Option<CartSnapshot> {
        self.try_remove_product(product_id)
            .await
            .map_err(|e| self.report(CartOperation::Remove, product_id, &e))
            .ok()
    }

    /// Set a product's quantity.
    ///
    /// Failures go to the notifier and yield `None`; the cart is unchanged.
    pub async fn update_product_amount(
        &self,
        update: UpdateProductAmount,
    ) -> Option<CartSnapshot> {
        self.try_update_product_amount(update)
            .await
            .map_err(|e| self.report(CartOperation::Update, update.product_id, &e))
            .ok()
    }

    /// Add one unit of a product.
    ///
    /// A product already in the cart is incremented if stock covers the new
    /// quantity. A new product is fetched from the catalog and appended with
    /// quantity 1.
    pub async fn try_add_product(&self, product_id: ProductId) -> Result<CartSnapshot, CartError> {
        let _writer = self.writer.lock().await;
        let current = self.snapshot();

        let next = match current.cart.find(product_id) {
            Some(item) => {
                let requested = item.amount + 1;
                self.ensure_stock(product_id, requested).await?;
                current.cart.with_amount(product_id, requested)
            }
            None => {
                let product = self
                    .catalog
                    .product(product_id)
                    .await
                    .map_err(|source| CartError::ProductFetch { product_id, source })?;
                current.cart.with_product(product)
            }
        };

        self.commit(&current, next)
    }

    /// Remove a product's line.
    pub async fn try_remove_product(
        &self,
        product_id: ProductId,
    ) -> Result<CartSnapshot, CartError> {
        let _writer = self.writer.lock().await;
        let current = self.snapshot();

        if !current.cart.contains(product_id) {
            return Err(CartError::ProductNotInCart(product_id));
        }

        let next = current.cart.without(product_id);
        self.commit(&current, next)
    }

    /// Set a product's quantity to the absolute `amount`.
    ///
    /// When `current + amount <= 1`, or `amount` itself is below 1, the call
    /// is a silent no-op and returns the unchanged snapshot.
    pub async fn try_update_product_amount(
        &self,
        update: UpdateProductAmount,
    ) -> Result<CartSnapshot, CartError> {
        let UpdateProductAmount { product_id, amount } = update;
        let _writer = self.writer.lock().await;
        let current = self.snapshot();

        let item = current
            .cart
            .find(product_id)
            .ok_or(CartError::ProductNotInCart(product_id))?;

        if item.amount.saturating_add(amount) <= 1 || amount < 1 {
            tracing::debug!(%product_id, current = item.amount, amount, "quantity update ignored");
            return Ok(current);
        }

        self.ensure_stock(product_id, amount).await?;
        let next = current.cart.with_amount(product_id, amount);
        self.commit(&current, next)
    }

    async fn ensure_stock(&self, product_id: ProductId, requested: i64) -> Result<(), CartError> {
        let stock = self
            .catalog
            .stock(product_id)
            .await
            .map_err(|source| CartError::StockFetch { product_id, source })?;

        if !stock.covers(requested) {
            return Err(CartError::OutOfStock {
                product_id,
                requested,
                available: stock.amount,
            });
        }
        Ok(())
    }

    /// Persist `next`, then publish it. A failed write publishes nothing.
    fn commit(&self, current: &CartSnapshot, next: Cart) -> Result<CartSnapshot, CartError> {
        self.storage.set(CART_STORAGE_KEY, &next)?;

        let snapshot = CartSnapshot {
            version: current.version + 1,
            cart: Arc::new(next),
        };
        self.state.send_replace(snapshot.clone());

        tracing::debug!(
            version = snapshot.version,
            items = snapshot.cart.len(),
            "cart committed"
        );
        Ok(snapshot)
    }

    fn report(&self, op: CartOperation, product_id: ProductId, error: &CartError) {
        tracing::warn!(%op, %product_id, error = %error, "cart operation failed");
        self.notifier.error(error.user_message(op));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Product, Stock};
    use crate::error::{
        CatalogError, ADD_FAILED_MESSAGE, OUT_OF_STOCK_MESSAGE, REMOVE_FAILED_MESSAGE,
        UPDATE_FAILED_MESSAGE,
    };
    use async_trait::async_trait;
    use rocket_cache::{CacheError, KvBackend};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeCatalog {
        products: HashMap<ProductId, Product>,
        stock: HashMap<ProductId, i64>,
        offline: bool,
        stock_calls: AtomicUsize,
    }

    impl FakeCatalog {
        fn with(mut self, id: u64, stock: i64) -> Self {
            let id = ProductId::new(id);
            self.products.insert(id, product(id.get()));
            self.stock.insert(id, stock);
            self
        }

        fn offline(mut self) -> Self {
            self.offline = true;
            self
        }
    }

    #[async_trait]
    impl Catalog for FakeCatalog {
        async fn stock(&self, id: ProductId) -> Result<Stock, CatalogError> {
            self.stock_calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            if self.offline {
                return Err(CatalogError::Unavailable("offline".into()));
            }
            self.stock
                .get(&id)
                .map(|&amount| Stock { id, amount })
                .ok_or(CatalogError::NotFound(id))
        }

        async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
            tokio::task::yield_now().await;
            if self.offline {
                return Err(CatalogError::Unavailable("offline".into()));
            }
            self.products.get(&id).cloned().ok_or(CatalogError::NotFound(id))
        }

        async fn products(&self) -> Result<Vec<Product>, CatalogError> {
            Ok(self.products.values().cloned().collect())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        messages: std::sync::Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        fn messages(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn error(&self, message: &str) {
            self.messages.lock().unwrap().push(message.to_string());
        }
    }

    #[derive(Debug, Default)]
    struct ReadOnlyBackend;

    impl KvBackend for ReadOnlyBackend {
        fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Ok(None)
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), CacheError> {
            Err(CacheError::StoreError("quota exceeded".into()))
        }
        fn delete(&self, _key: &str) -> Result<(), CacheError> {
            Ok(())
        }
        fn keys(&self) -> Result<Vec<String>, CacheError> {
            Ok(vec![])
        }
    }

    fn product(id: u64) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Shoe {id}"),
            price: 99.9,
            image: format!("https://example.com/{id}.jpg"),
        }
    }

    fn item(id: u64, amount: i64) -> CartItem {
        CartItem {
            product: product(id),
            amount,
        }
    }

    struct Harness {
        store: CartStore,
        storage: Cache,
        catalog: Arc<FakeCatalog>,
        notifier: Arc<RecordingNotifier>,
    }

    impl Harness {
        fn new(catalog: FakeCatalog, initial: &[CartItem]) -> Self {
            let storage = Cache::in_memory();
            if !initial.is_empty() {
                storage.set(CART_STORAGE_KEY, initial).unwrap();
            }
            Self::with_storage(catalog, storage)
        }

        fn with_storage(catalog: FakeCatalog, storage: Cache) -> Self {
            let catalog = Arc::new(catalog);
            let notifier = Arc::new(RecordingNotifier::default());
            let store = CartStore::load(catalog.clone(), storage.clone(), notifier.clone());
            Self {
                store,
                storage,
                catalog,
                notifier,
            }
        }

        fn persisted(&self) -> Option<Cart> {
            self.storage.get(CART_STORAGE_KEY).unwrap()
        }

        fn lines(&self) -> Vec<(u64, i64)> {
            self.store
                .cart()
                .iter()
                .map(|i| (i.id().get(), i.amount))
                .collect()
        }
    }

    const P1: ProductId = ProductId::new(1);
    const P2: ProductId = ProductId::new(2);
    const P3: ProductId = ProductId::new(3);

    #[tokio::test]
    async fn test_load_empty_when_absent() {
        let h = Harness::new(FakeCatalog::default(), &[]);
        assert!(h.store.cart().is_empty());
        assert_eq!(h.store.snapshot().version, 0);
    }

    #[tokio::test]
    async fn test_load_persisted_cart() {
        let h = Harness::new(FakeCatalog::default(), &[item(1, 2), item(3, 1)]);
        assert_eq!(h.lines(), vec![(1, 2), (3, 1)]);
        assert_eq!(h.store.cart_size(), 2);
        assert_eq!(h.store.amount_of(P1), 2);
    }

    #[tokio::test]
    async fn test_load_corrupt_value_starts_empty() {
        let storage = Cache::in_memory();
        storage.set(CART_STORAGE_KEY, "definitely not a cart").unwrap();
        let h = Harness::with_storage(FakeCatalog::default(), storage);
        assert!(h.store.cart().is_empty());
    }

    #[tokio::test]
    async fn test_add_new_product() {
        let h = Harness::new(FakeCatalog::default().with(2, 5), &[]);

        h.store.add_product(P2).await;

        let cart = h.store.cart();
        assert_eq!(cart.items(), &[item(2, 1)]);
        assert_eq!(h.persisted().as_ref(), Some(cart.as_ref()));
        assert!(h.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_add_new_product_skips_stock_check() {
        let h = Harness::new(FakeCatalog::default().with(1, 0), &[]);

        let snapshot = h.store.add_product(P1).await.unwrap();

        assert_eq!(snapshot.cart.amount_of(P1), 1);
        assert_eq!(h.catalog.stock_calls.load(Ordering::SeqCst), 0);
        assert!(h.notifier.messages().is_empty());

        // The next unit is checked and refused
        assert!(h.store.add_product(P1).await.is_none());
        assert_eq!(h.catalog.stock_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.notifier.messages(), vec![OUT_OF_STOCK_MESSAGE]);
        assert_eq!(h.lines(), vec![(1, 1)]);
    }

    #[tokio::test]
    async fn test_add_existing_product_increments() {
        let h = Harness::new(FakeCatalog::default().with(1, 3), &[item(1, 2)]);

        let snapshot = h.store.try_add_product(P1).await.unwrap();

        assert_eq!(snapshot.version, 1);
        assert_eq!(h.lines(), vec![(1, 3)]);
        assert_eq!(h.persisted().unwrap().amount_of(P1), 3);
    }

    #[tokio::test]
    async fn test_add_existing_product_out_of_stock() {
        let h = Harness::new(FakeCatalog::default().with(1, 1), &[item(1, 1)]);

        let result = h.store.try_add_product(P1).await;
        assert!(matches!(
            result,
            Err(CartError::OutOfStock {
                requested: 2,
                available: 1,
                ..
            })
        ));

        h.store.add_product(P1).await;
        assert_eq!(h.lines(), vec![(1, 1)]);
        assert_eq!(h.store.snapshot().version, 0);
        assert_eq!(h.notifier.messages(), vec![OUT_OF_STOCK_MESSAGE]);
    }

    #[tokio::test]
    async fn test_add_unknown_product_fails_with_fetch_error() {
        let h = Harness::new(FakeCatalog::default(), &[item(1, 1)]);

        let result = h.store.try_add_product(P3).await;
        assert!(matches!(result, Err(CartError::ProductFetch { .. })));

        h.store.add_product(P3).await;
        assert_eq!(h.lines(), vec![(1, 1)]);
        assert_eq!(h.notifier.messages(), vec![ADD_FAILED_MESSAGE]);
    }

    #[tokio::test]
    async fn test_add_existing_when_stock_lookup_fails() {
        let h = Harness::new(FakeCatalog::default().with(1, 9).offline(), &[item(1, 1)]);

        let result = h.store.try_add_product(P1).await;
        assert!(matches!(result, Err(CartError::StockFetch { .. })));

        h.store.add_product(P1).await;
        assert_eq!(h.notifier.messages(), vec![ADD_FAILED_MESSAGE]);
        assert_eq!(h.lines(), vec![(1, 1)]);
    }

    #[tokio::test]
    async fn test_remove_absent_product() {
        let h = Harness::new(FakeCatalog::default(), &[item(1, 2)]);
        let before = h.storage.get_raw(CART_STORAGE_KEY).unwrap();

        h.store.remove_product(P2).await;

        assert_eq!(h.storage.get_raw(CART_STORAGE_KEY).unwrap(), before);
        assert_eq!(h.lines(), vec![(1, 2)]);
        assert_eq!(h.notifier.messages(), vec![REMOVE_FAILED_MESSAGE]);
    }

    #[tokio::test]
    async fn test_remove_present_product_keeps_others() {
        let h = Harness::new(
            FakeCatalog::default(),
            &[item(1, 2), item(2, 1), item(3, 4)],
        );

        h.store.remove_product(P2).await;

        assert_eq!(h.lines(), vec![(1, 2), (3, 4)]);
        assert_eq!(h.persisted().unwrap().items(), &[item(1, 2), item(3, 4)]);
    }

    #[tokio::test]
    async fn test_update_sets_absolute_amount() {
        let h = Harness::new(FakeCatalog::default().with(1, 10), &[item(1, 2), item(2, 1)]);

        h.store
            .update_product_amount(UpdateProductAmount {
                product_id: P1,
                amount: 5,
            })
            .await;

        assert_eq!(h.lines(), vec![(1, 5), (2, 1)]);
        assert_eq!(h.persisted().unwrap().amount_of(P1), 5);
        assert!(h.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_update_guard_is_silent_noop() {
        let h = Harness::new(FakeCatalog::default().with(1, 10), &[item(1, 1)]);

        // 1 + 0 <= 1
        let snapshot = h
            .store
            .try_update_product_amount(UpdateProductAmount {
                product_id: P1,
                amount: 0,
            })
            .await
            .unwrap();

        assert_eq!(snapshot.version, 0);
        assert_eq!(h.lines(), vec![(1, 1)]);
        assert!(h.persisted().is_some());
        assert!(h.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_update_never_drives_amount_below_one() {
        let h = Harness::new(FakeCatalog::default().with(1, 10), &[item(1, 5)]);

        h.store
            .update_product_amount(UpdateProductAmount {
                product_id: P1,
                amount: -2,
            })
            .await;

        assert_eq!(h.lines(), vec![(1, 5)]);
        assert_eq!(h.store.snapshot().version, 0);
    }

    #[tokio::test]
    async fn test_update_out_of_stock() {
        let h = Harness::new(FakeCatalog::default().with(1, 3), &[item(1, 2)]);

        let result = h
            .store
            .try_update_product_amount(UpdateProductAmount {
                product_id: P1,
                amount: 4,
            })
            .await;
        assert!(matches!(result, Err(CartError::OutOfStock { .. })));
        assert_eq!(h.lines(), vec![(1, 2)]);

        let update = UpdateProductAmount {
            product_id: P1,
            amount: 4,
        };
        assert!(h.store.update_product_amount(update).await.is_none());
        assert_eq!(h.notifier.messages(), vec![OUT_OF_STOCK_MESSAGE]);
        assert_eq!(h.persisted().unwrap().amount_of(P1), 2);
    }

    #[tokio::test]
    async fn test_update_when_stock_lookup_fails() {
        let h = Harness::new(FakeCatalog::default().with(1, 9).offline(), &[item(1, 2)]);
        let update = UpdateProductAmount {
            product_id: P1,
            amount: 3,
        };

        let result = h.store.try_update_product_amount(update).await;
        assert!(matches!(result, Err(CartError::StockFetch { .. })));

        assert!(h.store.update_product_amount(update).await.is_none());
        assert_eq!(h.notifier.messages(), vec![UPDATE_FAILED_MESSAGE]);
        assert_eq!(h.lines(), vec![(1, 2)]);
        assert_eq!(h.store.snapshot().version, 0);
    }

    #[tokio::test]
    async fn test_update_absent_product() {
        let h = Harness::new(FakeCatalog::default().with(1, 3), &[]);

        h.store
            .update_product_amount(UpdateProductAmount {
                product_id: P1,
                amount: 2,
            })
            .await;

        assert!(h.store.cart().is_empty());
        assert_eq!(h.notifier.messages(), vec![UPDATE_FAILED_MESSAGE]);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_cart_unchanged() {
        let storage = Cache::new(ReadOnlyBackend);
        let h = Harness::with_storage(FakeCatalog::default().with(1, 5), storage);

        let result = h.store.try_add_product(P1).await;
        assert!(matches!(result, Err(CartError::Storage(_))));
        assert!(h.store.cart().is_empty());

        h.store.add_product(P1).await;
        assert_eq!(h.notifier.messages(), vec![ADD_FAILED_MESSAGE]);
    }

    #[tokio::test]
    async fn test_concurrent_adds_are_not_lost() {
        let h = Harness::new(FakeCatalog::default().with(1, 5), &[]);

        futures::future::join_all((0..3).map(|_| h.store.add_product(P1))).await;

        assert_eq!(h.lines(), vec![(1, 3)]);
        assert_eq!(h.store.snapshot().version, 3);
        assert_eq!(h.persisted().unwrap().amount_of(P1), 3);
    }

    #[tokio::test]
    async fn test_subscribers_see_commits() {
        let h = Harness::new(FakeCatalog::default().with(1, 5).with(2, 5), &[]);
        let mut rx = h.store.subscribe();

        h.store.add_product(P1).await;
        assert!(rx.has_changed().unwrap());
        let seen = rx.borrow_and_update().clone();
        assert_eq!(seen.version, 1);
        assert_eq!(seen.cart.len(), 1);

        // Failed operations publish nothing
        h.store.remove_product(P3).await;
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_persisted_value_round_trips() {
        let h = Harness::new(FakeCatalog::default().with(1, 5).with(2, 5), &[]);

        h.store.add_product(P1).await;
        h.store.add_product(P2).await;
        h.store.add_product(P1).await;
        h.store
            .update_product_amount(UpdateProductAmount {
                product_id: P2,
                amount: 4,
            })
            .await;

        let raw = h.storage.get_raw(CART_STORAGE_KEY).unwrap().unwrap();
        let decoded: Cart = serde_json::from_str(&raw).unwrap();
        assert_eq!(&decoded, h.store.cart().as_ref());
        assert_eq!(serde_json::to_string(&decoded).unwrap(), raw);
        assert_eq!(h.lines(), vec![(1, 2), (2, 4)]);
    }
}
