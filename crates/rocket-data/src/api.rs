//! Storefront API endpoints backing the cart's [`Catalog`].

use async_trait::async_trait;
use rocket_commerce::catalog::{Product, Stock};
use rocket_commerce::ports::Catalog;
use rocket_commerce::{CatalogError, ProductId};

use crate::client::{FetchClient, FetchError};
use crate::dependency::DependencyTag;

/// Catalog served over HTTP:
///
/// - `GET /stock/{id}` → `{ id, amount }`
/// - `GET /products/{id}` → `{ id, title, price, image }`
/// - `GET /products` → `[{ id, title, price, image }]`
#[derive(Debug, Clone)]
pub struct StoreApi {
    client: FetchClient,
}

impl StoreApi {
    pub fn new(client: FetchClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Catalog for StoreApi {
    async fn stock(&self, id: ProductId) -> Result<Stock, CatalogError> {
        self.client
            .fetch(&format!("/stock/{id}"), DependencyTag::Inventory)
            .await
            .map_err(|e| catalog_error(e, Some(id)))
    }

    async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.client
            .fetch(&format!("/products/{id}"), DependencyTag::Catalog)
            .await
            .map_err(|e| catalog_error(e, Some(id)))
    }

    async fn products(&self) -> Result<Vec<Product>, CatalogError> {
        self.client
            .fetch("/products", DependencyTag::Catalog)
            .await
            .map_err(|e| catalog_error(e, None))
    }
}

fn catalog_error(error: FetchError, id: Option<ProductId>) -> CatalogError {
    match (error, id) {
        (FetchError::Http { status: 404, .. }, Some(id)) => CatalogError::NotFound(id),
        (FetchError::Deserialization(msg), _) => CatalogError::InvalidResponse(msg),
        (other, _) => CatalogError::Unavailable(other.to_string()),
    }
}
