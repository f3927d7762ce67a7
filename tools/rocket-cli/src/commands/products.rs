//! Product listing.

use anyhow::{Context as _, Result};
use futures::future::join_all;
use rocket_commerce::prelude::*;
use serde::Serialize;

use super::ProductsArgs;
use crate::context::Context;
use crate::output::truncate;

const WIDTHS: [usize; 5] = [4, 32, 12, 6, 8];

#[derive(Serialize)]
struct Listing<'a> {
    #[serde(flatten)]
    product: &'a Product,
    #[serde(skip_serializing_if = "Option::is_none")]
    stock: Option<i64>,
    in_cart: i64,
}

/// List products on sale.
pub async fn run(args: ProductsArgs, ctx: &Context) -> Result<()> {
    let currency = ctx.currency()?;
    let store = ctx.cart_store()?;
    let catalog = store.catalog();

    let spinner = ctx.output.spinner("Fetching products...");
    let products = catalog.products().await;
    let products = match products {
        Ok(products) => products,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e).context("Failed to list products");
        }
    };

    let stock: Vec<Option<i64>> = if args.stock {
        spinner.set_message("Fetching stock...");
        join_all(products.iter().map(|p| catalog.stock(p.id)))
            .await
            .into_iter()
            .map(|s| s.ok().map(|s| s.amount))
            .collect()
    } else {
        vec![None; products.len()]
    };
    spinner.finish_and_clear();

    let listing: Vec<Listing<'_>> = products
        .iter()
        .zip(stock)
        .map(|(product, stock)| Listing {
            product,
            stock,
            in_cart: store.amount_of(product.id),
        })
        .collect();

    if ctx.output.is_json() {
        ctx.output.json(&listing);
        return Ok(());
    }

    if listing.is_empty() {
        ctx.output.info("No products available");
        return Ok(());
    }

    ctx.output.header("Products");
    ctx.output
        .table_row(&["ID", "PRODUCT", "PRICE", "STOCK", "IN CART"], &WIDTHS);

    for entry in &listing {
        let stock = match (args.stock, entry.stock) {
            (false, _) => "-".to_string(),
            (true, Some(amount)) => amount.to_string(),
            (true, None) => "?".to_string(),
        };
        ctx.output.table_row(
            &[
                &entry.product.id.to_string(),
                &truncate(&entry.product.title, WIDTHS[1]),
                &entry.product.unit_price(currency).to_string(),
                &stock,
                &entry.in_cart.to_string(),
            ],
            &WIDTHS,
        );
    }

    Ok(())
}
