//! Cart commands.

use anyhow::Result;
use rocket_commerce::prelude::*;
use serde_json::json;

use super::{ProductArgs, Reported, UpdateArgs};
use crate::context::Context;
use crate::output::truncate;

const WIDTHS: [usize; 5] = [4, 32, 12, 4, 14];

/// Show the cart.
pub async fn show(ctx: &Context) -> Result<()> {
    let store = ctx.cart_store()?;
    print_cart(ctx, &store.snapshot())
}

/// Add one unit of a product.
pub async fn add(args: ProductArgs, ctx: &Context) -> Result<()> {
    let store = ctx.cart_store()?;
    let snapshot = store.add_product(args.id).await.ok_or(Reported)?;

    if ctx.output.is_json() {
        return print_cart(ctx, &snapshot);
    }
    if let Some(item) = snapshot.cart.find(args.id) {
        ctx.output.success(&format!(
            "{} in cart: {}",
            item.product.title, item.amount
        ));
    }
    Ok(())
}

/// Remove a product line.
pub async fn remove(args: ProductArgs, ctx: &Context) -> Result<()> {
    let store = ctx.cart_store()?;
    let snapshot = store.remove_product(args.id).await.ok_or(Reported)?;

    if ctx.output.is_json() {
        return print_cart(ctx, &snapshot);
    }
    ctx.output
        .success(&format!("Removed product {} from the cart", args.id));
    Ok(())
}

/// Set the quantity of a product line.
pub async fn update(args: UpdateArgs, ctx: &Context) -> Result<()> {
    let store = ctx.cart_store()?;
    let before = store.amount_of(args.id);

    let snapshot = store
        .update_product_amount(UpdateProductAmount {
            product_id: args.id,
            amount: args.amount,
        })
        .await
        .ok_or(Reported)?;

    if ctx.output.is_json() {
        return print_cart(ctx, &snapshot);
    }

    let after = snapshot.cart.amount_of(args.id);
    if after == before {
        ctx.output
            .warn(&format!("Quantity of product {} unchanged ({})", args.id, after));
    } else {
        ctx.output
            .success(&format!("Quantity of product {} set to {}", args.id, after));
    }
    Ok(())
}

fn print_cart(ctx: &Context, snapshot: &CartSnapshot) -> Result<()> {
    let currency = ctx.currency()?;
    let pricing = snapshot.cart.pricing(currency)?;

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "version": snapshot.version,
            "cart": &*snapshot.cart,
            "pricing": pricing,
        }));
        return Ok(());
    }

    if snapshot.cart.is_empty() {
        ctx.output.info("Your cart is empty");
        return Ok(());
    }

    ctx.output.header("Cart");
    ctx.output
        .table_row(&["ID", "PRODUCT", "PRICE", "QTY", "SUBTOTAL"], &WIDTHS);

    for (item, line) in snapshot.cart.iter().zip(&pricing.lines) {
        ctx.output.table_row(
            &[
                &item.id().to_string(),
                &truncate(&item.product.title, WIDTHS[1]),
                &line.unit_price.to_string(),
                &line.amount.to_string(),
                &line.subtotal.to_string(),
            ],
            &WIDTHS,
        );
    }

    println!();
    ctx.output.kv("Products", &snapshot.cart.len().to_string());
    ctx.output.kv("Items", &pricing.item_count.to_string());
    ctx.output.kv("Total", &pricing.total.to_string());

    Ok(())
}
