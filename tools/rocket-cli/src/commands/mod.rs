//! CLI command implementations.

pub mod cart;
pub mod config;
pub mod products;

use std::fmt;

use clap::{Args, Subcommand};
use rocket_commerce::ProductId;

/// Marker error for failures the cart store already showed to the user.
#[derive(Debug)]
pub struct Reported;

impl fmt::Display for Reported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("operation failed")
    }
}

impl std::error::Error for Reported {}

/// Arguments for commands acting on one product.
#[derive(Args)]
pub struct ProductArgs {
    /// Product id.
    pub id: ProductId,
}

/// Arguments for the update command.
#[derive(Args)]
pub struct UpdateArgs {
    /// Product id.
    pub id: ProductId,

    /// New quantity.
    #[arg(allow_hyphen_values = true)]
    pub amount: i64,
}

/// Arguments for the products command.
#[derive(Args)]
pub struct ProductsArgs {
    /// Also fetch the stock level of every product.
    #[arg(short, long)]
    pub stock: bool,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Write a default rocket.toml in the current directory
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
}
