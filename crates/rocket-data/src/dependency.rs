//! Dependency tagging for semantic categorization.

use std::time::Duration;

/// Storefront endpoints the cart depends on.
///
/// Each tag carries default timeouts and retry budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyTag {
    /// Stock lookups (`/stock`).
    Inventory,
    /// Product details and listings (`/products`).
    Catalog,
}

impl DependencyTag {
    /// Get the default timeout for this dependency type.
    pub fn default_timeout(&self) -> Duration {
        match self {
            Self::Inventory => Duration::from_secs(3),
            Self::Catalog => Duration::from_secs(5),
        }
    }

    /// Get the default max retries for this dependency type.
    pub fn default_max_retries(&self) -> u32 {
        match self {
            Self::Inventory => 2,
            Self::Catalog => 1,
        }
    }

    /// Get the name of this dependency.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Inventory => "inventory",
            Self::Catalog => "catalog",
        }
    }
}

impl std::fmt::Display for DependencyTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
