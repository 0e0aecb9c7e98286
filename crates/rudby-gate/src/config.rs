use rudby_types::{CatalogRecord, PrincipalId};
use serde::{Deserialize, Serialize};

/// Which records a bulk listing returns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingScope {
    /// Every record, regardless of owner. Single-record access is still
    /// gated; this only affects listings.
    #[default]
    Unscoped,
    /// Only the caller's own records.
    OwnerScoped,
}

impl ListingScope {
    /// Whether `record` belongs in a listing requested by `caller`.
    pub fn admits(self, caller: &PrincipalId, record: &CatalogRecord) -> bool {
        match self {
            Self::Unscoped => true,
            Self::OwnerScoped => record.owner_id == *caller,
        }
    }
}

/// Configuration for the ownership gate.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// When `true`, callers who are denied access see "not found" instead of
    /// "access denied", so they cannot probe for other principals' records.
    pub conceal_denied: bool,
    /// Scope applied to bulk listings.
    pub listing: ListingScope,
}

impl GateConfig {
    /// A configuration that leaks nothing about records the caller does not
    /// own: denials look like misses and listings are owner-scoped.
    pub fn information_hiding() -> Self {
        Self {
            conceal_denied: true,
            listing: ListingScope::OwnerScoped,
        }
    }
}
