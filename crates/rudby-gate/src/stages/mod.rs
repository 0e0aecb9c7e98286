//! Built-in gate stages.

pub mod ownership;
pub mod principal;

pub use ownership::OwnershipStage;
pub use principal::PrincipalStage;
