pub mod error;
pub mod types;

#[cfg(feature = "waterfall")]
pub mod waterfall;

#[cfg(feature = "distribution")]
pub mod distribution;

#[cfg(feature = "sensitivity")]
pub mod sensitivity;

pub use error::SyndicateError;
pub use types::*;

/// Standard result type for all syndicate operations
pub type SyndicateResult<T> = Result<T, SyndicateError>;

/// Crate version, reported by the CLI and bindings
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
