//! Conduit Client Library
//!
//! Typed client for the Conduit ("RealWorld") demo API: wire-format types,
//! the REST client used for fixture setup and teardown, and the session
//! bootstrap that turns credentials into a reusable browser storage state.

pub mod api;
pub mod error;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use api::ConduitClient;
pub use error::{Error, Result};
pub use session::{bootstrap, Credentials, Session, StorageState};
pub use types::{Article, ArticleDraft, User};

/// Conduit client version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default base URL of the Conduit demo frontend
pub const DEFAULT_APP_URL: &str = "https://angular.realworld.how";

/// Default base URL of the Conduit API
pub const DEFAULT_API_URL: &str = "https://api.realworld.io/api";
