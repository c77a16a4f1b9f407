//! Core types shared by every bzljvm module
//!
//! ## `error` - Error Handling
//!
//! - [`BzlError`] - Enumerated error types covering the graph and classpath failure modes
//! - [`ErrorContext`] - User-friendly error wrapper with suggestions and details
//! - [`user_friendly_error`] - Convert any error to user-friendly format
//!
//! ```rust,no_run
//! use bzljvm::core::{BzlError, user_friendly_error};
//!
//! fn run() -> anyhow::Result<()> {
//!     Err(BzlError::MissingAspectData { target: "//app".to_string() }.into())
//! }
//!
//! if let Err(e) = run() {
//!     user_friendly_error(e).display();
//! }
//! ```

pub mod error;

pub use error::{BzlError, ErrorContext, user_friendly_error};

/// Result alias for the library APIs.
pub type Result<T, E = BzlError> = std::result::Result<T, E>;
