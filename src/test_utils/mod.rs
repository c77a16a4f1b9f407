//! Test utilities for bzljvm
//!
//! Fakes for the collaborator traits of [`crate::classpath`], a builder for
//! aspect records, and logging setup for tests. Available to unit tests and,
//! through the `test-utils` feature, to the integration suite.
//!
//! # Example
//!
//! ```rust,no_run
//! use bzljvm::label::TargetKind;
//! use bzljvm::test_utils::{RecordBuilder, RecordingRecordSource};
//!
//! let source = RecordingRecordSource::with_flat(vec![
//!     RecordBuilder::new("//app:app", TargetKind::JavaLibrary).dep("@maven//:guava").build(),
//!     RecordBuilder::new("@maven//:guava", TargetKind::JavaImport).jar("guava.jar").build(),
//! ]);
//! assert_eq!(source.fetch_count(), 0);
//! ```

pub mod builder;
pub mod fakes;

pub use builder::RecordBuilder;
pub use fakes::{ManualClock, RecordingRecordSource, StaticImplicitDependencies, StaticProjectModel};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. With `level` set, that level is used;
/// otherwise `RUST_LOG` is honored, and without it logging stays off.
///
/// ```bash
/// RUST_LOG=bzljvm=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
