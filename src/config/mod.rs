//! Configuration for bzljvm.
//!
//! A workspace may carry a `bzljvm.toml` next to its `WORKSPACE` file. All
//! keys are optional; see [`ResolverConfig`] for the recognized settings and
//! their defaults. The CLI's `--config` flag points at a different file.
//!
//! # Precedence
//!
//! 1. `BZLJVM_STRICT` environment variable
//! 2. The file named by `--config`, or `bzljvm.toml` in the workspace root
//! 3. Built-in defaults

mod settings;

pub use settings::ResolverConfig;
