//! Error handling for bzljvm
//!
//! Two layers, mirroring how the crate is used:
//! 1. [`BzlError`] is the strongly-typed error returned by the graph and
//!    classpath APIs.
//! 2. [`ErrorContext`] wraps an error with user-facing details and a
//!    suggestion for the command-line front end.
//!
//! Most of the failure modes a classpath resolution can hit are *recovered*
//! rather than returned: missing aspect data only clears
//! [`ResolvedClasspath::is_complete`](crate::classpath::ResolvedClasspath::is_complete),
//! malformed jar entries are skipped, and cycles found during reachability
//! queries are logged. The corresponding variants still exist so strict mode
//! can surface them, and so diagnostics print consistently.
//!
//! # Examples
//!
//! ```rust,no_run
//! use bzljvm::core::{BzlError, ErrorContext, user_friendly_error};
//!
//! let error = BzlError::MissingAspectData {
//!     target: "//app:server".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//!
//! let manual = ErrorContext::new(BzlError::ConfigError {
//!     message: "unknown ordering".to_string(),
//! })
//! .with_suggestion("Use 'topological' or 'insertion'");
//! println!("{manual}");
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for bzljvm operations.
///
/// # Error Categories
///
/// ## Aspect data
/// - [`MissingAspectData`] - no dependency record for a requested target
/// - [`MalformedDependencyEntry`] - a jar set or project entry could not be built
/// - [`RecordsParseError`] - aspect JSON could not be decoded
///
/// ## Graph
/// - [`CyclicPathDetected`] - a reachability walk came back to a label on its path
/// - [`InvalidLabel`] - a label string failed validation
///
/// ## Resolution
/// - [`ResolutionFailure`] - a collaborator (record fetch, project model) failed
/// - [`Cancelled`] - the caller's progress monitor asked to stop
///
/// ## Configuration
/// - [`ConfigError`] - an invalid setting or override
///
/// [`MissingAspectData`]: BzlError::MissingAspectData
/// [`MalformedDependencyEntry`]: BzlError::MalformedDependencyEntry
/// [`RecordsParseError`]: BzlError::RecordsParseError
/// [`CyclicPathDetected`]: BzlError::CyclicPathDetected
/// [`InvalidLabel`]: BzlError::InvalidLabel
/// [`ResolutionFailure`]: BzlError::ResolutionFailure
/// [`Cancelled`]: BzlError::Cancelled
/// [`ConfigError`]: BzlError::ConfigError
#[derive(Error, Debug, Clone)]
pub enum BzlError {
    /// A target has no dependency record in the aspect output.
    ///
    /// Usually means the aspect has not been run since the target was added,
    /// or the last build failed before reaching it.
    #[error("No aspect data available for target '{target}'")]
    MissingAspectData {
        /// The target whose record is missing
        target: String,
    },

    /// A reachability walk revisited a label that was already on its path.
    ///
    /// Graph queries never return this; it is produced for diagnostics by
    /// [`LabelGraph::find_cycles`](crate::graph::LabelGraph::find_cycles) callers
    /// and for the warning logged during `is_dependency`.
    #[error("Cyclic dependency path detected at '{label}': {path}")]
    CyclicPathDetected {
        /// The label that closed the cycle
        label: String,
        /// The path walked so far, rendered as `a -> b -> a`
        path: String,
    },

    /// A jar set or project entry in a dependency record could not be built.
    #[error("Malformed dependency entry in '{target}': {reason}")]
    MalformedDependencyEntry {
        /// The target whose record contained the bad entry
        target: String,
        /// What was wrong with it
        reason: String,
    },

    /// A collaborator failed while resolving a project classpath.
    #[error("Classpath resolution failed for project '{project}': {reason}")]
    ResolutionFailure {
        /// The project being resolved
        project: String,
        /// The underlying failure
        reason: String,
    },

    /// A label string is not valid Bazel label syntax.
    #[error("Invalid label '{label}': {reason}")]
    InvalidLabel {
        /// The rejected label text
        label: String,
        /// Why it was rejected
        reason: String,
    },

    /// Aspect records could not be decoded.
    #[error("Failed to parse aspect records from {file}: {reason}")]
    RecordsParseError {
        /// Where the records came from
        file: String,
        /// The decoder's message
        reason: String,
    },

    /// The caller cancelled a resolution between targets.
    #[error("Classpath resolution for project '{project}' was cancelled")]
    Cancelled {
        /// The project whose resolution was abandoned
        project: String,
    },

    /// Configuration is invalid.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl BzlError {
    /// Whether the error means "stop and report" rather than "degrade".
    ///
    /// Cancellation and configuration problems are never turned into a
    /// partial classpath, even outside strict mode.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Cancelled { .. } | Self::ConfigError { .. })
    }
}

/// Error context wrapper that provides user-friendly error information.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: BzlError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: BzlError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    ///
    /// Suggestions are displayed in green.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    ///
    /// Details are displayed in yellow.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with suggestions where the
/// failure is recognizable.
///
/// Known [`BzlError`] variants get tailored advice; I/O, TOML, and JSON
/// errors are mapped to their closest variant; anything else is rendered
/// with its full `anyhow` cause chain.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(bzl_error) = error.downcast_ref::<BzlError>() {
        return create_error_context(bzl_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(BzlError::Other {
                    message: format!("{error:#}"),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct")
                .with_details(
                    "This error occurs when a required file or directory cannot be found",
                );
            }
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(BzlError::Other {
                    message: format!("{error:#}"),
                })
                .with_suggestion("Check file ownership and permissions");
            }
            _ => {}
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(BzlError::ConfigError {
            message: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax in your bzljvm.toml file")
        .with_details("Every key is optional; an empty file yields the default configuration");
    }

    if let Some(json_error) = error.downcast_ref::<serde_json::Error>() {
        return ErrorContext::new(BzlError::RecordsParseError {
            file: "records".to_string(),
            reason: json_error.to_string(),
        })
        .with_suggestion("Regenerate the aspect output and make sure it is a JSON array of records");
    }

    // Generic error - include the full error chain for better diagnostics
    let mut message = error.to_string();

    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(BzlError::Other {
        message,
    })
}

fn create_error_context(error: BzlError) -> ErrorContext {
    match &error {
        BzlError::MissingAspectData { .. } => ErrorContext::new(error)
            .with_suggestion("Build the target once so the aspect can record its dependencies")
            .with_details("The classpath for this target will be reported as incomplete"),

        BzlError::CyclicPathDetected { .. } => ErrorContext::new(error)
            .with_suggestion("Break the cycle, or enable target granularity if the packages only depend on each other through different targets")
            .with_details("Package-level graphs cannot represent two packages that depend on each other"),

        BzlError::MalformedDependencyEntry { .. } => ErrorContext::new(error)
            .with_suggestion("Re-run the aspect; the cached aspect output for this target has been flushed")
            .with_details("Every jar set must name at least its output jar"),

        BzlError::ResolutionFailure { .. } => ErrorContext::new(error)
            .with_suggestion("Check that the last Bazel build succeeded, then retry")
            .with_details("Outside strict mode this yields an empty classpath marked incomplete"),

        BzlError::InvalidLabel { .. } => ErrorContext::new(error)
            .with_suggestion("Labels look like //path/to/package or //path/to/package:target, optionally prefixed with @repo"),

        BzlError::RecordsParseError { .. } => ErrorContext::new(error)
            .with_suggestion("Regenerate the aspect output and make sure it is a JSON array of records"),

        BzlError::ConfigError { .. } => ErrorContext::new(error)
            .with_suggestion("Check the TOML syntax and keys in your bzljvm.toml file"),

        _ => ErrorContext::new(error),
    }
}
