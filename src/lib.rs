//! Front end of the `svg2vector` converter.
//!
//! The crate owns the option metadata (`options`), the error-code category
//! registry (`registry`) and the listing/export of that registry (`report`).
//! Every failure the binary reports is mapped to one registered code.

pub mod check;
pub mod options;
pub mod registry;
pub mod report;

pub use options::{ConversionOptions, OptionSpec, OptionValue, OptionsError, TEXT_AS_SHAPE};
pub use registry::{
    CATEGORIES, Category, ERROR_CODES, ErrorCode, Registry, RegistryInvariantViolation, Violation,
};
pub use report::RegistryReport;

use registry::codes::{REGISTRY_INVALID, UNKNOWN};
use thiserror::Error;

/// Program name used in help text and logs.
pub const APP_NAME: &str = "svg2vector";

/// Environment variable holding the tracing filter directive.
pub const ENV_LOG: &str = "SVG2VECTOR_LOG";

#[derive(Debug, Error)]
#[error("{message}")]
/// A failure tagged with the exit code it should end the process with.
pub struct Failure {
    code: ErrorCode,
    message: String,
}

impl Failure {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }
}

/// Registered code for an error surfaced by the binary.
///
/// Looks through context layers; anything unrecognised is `general.unknown`.
pub fn exit_code(err: &anyhow::Error) -> ErrorCode {
    if let Some(failure) = err.downcast_ref::<Failure>() {
        return failure.code;
    }
    if let Some(options_err) = err.downcast_ref::<OptionsError>() {
        return options_err.error_code();
    }
    if err.downcast_ref::<RegistryInvariantViolation>().is_some() {
        return REGISTRY_INVALID;
    }
    UNKNOWN
}
