//! The exception seam: persistent failures become typed errors here.

use thiserror::Error;

use grid_api::constants::GENERAL_FATAL_ERR;
use grid_api::ErrorCode;

/// Error raised by the facade layer, carrying the native status code and a
/// human-readable context message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (native error code {code})")]
pub struct GridApiError {
    pub code: i32,
    pub message: String,
}

impl GridApiError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Attaches a context message to a status code from the typed layer.
    pub fn from_code(code: ErrorCode, context: impl Into<String>) -> Self {
        Self::new(code.code(), context)
    }

    /// The API could not be created or is in no state to serve requests.
    pub fn unavailable(context: impl Into<String>) -> Self {
        Self::new(GENERAL_FATAL_ERR, context)
    }
}

impl From<netcdf::Error> for GridApiError {
    fn from(error: netcdf::Error) -> Self {
        Self::new(GENERAL_FATAL_ERR, format!("NetCDF error: {error}"))
    }
}

pub type Result<T> = std::result::Result<T, GridApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_combines_context_and_code() {
        let error = GridApiError::from_code(ErrorCode(-1000), "Couldn't get meshname");
        assert_eq!(
            error.to_string(),
            "Couldn't get meshname (native error code -1000)"
        );
    }
}
