//! Status-code plumbing for the typed API layer.
//!
//! The binding and typed layers never throw for expected failure; they carry
//! the native status code. [`ErrorCode`] is that code classed as an error so
//! `?` composes, and the conversion to a descriptive error type happens once,
//! in the `ugrid` facade.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{GENERAL_ARRAY_LENGTH_FATAL_ERR, GENERAL_FATAL_ERR, NOERR};

/// A nonzero native status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("native error code {0}")]
pub struct ErrorCode(pub i32);

impl ErrorCode {
    pub const FATAL: ErrorCode = ErrorCode(GENERAL_FATAL_ERR);
    pub const ARRAY_LENGTH: ErrorCode = ErrorCode(GENERAL_ARRAY_LENGTH_FATAL_ERR);

    pub fn code(self) -> i32 {
        self.0
    }
}

pub type GridResult<T> = Result<T, ErrorCode>;

/// Lifts a native status code into a `GridResult`.
pub fn check(code: i32) -> GridResult<()> {
    if code == NOERR {
        Ok(())
    } else {
        Err(ErrorCode(code))
    }
}
