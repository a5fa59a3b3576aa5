//! Out-of-process implementation of the grid API.
//!
//! The native kernel occasionally crashes or is built for a different
//! bitness than the embedding process. [`RemoteUGridApi`] isolates it: every
//! operation is forwarded as a line of JSON to a `ugrid-host` child process
//! that holds the actual [`grid_api::NativeUGridApi`], and the reply carries
//! the same status code the in-process call would have produced.
//!
//! Error semantics are part of the contract: an absent or dead host makes
//! every operation report `GENERAL_FATAL_ERR` (NaN for the version query,
//! `Null` for convention probes); callers cannot tell "no remote process"
//! apart from "fatal native error", and must not need to.

pub mod api;
pub mod instance;
pub mod protocol;

pub use api::RemoteUGridApi;
pub use instance::{RemoteInstance, HOST_EXE_ENV, REMOTE_EXIT_GRACE};
pub use protocol::{ConnectivityTable, Request, Response};
