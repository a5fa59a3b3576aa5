//! Typed grid operations over the native io_netcdf binding.
//!
//! This crate turns the raw entry points of [`ionc`] into the
//! [`GridApi`]/[`UGridApi`] trait surface the rest of the workspace programs
//! against. The native-backed implementation is [`NativeUGridApi`]; the
//! `grid-remote` crate provides an out-of-process implementation of the same
//! traits.
//!
//! Error signalling follows the layering of the native library: everything
//! here speaks status codes (`Result<T, ErrorCode>`), never panics across the
//! API, and the upgrade to a rich error type happens once, in the `ugrid`
//! facade. A call made while no dataset is open returns
//! [`constants::GENERAL_FATAL_ERR`] without reaching the native library.

pub mod api;
pub mod constants;
pub mod error;
pub mod factory;
pub mod marshal;
pub mod native;
pub mod probe;
pub mod types;

pub use api::{GridApi, UGridApi};
pub use error::{check, ErrorCode, GridResult};
pub use factory::create_native_ugrid_api;
pub use native::NativeUGridApi;
pub use types::{
    DataSetConvention, LocationType, OpenMode, UGridGlobalMetaData, UGridMeshType,
};
