//! Runtime binding to the native `io_netcdf` unstructured-grid library.
//!
//! The native library exposes a Fortran-backed C API (`ionc_*` entry points)
//! for reading and writing UGRID-convention NetCDF files. This crate binds it
//! at *runtime* rather than link time: the library is resolved with
//! [`libloading`] when an [`IoncWrapper`] is constructed, so a machine without
//! the kernel installed degrades to "no API available" instead of failing to
//! link.
//!
//! Layering:
//!
//! - [`ffi`]: raw `#[repr(C)]` types, fixed-width character buffers and
//!   function-pointer signatures, one per entry point.
//! - [`library`]: [`IoncLibrary`] loads the shared library and resolves
//!   every symbol up front.
//! - [`wrapper`]: the [`GridWrapper`] seam (one method per entry point,
//!   caller-allocated buffers, native status codes in and out) and
//!   [`IoncWrapper`], its implementation over [`IoncLibrary`].
//!
//! Nothing in this crate interprets results; status codes pass through
//! unchanged and buffers are filled in place.

pub mod ffi;
pub mod library;
pub mod wrapper;

pub use ffi::{
    InteropCharInfo, InteropMetadata, MeshGeom, MeshGeomDim, IDS_SIZE, IONC_NOERR,
    LONG_NAMES_SIZE, MAXSTRLEN, METADATA_SIZE,
};
pub use library::{IoncLibrary, LoadError};
pub use wrapper::{GridWrapper, IoncWrapper};
