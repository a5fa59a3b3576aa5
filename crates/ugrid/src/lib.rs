//! High-level access to UGRID-convention NetCDF grid files.
//!
//! This is the seam where the status codes of the lower layers become real
//! errors. [`AGrid`] owns the open/initialize/close lifecycle of one grid
//! file over any [`grid_api::UGridApi`] implementation, local or remote;
//! [`UGrid`] adds the cached convenience operations the rest of an
//! application wants (all node coordinates as points, connectivity tables per
//! mesh, Z values at faces or nodes); [`file_helper`] covers the whole-file
//! operations that branch between the UGRID and legacy code paths based on
//! the detected convention.
//!
//! Callers of this crate see either typed data or a [`GridApiError`] with a
//! readable context message; raw native error integers stay below this line.

pub mod agrid;
pub mod error;
pub mod factory;
pub mod file_helper;
pub mod netfile;
pub mod spatial;
pub mod ugrid;

pub use agrid::AGrid;
pub use error::{GridApiError, Result};
pub use factory::{create_api, ApiMode};
pub use file_helper::BedLevelLocation;
pub use spatial::CoordinateSystem;
pub use ugrid::UGrid;
