//! Status codes and fixed names shared by every layer of the grid API.

pub use ionc::ffi::{GENERAL_ARRAY_LENGTH_FATAL_ERR, GENERAL_FATAL_ERR, MAXSTRLEN};

/// Success status of any native call.
pub const NOERR: i32 = 0;

/// Minimum UGRID convention version a dataset must report to be treated as
/// UGRID; anything lower is downgraded to [`crate::DataSetConvention::Other`].
pub const UG_CONV_MIN_VERSION: f64 = 1.0;

/// An edge connects exactly two nodes.
pub const NUMBER_OF_NODES_ON_AN_EDGE: usize = 2;

/// Fill value written for newly defined double variables.
pub const DEFAULT_FILL_VALUE: f64 = -999.0;

/// NetCDF external type code for a double variable.
pub const NF90_DOUBLE: i32 = 6;

/// Standard name identifying Z/bed-level variables.
pub const ALTITUDE_STANDARD_NAME: &str = "altitude";
/// Unit of Z values.
pub const METRES_UNIT: &str = "m";
/// UGRID node Z variable name.
pub const NODE_Z_VAR: &str = "node_z";
/// Legacy node Z variable name, still found in older _net.nc files.
pub const NET_NODE_Z_VAR: &str = "NetNode_z";
