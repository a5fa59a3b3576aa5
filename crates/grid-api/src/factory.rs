//! Construction of grid API instances.

use tracing::warn;

use crate::native::NativeUGridApi;

/// Creates an in-process grid API, or `None` when the native kernel cannot
/// be loaded on this machine. Callers treat `None` the same way they treat a
/// fatal native error: the UGRID code path is unavailable.
pub fn create_native_ugrid_api() -> Option<NativeUGridApi> {
    match NativeUGridApi::load() {
        Ok(api) => Some(api),
        Err(error) => {
            warn!(%error, "io_netcdf kernel unavailable, grid API disabled");
            None
        }
    }
}
