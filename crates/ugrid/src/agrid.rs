//! Lifecycle state machine for one grid file over any API implementation.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use grid_api::constants::UG_CONV_MIN_VERSION;
use grid_api::{DataSetConvention, OpenMode, UGridApi, UGridGlobalMetaData};

use crate::error::{GridApiError, Result};
use crate::spatial::CoordinateSystem;

/// A grid file and the API instance serving it.
///
/// States: unopened → open/initialized → unopened again on close. The same
/// wrapper works over the in-process API and the remote proxy; disposal
/// (explicit `close` or `Drop`) closes the native handle exactly once and
/// never lets a teardown failure escape.
pub struct AGrid<A: UGridApi> {
    path: PathBuf,
    open_mode: OpenMode,
    metadata: UGridGlobalMetaData,
    api: Option<A>,
    coordinate_system: Option<CoordinateSystem>,
}

impl<A: UGridApi> AGrid<A> {
    pub fn new(path: impl AsRef<Path>, api: Option<A>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            open_mode: OpenMode::ReadOnly,
            metadata: UGridGlobalMetaData::new(
                "Unknown model",
                "ugrid-io",
                UG_CONV_MIN_VERSION.to_string(),
            ),
            api,
            coordinate_system: None,
        }
    }

    pub fn set_open_mode(&mut self, mode: OpenMode) {
        self.open_mode = mode;
    }

    pub fn set_metadata(&mut self, metadata: UGridGlobalMetaData) {
        self.metadata = metadata;
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn coordinate_system(&self) -> Option<&CoordinateSystem> {
        self.coordinate_system.as_ref()
    }

    pub fn is_initialized(&mut self) -> bool {
        self.api.as_mut().is_some_and(|api| api.initialized())
    }

    /// Opens the file and derives the coordinate system. Re-entrant: an
    /// already-initialized grid is torn down first.
    pub fn initialize(&mut self) -> Result<()> {
        let path = self.path.to_string_lossy().into_owned();
        let mode = self.open_mode;
        let Some(api) = self.api.as_mut() else {
            return Err(GridApiError::unavailable("No grid API available"));
        };

        if api.initialized() {
            if let Err(code) = api.close() {
                warn!(%code, path, "closing before re-initialization failed");
            }
            self.coordinate_system = None;
        }

        api.open(&path, mode).map_err(|code| {
            GridApiError::from_code(code, format!("Couldn't open the grid file {path}"))
        })?;

        // A failing code query is not fatal; the coordinate system simply
        // stays unknown.
        self.coordinate_system = match api.coordinate_system_code() {
            Ok(code) => CoordinateSystem::from_epsg(code),
            Err(_) => None,
        };
        Ok(())
    }

    /// Creates the grid file with the stored global metadata and leaves it
    /// open. An already-existing file is left untouched.
    pub fn create_file(&mut self) -> Result<()> {
        if self.path.exists() {
            debug!(path = %self.path.display(), "grid file already exists, skipping creation");
            return Ok(());
        }
        let path = self.path.to_string_lossy().into_owned();
        let metadata = self.metadata.clone();
        let Some(api) = self.api.as_mut() else {
            return Err(GridApiError::unavailable("No grid API available"));
        };
        api.create_file(&path, &metadata, OpenMode::Replace)
            .map_err(|code| {
                GridApiError::from_code(code, format!("Couldn't create the grid file {path}"))
            })
    }

    /// Closes the grid file. Close failures during teardown are logged, not
    /// raised; a second call finds nothing open and does nothing.
    pub fn close(&mut self) {
        if let Some(api) = self.api.as_mut() {
            if api.initialized() {
                if let Err(code) = api.close() {
                    warn!(%code, path = %self.path.display(), "closing the grid file failed");
                }
            }
        }
        self.coordinate_system = None;
    }

    /// Hands out the API for a guarded operation: initializes on demand and
    /// verifies the file actually is a current-version UGRID dataset.
    pub fn valid_api(&mut self) -> Result<&mut A> {
        if !self.is_initialized() {
            self.initialize()?;
        }
        let path = self.path.to_string_lossy().into_owned();
        let Some(api) = self.api.as_mut() else {
            return Err(GridApiError::unavailable("No grid API available"));
        };
        if api.convention() != DataSetConvention::Ugrid || !(api.version() >= UG_CONV_MIN_VERSION) {
            return Err(GridApiError::unavailable(format!(
                "File {path} is not a UGRID {UG_CONV_MIN_VERSION} file"
            )));
        }
        Ok(api)
    }

    /// Direct access to the API without the validity guard.
    pub fn api_mut(&mut self) -> Option<&mut A> {
        self.api.as_mut()
    }
}

impl<A: UGridApi> Drop for AGrid<A> {
    fn drop(&mut self) {
        self.close();
    }
}
