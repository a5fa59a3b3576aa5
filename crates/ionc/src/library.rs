//! Loading and symbol resolution for the native library.
//!
//! All entry points are resolved once, at load time, so a partially
//! installed kernel fails fast instead of failing on the first call that
//! happens to hit a missing symbol.

use std::env;

use libloading::Library;
use thiserror::Error;
use tracing::debug;

use crate::ffi::*;

/// Environment variable overriding the library path, for installations that
/// keep the kernel outside the default search path.
pub const IONC_LIB_ENV: &str = "IONC_LIB";

/// Failure to bind the native library.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not load the io_netcdf library (tried {tried:?})")]
    LibraryNotFound {
        tried: Vec<String>,
        #[source]
        source: Option<libloading::Error>,
    },
    #[error("io_netcdf library is missing symbol `{symbol}`")]
    MissingSymbol {
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },
}

/// The resolved entry-point table of one loaded io_netcdf library.
///
/// The function pointers stay valid for as long as this struct lives; the
/// `Library` handle is kept alongside them for exactly that reason.
pub struct IoncLibrary {
    pub ionc_open: IoncOpenFn,
    pub ionc_close: IoncCloseFn,
    pub ionc_create: IoncCreateFn,
    pub ionc_adheresto_conventions: IoncAdherestoConventionsFn,
    pub ionc_inq_conventions: IoncInqConventionsFn,
    pub ionc_get_mesh_count: IoncGetMeshCountFn,
    pub ionc_get_mesh_name: IoncGetMeshNameFn,
    pub ionc_get_node_count: IoncGetCountFn,
    pub ionc_get_edge_count: IoncGetCountFn,
    pub ionc_get_face_count: IoncGetCountFn,
    pub ionc_get_max_face_nodes: IoncGetCountFn,
    pub ionc_get_node_coordinates: IoncGetNodeCoordinatesFn,
    pub ionc_put_node_coordinates: IoncPutNodeCoordinatesFn,
    pub ionc_get_edge_nodes: IoncGetEdgeNodesFn,
    pub ionc_get_face_nodes: IoncGetFaceNodesFn,
    pub ionc_get_coordinate_system: IoncGetCoordinateSystemFn,
    pub ionc_get_var_count: IoncGetVarCountFn,
    pub ionc_inq_varid: IoncInqVarIdFn,
    pub ionc_inq_varid_by_standard_name: IoncInqVarIdByStandardNameFn,
    pub ionc_inq_varids: IoncInqVarIdsFn,
    pub ionc_get_var: IoncGetVarFn,
    pub ionc_put_var: IoncPutVarFn,
    pub ionc_def_var: IoncDefVarFn,
    pub ionc_add_global_attributes: IoncAddGlobalAttributesFn,
    pub ionc_initialize: IoncInitializeFn,
    pub ionc_write_geom_ugrid: IoncWritePathFn,
    pub ionc_write_map_ugrid: IoncWritePathFn,
    pub ionc_def_mesh_contact: IoncDefMeshContactFn,
    pub ionc_put_mesh_contact: IoncPutMeshContactFn,
    pub ionc_get_contacts_count: IoncGetContactsCountFn,
    pub ionc_get_mesh_contact: IoncGetMeshContactFn,
    pub ionc_clone_mesh_definition: IoncCloneMeshFn,
    pub ionc_clone_mesh_data: IoncCloneMeshFn,
    pub ionc_get_number_of_networks: IoncGetNumberOfNetworksFn,
    pub ionc_get_number_of_meshes: IoncGetNumberOfMeshesFn,
    pub ionc_get_network_ids: IoncGetNetworkIdsFn,
    pub ionc_ug_get_mesh_ids: IoncUgGetMeshIdsFn,
    pub ionc_get_network_id_from_mesh_id: IoncGetNetworkIdFromMeshIdFn,
    pub ionc_get_meshgeom: IoncGetMeshGeomFn,
    pub ionc_get_meshgeom_dim: IoncGetMeshGeomDimFn,

    _lib: Library,
}

macro_rules! resolve {
    ($lib:expr, $name:literal) => {
        *unsafe { $lib.get(concat!($name, "\0").as_bytes()) }.map_err(|source| {
            LoadError::MissingSymbol {
                symbol: $name,
                source,
            }
        })?
    };
}

impl IoncLibrary {
    /// Loads the library from `IONC_LIB` or the platform default name and
    /// resolves every entry point.
    pub fn load() -> Result<Self, LoadError> {
        let candidates = library_candidates();

        let mut last_error = None;
        let mut lib = None;
        for candidate in &candidates {
            match unsafe { Library::new(candidate) } {
                Ok(loaded) => {
                    debug!(library = %candidate, "loaded io_netcdf");
                    lib = Some(loaded);
                    break;
                }
                Err(err) => last_error = Some(err),
            }
        }
        let Some(lib) = lib else {
            return Err(LoadError::LibraryNotFound {
                tried: candidates,
                source: last_error,
            });
        };

        Ok(Self {
            ionc_open: resolve!(lib, "ionc_open"),
            ionc_close: resolve!(lib, "ionc_close"),
            ionc_create: resolve!(lib, "ionc_create"),
            ionc_adheresto_conventions: resolve!(lib, "ionc_adheresto_conventions"),
            ionc_inq_conventions: resolve!(lib, "ionc_inq_conventions"),
            ionc_get_mesh_count: resolve!(lib, "ionc_get_mesh_count"),
            ionc_get_mesh_name: resolve!(lib, "ionc_get_mesh_name"),
            ionc_get_node_count: resolve!(lib, "ionc_get_node_count"),
            ionc_get_edge_count: resolve!(lib, "ionc_get_edge_count"),
            ionc_get_face_count: resolve!(lib, "ionc_get_face_count"),
            ionc_get_max_face_nodes: resolve!(lib, "ionc_get_max_face_nodes"),
            ionc_get_node_coordinates: resolve!(lib, "ionc_get_node_coordinates"),
            ionc_put_node_coordinates: resolve!(lib, "ionc_put_node_coordinates"),
            ionc_get_edge_nodes: resolve!(lib, "ionc_get_edge_nodes"),
            ionc_get_face_nodes: resolve!(lib, "ionc_get_face_nodes"),
            ionc_get_coordinate_system: resolve!(lib, "ionc_get_coordinate_system"),
            ionc_get_var_count: resolve!(lib, "ionc_get_var_count"),
            ionc_inq_varid: resolve!(lib, "ionc_inq_varid"),
            ionc_inq_varid_by_standard_name: resolve!(lib, "ionc_inq_varid_by_standard_name"),
            ionc_inq_varids: resolve!(lib, "ionc_inq_varids"),
            ionc_get_var: resolve!(lib, "ionc_get_var"),
            ionc_put_var: resolve!(lib, "ionc_put_var"),
            ionc_def_var: resolve!(lib, "ionc_def_var"),
            ionc_add_global_attributes: resolve!(lib, "ionc_add_global_attributes"),
            ionc_initialize: resolve!(lib, "ionc_initialize"),
            ionc_write_geom_ugrid: resolve!(lib, "ionc_write_geom_ugrid"),
            ionc_write_map_ugrid: resolve!(lib, "ionc_write_map_ugrid"),
            ionc_def_mesh_contact: resolve!(lib, "ionc_def_mesh_contact"),
            ionc_put_mesh_contact: resolve!(lib, "ionc_put_mesh_contact"),
            ionc_get_contacts_count: resolve!(lib, "ionc_get_contacts_count"),
            ionc_get_mesh_contact: resolve!(lib, "ionc_get_mesh_contact"),
            ionc_clone_mesh_definition: resolve!(lib, "ionc_clone_mesh_definition"),
            ionc_clone_mesh_data: resolve!(lib, "ionc_clone_mesh_data"),
            ionc_get_number_of_networks: resolve!(lib, "ionc_get_number_of_networks"),
            ionc_get_number_of_meshes: resolve!(lib, "ionc_get_number_of_meshes"),
            ionc_get_network_ids: resolve!(lib, "ionc_get_network_ids"),
            ionc_ug_get_mesh_ids: resolve!(lib, "ionc_ug_get_mesh_ids"),
            ionc_get_network_id_from_mesh_id: resolve!(lib, "ionc_get_network_id_from_mesh_id"),
            ionc_get_meshgeom: resolve!(lib, "ionc_get_meshgeom"),
            ionc_get_meshgeom_dim: resolve!(lib, "ionc_get_meshgeom_dim"),
            _lib: lib,
        })
    }
}

fn library_candidates() -> Vec<String> {
    if let Ok(path) = env::var(IONC_LIB_ENV) {
        return vec![path];
    }

    if cfg!(target_os = "windows") {
        vec!["io_netcdf.dll".into()]
    } else if cfg!(target_os = "macos") {
        vec!["libio_netcdf.dylib".into()]
    } else {
        vec!["libio_netcdf.so".into(), "libio_netcdf.so.0".into()]
    }
}
