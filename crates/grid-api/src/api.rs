//! The capability surface every grid API implementation satisfies.
//!
//! Two implementations exist: [`crate::NativeUGridApi`] (in-process, calls
//! the loaded kernel directly) and `grid_remote::RemoteUGridApi`
//! (out-of-process). Callers hold a `Box<dyn UGridApi>` and cannot tell the
//! difference; the error semantics are identical.

use nalgebra::DMatrix;

use crate::error::GridResult;
use crate::types::{DataSetConvention, LocationType, OpenMode, UGridGlobalMetaData, UGridMeshType};

/// Dataset lifecycle and convention introspection.
///
/// Methods take `&mut self` throughout: even the getters may cross a process
/// boundary in the remote implementation.
pub trait GridApi {
    /// Whether a dataset handle is currently open.
    fn initialized(&mut self) -> bool;

    /// Opens a dataset. Failure leaves the handle unopened and reports
    /// [`crate::ErrorCode::FATAL`].
    fn open(&mut self, path: &str, mode: OpenMode) -> GridResult<()>;

    /// Closes the dataset. A no-op when nothing is open; on failure the
    /// handle is kept so a retry stays possible.
    fn close(&mut self) -> GridResult<()>;

    /// Creates a new grid file and writes the global metadata. The dataset
    /// is left open for subsequent writes.
    fn create_file(
        &mut self,
        path: &str,
        metadata: &UGridGlobalMetaData,
        mode: OpenMode,
    ) -> GridResult<()>;

    /// Convention reported by the open dataset; `Null` when nothing is open.
    fn convention(&mut self) -> DataSetConvention;

    /// Convention version of the open dataset; NaN when nothing is open.
    fn version(&mut self) -> f64;

    /// Probes the convention of the file at `path` without leaving a handle
    /// open. Falls back to attribute-based detection when the native open
    /// fails, and downgrades under-version UGRID files to `Other`.
    fn probe_convention(&mut self, path: &str) -> DataSetConvention;

    fn mesh_count(&mut self) -> GridResult<i32>;

    /// EPSG code stored in the dataset's coordinate-system variable.
    fn coordinate_system_code(&mut self) -> GridResult<i32>;
}

/// UGRID mesh operations on top of [`GridApi`].
pub trait UGridApi: GridApi {
    fn z_coordinate_fill_value(&mut self) -> f64;
    fn set_z_coordinate_fill_value(&mut self, value: f64);

    fn number_of_meshes_by_type(&mut self, mesh_type: UGridMeshType) -> GridResult<i32>;
    fn mesh_ids(&mut self, mesh_type: UGridMeshType) -> GridResult<Vec<i32>>;
    fn number_of_networks(&mut self) -> GridResult<i32>;
    fn network_ids(&mut self) -> GridResult<Vec<i32>>;

    fn number_of_nodes(&mut self, mesh_id: i32) -> GridResult<i32>;
    fn number_of_edges(&mut self, mesh_id: i32) -> GridResult<i32>;
    fn number_of_faces(&mut self, mesh_id: i32) -> GridResult<i32>;
    fn max_face_nodes(&mut self, mesh_id: i32) -> GridResult<i32>;

    fn node_x_coordinates(&mut self, mesh_id: i32) -> GridResult<Vec<f64>>;
    fn node_y_coordinates(&mut self, mesh_id: i32) -> GridResult<Vec<f64>>;
    fn node_z_coordinates(&mut self, mesh_id: i32) -> GridResult<Vec<f64>>;

    /// Edge-node connectivity, one row per edge.
    fn edge_nodes(&mut self, mesh_id: i32) -> GridResult<DMatrix<i32>>;
    /// Face-node connectivity, one row per face, fill-padded to the mesh's
    /// max-nodes-per-face.
    fn face_nodes(&mut self, mesh_id: i32) -> GridResult<DMatrix<i32>>;

    fn write_xy_coordinates(&mut self, mesh_id: i32, xs: &[f64], ys: &[f64]) -> GridResult<()>;
    fn write_z_coordinates(
        &mut self,
        mesh_id: i32,
        location: LocationType,
        var_name: &str,
        long_name: &str,
        values: &[f64],
    ) -> GridResult<()>;
    /// Reads Z values at the given location. A dataset without an altitude
    /// variable yields an empty vector, not an error.
    fn read_z_coordinates(
        &mut self,
        mesh_id: i32,
        location: LocationType,
        var_name: &str,
    ) -> GridResult<Vec<f64>>;

    fn mesh_name(&mut self, mesh_id: i32) -> GridResult<String>;

    fn var_count(&mut self, mesh_id: i32, location: LocationType) -> GridResult<i32>;
    fn var_ids(&mut self, mesh_id: i32, location: LocationType) -> GridResult<Vec<i32>>;

    fn write_geom_ugrid(&mut self, filename: &str) -> GridResult<()>;
    fn write_map_ugrid(&mut self, filename: &str) -> GridResult<()>;
}

impl<T: GridApi + ?Sized> GridApi for Box<T> {
    fn initialized(&mut self) -> bool {
        (**self).initialized()
    }
    fn open(&mut self, path: &str, mode: OpenMode) -> GridResult<()> {
        (**self).open(path, mode)
    }
    fn close(&mut self) -> GridResult<()> {
        (**self).close()
    }
    fn create_file(
        &mut self,
        path: &str,
        metadata: &UGridGlobalMetaData,
        mode: OpenMode,
    ) -> GridResult<()> {
        (**self).create_file(path, metadata, mode)
    }
    fn convention(&mut self) -> DataSetConvention {
        (**self).convention()
    }
    fn version(&mut self) -> f64 {
        (**self).version()
    }
    fn probe_convention(&mut self, path: &str) -> DataSetConvention {
        (**self).probe_convention(path)
    }
    fn mesh_count(&mut self) -> GridResult<i32> {
        (**self).mesh_count()
    }
    fn coordinate_system_code(&mut self) -> GridResult<i32> {
        (**self).coordinate_system_code()
    }
}

impl<T: UGridApi + ?Sized> UGridApi for Box<T> {
    fn z_coordinate_fill_value(&mut self) -> f64 {
        (**self).z_coordinate_fill_value()
    }
    fn set_z_coordinate_fill_value(&mut self, value: f64) {
        (**self).set_z_coordinate_fill_value(value)
    }
    fn number_of_meshes_by_type(&mut self, mesh_type: UGridMeshType) -> GridResult<i32> {
        (**self).number_of_meshes_by_type(mesh_type)
    }
    fn mesh_ids(&mut self, mesh_type: UGridMeshType) -> GridResult<Vec<i32>> {
        (**self).mesh_ids(mesh_type)
    }
    fn number_of_networks(&mut self) -> GridResult<i32> {
        (**self).number_of_networks()
    }
    fn network_ids(&mut self) -> GridResult<Vec<i32>> {
        (**self).network_ids()
    }
    fn number_of_nodes(&mut self, mesh_id: i32) -> GridResult<i32> {
        (**self).number_of_nodes(mesh_id)
    }
    fn number_of_edges(&mut self, mesh_id: i32) -> GridResult<i32> {
        (**self).number_of_edges(mesh_id)
    }
    fn number_of_faces(&mut self, mesh_id: i32) -> GridResult<i32> {
        (**self).number_of_faces(mesh_id)
    }
    fn max_face_nodes(&mut self, mesh_id: i32) -> GridResult<i32> {
        (**self).max_face_nodes(mesh_id)
    }
    fn node_x_coordinates(&mut self, mesh_id: i32) -> GridResult<Vec<f64>> {
        (**self).node_x_coordinates(mesh_id)
    }
    fn node_y_coordinates(&mut self, mesh_id: i32) -> GridResult<Vec<f64>> {
        (**self).node_y_coordinates(mesh_id)
    }
    fn node_z_coordinates(&mut self, mesh_id: i32) -> GridResult<Vec<f64>> {
        (**self).node_z_coordinates(mesh_id)
    }
    fn edge_nodes(&mut self, mesh_id: i32) -> GridResult<DMatrix<i32>> {
        (**self).edge_nodes(mesh_id)
    }
    fn face_nodes(&mut self, mesh_id: i32) -> GridResult<DMatrix<i32>> {
        (**self).face_nodes(mesh_id)
    }
    fn write_xy_coordinates(&mut self, mesh_id: i32, xs: &[f64], ys: &[f64]) -> GridResult<()> {
        (**self).write_xy_coordinates(mesh_id, xs, ys)
    }
    fn write_z_coordinates(
        &mut self,
        mesh_id: i32,
        location: LocationType,
        var_name: &str,
        long_name: &str,
        values: &[f64],
    ) -> GridResult<()> {
        (**self).write_z_coordinates(mesh_id, location, var_name, long_name, values)
    }
    fn read_z_coordinates(
        &mut self,
        mesh_id: i32,
        location: LocationType,
        var_name: &str,
    ) -> GridResult<Vec<f64>> {
        (**self).read_z_coordinates(mesh_id, location, var_name)
    }
    fn mesh_name(&mut self, mesh_id: i32) -> GridResult<String> {
        (**self).mesh_name(mesh_id)
    }
    fn var_count(&mut self, mesh_id: i32, location: LocationType) -> GridResult<i32> {
        (**self).var_count(mesh_id, location)
    }
    fn var_ids(&mut self, mesh_id: i32, location: LocationType) -> GridResult<Vec<i32>> {
        (**self).var_ids(mesh_id, location)
    }
    fn write_geom_ugrid(&mut self, filename: &str) -> GridResult<()> {
        (**self).write_geom_ugrid(filename)
    }
    fn write_map_ugrid(&mut self, filename: &str) -> GridResult<()> {
        (**self).write_map_ugrid(filename)
    }
}
