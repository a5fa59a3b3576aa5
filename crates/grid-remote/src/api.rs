//! The proxy implementation of the grid API traits.

use nalgebra::DMatrix;
use serde::de::DeserializeOwned;
use tracing::warn;

use grid_api::{
    DataSetConvention, ErrorCode, GridApi, GridResult, LocationType, OpenMode, UGridApi,
    UGridGlobalMetaData, UGridMeshType,
};

use crate::instance::RemoteInstance;
use crate::protocol::{ConnectivityTable, Request};

/// Grid API backed by a `ugrid-host` process.
///
/// Holds at most one host instance. When the instance is absent (spawn
/// failed, host died, already disposed) every operation degrades to the
/// fatal error code instead of panicking or blocking; the version query
/// yields NaN and convention queries yield `Null`, matching what callers
/// get from a broken in-process kernel.
pub struct RemoteUGridApi {
    instance: Option<RemoteInstance>,
}

impl RemoteUGridApi {
    /// Spawns a host process. The result is usable either way: with no host
    /// every call reports the fatal error code.
    pub fn spawn() -> Self {
        match RemoteInstance::spawn() {
            Ok(instance) => Self { instance: Some(instance) },
            Err(error) => {
                warn!(%error, "could not spawn grid host, remote API disabled");
                Self { instance: None }
            }
        }
    }

    /// Wraps an already-running host instance.
    pub fn connect(instance: RemoteInstance) -> Self {
        Self { instance: Some(instance) }
    }

    /// A proxy with no host behind it.
    pub fn disconnected() -> Self {
        Self { instance: None }
    }

    pub fn is_alive(&self) -> bool {
        self.instance.is_some()
    }

    /// Closes the remote grid file and tears the host process down. Safe to
    /// call repeatedly; later calls are no-ops.
    pub fn dispose(&mut self) {
        if let Some(mut instance) = self.instance.take() {
            if let Err(error) = instance.call(&Request::Close) {
                warn!(%error, "could not close the remote grid file during teardown");
            }
            instance.shutdown();
        }
    }

    fn request<T: DeserializeOwned>(&mut self, request: Request) -> GridResult<T> {
        let Some(instance) = self.instance.as_mut() else {
            return Err(ErrorCode::FATAL);
        };
        match instance.call(&request) {
            Ok(response) if response.code == grid_api::constants::NOERR => {
                serde_json::from_value(response.value).map_err(|_| ErrorCode::FATAL)
            }
            Ok(response) => Err(ErrorCode(response.code)),
            Err(error) => {
                warn!(%error, "grid host call failed, dropping the instance");
                self.instance = None;
                Err(ErrorCode::FATAL)
            }
        }
    }
}

impl GridApi for RemoteUGridApi {
    fn initialized(&mut self) -> bool {
        self.request(Request::Initialized).unwrap_or(false)
    }

    fn open(&mut self, path: &str, mode: OpenMode) -> GridResult<()> {
        self.request(Request::Open { path: path.into(), mode })
    }

    fn close(&mut self) -> GridResult<()> {
        self.request(Request::Close)
    }

    fn create_file(
        &mut self,
        path: &str,
        metadata: &UGridGlobalMetaData,
        mode: OpenMode,
    ) -> GridResult<()> {
        self.request(Request::CreateFile {
            path: path.into(),
            metadata: metadata.clone(),
            mode,
        })
    }

    fn convention(&mut self) -> DataSetConvention {
        self.request(Request::Convention)
            .unwrap_or(DataSetConvention::Null)
    }

    fn version(&mut self) -> f64 {
        self.request(Request::Version).unwrap_or(f64::NAN)
    }

    fn probe_convention(&mut self, path: &str) -> DataSetConvention {
        self.request(Request::ProbeConvention { path: path.into() })
            .unwrap_or(DataSetConvention::Null)
    }

    fn mesh_count(&mut self) -> GridResult<i32> {
        self.request(Request::MeshCount)
    }

    fn coordinate_system_code(&mut self) -> GridResult<i32> {
        self.request(Request::CoordinateSystemCode)
    }
}

impl UGridApi for RemoteUGridApi {
    fn z_coordinate_fill_value(&mut self) -> f64 {
        self.request(Request::ZFillValue).unwrap_or(0.0)
    }

    fn set_z_coordinate_fill_value(&mut self, value: f64) {
        let _: GridResult<()> = self.request(Request::SetZFillValue { value });
    }

    fn number_of_meshes_by_type(&mut self, mesh_type: UGridMeshType) -> GridResult<i32> {
        self.request(Request::MeshesByType { mesh_type })
    }

    fn mesh_ids(&mut self, mesh_type: UGridMeshType) -> GridResult<Vec<i32>> {
        self.request(Request::MeshIds { mesh_type })
    }

    fn number_of_networks(&mut self) -> GridResult<i32> {
        self.request(Request::NetworkCount)
    }

    fn network_ids(&mut self) -> GridResult<Vec<i32>> {
        self.request(Request::NetworkIds)
    }

    fn number_of_nodes(&mut self, mesh_id: i32) -> GridResult<i32> {
        self.request(Request::NodeCount { mesh_id })
    }

    fn number_of_edges(&mut self, mesh_id: i32) -> GridResult<i32> {
        self.request(Request::EdgeCount { mesh_id })
    }

    fn number_of_faces(&mut self, mesh_id: i32) -> GridResult<i32> {
        self.request(Request::FaceCount { mesh_id })
    }

    fn max_face_nodes(&mut self, mesh_id: i32) -> GridResult<i32> {
        self.request(Request::MaxFaceNodes { mesh_id })
    }

    fn node_x_coordinates(&mut self, mesh_id: i32) -> GridResult<Vec<f64>> {
        self.request(Request::NodeXCoordinates { mesh_id })
    }

    fn node_y_coordinates(&mut self, mesh_id: i32) -> GridResult<Vec<f64>> {
        self.request(Request::NodeYCoordinates { mesh_id })
    }

    fn node_z_coordinates(&mut self, mesh_id: i32) -> GridResult<Vec<f64>> {
        self.request(Request::NodeZCoordinates { mesh_id })
    }

    fn edge_nodes(&mut self, mesh_id: i32) -> GridResult<DMatrix<i32>> {
        let table: ConnectivityTable = self.request(Request::EdgeNodes { mesh_id })?;
        Ok(table.into_matrix())
    }

    fn face_nodes(&mut self, mesh_id: i32) -> GridResult<DMatrix<i32>> {
        let table: ConnectivityTable = self.request(Request::FaceNodes { mesh_id })?;
        Ok(table.into_matrix())
    }

    fn write_xy_coordinates(&mut self, mesh_id: i32, xs: &[f64], ys: &[f64]) -> GridResult<()> {
        self.request(Request::WriteXyCoordinates {
            mesh_id,
            xs: xs.to_vec(),
            ys: ys.to_vec(),
        })
    }

    fn write_z_coordinates(
        &mut self,
        mesh_id: i32,
        location: LocationType,
        var_name: &str,
        long_name: &str,
        values: &[f64],
    ) -> GridResult<()> {
        self.request(Request::WriteZCoordinates {
            mesh_id,
            location,
            var_name: var_name.into(),
            long_name: long_name.into(),
            values: values.to_vec(),
        })
    }

    fn read_z_coordinates(
        &mut self,
        mesh_id: i32,
        location: LocationType,
        var_name: &str,
    ) -> GridResult<Vec<f64>> {
        self.request(Request::ReadZCoordinates {
            mesh_id,
            location,
            var_name: var_name.into(),
        })
    }

    fn mesh_name(&mut self, mesh_id: i32) -> GridResult<String> {
        self.request(Request::MeshName { mesh_id })
    }

    fn var_count(&mut self, mesh_id: i32, location: LocationType) -> GridResult<i32> {
        self.request(Request::VarCount { mesh_id, location })
    }

    fn var_ids(&mut self, mesh_id: i32, location: LocationType) -> GridResult<Vec<i32>> {
        self.request(Request::VarIds { mesh_id, location })
    }

    fn write_geom_ugrid(&mut self, filename: &str) -> GridResult<()> {
        self.request(Request::WriteGeomUgrid { path: filename.into() })
    }

    fn write_map_ugrid(&mut self, filename: &str) -> GridResult<()> {
        self.request(Request::WriteMapUgrid { path: filename.into() })
    }
}

impl Drop for RemoteUGridApi {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_operation_degrades_without_a_host() {
        let mut api = RemoteUGridApi::disconnected();

        assert!(!api.initialized());
        assert_eq!(api.open("test.nc", OpenMode::ReadOnly), Err(ErrorCode::FATAL));
        assert_eq!(api.close(), Err(ErrorCode::FATAL));
        assert_eq!(api.mesh_count(), Err(ErrorCode::FATAL));
        assert_eq!(api.coordinate_system_code(), Err(ErrorCode::FATAL));
        assert_eq!(api.number_of_nodes(1), Err(ErrorCode::FATAL));
        assert_eq!(api.node_x_coordinates(1), Err(ErrorCode::FATAL));
        assert_eq!(api.edge_nodes(1).unwrap_err(), ErrorCode::FATAL);
        assert_eq!(api.mesh_name(1), Err(ErrorCode::FATAL));
        assert_eq!(
            api.write_xy_coordinates(1, &[0.0], &[0.0]),
            Err(ErrorCode::FATAL)
        );

        assert!(api.version().is_nan());
        assert_eq!(api.convention(), DataSetConvention::Null);
        assert_eq!(api.probe_convention("test.nc"), DataSetConvention::Null);
    }

    #[test]
    fn dispose_is_idempotent_without_a_host() {
        let mut api = RemoteUGridApi::disconnected();
        api.dispose();
        api.dispose();
        assert!(!api.is_alive());
    }

    #[test]
    fn spawn_failure_yields_a_disconnected_proxy() {
        // Point the host resolution at an executable that cannot exist.
        std::env::set_var(crate::HOST_EXE_ENV, "/nonexistent/ugrid-host");
        let api = RemoteUGridApi::spawn();
        std::env::remove_var(crate::HOST_EXE_ENV);
        assert!(!api.is_alive());
    }
}
