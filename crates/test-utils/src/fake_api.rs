//! A scripted implementation of the grid API traits.

use std::cell::RefCell;
use std::rc::Rc;

use nalgebra::DMatrix;

use grid_api::{
    DataSetConvention, ErrorCode, GridApi, GridResult, LocationType, OpenMode, UGridApi,
    UGridGlobalMetaData, UGridMeshType,
};

/// Configurable fake for facade and host tests.
///
/// Defaults describe a healthy, already-initialized UGRID dataset with two
/// nodes, two meshes and one small connectivity table; tests overwrite the
/// fields they care about (usually swapping one `Ok` for an `Err`) and then
/// assert on `calls` and the returned values.
#[derive(Debug, Clone)]
pub struct FakeUGridApi {
    pub initialized: bool,
    pub convention: DataSetConvention,
    pub version: f64,
    pub z_fill_value: f64,

    pub open_result: GridResult<()>,
    pub close_result: GridResult<()>,
    pub create_result: GridResult<()>,
    pub probe_result: DataSetConvention,
    pub mesh_count: GridResult<i32>,
    pub coordinate_system_code: GridResult<i32>,
    pub meshes_by_type: GridResult<i32>,
    pub mesh_ids: GridResult<Vec<i32>>,
    pub network_count: GridResult<i32>,
    pub network_ids: GridResult<Vec<i32>>,
    pub node_count: GridResult<i32>,
    pub edge_count: GridResult<i32>,
    pub face_count: GridResult<i32>,
    pub max_face_nodes: GridResult<i32>,
    pub node_x: GridResult<Vec<f64>>,
    pub node_y: GridResult<Vec<f64>>,
    pub node_z: GridResult<Vec<f64>>,
    pub edge_nodes: GridResult<DMatrix<i32>>,
    pub face_nodes: GridResult<DMatrix<i32>>,
    pub write_xy_result: GridResult<()>,
    pub write_z_result: GridResult<()>,
    pub read_z_result: GridResult<Vec<f64>>,
    pub mesh_name: GridResult<String>,
    pub var_count: GridResult<i32>,
    pub var_ids: GridResult<Vec<i32>>,
    pub write_geom_result: GridResult<()>,
    pub write_map_result: GridResult<()>,

    /// Shared record of calls and written data; clones taken before the
    /// fake moves into a facade keep observing it.
    pub recorded: Rc<RefCell<Recorded>>,
}

/// What a [`FakeUGridApi`] saw happen to it.
#[derive(Debug, Default)]
pub struct Recorded {
    /// Method names in invocation order.
    pub calls: Vec<String>,
    /// Last values handed to `write_xy_coordinates`.
    pub written_xy: Option<(Vec<f64>, Vec<f64>)>,
    /// Last values handed to `write_z_coordinates`.
    pub written_z: Option<Vec<f64>>,
    /// Metadata handed to `create_file`.
    pub created_with: Option<UGridGlobalMetaData>,
}

impl Default for FakeUGridApi {
    fn default() -> Self {
        Self {
            initialized: true,
            convention: DataSetConvention::Ugrid,
            version: grid_api::constants::UG_CONV_MIN_VERSION,
            z_fill_value: 0.0,
            open_result: Ok(()),
            close_result: Ok(()),
            create_result: Ok(()),
            probe_result: DataSetConvention::Ugrid,
            mesh_count: Ok(2),
            coordinate_system_code: Ok(4326),
            meshes_by_type: Ok(2),
            mesh_ids: Ok(vec![1, 2]),
            network_count: Ok(0),
            network_ids: Ok(Vec::new()),
            node_count: Ok(2),
            edge_count: Ok(2),
            face_count: Ok(2),
            max_face_nodes: Ok(2),
            node_x: Ok(vec![2.0, 3.4]),
            node_y: Ok(vec![-1.0, 8.4]),
            node_z: Ok(vec![-1.1, -2.3]),
            edge_nodes: Ok(DMatrix::from_row_iterator(2, 2, [0, 1, 1, 2])),
            face_nodes: Ok(DMatrix::from_row_iterator(2, 2, [0, 1, 1, 2])),
            write_xy_result: Ok(()),
            write_z_result: Ok(()),
            read_z_result: Ok(vec![1.0, 2.0]),
            mesh_name: Ok("MyNetwork".to_string()),
            var_count: Ok(33),
            var_ids: Ok(vec![1, 1, 2, 3, 5, 8]),
            write_geom_result: Ok(()),
            write_map_result: Ok(()),
            recorded: Rc::default(),
        }
    }
}

impl FakeUGridApi {
    /// A fake representing a dataset that is not (yet) open.
    pub fn uninitialized() -> Self {
        Self {
            initialized: false,
            ..Self::default()
        }
    }

    /// A fake whose every operation fails with the given code.
    pub fn failing(code: ErrorCode) -> Self {
        Self {
            open_result: Err(code),
            close_result: Err(code),
            create_result: Err(code),
            mesh_count: Err(code),
            coordinate_system_code: Err(code),
            meshes_by_type: Err(code),
            mesh_ids: Err(code),
            network_count: Err(code),
            network_ids: Err(code),
            node_count: Err(code),
            edge_count: Err(code),
            face_count: Err(code),
            max_face_nodes: Err(code),
            node_x: Err(code),
            node_y: Err(code),
            node_z: Err(code),
            edge_nodes: Err(code),
            face_nodes: Err(code),
            write_xy_result: Err(code),
            write_z_result: Err(code),
            read_z_result: Err(code),
            mesh_name: Err(code),
            var_count: Err(code),
            var_ids: Err(code),
            write_geom_result: Err(code),
            write_map_result: Err(code),
            ..Self::default()
        }
    }

    /// Handle for inspecting calls after the fake moved into a facade.
    pub fn recorder(&self) -> Rc<RefCell<Recorded>> {
        Rc::clone(&self.recorded)
    }

    pub fn calls_to(&self, name: &str) -> usize {
        self.recorded
            .borrow()
            .calls
            .iter()
            .filter(|call| *call == name)
            .count()
    }

    fn record(&mut self, name: &str) {
        self.recorded.borrow_mut().calls.push(name.to_string());
    }
}

impl GridApi for FakeUGridApi {
    fn initialized(&mut self) -> bool {
        self.initialized
    }

    fn open(&mut self, _path: &str, _mode: OpenMode) -> GridResult<()> {
        self.record("open");
        if self.open_result.is_ok() {
            self.initialized = true;
        }
        self.open_result
    }

    fn close(&mut self) -> GridResult<()> {
        self.record("close");
        if self.close_result.is_ok() {
            self.initialized = false;
        }
        self.close_result
    }

    fn create_file(
        &mut self,
        _path: &str,
        metadata: &UGridGlobalMetaData,
        _mode: OpenMode,
    ) -> GridResult<()> {
        self.record("create_file");
        if self.create_result.is_ok() {
            self.initialized = true;
            self.recorded.borrow_mut().created_with = Some(metadata.clone());
        }
        self.create_result
    }

    fn convention(&mut self) -> DataSetConvention {
        self.convention
    }

    fn version(&mut self) -> f64 {
        self.version
    }

    fn probe_convention(&mut self, _path: &str) -> DataSetConvention {
        self.record("probe_convention");
        self.probe_result
    }

    fn mesh_count(&mut self) -> GridResult<i32> {
        self.record("mesh_count");
        self.mesh_count
    }

    fn coordinate_system_code(&mut self) -> GridResult<i32> {
        self.record("coordinate_system_code");
        self.coordinate_system_code
    }
}

impl UGridApi for FakeUGridApi {
    fn z_coordinate_fill_value(&mut self) -> f64 {
        self.z_fill_value
    }

    fn set_z_coordinate_fill_value(&mut self, value: f64) {
        self.z_fill_value = value;
    }

    fn number_of_meshes_by_type(&mut self, _mesh_type: UGridMeshType) -> GridResult<i32> {
        self.record("number_of_meshes_by_type");
        self.meshes_by_type
    }

    fn mesh_ids(&mut self, _mesh_type: UGridMeshType) -> GridResult<Vec<i32>> {
        self.record("mesh_ids");
        self.mesh_ids.clone()
    }

    fn number_of_networks(&mut self) -> GridResult<i32> {
        self.record("number_of_networks");
        self.network_count
    }

    fn network_ids(&mut self) -> GridResult<Vec<i32>> {
        self.record("network_ids");
        self.network_ids.clone()
    }

    fn number_of_nodes(&mut self, _mesh_id: i32) -> GridResult<i32> {
        self.record("number_of_nodes");
        self.node_count
    }

    fn number_of_edges(&mut self, _mesh_id: i32) -> GridResult<i32> {
        self.record("number_of_edges");
        self.edge_count
    }

    fn number_of_faces(&mut self, _mesh_id: i32) -> GridResult<i32> {
        self.record("number_of_faces");
        self.face_count
    }

    fn max_face_nodes(&mut self, _mesh_id: i32) -> GridResult<i32> {
        self.record("max_face_nodes");
        self.max_face_nodes
    }

    fn node_x_coordinates(&mut self, _mesh_id: i32) -> GridResult<Vec<f64>> {
        self.record("node_x_coordinates");
        self.node_x.clone()
    }

    fn node_y_coordinates(&mut self, _mesh_id: i32) -> GridResult<Vec<f64>> {
        self.record("node_y_coordinates");
        self.node_y.clone()
    }

    fn node_z_coordinates(&mut self, _mesh_id: i32) -> GridResult<Vec<f64>> {
        self.record("node_z_coordinates");
        self.node_z.clone()
    }

    fn edge_nodes(&mut self, _mesh_id: i32) -> GridResult<DMatrix<i32>> {
        self.record("edge_nodes");
        self.edge_nodes.clone()
    }

    fn face_nodes(&mut self, _mesh_id: i32) -> GridResult<DMatrix<i32>> {
        self.record("face_nodes");
        self.face_nodes.clone()
    }

    fn write_xy_coordinates(&mut self, _mesh_id: i32, xs: &[f64], ys: &[f64]) -> GridResult<()> {
        self.record("write_xy_coordinates");
        if self.write_xy_result.is_ok() {
            self.recorded.borrow_mut().written_xy = Some((xs.to_vec(), ys.to_vec()));
        }
        self.write_xy_result
    }

    fn write_z_coordinates(
        &mut self,
        _mesh_id: i32,
        _location: LocationType,
        _var_name: &str,
        _long_name: &str,
        values: &[f64],
    ) -> GridResult<()> {
        self.record("write_z_coordinates");
        if self.write_z_result.is_ok() {
            self.recorded.borrow_mut().written_z = Some(values.to_vec());
        }
        self.write_z_result
    }

    fn read_z_coordinates(
        &mut self,
        _mesh_id: i32,
        _location: LocationType,
        _var_name: &str,
    ) -> GridResult<Vec<f64>> {
        self.record("read_z_coordinates");
        self.read_z_result.clone()
    }

    fn mesh_name(&mut self, _mesh_id: i32) -> GridResult<String> {
        self.record("mesh_name");
        self.mesh_name.clone()
    }

    fn var_count(&mut self, _mesh_id: i32, _location: LocationType) -> GridResult<i32> {
        self.record("var_count");
        self.var_count
    }

    fn var_ids(&mut self, _mesh_id: i32, _location: LocationType) -> GridResult<Vec<i32>> {
        self.record("var_ids");
        self.var_ids.clone()
    }

    fn write_geom_ugrid(&mut self, _filename: &str) -> GridResult<()> {
        self.record("write_geom_ugrid");
        self.write_geom_result
    }

    fn write_map_ugrid(&mut self, _filename: &str) -> GridResult<()> {
        self.record("write_map_ugrid");
        self.write_map_result
    }
}
