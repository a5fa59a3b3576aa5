//! Cached convenience operations over one open UGRID file.

use std::collections::HashMap;
use std::path::Path;

use nalgebra::{DMatrix, Point3};

use grid_api::constants::NODE_Z_VAR;
use grid_api::{LocationType, OpenMode, UGridApi, UGridGlobalMetaData, UGridMeshType};

use crate::agrid::AGrid;
use crate::error::{GridApiError, Result};
use crate::factory::create_api;
use crate::spatial::CoordinateSystem;

const FACE_Z_VAR: &str = "mesh2d_flowelem_bl";
const FACE_Z_LONG_NAME: &str = "bed level at mesh faces";
const NODE_Z_LONG_NAME: &str = "bed level at mesh nodes";

/// One UGRID file plus per-mesh caches of what has been read from it.
///
/// Caches hold managed copies only, never native pointers, so they stay
/// valid after the dataset closes. Mesh ids are 1-based; the per-mesh caches
/// index by `mesh_id - 1`.
pub struct UGrid {
    grid: AGrid<Box<dyn UGridApi>>,
    node_coordinates: HashMap<i32, Vec<Point3<f64>>>,
    edge_nodes: Vec<Option<DMatrix<i32>>>,
    face_nodes: Vec<Option<DMatrix<i32>>>,
    var_name_ids: Vec<Option<HashMap<LocationType, Vec<i32>>>>,
}

impl UGrid {
    /// Opens a grid over the configured API (local kernel or remote host).
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_api(path, create_api())
    }

    pub fn with_open_mode(path: impl AsRef<Path>, mode: OpenMode) -> Self {
        let mut ugrid = Self::new(path);
        ugrid.grid.set_open_mode(mode);
        ugrid
    }

    pub fn with_metadata(path: impl AsRef<Path>, metadata: UGridGlobalMetaData) -> Self {
        let mut ugrid = Self::new(path);
        ugrid.grid.set_metadata(metadata);
        ugrid
    }

    /// Builds the grid over a specific API instance. This is also the
    /// injection point the unit tests use.
    pub fn with_api(path: impl AsRef<Path>, api: Option<Box<dyn UGridApi>>) -> Self {
        Self {
            grid: AGrid::new(path, api),
            node_coordinates: HashMap::new(),
            edge_nodes: Vec::new(),
            face_nodes: Vec::new(),
            var_name_ids: Vec::new(),
        }
    }

    pub fn is_initialized(&mut self) -> bool {
        self.grid.is_initialized()
    }

    pub fn initialize(&mut self) -> Result<()> {
        self.grid.initialize()
    }

    pub fn create_file(&mut self) -> Result<()> {
        self.grid.create_file()
    }

    pub fn close(&mut self) {
        self.grid.close()
    }

    pub fn coordinate_system(&self) -> Option<&CoordinateSystem> {
        self.grid.coordinate_system()
    }

    pub fn z_coordinate_fill_value(&mut self) -> Result<f64> {
        Ok(self.grid.valid_api()?.z_coordinate_fill_value())
    }

    pub fn set_z_coordinate_fill_value(&mut self, value: f64) -> Result<()> {
        self.grid.valid_api()?.set_z_coordinate_fill_value(value);
        Ok(())
    }

    pub fn get_number_of_meshes(&mut self, mesh_type: UGridMeshType) -> Result<i32> {
        let context = match mesh_type {
            UGridMeshType::Any => "Couldn't get the number of meshes",
            UGridMeshType::Mesh1D => "Couldn't get the number of 1D meshes",
            UGridMeshType::Mesh2D => "Couldn't get the number of 2D meshes",
            UGridMeshType::Mesh3D => "Couldn't get the number of 3D meshes",
        };
        self.grid
            .valid_api()?
            .number_of_meshes_by_type(mesh_type)
            .map_err(|code| GridApiError::from_code(code, context))
    }

    pub fn get_number_of_1d_meshes(&mut self) -> Result<i32> {
        self.get_number_of_meshes(UGridMeshType::Mesh1D)
    }

    pub fn get_number_of_2d_meshes(&mut self) -> Result<i32> {
        self.get_number_of_meshes(UGridMeshType::Mesh2D)
    }

    pub fn get_number_of_3d_meshes(&mut self) -> Result<i32> {
        self.get_number_of_meshes(UGridMeshType::Mesh3D)
    }

    pub fn get_mesh_ids(&mut self, mesh_type: UGridMeshType) -> Result<Vec<i32>> {
        self.grid
            .valid_api()?
            .mesh_ids(mesh_type)
            .map_err(|code| GridApiError::from_code(code, "Couldn't get the mesh ids"))
    }

    pub fn get_number_of_nodes_for_mesh_id(&mut self, mesh_id: i32) -> Result<i32> {
        self.grid
            .valid_api()?
            .number_of_nodes(mesh_id)
            .map_err(|code| GridApiError::from_code(code, "Couldn't get the number of nodes"))
    }

    pub fn get_number_of_edges_for_mesh_id(&mut self, mesh_id: i32) -> Result<i32> {
        self.grid
            .valid_api()?
            .number_of_edges(mesh_id)
            .map_err(|code| GridApiError::from_code(code, "Couldn't get number of edges"))
    }

    pub fn get_number_of_faces_for_mesh_id(&mut self, mesh_id: i32) -> Result<i32> {
        self.grid
            .valid_api()?
            .number_of_faces(mesh_id)
            .map_err(|code| GridApiError::from_code(code, "Couldn't get number of faces"))
    }

    pub fn get_number_of_max_face_nodes_for_mesh_id(&mut self, mesh_id: i32) -> Result<i32> {
        self.grid
            .valid_api()?
            .max_face_nodes(mesh_id)
            .map_err(|code| GridApiError::from_code(code, "Couldn't get max face nodes"))
    }

    /// All node coordinates of one mesh as points, cached per mesh id.
    pub fn get_all_node_coordinates_for_mesh_id(
        &mut self,
        mesh_id: i32,
    ) -> Result<Vec<Point3<f64>>> {
        let api = self.grid.valid_api()?;
        let n_nodes = api
            .number_of_nodes(mesh_id)
            .map_err(|code| GridApiError::from_code(code, "Couldn't get the number of nodes"))?;
        if n_nodes <= 0 {
            return Ok(Vec::new());
        }

        let xs = api
            .node_x_coordinates(mesh_id)
            .map_err(|code| GridApiError::from_code(code, "Couldn't get x node coordinates"))?;
        let ys = api
            .node_y_coordinates(mesh_id)
            .map_err(|code| GridApiError::from_code(code, "Couldn't get y node coordinates"))?;
        let zs = api
            .node_z_coordinates(mesh_id)
            .map_err(|code| GridApiError::from_code(code, "Couldn't get z node coordinates"))?;

        let coordinates: Vec<Point3<f64>> = xs
            .iter()
            .zip(ys.iter())
            .zip(zs.iter())
            .map(|((&x, &y), &z)| Point3::new(x, y, z))
            .collect();
        self.node_coordinates.insert(mesh_id, coordinates.clone());
        Ok(coordinates)
    }

    pub fn get_edge_nodes_for_mesh_id(&mut self, mesh_id: i32) -> Result<DMatrix<i32>> {
        let api = self.grid.valid_api()?;
        let table = api
            .edge_nodes(mesh_id)
            .map_err(|code| GridApiError::from_code(code, "Couldn't get edge nodes of the mesh"))?;
        let total = api
            .number_of_meshes_by_type(UGridMeshType::Any)
            .map_err(|code| GridApiError::from_code(code, "Couldn't get the number of meshes"))?;

        grow_cache(&mut self.edge_nodes, total.max(mesh_id) as usize);
        self.edge_nodes[(mesh_id - 1) as usize] = Some(table.clone());
        Ok(table)
    }

    pub fn get_face_nodes_for_mesh_id(&mut self, mesh_id: i32) -> Result<DMatrix<i32>> {
        let api = self.grid.valid_api()?;
        let table = api
            .face_nodes(mesh_id)
            .map_err(|code| GridApiError::from_code(code, "Couldn't get face nodes of the mesh"))?;
        let total = api
            .number_of_meshes_by_type(UGridMeshType::Any)
            .map_err(|code| GridApiError::from_code(code, "Couldn't get the number of meshes"))?;

        grow_cache(&mut self.face_nodes, total.max(mesh_id) as usize);
        self.face_nodes[(mesh_id - 1) as usize] = Some(table.clone());
        Ok(table)
    }

    pub fn number_of_names_for_location_type(
        &mut self,
        mesh_id: i32,
        location: LocationType,
    ) -> Result<i32> {
        self.grid
            .valid_api()?
            .var_count(mesh_id, location)
            .map_err(|code| {
                GridApiError::from_code(code, "Couldn't get the number of names for location type")
            })
    }

    pub fn get_names_at_location(
        &mut self,
        mesh_id: i32,
        location: LocationType,
    ) -> Result<Vec<i32>> {
        let ids = self
            .grid
            .valid_api()?
            .var_ids(mesh_id, location)
            .map_err(|code| GridApiError::from_code(code, "Couldn't get the names at location"))?;

        grow_cache(&mut self.var_name_ids, mesh_id as usize);
        let slot = &mut self.var_name_ids[(mesh_id - 1) as usize];
        slot.get_or_insert_with(HashMap::new)
            .insert(location, ids.clone());
        Ok(ids)
    }

    pub fn rewrite_grid_coordinates_for_mesh_id(
        &mut self,
        mesh_id: i32,
        xs: &[f64],
        ys: &[f64],
    ) -> Result<()> {
        self.grid
            .valid_api()?
            .write_xy_coordinates(mesh_id, xs, ys)
            .map_err(|code| GridApiError::from_code(code, "Couldn't rewrite grid coordinates"))
    }

    pub fn get_mesh_name(&mut self, mesh_id: i32) -> Result<String> {
        self.grid
            .valid_api()?
            .mesh_name(mesh_id)
            .map_err(|code| GridApiError::from_code(code, "Couldn't get meshname"))
    }

    pub fn write_z_values_at_faces_for_mesh_id(
        &mut self,
        mesh_id: i32,
        values: &[f64],
    ) -> Result<()> {
        self.grid
            .valid_api()?
            .write_z_coordinates(mesh_id, LocationType::Face, FACE_Z_VAR, FACE_Z_LONG_NAME, values)
            .map_err(|code| {
                GridApiError::from_code(code, "Error writing z values at mesh faces")
            })
    }

    pub fn write_z_values_at_nodes_for_mesh_id(
        &mut self,
        mesh_id: i32,
        values: &[f64],
    ) -> Result<()> {
        self.grid
            .valid_api()?
            .write_z_coordinates(mesh_id, LocationType::Node, NODE_Z_VAR, NODE_Z_LONG_NAME, values)
            .map_err(|code| {
                GridApiError::from_code(code, "Error writing z values at mesh nodes")
            })
    }

    pub fn read_z_values_at_faces_for_mesh_id(&mut self, mesh_id: i32) -> Result<Vec<f64>> {
        self.grid
            .valid_api()?
            .read_z_coordinates(mesh_id, LocationType::Face, FACE_Z_VAR)
            .map_err(|code| {
                GridApiError::from_code(code, "Error reading z values at mesh faces")
            })
    }

    pub fn read_z_values_at_nodes_for_mesh_id(&mut self, mesh_id: i32) -> Result<Vec<f64>> {
        self.grid
            .valid_api()?
            .read_z_coordinates(mesh_id, LocationType::Node, NODE_Z_VAR)
            .map_err(|code| {
                GridApiError::from_code(code, "Error reading z values at mesh nodes")
            })
    }

    /// Edge-node caches, indexed by `mesh_id - 1`.
    pub fn edge_nodes_by_mesh_id(&self) -> &[Option<DMatrix<i32>>] {
        &self.edge_nodes
    }

    /// Face-node caches, indexed by `mesh_id - 1`.
    pub fn face_nodes_by_mesh_id(&self) -> &[Option<DMatrix<i32>>] {
        &self.face_nodes
    }

    /// Variable-id caches per location type, indexed by `mesh_id - 1`.
    pub fn var_name_ids_by_location_by_mesh_id(
        &self,
    ) -> &[Option<HashMap<LocationType, Vec<i32>>>] {
        &self.var_name_ids
    }

    pub fn cached_node_coordinates(&self, mesh_id: i32) -> Option<&Vec<Point3<f64>>> {
        self.node_coordinates.get(&mesh_id)
    }
}

fn grow_cache<T>(cache: &mut Vec<Option<T>>, len: usize) {
    if cache.len() < len {
        cache.resize_with(len, || None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_api::ErrorCode;
    use test_utils::FakeUGridApi;

    fn grid_with(api: FakeUGridApi) -> UGrid {
        UGrid::with_api("ugrid/Dummy.nc", Some(Box::new(api)))
    }

    fn message_of<T>(result: Result<T>) -> String {
        result.err().expect("expected an error").message
    }

    const ERR: ErrorCode = ErrorCode(-1);

    #[test]
    fn z_coordinate_fill_value_is_passed_through() {
        let mut grid = grid_with(FakeUGridApi {
            z_fill_value: 2.0,
            ..FakeUGridApi::default()
        });
        assert_eq!(grid.z_coordinate_fill_value().unwrap(), 2.0);
    }

    #[test]
    fn number_of_2d_meshes_reports_count_or_context() {
        let mut grid = grid_with(FakeUGridApi::default());
        assert_eq!(grid.get_number_of_2d_meshes().unwrap(), 2);

        let mut grid = grid_with(FakeUGridApi {
            meshes_by_type: Err(ERR),
            ..FakeUGridApi::default()
        });
        assert!(message_of(grid.get_number_of_2d_meshes())
            .contains("Couldn't get the number of 2D meshes"));
    }

    #[test]
    fn number_of_nodes_reports_count_or_context() {
        let mut grid = grid_with(FakeUGridApi::default());
        assert_eq!(grid.get_number_of_nodes_for_mesh_id(1).unwrap(), 2);

        let mut grid = grid_with(FakeUGridApi {
            node_count: Err(ERR),
            ..FakeUGridApi::default()
        });
        assert!(message_of(grid.get_number_of_nodes_for_mesh_id(1))
            .contains("Couldn't get the number of nodes"));
    }

    #[test]
    fn number_of_edges_and_faces_report_their_contexts() {
        let mut grid = grid_with(FakeUGridApi {
            edge_count: Err(ERR),
            ..FakeUGridApi::default()
        });
        assert!(message_of(grid.get_number_of_edges_for_mesh_id(1))
            .contains("Couldn't get number of edges"));

        let mut grid = grid_with(FakeUGridApi {
            face_count: Err(ERR),
            ..FakeUGridApi::default()
        });
        assert!(message_of(grid.get_number_of_faces_for_mesh_id(1))
            .contains("Couldn't get number of faces"));

        let mut grid = grid_with(FakeUGridApi {
            max_face_nodes: Err(ERR),
            ..FakeUGridApi::default()
        });
        assert!(message_of(grid.get_number_of_max_face_nodes_for_mesh_id(1))
            .contains("Couldn't get max face nodes"));
    }

    #[test]
    fn all_node_coordinates_report_the_failing_axis() {
        let mut grid = grid_with(FakeUGridApi {
            node_x: Err(ERR),
            ..FakeUGridApi::default()
        });
        assert!(message_of(grid.get_all_node_coordinates_for_mesh_id(1))
            .contains("Couldn't get x node coordinates"));

        let mut grid = grid_with(FakeUGridApi {
            node_y: Err(ERR),
            ..FakeUGridApi::default()
        });
        assert!(message_of(grid.get_all_node_coordinates_for_mesh_id(1))
            .contains("Couldn't get y node coordinates"));

        let mut grid = grid_with(FakeUGridApi {
            node_z: Err(ERR),
            ..FakeUGridApi::default()
        });
        assert!(message_of(grid.get_all_node_coordinates_for_mesh_id(1))
            .contains("Couldn't get z node coordinates"));
    }

    #[test]
    fn all_node_coordinates_of_an_empty_mesh_are_empty() {
        let mut grid = grid_with(FakeUGridApi {
            node_count: Ok(0),
            ..FakeUGridApi::default()
        });
        assert!(grid.get_all_node_coordinates_for_mesh_id(1).unwrap().is_empty());
    }

    #[test]
    fn all_node_coordinates_combine_the_three_axes() {
        let mut grid = grid_with(FakeUGridApi::default());
        let coordinates = grid.get_all_node_coordinates_for_mesh_id(1).unwrap();
        assert_eq!(
            coordinates,
            vec![Point3::new(2.0, -1.0, -1.1), Point3::new(3.4, 8.4, -2.3)]
        );
        assert_eq!(grid.cached_node_coordinates(1), Some(&coordinates));
    }

    #[test]
    fn edge_nodes_are_cached_per_mesh_id() {
        let mut grid = grid_with(FakeUGridApi::default());
        grid.get_edge_nodes_for_mesh_id(1).unwrap();

        let cached = grid.edge_nodes_by_mesh_id()[0].as_ref().unwrap();
        assert_eq!(cached[(0, 0)], 0);
        assert_eq!(cached[(0, 1)], 1);
        assert_eq!(cached[(1, 0)], 1);
        assert_eq!(cached[(1, 1)], 2);
    }

    #[test]
    fn edge_nodes_failure_reports_its_context() {
        let mut grid = grid_with(FakeUGridApi {
            edge_nodes: Err(ERR),
            ..FakeUGridApi::default()
        });
        assert!(message_of(grid.get_edge_nodes_for_mesh_id(1))
            .contains("Couldn't get edge nodes of the mesh"));
    }

    #[test]
    fn face_nodes_are_cached_per_mesh_id() {
        let mut grid = grid_with(FakeUGridApi::default());
        grid.get_face_nodes_for_mesh_id(1).unwrap();

        let cached = grid.face_nodes_by_mesh_id()[0].as_ref().unwrap();
        assert_eq!(cached[(1, 0)], 1);
        assert_eq!(cached[(1, 1)], 2);
    }

    #[test]
    fn face_nodes_failure_reports_its_context() {
        let mut grid = grid_with(FakeUGridApi {
            face_nodes: Err(ERR),
            ..FakeUGridApi::default()
        });
        assert!(message_of(grid.get_face_nodes_for_mesh_id(1))
            .contains("Couldn't get face nodes of the mesh"));
    }

    #[test]
    fn names_for_location_type_report_count_or_context() {
        let mut grid = grid_with(FakeUGridApi::default());
        assert_eq!(
            grid.number_of_names_for_location_type(1, LocationType::Node).unwrap(),
            33
        );

        let mut grid = grid_with(FakeUGridApi {
            var_count: Err(ERR),
            ..FakeUGridApi::default()
        });
        assert!(
            message_of(grid.number_of_names_for_location_type(1, LocationType::Node))
                .contains("Couldn't get the number of names for location type")
        );
    }

    #[test]
    fn names_at_location_are_cached_by_location_type() {
        let mut grid = grid_with(FakeUGridApi::default());
        grid.get_names_at_location(1, LocationType::Node).unwrap();

        let cached = grid.var_name_ids_by_location_by_mesh_id()[0].as_ref().unwrap();
        assert_eq!(cached[&LocationType::Node], vec![1, 1, 2, 3, 5, 8]);
    }

    #[test]
    fn names_at_location_failure_reports_its_context() {
        let mut grid = grid_with(FakeUGridApi {
            var_ids: Err(ERR),
            ..FakeUGridApi::default()
        });
        assert!(message_of(grid.get_names_at_location(1, LocationType::Node))
            .contains("Couldn't get the names at location"));
    }

    #[test]
    fn rewriting_coordinates_reports_its_context() {
        let mut grid = grid_with(FakeUGridApi::default());
        grid.rewrite_grid_coordinates_for_mesh_id(1, &[1.0], &[2.0]).unwrap();

        let mut grid = grid_with(FakeUGridApi {
            write_xy_result: Err(ERR),
            ..FakeUGridApi::default()
        });
        assert!(
            message_of(grid.rewrite_grid_coordinates_for_mesh_id(1, &[1.0], &[2.0]))
                .contains("Couldn't rewrite grid coordinates")
        );
    }

    #[test]
    fn mesh_name_reports_name_or_context() {
        let mut grid = grid_with(FakeUGridApi::default());
        assert_eq!(grid.get_mesh_name(1).unwrap(), "MyNetwork");

        let mut grid = grid_with(FakeUGridApi {
            mesh_name: Err(ERR),
            ..FakeUGridApi::default()
        });
        assert!(message_of(grid.get_mesh_name(1)).contains("Couldn't get meshname"));
    }

    #[test]
    fn z_value_writes_report_their_location_context() {
        let failing = || FakeUGridApi {
            write_z_result: Err(ERR),
            ..FakeUGridApi::default()
        };

        let mut grid = grid_with(failing());
        assert!(message_of(grid.write_z_values_at_faces_for_mesh_id(1, &[1.0]))
            .contains("Error writing z values at mesh faces"));

        let mut grid = grid_with(failing());
        assert!(message_of(grid.write_z_values_at_nodes_for_mesh_id(1, &[1.0]))
            .contains("Error writing z values at mesh nodes"));

        let mut grid = grid_with(FakeUGridApi::default());
        grid.write_z_values_at_faces_for_mesh_id(1, &[1.0, 2.0]).unwrap();
        grid.write_z_values_at_nodes_for_mesh_id(1, &[3.0, 4.0]).unwrap();
    }

    #[test]
    fn z_value_reads_report_their_location_context() {
        let failing = || FakeUGridApi {
            read_z_result: Err(ERR),
            ..FakeUGridApi::default()
        };

        let mut grid = grid_with(failing());
        assert!(message_of(grid.read_z_values_at_faces_for_mesh_id(1))
            .contains("Error reading z values at mesh faces"));

        let mut grid = grid_with(failing());
        assert!(message_of(grid.read_z_values_at_nodes_for_mesh_id(1))
            .contains("Error reading z values at mesh nodes"));

        let mut grid = grid_with(FakeUGridApi::default());
        assert_eq!(grid.read_z_values_at_faces_for_mesh_id(1).unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn a_non_ugrid_dataset_is_rejected_by_the_guard() {
        let mut grid = grid_with(FakeUGridApi {
            convention: grid_api::DataSetConvention::Other,
            ..FakeUGridApi::default()
        });
        assert!(message_of(grid.get_mesh_name(1)).contains("is not a UGRID"));
    }

    #[test]
    fn an_under_version_dataset_is_rejected_by_the_guard() {
        let mut grid = grid_with(FakeUGridApi {
            version: 0.9,
            ..FakeUGridApi::default()
        });
        assert!(message_of(grid.get_mesh_name(1)).contains("is not a UGRID"));
    }

    #[test]
    fn guarded_operations_initialize_on_demand() {
        let api = FakeUGridApi::uninitialized();
        let recorder = api.recorder();
        let mut grid = grid_with(api);

        assert_eq!(grid.get_mesh_name(1).unwrap(), "MyNetwork");
        assert!(recorder.borrow().calls.contains(&"open".to_string()));
    }
}
