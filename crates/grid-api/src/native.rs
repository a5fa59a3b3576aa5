//! The in-process grid API: typed operations calling the loaded kernel.

use nalgebra::DMatrix;
use tracing::debug;

use ionc::library::LoadError;
use ionc::wrapper::{GridWrapper, IoncWrapper};

use crate::api::{GridApi, UGridApi};
use crate::constants::{
    ALTITUDE_STANDARD_NAME, DEFAULT_FILL_VALUE, MAXSTRLEN, METRES_UNIT, NET_NODE_Z_VAR, NF90_DOUBLE,
    NODE_Z_VAR, NOERR, NUMBER_OF_NODES_ON_AN_EDGE, UG_CONV_MIN_VERSION,
};
use crate::error::{check, ErrorCode, GridResult};
use crate::marshal::{reshape_connectivity, string_from_fixed};
use crate::probe::legacy_convention;
use crate::types::{DataSetConvention, LocationType, OpenMode, UGridGlobalMetaData, UGridMeshType};

/// Grid API over a [`GridWrapper`], normally the loaded native kernel.
///
/// Owns exactly one dataset handle: 0 while closed, positive while open.
/// Every operation other than `open`/`create_file` refuses to run without an
/// open handle and reports [`ErrorCode::FATAL`] instead.
pub struct NativeUGridApi<W: GridWrapper = IoncWrapper> {
    wrapper: W,
    ionc_id: i32,
    convention: DataSetConvention,
    conv_version: f64,
    z_coordinate_fill_value: f64,
}

impl NativeUGridApi<IoncWrapper> {
    /// Loads the native library and wraps it. Fails when the kernel is not
    /// installed on this machine.
    pub fn load() -> Result<Self, LoadError> {
        Ok(Self::with_wrapper(IoncWrapper::load()?))
    }
}

impl<W: GridWrapper> NativeUGridApi<W> {
    pub fn with_wrapper(wrapper: W) -> Self {
        Self {
            wrapper,
            ionc_id: 0,
            convention: DataSetConvention::Null,
            conv_version: f64::NAN,
            z_coordinate_fill_value: 0.0,
        }
    }

    fn guard(&self) -> GridResult<()> {
        if self.ionc_id > 0 {
            Ok(())
        } else {
            Err(ErrorCode::FATAL)
        }
    }

    fn node_xy(&mut self, mesh_id: i32, n_nodes: usize) -> GridResult<(Vec<f64>, Vec<f64>)> {
        let mut xs = vec![0.0; n_nodes];
        let mut ys = vec![0.0; n_nodes];
        check(self.wrapper.get_node_coordinates(self.ionc_id, mesh_id, &mut xs, &mut ys))?;
        Ok((xs, ys))
    }
}

impl<W: GridWrapper> GridApi for NativeUGridApi<W> {
    fn initialized(&mut self) -> bool {
        self.ionc_id > 0
    }

    fn open(&mut self, path: &str, mode: OpenMode) -> GridResult<()> {
        let mut ionc_id = 0;
        let mut conv_type = 0;
        let mut conv_version = f64::NAN;
        let ierr = self.wrapper.open(
            path,
            mode.to_nf90(),
            &mut ionc_id,
            &mut conv_type,
            &mut conv_version,
        );
        if ierr != NOERR {
            return Err(ErrorCode::FATAL);
        }
        self.ionc_id = ionc_id;
        self.convention = DataSetConvention::from_native(conv_type);
        self.conv_version = conv_version;
        Ok(())
    }

    fn close(&mut self) -> GridResult<()> {
        if self.ionc_id <= 0 {
            return Ok(());
        }
        check(self.wrapper.close(self.ionc_id))?;
        self.ionc_id = 0;
        Ok(())
    }

    fn create_file(
        &mut self,
        path: &str,
        metadata: &UGridGlobalMetaData,
        mode: OpenMode,
    ) -> GridResult<()> {
        let mut ionc_id = 0;
        check(self.wrapper.create(path, mode.to_nf90(), &mut ionc_id))?;
        self.ionc_id = ionc_id;
        self.convention = DataSetConvention::Ugrid;
        self.conv_version = UG_CONV_MIN_VERSION;
        check(
            self.wrapper
                .add_global_attributes(self.ionc_id, &metadata.to_interop()),
        )
    }

    fn convention(&mut self) -> DataSetConvention {
        if self.ionc_id > 0 {
            self.convention
        } else {
            DataSetConvention::Null
        }
    }

    fn version(&mut self) -> f64 {
        if self.ionc_id > 0 {
            self.conv_version
        } else {
            f64::NAN
        }
    }

    fn probe_convention(&mut self, path: &str) -> DataSetConvention {
        if path.is_empty() {
            return DataSetConvention::Other;
        }

        let convention = match self.open(path, OpenMode::ReadOnly) {
            Err(_) => legacy_convention(path),
            Ok(()) => {
                let mut convention = self.convention;
                if convention == DataSetConvention::Null {
                    convention = legacy_convention(path);
                }
                // NaN versions must downgrade too, hence the negated compare.
                if convention == DataSetConvention::Ugrid
                    && !(self.conv_version >= UG_CONV_MIN_VERSION)
                {
                    convention = DataSetConvention::Other;
                }
                convention
            }
        };

        // The probe must not leave a handle open behind the caller's back.
        if let Err(code) = self.close() {
            debug!(path, %code, "closing the probed dataset failed");
        }
        convention
    }

    fn mesh_count(&mut self) -> GridResult<i32> {
        self.guard()?;
        let mut n_mesh = 0;
        check(self.wrapper.get_mesh_count(self.ionc_id, &mut n_mesh))?;
        Ok(n_mesh)
    }

    fn coordinate_system_code(&mut self) -> GridResult<i32> {
        self.guard()?;
        let mut epsg = 0;
        check(self.wrapper.get_coordinate_system(self.ionc_id, &mut epsg))?;
        Ok(epsg)
    }
}

impl<W: GridWrapper> UGridApi for NativeUGridApi<W> {
    fn z_coordinate_fill_value(&mut self) -> f64 {
        self.z_coordinate_fill_value
    }

    fn set_z_coordinate_fill_value(&mut self, value: f64) {
        self.z_coordinate_fill_value = value;
    }

    fn number_of_meshes_by_type(&mut self, mesh_type: UGridMeshType) -> GridResult<i32> {
        self.guard()?;
        let mut n_meshes = 0;
        check(
            self.wrapper
                .get_number_of_meshes(self.ionc_id, mesh_type.into(), &mut n_meshes),
        )?;
        Ok(n_meshes)
    }

    fn mesh_ids(&mut self, mesh_type: UGridMeshType) -> GridResult<Vec<i32>> {
        let n_meshes = self.number_of_meshes_by_type(mesh_type)?;
        let mut ids = vec![0; n_meshes.max(0) as usize];
        check(self.wrapper.get_mesh_ids(self.ionc_id, mesh_type.into(), &mut ids))?;
        Ok(ids)
    }

    fn number_of_networks(&mut self) -> GridResult<i32> {
        self.guard()?;
        let mut n_networks = 0;
        check(self.wrapper.get_number_of_networks(self.ionc_id, &mut n_networks))?;
        Ok(n_networks)
    }

    fn network_ids(&mut self) -> GridResult<Vec<i32>> {
        let n_networks = self.number_of_networks()?;
        let mut ids = vec![0; n_networks.max(0) as usize];
        check(self.wrapper.get_network_ids(self.ionc_id, &mut ids))?;
        Ok(ids)
    }

    fn number_of_nodes(&mut self, mesh_id: i32) -> GridResult<i32> {
        self.guard()?;
        let mut n_nodes = 0;
        check(self.wrapper.get_node_count(self.ionc_id, mesh_id, &mut n_nodes))?;
        Ok(n_nodes)
    }

    fn number_of_edges(&mut self, mesh_id: i32) -> GridResult<i32> {
        self.guard()?;
        let mut n_edges = 0;
        check(self.wrapper.get_edge_count(self.ionc_id, mesh_id, &mut n_edges))?;
        Ok(n_edges)
    }

    fn number_of_faces(&mut self, mesh_id: i32) -> GridResult<i32> {
        self.guard()?;
        let mut n_faces = 0;
        check(self.wrapper.get_face_count(self.ionc_id, mesh_id, &mut n_faces))?;
        Ok(n_faces)
    }

    fn max_face_nodes(&mut self, mesh_id: i32) -> GridResult<i32> {
        self.guard()?;
        let mut n_max = 0;
        check(self.wrapper.get_max_face_nodes(self.ionc_id, mesh_id, &mut n_max))?;
        Ok(n_max)
    }

    fn node_x_coordinates(&mut self, mesh_id: i32) -> GridResult<Vec<f64>> {
        self.guard()?;
        let n_nodes = self
            .number_of_nodes(mesh_id)
            .map_err(|_| ErrorCode::FATAL)?;
        let (xs, _) = self.node_xy(mesh_id, n_nodes.max(0) as usize)?;
        Ok(xs)
    }

    fn node_y_coordinates(&mut self, mesh_id: i32) -> GridResult<Vec<f64>> {
        self.guard()?;
        let n_nodes = self
            .number_of_nodes(mesh_id)
            .map_err(|_| ErrorCode::FATAL)?;
        let (_, ys) = self.node_xy(mesh_id, n_nodes.max(0) as usize)?;
        Ok(ys)
    }

    fn node_z_coordinates(&mut self, mesh_id: i32) -> GridResult<Vec<f64>> {
        self.guard()?;
        let n_nodes = self.number_of_nodes(mesh_id)?;
        if n_nodes <= 0 {
            return Ok(Vec::new());
        }
        let mut values = vec![0.0; n_nodes as usize];
        let location = LocationType::Node.into();
        let ierr = self.wrapper.get_var(
            self.ionc_id,
            mesh_id,
            location,
            NODE_Z_VAR,
            &mut values,
            &mut self.z_coordinate_fill_value,
        );
        if ierr != NOERR {
            // Older files store the node Z values under the legacy name.
            check(self.wrapper.get_var(
                self.ionc_id,
                mesh_id,
                location,
                NET_NODE_Z_VAR,
                &mut values,
                &mut self.z_coordinate_fill_value,
            ))?;
        }
        Ok(values)
    }

    fn edge_nodes(&mut self, mesh_id: i32) -> GridResult<DMatrix<i32>> {
        self.guard()?;
        let n_edges = self.number_of_edges(mesh_id)?.max(0) as usize;
        let mut flat = vec![0; n_edges * NUMBER_OF_NODES_ON_AN_EDGE];
        check(self.wrapper.get_edge_nodes(self.ionc_id, mesh_id, &mut flat))?;
        Ok(reshape_connectivity(&flat, n_edges, NUMBER_OF_NODES_ON_AN_EDGE))
    }

    fn face_nodes(&mut self, mesh_id: i32) -> GridResult<DMatrix<i32>> {
        self.guard()?;
        let n_faces = self.number_of_faces(mesh_id)?;
        let n_max = self.max_face_nodes(mesh_id)?;
        let (rows, cols) = (n_faces.max(0) as usize, n_max.max(0) as usize);
        let mut flat = vec![0; rows * cols];
        let mut fill_value = 0;
        check(self.wrapper.get_face_nodes(
            self.ionc_id,
            mesh_id,
            &mut flat,
            n_faces,
            n_max,
            &mut fill_value,
        ))?;
        Ok(reshape_connectivity(&flat, rows, cols))
    }

    fn write_xy_coordinates(&mut self, mesh_id: i32, xs: &[f64], ys: &[f64]) -> GridResult<()> {
        self.guard()?;
        let n_nodes = self
            .number_of_nodes(mesh_id)
            .map_err(|_| ErrorCode::FATAL)?;
        if xs.len() != n_nodes.max(0) as usize || ys.len() != xs.len() {
            return Err(ErrorCode::ARRAY_LENGTH);
        }
        check(self.wrapper.put_node_coordinates(self.ionc_id, mesh_id, xs, ys))
    }

    fn write_z_coordinates(
        &mut self,
        mesh_id: i32,
        location: LocationType,
        var_name: &str,
        long_name: &str,
        values: &[f64],
    ) -> GridResult<()> {
        self.guard()?;
        let mut var_id = -1;
        let _ = self
            .wrapper
            .inq_var_id(self.ionc_id, mesh_id, var_name, &mut var_id);
        if var_id < 0 {
            check(self.wrapper.def_var(
                self.ionc_id,
                mesh_id,
                &mut var_id,
                NF90_DOUBLE,
                location.into(),
                var_name,
                ALTITUDE_STANDARD_NAME,
                long_name,
                METRES_UNIT,
                DEFAULT_FILL_VALUE,
            ))?;
        }
        check(
            self.wrapper
                .put_var(self.ionc_id, mesh_id, location.into(), var_name, values),
        )
    }

    fn read_z_coordinates(
        &mut self,
        mesh_id: i32,
        location: LocationType,
        var_name: &str,
    ) -> GridResult<Vec<f64>> {
        self.guard()?;
        let mut var_id = -1;
        let _ = self.wrapper.inq_var_id_by_standard_name(
            self.ionc_id,
            mesh_id,
            location.into(),
            ALTITUDE_STANDARD_NAME,
            &mut var_id,
        );
        if var_id < 0 {
            // No altitude variable in this dataset; nothing to read.
            return Ok(Vec::new());
        }

        let n_values = match location {
            LocationType::Node => self.number_of_nodes(mesh_id)?,
            LocationType::Face => self.number_of_faces(mesh_id)?,
            _ => 0,
        };
        if n_values <= 0 {
            return Ok(Vec::new());
        }

        let mut values = vec![0.0; n_values as usize];
        check(self.wrapper.get_var(
            self.ionc_id,
            mesh_id,
            location.into(),
            var_name,
            &mut values,
            &mut self.z_coordinate_fill_value,
        ))?;
        Ok(values)
    }

    fn mesh_name(&mut self, mesh_id: i32) -> GridResult<String> {
        self.guard()?;
        let mut buf = [0u8; MAXSTRLEN];
        check(self.wrapper.get_mesh_name(self.ionc_id, mesh_id, &mut buf))?;
        Ok(string_from_fixed(&buf))
    }

    fn var_count(&mut self, mesh_id: i32, location: LocationType) -> GridResult<i32> {
        self.guard()?;
        let mut n_count = 0;
        check(
            self.wrapper
                .get_var_count(self.ionc_id, mesh_id, location.into(), &mut n_count),
        )?;
        Ok(n_count)
    }

    fn var_ids(&mut self, mesh_id: i32, location: LocationType) -> GridResult<Vec<i32>> {
        let n_vars = self.var_count(mesh_id, location)?;
        let mut ids = vec![0; n_vars.max(0) as usize];
        check(
            self.wrapper
                .inq_var_ids(self.ionc_id, mesh_id, location.into(), &mut ids),
        )?;
        Ok(ids)
    }

    fn write_geom_ugrid(&mut self, filename: &str) -> GridResult<()> {
        check(self.wrapper.write_geom_ugrid(filename))
    }

    fn write_map_ugrid(&mut self, filename: &str) -> GridResult<()> {
        check(self.wrapper.write_map_ugrid(filename))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::constants::GENERAL_FATAL_ERR;

    #[derive(Default)]
    struct FakeState {
        calls: Vec<String>,
        written_xy: Option<(Vec<f64>, Vec<f64>)>,
        written_z: Option<Vec<f64>>,
        defined_vars: Vec<String>,
        read_z_vars: Vec<String>,
    }

    /// Scripted stand-in for the native kernel, so the typed layer can be
    /// exercised without a loaded library.
    struct FakeWrapper {
        state: Rc<RefCell<FakeState>>,
        open_result: i32,
        open_id: i32,
        open_conv: i32,
        open_version: f64,
        close_result: i32,
        create_result: i32,
        mesh_count: i32,
        node_count: i32,
        edge_count: i32,
        face_count: i32,
        max_face_nodes: i32,
        epsg: i32,
        xs: Vec<f64>,
        ys: Vec<f64>,
        zs: Vec<f64>,
        edge_nodes_flat: Vec<i32>,
        face_nodes_flat: Vec<i32>,
        node_z_result: i32,
        var_id: i32,
        var_ids: Vec<i32>,
        mesh_name: &'static str,
    }

    impl Default for FakeWrapper {
        fn default() -> Self {
            Self {
                state: Rc::default(),
                open_result: NOERR,
                open_id: 1,
                open_conv: DataSetConvention::Ugrid.into(),
                open_version: UG_CONV_MIN_VERSION,
                close_result: NOERR,
                create_result: NOERR,
                mesh_count: 1,
                node_count: 4,
                edge_count: 4,
                face_count: 1,
                max_face_nodes: 4,
                epsg: 4326,
                xs: vec![0.0, 1.0, 1.0, 0.0],
                ys: vec![0.0, 0.0, 1.0, 1.0],
                zs: vec![-1.0, -2.0, -3.0, -4.0],
                edge_nodes_flat: vec![0, 1, 1, 2, 2, 3, 3, 0],
                face_nodes_flat: vec![0, 1, 2, 3],
                node_z_result: NOERR,
                var_id: 3,
                var_ids: vec![1, 1, 2, 3, 5, 8],
                mesh_name: "mesh2d",
            }
        }
    }

    impl FakeWrapper {
        fn record(&self, call: &str) {
            self.state.borrow_mut().calls.push(call.to_string());
        }

        fn shared_state(&self) -> Rc<RefCell<FakeState>> {
            Rc::clone(&self.state)
        }
    }

    impl GridWrapper for FakeWrapper {
        fn open(
            &self,
            _path: &str,
            _mode: i32,
            ionc_id: &mut i32,
            conv_type: &mut i32,
            conv_version: &mut f64,
        ) -> i32 {
            self.record("open");
            if self.open_result == NOERR {
                *ionc_id = self.open_id;
                *conv_type = self.open_conv;
                *conv_version = self.open_version;
            }
            self.open_result
        }

        fn close(&self, _ionc_id: i32) -> i32 {
            self.record("close");
            self.close_result
        }

        fn create(&self, _path: &str, _mode: i32, ionc_id: &mut i32) -> i32 {
            self.record("create");
            if self.create_result == NOERR {
                *ionc_id = self.open_id;
            }
            self.create_result
        }

        fn adheres_to_conventions(&self, _ionc_id: i32, _conv_type: i32) -> bool {
            false
        }

        fn inq_conventions(&self, _ionc_id: i32, conv_type: &mut i32, conv_version: &mut f64) -> i32 {
            *conv_type = self.open_conv;
            *conv_version = self.open_version;
            NOERR
        }

        fn get_mesh_count(&self, _ionc_id: i32, n_mesh: &mut i32) -> i32 {
            self.record("get_mesh_count");
            *n_mesh = self.mesh_count;
            NOERR
        }

        fn get_mesh_name(&self, _ionc_id: i32, _mesh_id: i32, name: &mut [u8]) -> i32 {
            let bytes = self.mesh_name.as_bytes();
            name[..bytes.len()].copy_from_slice(bytes);
            name[bytes.len()] = 0;
            NOERR
        }

        fn get_node_count(&self, _ionc_id: i32, _mesh_id: i32, n_node: &mut i32) -> i32 {
            self.record("get_node_count");
            *n_node = self.node_count;
            NOERR
        }

        fn get_edge_count(&self, _ionc_id: i32, _mesh_id: i32, n_edge: &mut i32) -> i32 {
            self.record("get_edge_count");
            *n_edge = self.edge_count;
            NOERR
        }

        fn get_face_count(&self, _ionc_id: i32, _mesh_id: i32, n_face: &mut i32) -> i32 {
            self.record("get_face_count");
            *n_face = self.face_count;
            NOERR
        }

        fn get_max_face_nodes(&self, _ionc_id: i32, _mesh_id: i32, n_max: &mut i32) -> i32 {
            *n_max = self.max_face_nodes;
            NOERR
        }

        fn get_node_coordinates(
            &self,
            _ionc_id: i32,
            _mesh_id: i32,
            x: &mut [f64],
            y: &mut [f64],
        ) -> i32 {
            self.record("get_node_coordinates");
            x.copy_from_slice(&self.xs[..x.len()]);
            y.copy_from_slice(&self.ys[..y.len()]);
            NOERR
        }

        fn put_node_coordinates(&self, _ionc_id: i32, _mesh_id: i32, x: &[f64], y: &[f64]) -> i32 {
            self.record("put_node_coordinates");
            self.state.borrow_mut().written_xy = Some((x.to_vec(), y.to_vec()));
            NOERR
        }

        fn get_edge_nodes(&self, _ionc_id: i32, _mesh_id: i32, edge_nodes: &mut [i32]) -> i32 {
            edge_nodes.copy_from_slice(&self.edge_nodes_flat[..edge_nodes.len()]);
            NOERR
        }

        fn get_face_nodes(
            &self,
            _ionc_id: i32,
            _mesh_id: i32,
            face_nodes: &mut [i32],
            _n_face: i32,
            _n_max_face_nodes: i32,
            fill_value: &mut i32,
        ) -> i32 {
            *fill_value = -999;
            face_nodes.copy_from_slice(&self.face_nodes_flat[..face_nodes.len()]);
            NOERR
        }

        fn get_coordinate_system(&self, _ionc_id: i32, epsg: &mut i32) -> i32 {
            self.record("get_coordinate_system");
            *epsg = self.epsg;
            NOERR
        }

        fn get_var_count(&self, _ionc_id: i32, _mesh_id: i32, _location: i32, n_count: &mut i32) -> i32 {
            *n_count = self.var_ids.len() as i32;
            NOERR
        }

        fn inq_var_id(&self, _ionc_id: i32, _mesh_id: i32, _var_name: &str, var_id: &mut i32) -> i32 {
            *var_id = self.var_id;
            NOERR
        }

        fn inq_var_id_by_standard_name(
            &self,
            _ionc_id: i32,
            _mesh_id: i32,
            _location: i32,
            _standard_name: &str,
            var_id: &mut i32,
        ) -> i32 {
            *var_id = self.var_id;
            NOERR
        }

        fn inq_var_ids(&self, _ionc_id: i32, _mesh_id: i32, _location: i32, var_ids: &mut [i32]) -> i32 {
            var_ids.copy_from_slice(&self.var_ids[..var_ids.len()]);
            NOERR
        }

        fn get_var(
            &self,
            _ionc_id: i32,
            _mesh_id: i32,
            _location: i32,
            var_name: &str,
            values: &mut [f64],
            fill_value: &mut f64,
        ) -> i32 {
            self.state.borrow_mut().read_z_vars.push(var_name.to_string());
            if var_name == NODE_Z_VAR && self.node_z_result != NOERR {
                return self.node_z_result;
            }
            *fill_value = DEFAULT_FILL_VALUE;
            values.copy_from_slice(&self.zs[..values.len()]);
            NOERR
        }

        fn put_var(
            &self,
            _ionc_id: i32,
            _mesh_id: i32,
            _location: i32,
            _var_name: &str,
            values: &[f64],
        ) -> i32 {
            self.state.borrow_mut().written_z = Some(values.to_vec());
            NOERR
        }

        fn def_var(
            &self,
            _ionc_id: i32,
            _mesh_id: i32,
            var_id: &mut i32,
            _data_type: i32,
            _location: i32,
            var_name: &str,
            _standard_name: &str,
            _long_name: &str,
            _unit: &str,
            _fill_value: f64,
        ) -> i32 {
            self.state.borrow_mut().defined_vars.push(var_name.to_string());
            *var_id = 7;
            NOERR
        }

        fn add_global_attributes(&self, _ionc_id: i32, _metadata: &ionc::ffi::InteropMetadata) -> i32 {
            self.record("add_global_attributes");
            NOERR
        }

        fn get_number_of_networks(&self, _ionc_id: i32, n_networks: &mut i32) -> i32 {
            *n_networks = 0;
            NOERR
        }

        fn get_number_of_meshes(&self, _ionc_id: i32, _mesh_type: i32, n_meshes: &mut i32) -> i32 {
            self.record("get_number_of_meshes");
            *n_meshes = self.mesh_count;
            NOERR
        }

        fn get_network_ids(&self, _ionc_id: i32, _network_ids: &mut [i32]) -> i32 {
            NOERR
        }

        fn get_mesh_ids(&self, _ionc_id: i32, _mesh_type: i32, mesh_ids: &mut [i32]) -> i32 {
            for (index, id) in mesh_ids.iter_mut().enumerate() {
                *id = index as i32 + 1;
            }
            NOERR
        }

        fn get_network_id_from_mesh_id(&self, _ionc_id: i32, _mesh_id: i32, network_id: &mut i32) -> i32 {
            *network_id = 0;
            NOERR
        }

        fn write_geom_ugrid(&self, _filename: &str) -> i32 {
            NOERR
        }

        fn write_map_ugrid(&self, _filename: &str) -> i32 {
            NOERR
        }
    }

    fn open_api(wrapper: FakeWrapper) -> NativeUGridApi<FakeWrapper> {
        let mut api = NativeUGridApi::with_wrapper(wrapper);
        api.open("test.nc", OpenMode::ReadOnly).expect("open");
        api
    }

    #[test]
    fn operations_before_open_return_fatal_without_a_native_call() {
        let wrapper = FakeWrapper::default();
        let state = wrapper.shared_state();
        let mut api = NativeUGridApi::with_wrapper(wrapper);

        assert!(!api.initialized());
        assert_eq!(api.mesh_count(), Err(ErrorCode::FATAL));
        assert_eq!(api.number_of_nodes(1), Err(ErrorCode::FATAL));
        assert_eq!(api.node_x_coordinates(1), Err(ErrorCode::FATAL));
        assert_eq!(api.edge_nodes(1).unwrap_err(), ErrorCode::FATAL);
        assert_eq!(api.coordinate_system_code(), Err(ErrorCode::FATAL));
        assert!(api.version().is_nan());
        assert_eq!(api.convention(), DataSetConvention::Null);

        assert!(state.borrow().calls.is_empty());
    }

    #[test]
    fn open_failure_reports_fatal_and_stays_unopened() {
        let wrapper = FakeWrapper {
            open_result: GENERAL_FATAL_ERR,
            ..FakeWrapper::default()
        };
        let mut api = NativeUGridApi::with_wrapper(wrapper);

        assert_eq!(api.open("test.nc", OpenMode::ReadOnly), Err(ErrorCode::FATAL));
        assert!(!api.initialized());
    }

    #[test]
    fn handle_is_open_strictly_between_open_and_close() {
        let wrapper = FakeWrapper::default();
        let state = wrapper.shared_state();
        let mut api = NativeUGridApi::with_wrapper(wrapper);

        assert!(!api.initialized());
        api.open("test.nc", OpenMode::ReadOnly).unwrap();
        assert!(api.initialized());
        assert_eq!(api.convention(), DataSetConvention::Ugrid);
        assert_eq!(api.version(), UG_CONV_MIN_VERSION);

        api.close().unwrap();
        assert!(!api.initialized());

        // A second close must not reach the native library again.
        api.close().unwrap();
        let closes = state.borrow().calls.iter().filter(|c| *c == "close").count();
        assert_eq!(closes, 1);
    }

    #[test]
    fn failed_close_keeps_the_handle() {
        let wrapper = FakeWrapper {
            close_result: GENERAL_FATAL_ERR,
            ..FakeWrapper::default()
        };
        let mut api = open_api(wrapper);

        assert_eq!(api.close(), Err(ErrorCode::FATAL));
        assert!(api.initialized());
    }

    #[test]
    fn probe_with_empty_path_is_other_without_native_calls() {
        let wrapper = FakeWrapper::default();
        let state = wrapper.shared_state();
        let mut api = NativeUGridApi::with_wrapper(wrapper);

        assert_eq!(api.probe_convention(""), DataSetConvention::Other);
        assert!(state.borrow().calls.is_empty());
    }

    #[test]
    fn probe_falls_back_to_attribute_detection_when_open_fails() {
        let wrapper = FakeWrapper {
            open_result: GENERAL_FATAL_ERR,
            ..FakeWrapper::default()
        };
        let mut api = NativeUGridApi::with_wrapper(wrapper);

        // The fallback cannot read this file either, so the result is Other.
        assert_eq!(api.probe_convention("missing.nc"), DataSetConvention::Other);
    }

    #[test]
    fn probe_reports_ugrid_for_a_current_version_file_and_closes_it() {
        let wrapper = FakeWrapper::default();
        let state = wrapper.shared_state();
        let mut api = NativeUGridApi::with_wrapper(wrapper);

        assert_eq!(api.probe_convention("test.nc"), DataSetConvention::Ugrid);
        assert!(!api.initialized());
        assert!(state.borrow().calls.contains(&"close".to_string()));
    }

    #[test]
    fn probe_downgrades_ugrid_below_minimum_version() {
        let wrapper = FakeWrapper {
            open_version: f64::NAN,
            ..FakeWrapper::default()
        };
        let mut api = NativeUGridApi::with_wrapper(wrapper);
        assert_eq!(api.probe_convention("test.nc"), DataSetConvention::Other);

        let wrapper = FakeWrapper {
            open_version: 0.9,
            ..FakeWrapper::default()
        };
        let mut api = NativeUGridApi::with_wrapper(wrapper);
        assert_eq!(api.probe_convention("test.nc"), DataSetConvention::Other);
    }

    #[test]
    fn probe_keeps_its_result_when_the_close_fails() {
        let wrapper = FakeWrapper {
            open_conv: DataSetConvention::Test.into(),
            close_result: GENERAL_FATAL_ERR,
            ..FakeWrapper::default()
        };
        let mut api = NativeUGridApi::with_wrapper(wrapper);
        assert_eq!(api.probe_convention("test.nc"), DataSetConvention::Test);
    }

    #[test]
    fn probe_retries_via_attributes_when_the_open_reports_null() {
        let wrapper = FakeWrapper {
            open_conv: DataSetConvention::Null.into(),
            ..FakeWrapper::default()
        };
        let mut api = NativeUGridApi::with_wrapper(wrapper);
        assert_eq!(api.probe_convention("missing.nc"), DataSetConvention::Other);
    }

    #[test]
    fn mesh_and_node_counts_come_from_the_kernel() {
        let mut api = open_api(FakeWrapper::default());
        assert_eq!(api.mesh_count(), Ok(1));
        assert_eq!(api.number_of_nodes(1), Ok(4));
        assert_eq!(api.number_of_edges(1), Ok(4));
        assert_eq!(api.number_of_faces(1), Ok(1));
        assert_eq!(api.max_face_nodes(1), Ok(4));
        assert_eq!(api.coordinate_system_code(), Ok(4326));
    }

    #[test]
    fn node_coordinates_round_trip_through_the_buffer_protocol() {
        let mut api = open_api(FakeWrapper::default());
        assert_eq!(api.node_x_coordinates(1).unwrap(), vec![0.0, 1.0, 1.0, 0.0]);
        assert_eq!(api.node_y_coordinates(1).unwrap(), vec![0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn node_z_falls_back_to_the_legacy_variable_name() {
        let wrapper = FakeWrapper {
            node_z_result: GENERAL_FATAL_ERR,
            ..FakeWrapper::default()
        };
        let state = wrapper.shared_state();
        let mut api = open_api(wrapper);

        let zs = api.node_z_coordinates(1).unwrap();
        assert_eq!(zs, vec![-1.0, -2.0, -3.0, -4.0]);
        assert_eq!(
            state.borrow().read_z_vars,
            vec![NODE_Z_VAR.to_string(), NET_NODE_Z_VAR.to_string()]
        );
    }

    #[test]
    fn connectivity_tables_are_rebuilt_row_major() {
        let mut api = open_api(FakeWrapper::default());

        let edges = api.edge_nodes(1).unwrap();
        assert_eq!(edges.nrows(), 4);
        assert_eq!(edges.ncols(), 2);
        let flat = [0, 1, 1, 2, 2, 3, 3, 0];
        for i in 0..4 {
            for j in 0..2 {
                assert_eq!(edges[(i, j)], flat[i * 2 + j]);
            }
        }

        let faces = api.face_nodes(1).unwrap();
        assert_eq!((faces.nrows(), faces.ncols()), (1, 4));
        assert_eq!(
            (faces[(0, 0)], faces[(0, 1)], faces[(0, 2)], faces[(0, 3)]),
            (0, 1, 2, 3)
        );
    }

    #[test]
    fn write_xy_rejects_mismatched_array_lengths() {
        let mut api = open_api(FakeWrapper::default());
        assert_eq!(
            api.write_xy_coordinates(1, &[0.0, 1.0, 2.0], &[0.0, 1.0, 2.0]),
            Err(ErrorCode::ARRAY_LENGTH)
        );
    }

    #[test]
    fn write_then_read_xy_preserves_values() {
        let wrapper = FakeWrapper::default();
        let state = wrapper.shared_state();
        let mut api = open_api(wrapper);

        let xs = [0.0, 1.0, 1.0, 0.0];
        let ys = [0.0, 0.0, 1.0, 1.0];
        api.write_xy_coordinates(1, &xs, &ys).unwrap();

        let written = state.borrow().written_xy.clone().unwrap();
        assert_eq!(written.0, xs);
        assert_eq!(written.1, ys);
    }

    #[test]
    fn write_z_defines_the_variable_when_it_does_not_exist() {
        let wrapper = FakeWrapper {
            var_id: -1,
            ..FakeWrapper::default()
        };
        let state = wrapper.shared_state();
        let mut api = open_api(wrapper);

        api.write_z_coordinates(1, LocationType::Face, "mesh2d_flowelem_bl", "bed level", &[1.5])
            .unwrap();

        let state = state.borrow();
        assert_eq!(state.defined_vars, vec!["mesh2d_flowelem_bl".to_string()]);
        assert_eq!(state.written_z.as_deref(), Some(&[1.5][..]));
    }

    #[test]
    fn write_z_skips_definition_for_an_existing_variable() {
        let wrapper = FakeWrapper::default();
        let state = wrapper.shared_state();
        let mut api = open_api(wrapper);

        api.write_z_coordinates(1, LocationType::Node, NODE_Z_VAR, "bed level", &[1.0, 2.0, 3.0, 4.0])
            .unwrap();
        assert!(state.borrow().defined_vars.is_empty());
    }

    #[test]
    fn read_z_without_an_altitude_variable_is_empty_and_not_an_error() {
        let wrapper = FakeWrapper {
            var_id: -1,
            ..FakeWrapper::default()
        };
        let state = wrapper.shared_state();
        let mut api = open_api(wrapper);

        assert_eq!(api.read_z_coordinates(1, LocationType::Face, NODE_Z_VAR), Ok(Vec::new()));
        assert!(state.borrow().read_z_vars.is_empty());
    }

    #[test]
    fn read_z_sizes_the_buffer_by_location() {
        let mut api = open_api(FakeWrapper::default());
        let at_nodes = api.read_z_coordinates(1, LocationType::Node, NODE_Z_VAR).unwrap();
        assert_eq!(at_nodes.len(), 4);

        let at_faces = api.read_z_coordinates(1, LocationType::Face, NODE_Z_VAR).unwrap();
        assert_eq!(at_faces.len(), 1);

        let at_edges = api.read_z_coordinates(1, LocationType::Edge, NODE_Z_VAR).unwrap();
        assert!(at_edges.is_empty());
    }

    #[test]
    fn mesh_name_is_read_from_the_fixed_buffer() {
        let mut api = open_api(FakeWrapper::default());
        assert_eq!(api.mesh_name(1).unwrap(), "mesh2d");
    }

    #[test]
    fn var_ids_are_sized_by_the_count_call() {
        let mut api = open_api(FakeWrapper::default());
        assert_eq!(api.var_ids(1, LocationType::Node).unwrap(), vec![1, 1, 2, 3, 5, 8]);
    }

    #[test]
    fn create_file_propagates_the_native_code() {
        for code in [GENERAL_FATAL_ERR, crate::constants::GENERAL_ARRAY_LENGTH_FATAL_ERR] {
            let wrapper = FakeWrapper {
                create_result: code,
                ..FakeWrapper::default()
            };
            let mut api = NativeUGridApi::with_wrapper(wrapper);
            let metadata = UGridGlobalMetaData::new("My Model", "My Source", "1.0");
            assert_eq!(
                api.create_file("new.nc", &metadata, OpenMode::Replace),
                Err(ErrorCode(code))
            );
            assert!(!api.initialized());
        }
    }

    #[test]
    fn create_file_writes_metadata_and_leaves_the_dataset_open() {
        let wrapper = FakeWrapper::default();
        let state = wrapper.shared_state();
        let mut api = NativeUGridApi::with_wrapper(wrapper);

        let metadata = UGridGlobalMetaData::new("My Model", "My Source", "1.0");
        api.create_file("new.nc", &metadata, OpenMode::Replace).unwrap();
        assert!(api.initialized());
        assert!(state.borrow().calls.contains(&"add_global_attributes".to_string()));
    }

    #[test]
    fn mesh_ids_scenario_for_a_single_mesh_file() {
        let mut api = open_api(FakeWrapper::default());
        assert_eq!(api.mesh_ids(UGridMeshType::Mesh2D).unwrap(), vec![1]);
        assert_eq!(api.number_of_meshes_by_type(UGridMeshType::Any), Ok(1));
    }
}
