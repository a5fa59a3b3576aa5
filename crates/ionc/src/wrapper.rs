//! The wrapper seam over the native entry points.
//!
//! [`GridWrapper`] is the surface the typed API layer programs against: one
//! method per entry point, caller-allocated buffers sized to the expected
//! element count, native status codes returned unchanged. [`IoncWrapper`]
//! implements it over a loaded [`IoncLibrary`]; tests substitute fakes.

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_double, c_int};

use tracing::{debug, info, warn};

use crate::ffi::*;
use crate::library::{IoncLibrary, LoadError};

/// Connectivity start index passed to the native edge-node and face-node
/// calls. Must be the same value for both.
pub const START_INDEX: c_int = 0;

/// One method per native entry point. Buffer arguments must already be sized
/// to the element count the preceding count call reported; the native side
/// fills them in place. No interpretation happens here.
pub trait GridWrapper {
    fn open(
        &self,
        path: &str,
        mode: i32,
        ionc_id: &mut i32,
        conv_type: &mut i32,
        conv_version: &mut f64,
    ) -> i32;
    fn close(&self, ionc_id: i32) -> i32;
    fn create(&self, path: &str, mode: i32, ionc_id: &mut i32) -> i32;
    fn adheres_to_conventions(&self, ionc_id: i32, conv_type: i32) -> bool;
    fn inq_conventions(&self, ionc_id: i32, conv_type: &mut i32, conv_version: &mut f64) -> i32;
    fn get_mesh_count(&self, ionc_id: i32, n_mesh: &mut i32) -> i32;
    fn get_mesh_name(&self, ionc_id: i32, mesh_id: i32, name: &mut [u8]) -> i32;
    fn get_node_count(&self, ionc_id: i32, mesh_id: i32, n_node: &mut i32) -> i32;
    fn get_edge_count(&self, ionc_id: i32, mesh_id: i32, n_edge: &mut i32) -> i32;
    fn get_face_count(&self, ionc_id: i32, mesh_id: i32, n_face: &mut i32) -> i32;
    fn get_max_face_nodes(&self, ionc_id: i32, mesh_id: i32, n_max_face_nodes: &mut i32) -> i32;
    fn get_node_coordinates(&self, ionc_id: i32, mesh_id: i32, x: &mut [f64], y: &mut [f64])
        -> i32;
    fn put_node_coordinates(&self, ionc_id: i32, mesh_id: i32, x: &[f64], y: &[f64]) -> i32;
    /// `edge_nodes` holds two node indices per edge.
    fn get_edge_nodes(&self, ionc_id: i32, mesh_id: i32, edge_nodes: &mut [i32]) -> i32;
    /// `face_nodes` holds `n_max_face_nodes` entries per face, fill-padded.
    fn get_face_nodes(
        &self,
        ionc_id: i32,
        mesh_id: i32,
        face_nodes: &mut [i32],
        n_face: i32,
        n_max_face_nodes: i32,
        fill_value: &mut i32,
    ) -> i32;
    fn get_coordinate_system(&self, ionc_id: i32, epsg: &mut i32) -> i32;
    fn get_var_count(&self, ionc_id: i32, mesh_id: i32, location: i32, n_count: &mut i32) -> i32;
    fn inq_var_id(&self, ionc_id: i32, mesh_id: i32, var_name: &str, var_id: &mut i32) -> i32;
    fn inq_var_id_by_standard_name(
        &self,
        ionc_id: i32,
        mesh_id: i32,
        location: i32,
        standard_name: &str,
        var_id: &mut i32,
    ) -> i32;
    fn inq_var_ids(&self, ionc_id: i32, mesh_id: i32, location: i32, var_ids: &mut [i32]) -> i32;
    fn get_var(
        &self,
        ionc_id: i32,
        mesh_id: i32,
        location: i32,
        var_name: &str,
        values: &mut [f64],
        fill_value: &mut f64,
    ) -> i32;
    fn put_var(
        &self,
        ionc_id: i32,
        mesh_id: i32,
        location: i32,
        var_name: &str,
        values: &[f64],
    ) -> i32;
    #[allow(clippy::too_many_arguments)]
    fn def_var(
        &self,
        ionc_id: i32,
        mesh_id: i32,
        var_id: &mut i32,
        data_type: i32,
        location: i32,
        var_name: &str,
        standard_name: &str,
        long_name: &str,
        unit: &str,
        fill_value: f64,
    ) -> i32;
    fn add_global_attributes(&self, ionc_id: i32, metadata: &InteropMetadata) -> i32;
    fn get_number_of_networks(&self, ionc_id: i32, n_networks: &mut i32) -> i32;
    fn get_number_of_meshes(&self, ionc_id: i32, mesh_type: i32, n_meshes: &mut i32) -> i32;
    fn get_network_ids(&self, ionc_id: i32, network_ids: &mut [i32]) -> i32;
    fn get_mesh_ids(&self, ionc_id: i32, mesh_type: i32, mesh_ids: &mut [i32]) -> i32;
    fn get_network_id_from_mesh_id(&self, ionc_id: i32, mesh_id: i32, network_id: &mut i32)
        -> i32;
    fn write_geom_ugrid(&self, filename: &str) -> i32;
    fn write_map_ugrid(&self, filename: &str) -> i32;
}

/// [`GridWrapper`] backed by the loaded native library.
pub struct IoncWrapper {
    lib: IoncLibrary,
}

unsafe extern "C" fn forward_message(level: c_int, message: *const c_char) {
    if message.is_null() {
        return;
    }
    let text = CStr::from_ptr(message).to_string_lossy();
    match level {
        0 | 1 => info!(target: "ionc", "{text}"),
        2 => warn!(target: "ionc", "{text}"),
        _ => debug!(target: "ionc", "{text}"),
    }
}

unsafe extern "C" fn forward_progress(message: *const c_char, progress: *mut c_double) {
    let fraction = if progress.is_null() { 0.0 } else { *progress };
    if !message.is_null() {
        let text = CStr::from_ptr(message).to_string_lossy();
        debug!(target: "ionc", progress = fraction, "{text}");
    }
}

fn cstring(value: &str) -> Option<CString> {
    CString::new(value).ok()
}

impl IoncWrapper {
    /// Loads the native library and registers the log/progress callbacks.
    pub fn load() -> Result<Self, LoadError> {
        let lib = IoncLibrary::load()?;
        let ierr = unsafe { (lib.ionc_initialize)(forward_message, forward_progress) };
        if ierr != IONC_NOERR {
            warn!(code = ierr, "ionc_initialize reported an error; continuing");
        }
        Ok(Self { lib })
    }

    pub fn from_library(lib: IoncLibrary) -> Self {
        Self { lib }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn def_mesh_contact(
        &self,
        ionc_id: i32,
        contacts_mesh: &mut i32,
        contacts_mesh_name: &str,
        n_contacts: i32,
        mesh1: i32,
        mesh2: i32,
        location_type_1: i32,
        location_type_2: i32,
    ) -> i32 {
        let Some(name) = cstring(contacts_mesh_name) else {
            return GENERAL_FATAL_ERR;
        };
        let (mut id, mut n, mut m1, mut m2, mut l1, mut l2) =
            (ionc_id, n_contacts, mesh1, mesh2, location_type_1, location_type_2);
        unsafe {
            (self.lib.ionc_def_mesh_contact)(
                &mut id,
                contacts_mesh,
                name.as_ptr(),
                &mut n,
                &mut m1,
                &mut m2,
                &mut l1,
                &mut l2,
            )
        }
    }

    pub fn put_mesh_contact(
        &self,
        ionc_id: i32,
        contacts_mesh: i32,
        mesh1_indexes: &[i32],
        mesh2_indexes: &[i32],
        contacts_info: &mut [InteropCharInfo],
    ) -> i32 {
        let (mut id, mut mesh) = (ionc_id, contacts_mesh);
        let mut n = contacts_info.len() as c_int;
        let mut start_index = START_INDEX;
        let mut p1 = mesh1_indexes.as_ptr();
        let mut p2 = mesh2_indexes.as_ptr();
        unsafe {
            (self.lib.ionc_put_mesh_contact)(
                &mut id,
                &mut mesh,
                &mut p1,
                &mut p2,
                contacts_info.as_mut_ptr(),
                &mut n,
                &mut start_index,
            )
        }
    }

    pub fn get_contacts_count(&self, ionc_id: i32, contacts_mesh: i32, n_contacts: &mut i32) -> i32 {
        let (mut id, mut mesh) = (ionc_id, contacts_mesh);
        unsafe { (self.lib.ionc_get_contacts_count)(&mut id, &mut mesh, n_contacts) }
    }

    pub fn get_mesh_contact(
        &self,
        ionc_id: i32,
        contacts_mesh: i32,
        mesh1_indexes: &mut [i32],
        mesh2_indexes: &mut [i32],
        contacts_info: &mut [InteropCharInfo],
    ) -> i32 {
        let (mut id, mut mesh) = (ionc_id, contacts_mesh);
        let mut n = contacts_info.len() as c_int;
        let mut start_index = START_INDEX;
        let mut p1 = mesh1_indexes.as_mut_ptr();
        let mut p2 = mesh2_indexes.as_mut_ptr();
        unsafe {
            (self.lib.ionc_get_mesh_contact)(
                &mut id,
                &mut mesh,
                &mut p1,
                &mut p2,
                contacts_info.as_mut_ptr(),
                &mut n,
                &mut start_index,
            )
        }
    }

    pub fn clone_mesh_definition(
        &self,
        ncid_in: i32,
        ncid_out: i32,
        mesh_id_in: i32,
        mesh_id_out: &mut i32,
    ) -> i32 {
        let (mut nin, mut nout, mut min) = (ncid_in, ncid_out, mesh_id_in);
        unsafe { (self.lib.ionc_clone_mesh_definition)(&mut nin, &mut nout, &mut min, mesh_id_out) }
    }

    pub fn clone_mesh_data(
        &self,
        ncid_in: i32,
        ncid_out: i32,
        mesh_id_in: i32,
        mesh_id_out: &mut i32,
    ) -> i32 {
        let (mut nin, mut nout, mut min) = (ncid_in, ncid_out, mesh_id_in);
        unsafe { (self.lib.ionc_clone_mesh_data)(&mut nin, &mut nout, &mut min, mesh_id_out) }
    }

    pub fn get_meshgeom(
        &self,
        ionc_id: i32,
        mesh_id: i32,
        geom: &mut MeshGeom,
        include_arrays: bool,
    ) -> i32 {
        let (mut id, mut mesh) = (ionc_id, mesh_id);
        let mut include = c_int::from(include_arrays);
        unsafe { (self.lib.ionc_get_meshgeom)(&mut id, &mut mesh, geom, &mut include) }
    }

    pub fn get_meshgeom_dim(&self, ionc_id: i32, mesh_id: i32, dim: &mut MeshGeomDim) -> i32 {
        let (mut id, mut mesh) = (ionc_id, mesh_id);
        unsafe { (self.lib.ionc_get_meshgeom_dim)(&mut id, &mut mesh, dim) }
    }
}

impl GridWrapper for IoncWrapper {
    fn open(
        &self,
        path: &str,
        mode: i32,
        ionc_id: &mut i32,
        conv_type: &mut i32,
        conv_version: &mut f64,
    ) -> i32 {
        let Some(c_path) = cstring(path) else {
            return GENERAL_FATAL_ERR;
        };
        let mut mode = mode;
        unsafe { (self.lib.ionc_open)(c_path.as_ptr(), &mut mode, ionc_id, conv_type, conv_version) }
    }

    fn close(&self, ionc_id: i32) -> i32 {
        let mut id = ionc_id;
        unsafe { (self.lib.ionc_close)(&mut id) }
    }

    fn create(&self, path: &str, mode: i32, ionc_id: &mut i32) -> i32 {
        let Some(c_path) = cstring(path) else {
            return GENERAL_FATAL_ERR;
        };
        let mut mode = mode;
        unsafe { (self.lib.ionc_create)(c_path.as_ptr(), &mut mode, ionc_id) }
    }

    fn adheres_to_conventions(&self, ionc_id: i32, conv_type: i32) -> bool {
        let (mut id, mut conv) = (ionc_id, conv_type);
        unsafe { (self.lib.ionc_adheresto_conventions)(&mut id, &mut conv) != 0 }
    }

    fn inq_conventions(&self, ionc_id: i32, conv_type: &mut i32, conv_version: &mut f64) -> i32 {
        let mut id = ionc_id;
        unsafe { (self.lib.ionc_inq_conventions)(&mut id, conv_type, conv_version) }
    }

    fn get_mesh_count(&self, ionc_id: i32, n_mesh: &mut i32) -> i32 {
        let mut id = ionc_id;
        unsafe { (self.lib.ionc_get_mesh_count)(&mut id, n_mesh) }
    }

    fn get_mesh_name(&self, ionc_id: i32, mesh_id: i32, name: &mut [u8]) -> i32 {
        let (mut id, mut mesh) = (ionc_id, mesh_id);
        unsafe { (self.lib.ionc_get_mesh_name)(&mut id, &mut mesh, name.as_mut_ptr().cast()) }
    }

    fn get_node_count(&self, ionc_id: i32, mesh_id: i32, n_node: &mut i32) -> i32 {
        let (mut id, mut mesh) = (ionc_id, mesh_id);
        unsafe { (self.lib.ionc_get_node_count)(&mut id, &mut mesh, n_node) }
    }

    fn get_edge_count(&self, ionc_id: i32, mesh_id: i32, n_edge: &mut i32) -> i32 {
        let (mut id, mut mesh) = (ionc_id, mesh_id);
        unsafe { (self.lib.ionc_get_edge_count)(&mut id, &mut mesh, n_edge) }
    }

    fn get_face_count(&self, ionc_id: i32, mesh_id: i32, n_face: &mut i32) -> i32 {
        let (mut id, mut mesh) = (ionc_id, mesh_id);
        unsafe { (self.lib.ionc_get_face_count)(&mut id, &mut mesh, n_face) }
    }

    fn get_max_face_nodes(&self, ionc_id: i32, mesh_id: i32, n_max_face_nodes: &mut i32) -> i32 {
        let (mut id, mut mesh) = (ionc_id, mesh_id);
        unsafe { (self.lib.ionc_get_max_face_nodes)(&mut id, &mut mesh, n_max_face_nodes) }
    }

    fn get_node_coordinates(
        &self,
        ionc_id: i32,
        mesh_id: i32,
        x: &mut [f64],
        y: &mut [f64],
    ) -> i32 {
        let (mut id, mut mesh) = (ionc_id, mesh_id);
        let mut n_node = x.len().min(y.len()) as c_int;
        let mut x_ptr = x.as_mut_ptr();
        let mut y_ptr = y.as_mut_ptr();
        unsafe {
            (self.lib.ionc_get_node_coordinates)(&mut id, &mut mesh, &mut x_ptr, &mut y_ptr, &mut n_node)
        }
    }

    fn put_node_coordinates(&self, ionc_id: i32, mesh_id: i32, x: &[f64], y: &[f64]) -> i32 {
        let (mut id, mut mesh) = (ionc_id, mesh_id);
        let mut n_node = x.len().min(y.len()) as c_int;
        let mut x_ptr = x.as_ptr();
        let mut y_ptr = y.as_ptr();
        unsafe {
            (self.lib.ionc_put_node_coordinates)(&mut id, &mut mesh, &mut x_ptr, &mut y_ptr, &mut n_node)
        }
    }

    fn get_edge_nodes(&self, ionc_id: i32, mesh_id: i32, edge_nodes: &mut [i32]) -> i32 {
        let (mut id, mut mesh) = (ionc_id, mesh_id);
        let mut n_edge = (edge_nodes.len() / 2) as c_int;
        let mut start_index = START_INDEX;
        let mut ptr = edge_nodes.as_mut_ptr();
        unsafe {
            (self.lib.ionc_get_edge_nodes)(&mut id, &mut mesh, &mut ptr, &mut n_edge, &mut start_index)
        }
    }

    fn get_face_nodes(
        &self,
        ionc_id: i32,
        mesh_id: i32,
        face_nodes: &mut [i32],
        n_face: i32,
        n_max_face_nodes: i32,
        fill_value: &mut i32,
    ) -> i32 {
        let (mut id, mut mesh) = (ionc_id, mesh_id);
        let (mut n_face, mut n_max) = (n_face, n_max_face_nodes);
        let mut start_index = START_INDEX;
        let mut ptr = face_nodes.as_mut_ptr();
        unsafe {
            (self.lib.ionc_get_face_nodes)(
                &mut id,
                &mut mesh,
                &mut ptr,
                &mut n_face,
                &mut n_max,
                fill_value,
                &mut start_index,
            )
        }
    }

    fn get_coordinate_system(&self, ionc_id: i32, epsg: &mut i32) -> i32 {
        let mut id = ionc_id;
        unsafe { (self.lib.ionc_get_coordinate_system)(&mut id, epsg) }
    }

    fn get_var_count(&self, ionc_id: i32, mesh_id: i32, location: i32, n_count: &mut i32) -> i32 {
        let (mut id, mut mesh, mut loc) = (ionc_id, mesh_id, location);
        unsafe { (self.lib.ionc_get_var_count)(&mut id, &mut mesh, &mut loc, n_count) }
    }

    fn inq_var_id(&self, ionc_id: i32, mesh_id: i32, var_name: &str, var_id: &mut i32) -> i32 {
        let Some(name) = cstring(var_name) else {
            return GENERAL_FATAL_ERR;
        };
        let (mut id, mut mesh) = (ionc_id, mesh_id);
        unsafe { (self.lib.ionc_inq_varid)(&mut id, &mut mesh, name.as_ptr(), var_id) }
    }

    fn inq_var_id_by_standard_name(
        &self,
        ionc_id: i32,
        mesh_id: i32,
        location: i32,
        standard_name: &str,
        var_id: &mut i32,
    ) -> i32 {
        let Some(name) = cstring(standard_name) else {
            return GENERAL_FATAL_ERR;
        };
        let (mut id, mut mesh, mut loc) = (ionc_id, mesh_id, location);
        unsafe {
            (self.lib.ionc_inq_varid_by_standard_name)(&mut id, &mut mesh, &mut loc, name.as_ptr(), var_id)
        }
    }

    fn inq_var_ids(&self, ionc_id: i32, mesh_id: i32, location: i32, var_ids: &mut [i32]) -> i32 {
        let (mut id, mut mesh, mut loc) = (ionc_id, mesh_id, location);
        let mut n_var = var_ids.len() as c_int;
        let mut ptr = var_ids.as_mut_ptr();
        unsafe { (self.lib.ionc_inq_varids)(&mut id, &mut mesh, &mut loc, &mut ptr, &mut n_var) }
    }

    fn get_var(
        &self,
        ionc_id: i32,
        mesh_id: i32,
        location: i32,
        var_name: &str,
        values: &mut [f64],
        fill_value: &mut f64,
    ) -> i32 {
        let Some(name) = cstring(var_name) else {
            return GENERAL_FATAL_ERR;
        };
        let (mut id, mut mesh, mut loc) = (ionc_id, mesh_id, location);
        let mut n_values = values.len() as c_int;
        let mut ptr = values.as_mut_ptr();
        unsafe {
            (self.lib.ionc_get_var)(
                &mut id,
                &mut mesh,
                &mut loc,
                name.as_ptr(),
                &mut ptr,
                &mut n_values,
                fill_value,
            )
        }
    }

    fn put_var(
        &self,
        ionc_id: i32,
        mesh_id: i32,
        location: i32,
        var_name: &str,
        values: &[f64],
    ) -> i32 {
        let Some(name) = cstring(var_name) else {
            return GENERAL_FATAL_ERR;
        };
        let (mut id, mut mesh, mut loc) = (ionc_id, mesh_id, location);
        let mut n_values = values.len() as c_int;
        let mut ptr = values.as_ptr();
        unsafe {
            (self.lib.ionc_put_var)(&mut id, &mut mesh, &mut loc, name.as_ptr(), &mut ptr, &mut n_values)
        }
    }

    fn def_var(
        &self,
        ionc_id: i32,
        mesh_id: i32,
        var_id: &mut i32,
        data_type: i32,
        location: i32,
        var_name: &str,
        standard_name: &str,
        long_name: &str,
        unit: &str,
        fill_value: f64,
    ) -> i32 {
        let (Some(name), Some(standard), Some(long), Some(unit)) = (
            cstring(var_name),
            cstring(standard_name),
            cstring(long_name),
            cstring(unit),
        ) else {
            return GENERAL_FATAL_ERR;
        };
        let (mut id, mut mesh, mut data_type, mut loc) = (ionc_id, mesh_id, data_type, location);
        // The library requires a network id and an integer fill value even
        // though networks are not written through this call.
        let mut network_id = 0;
        let mut fill_value_int = -999;
        let mut fill_value = fill_value;
        unsafe {
            (self.lib.ionc_def_var)(
                &mut id,
                &mut mesh,
                &mut network_id,
                var_id,
                &mut data_type,
                &mut loc,
                name.as_ptr(),
                standard.as_ptr(),
                long.as_ptr(),
                unit.as_ptr(),
                &mut fill_value_int,
                &mut fill_value,
            )
        }
    }

    fn add_global_attributes(&self, ionc_id: i32, metadata: &InteropMetadata) -> i32 {
        let mut id = ionc_id;
        let mut metadata = metadata.clone();
        unsafe { (self.lib.ionc_add_global_attributes)(&mut id, &mut metadata) }
    }

    fn get_number_of_networks(&self, ionc_id: i32, n_networks: &mut i32) -> i32 {
        let mut id = ionc_id;
        unsafe { (self.lib.ionc_get_number_of_networks)(&mut id, n_networks) }
    }

    fn get_number_of_meshes(&self, ionc_id: i32, mesh_type: i32, n_meshes: &mut i32) -> i32 {
        let (mut id, mut mesh_type) = (ionc_id, mesh_type);
        unsafe { (self.lib.ionc_get_number_of_meshes)(&mut id, &mut mesh_type, n_meshes) }
    }

    fn get_network_ids(&self, ionc_id: i32, network_ids: &mut [i32]) -> i32 {
        let mut id = ionc_id;
        let mut n = network_ids.len() as c_int;
        let mut ptr = network_ids.as_mut_ptr();
        unsafe { (self.lib.ionc_get_network_ids)(&mut id, &mut ptr, &mut n) }
    }

    fn get_mesh_ids(&self, ionc_id: i32, mesh_type: i32, mesh_ids: &mut [i32]) -> i32 {
        let (mut id, mut mesh_type) = (ionc_id, mesh_type);
        let mut n = mesh_ids.len() as c_int;
        let mut ptr = mesh_ids.as_mut_ptr();
        unsafe { (self.lib.ionc_ug_get_mesh_ids)(&mut id, &mut mesh_type, &mut ptr, &mut n) }
    }

    fn get_network_id_from_mesh_id(
        &self,
        ionc_id: i32,
        mesh_id: i32,
        network_id: &mut i32,
    ) -> i32 {
        let (mut id, mut mesh) = (ionc_id, mesh_id);
        unsafe { (self.lib.ionc_get_network_id_from_mesh_id)(&mut id, &mut mesh, network_id) }
    }

    fn write_geom_ugrid(&self, filename: &str) -> i32 {
        let Some(name) = cstring(filename) else {
            return GENERAL_FATAL_ERR;
        };
        unsafe { (self.lib.ionc_write_geom_ugrid)(name.as_ptr()) }
    }

    fn write_map_ugrid(&self, filename: &str) -> i32 {
        let Some(name) = cstring(filename) else {
            return GENERAL_FATAL_ERR;
        };
        unsafe { (self.lib.ionc_write_map_ugrid)(name.as_ptr()) }
    }
}
