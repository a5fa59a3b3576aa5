//! Raw C ABI surface of the io_netcdf library.
//!
//! Every entry point is C-decl and passes scalars by pointer (the library is
//! Fortran underneath). Character buffers crossing the boundary are fixed
//! width: 100 chars for global metadata fields, 40 for ids, 80 for long
//! names. Booleans travel as 4-byte integers.

use std::os::raw::{c_char, c_double, c_int};

/// Status code the native library returns on success.
pub const IONC_NOERR: c_int = 0;
/// Generic fatal failure; also the code every wrapper layer reports when a
/// call cannot even reach the native library.
pub const GENERAL_FATAL_ERR: c_int = -1000;
/// An array argument did not have the length the operation requires.
pub const GENERAL_ARRAY_LENGTH_FATAL_ERR: c_int = -1001;

/// Width of one global-metadata character field.
pub const METADATA_SIZE: usize = 100;
/// Width of an id field in a char-info record.
pub const IDS_SIZE: usize = 40;
/// Width of a long-name field in a char-info record.
pub const LONG_NAMES_SIZE: usize = 80;
/// Maximum length of a name buffer (mesh names and the like).
pub const MAXSTRLEN: usize = 255;

/// Global attributes written once at file creation, fixed-width padded.
#[repr(C)]
#[derive(Clone)]
pub struct InteropMetadata {
    pub institution: [c_char; METADATA_SIZE],
    pub source: [c_char; METADATA_SIZE],
    pub references: [c_char; METADATA_SIZE],
    pub version: [c_char; METADATA_SIZE],
    pub modelname: [c_char; METADATA_SIZE],
}

/// Id/long-name pair as the contacts calls expect them.
#[repr(C)]
#[derive(Clone)]
pub struct InteropCharInfo {
    pub ids: [c_char; IDS_SIZE],
    pub longnames: [c_char; LONG_NAMES_SIZE],
}

/// Pointer table filled by `ionc_get_meshgeom`. The native side owns the
/// memory behind these pointers; they are valid until the dataset closes.
#[repr(C)]
pub struct MeshGeom {
    pub edge_nodes: *mut c_int,
    pub face_nodes: *mut c_int,
    pub edge_faces: *mut c_int,
    pub face_edges: *mut c_int,
    pub face_links: *mut c_int,

    pub branchids: *mut c_int,
    pub nbranchgeometrynodes: *mut c_int,
    pub nedge_nodes: *mut c_int,

    pub nodex: *mut c_double,
    pub nodey: *mut c_double,
    pub nodez: *mut c_double,
    pub edgex: *mut c_double,
    pub edgey: *mut c_double,
    pub edgez: *mut c_double,
    pub facex: *mut c_double,
    pub facey: *mut c_double,
    pub facez: *mut c_double,

    pub branchoffsets: *mut c_double,
    pub geopointsx: *mut c_double,
    pub geopointsy: *mut c_double,
    pub branchlengths: *mut c_double,

    pub layer_zs: *mut c_double,
    pub interface_zs: *mut c_double,
}

impl Default for MeshGeom {
    fn default() -> Self {
        // A zeroed pointer table; the native call fills the slots it knows.
        unsafe { std::mem::zeroed() }
    }
}

/// Dimensions record filled by `ionc_get_meshgeom_dim`.
#[repr(C)]
pub struct MeshGeomDim {
    pub meshname: [c_char; MAXSTRLEN],
    pub dim: c_int,
    pub numnode: c_int,
    pub numedge: c_int,
    pub numface: c_int,
    pub maxnumfacenodes: c_int,
    pub numlayer: c_int,
    pub layertype: c_int,
    pub nt_nbranches: c_int,
    pub nt_ngeometry: c_int,
}

impl Default for MeshGeomDim {
    fn default() -> Self {
        unsafe { std::mem::zeroed() }
    }
}

/// Log-message callback the library invokes during long operations.
pub type MessageCallback = unsafe extern "C" fn(level: c_int, message: *const c_char);
/// Progress callback; `progress` is a fraction in [0, 1].
pub type ProgressCallback = unsafe extern "C" fn(message: *const c_char, progress: *mut c_double);

pub type IoncOpenFn = unsafe extern "C" fn(
    c_path: *const c_char,
    mode: *mut c_int,
    ioncid: *mut c_int,
    iconvtype: *mut c_int,
    convversion: *mut c_double,
) -> c_int;

pub type IoncCloseFn = unsafe extern "C" fn(ioncid: *mut c_int) -> c_int;

pub type IoncCreateFn =
    unsafe extern "C" fn(c_path: *const c_char, mode: *mut c_int, ioncid: *mut c_int) -> c_int;

pub type IoncAdherestoConventionsFn =
    unsafe extern "C" fn(ioncid: *mut c_int, iconvtype: *mut c_int) -> c_int;

pub type IoncInqConventionsFn = unsafe extern "C" fn(
    ioncid: *mut c_int,
    iconvtype: *mut c_int,
    convversion: *mut c_double,
) -> c_int;

pub type IoncGetMeshCountFn = unsafe extern "C" fn(ioncid: *mut c_int, nmesh: *mut c_int) -> c_int;

pub type IoncGetMeshNameFn =
    unsafe extern "C" fn(ioncid: *mut c_int, meshid: *mut c_int, meshname: *mut c_char) -> c_int;

pub type IoncGetCountFn =
    unsafe extern "C" fn(ioncid: *mut c_int, meshid: *mut c_int, count: *mut c_int) -> c_int;

pub type IoncGetNodeCoordinatesFn = unsafe extern "C" fn(
    ioncid: *mut c_int,
    meshid: *mut c_int,
    c_xptr: *mut *mut c_double,
    c_yptr: *mut *mut c_double,
    nnode: *mut c_int,
) -> c_int;

pub type IoncPutNodeCoordinatesFn = unsafe extern "C" fn(
    ioncid: *mut c_int,
    meshid: *mut c_int,
    c_xvalues_ptr: *mut *const c_double,
    c_yvalues_ptr: *mut *const c_double,
    nnode: *mut c_int,
) -> c_int;

pub type IoncGetEdgeNodesFn = unsafe extern "C" fn(
    ioncid: *mut c_int,
    meshid: *mut c_int,
    c_edge_nodes_ptr: *mut *mut c_int,
    nedge: *mut c_int,
    start_index: *mut c_int,
) -> c_int;

pub type IoncGetFaceNodesFn = unsafe extern "C" fn(
    ioncid: *mut c_int,
    meshid: *mut c_int,
    c_face_nodes_ptr: *mut *mut c_int,
    nface: *mut c_int,
    nmaxfacenodes: *mut c_int,
    fillvalue: *mut c_int,
    start_index: *mut c_int,
) -> c_int;

pub type IoncGetCoordinateSystemFn =
    unsafe extern "C" fn(ioncid: *mut c_int, epsg: *mut c_int) -> c_int;

pub type IoncGetVarCountFn = unsafe extern "C" fn(
    ioncid: *mut c_int,
    meshid: *mut c_int,
    location: *mut c_int,
    ncount: *mut c_int,
) -> c_int;

pub type IoncInqVarIdFn = unsafe extern "C" fn(
    ioncid: *mut c_int,
    meshid: *mut c_int,
    varname: *const c_char,
    varid: *mut c_int,
) -> c_int;

pub type IoncInqVarIdByStandardNameFn = unsafe extern "C" fn(
    ioncid: *mut c_int,
    meshid: *mut c_int,
    location: *mut c_int,
    standard_name: *const c_char,
    varid: *mut c_int,
) -> c_int;

pub type IoncInqVarIdsFn = unsafe extern "C" fn(
    ioncid: *mut c_int,
    meshid: *mut c_int,
    location: *mut c_int,
    ptr: *mut *mut c_int,
    nvar: *mut c_int,
) -> c_int;

pub type IoncGetVarFn = unsafe extern "C" fn(
    ioncid: *mut c_int,
    meshid: *mut c_int,
    location: *mut c_int,
    varname: *const c_char,
    c_zptr: *mut *mut c_double,
    nvalues: *mut c_int,
    c_fillvalue: *mut c_double,
) -> c_int;

pub type IoncPutVarFn = unsafe extern "C" fn(
    ioncid: *mut c_int,
    meshid: *mut c_int,
    iloctype: *mut c_int,
    c_varname: *const c_char,
    c_values_ptr: *mut *const c_double,
    nvalues: *mut c_int,
) -> c_int;

pub type IoncDefVarFn = unsafe extern "C" fn(
    ioncid: *mut c_int,
    meshid: *mut c_int,
    networkid: *mut c_int,
    varid: *mut c_int,
    datatype: *mut c_int,
    loctype: *mut c_int,
    varname: *const c_char,
    standard_name: *const c_char,
    long_name: *const c_char,
    unit: *const c_char,
    fill_value_int: *mut c_int,
    fill_value: *mut c_double,
) -> c_int;

pub type IoncAddGlobalAttributesFn =
    unsafe extern "C" fn(ioncid: *mut c_int, metadata: *mut InteropMetadata) -> c_int;

pub type IoncInitializeFn =
    unsafe extern "C" fn(message_callback: MessageCallback, progress_callback: ProgressCallback) -> c_int;

pub type IoncWritePathFn = unsafe extern "C" fn(filename: *const c_char) -> c_int;

pub type IoncDefMeshContactFn = unsafe extern "C" fn(
    ioncid: *mut c_int,
    contactsmesh: *mut c_int,
    contactsmeshname: *const c_char,
    ncontacts: *mut c_int,
    mesh1: *mut c_int,
    mesh2: *mut c_int,
    location_type_1: *mut c_int,
    location_type_2: *mut c_int,
) -> c_int;

pub type IoncPutMeshContactFn = unsafe extern "C" fn(
    ioncid: *mut c_int,
    contactsmesh: *mut c_int,
    c_mesh1indexes: *mut *const c_int,
    c_mesh2indexes: *mut *const c_int,
    contactsinfo: *mut InteropCharInfo,
    ncontacts: *mut c_int,
    start_index: *mut c_int,
) -> c_int;

pub type IoncGetContactsCountFn = unsafe extern "C" fn(
    ioncid: *mut c_int,
    contactsmesh: *mut c_int,
    ncontacts: *mut c_int,
) -> c_int;

pub type IoncGetMeshContactFn = unsafe extern "C" fn(
    ioncid: *mut c_int,
    contactsmesh: *mut c_int,
    c_mesh1indexes: *mut *mut c_int,
    c_mesh2indexes: *mut *mut c_int,
    contactsinfo: *mut InteropCharInfo,
    ncontacts: *mut c_int,
    start_index: *mut c_int,
) -> c_int;

pub type IoncCloneMeshFn = unsafe extern "C" fn(
    ncidin: *mut c_int,
    ncidout: *mut c_int,
    meshidin: *mut c_int,
    meshidout: *mut c_int,
) -> c_int;

pub type IoncGetNumberOfNetworksFn =
    unsafe extern "C" fn(ioncid: *mut c_int, nnetworks: *mut c_int) -> c_int;

pub type IoncGetNumberOfMeshesFn = unsafe extern "C" fn(
    ioncid: *mut c_int,
    meshtype: *mut c_int,
    nmeshes: *mut c_int,
) -> c_int;

pub type IoncGetNetworkIdsFn = unsafe extern "C" fn(
    ioncid: *mut c_int,
    c_networkids: *mut *mut c_int,
    nnetworks: *mut c_int,
) -> c_int;

pub type IoncUgGetMeshIdsFn = unsafe extern "C" fn(
    ioncid: *mut c_int,
    meshtype: *mut c_int,
    c_meshids: *mut *mut c_int,
    nmeshes: *mut c_int,
) -> c_int;

pub type IoncGetNetworkIdFromMeshIdFn = unsafe extern "C" fn(
    ioncid: *mut c_int,
    meshid: *mut c_int,
    networkid: *mut c_int,
) -> c_int;

pub type IoncGetMeshGeomFn = unsafe extern "C" fn(
    ioncid: *mut c_int,
    meshid: *mut c_int,
    meshgeom: *mut MeshGeom,
    include_arrays: *mut c_int,
) -> c_int;

pub type IoncGetMeshGeomDimFn = unsafe extern "C" fn(
    ioncid: *mut c_int,
    meshid: *mut c_int,
    meshgeomdim: *mut MeshGeomDim,
) -> c_int;

/// Pads a Rust string into a space-padded fixed-width char field, the layout
/// the Fortran side expects. Overlong input is truncated.
pub fn pad_fixed<const N: usize>(value: &str) -> [c_char; N] {
    let mut out = [b' ' as c_char; N];
    for (slot, byte) in out.iter_mut().zip(value.bytes()) {
        *slot = byte as c_char;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem;

    #[test]
    fn interop_metadata_is_five_fixed_fields() {
        assert_eq!(mem::size_of::<InteropMetadata>(), 5 * METADATA_SIZE);
    }

    #[test]
    fn interop_char_info_matches_id_and_longname_widths() {
        assert_eq!(mem::size_of::<InteropCharInfo>(), IDS_SIZE + LONG_NAMES_SIZE);
    }

    #[test]
    fn pad_fixed_space_pads_and_truncates() {
        let padded = pad_fixed::<8>("grid");
        assert_eq!(padded[..4], [b'g' as c_char, b'r' as c_char, b'i' as c_char, b'd' as c_char]);
        assert!(padded[4..].iter().all(|&c| c == b' ' as c_char));

        let truncated = pad_fixed::<3>("mesh2d");
        assert_eq!(
            truncated,
            [b'm' as c_char, b'e' as c_char, b's' as c_char]
        );
    }
}
