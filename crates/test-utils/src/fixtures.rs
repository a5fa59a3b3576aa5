//! Small well-known meshes for scenario tests.

use nalgebra::DMatrix;

/// A single quad: 4 nodes, 4 edges, 1 face.
pub struct UnitSquareMesh {
    pub node_x: Vec<f64>,
    pub node_y: Vec<f64>,
    pub node_z: Vec<f64>,
    pub edge_nodes: DMatrix<i32>,
    pub face_nodes: DMatrix<i32>,
}

pub fn unit_square() -> UnitSquareMesh {
    UnitSquareMesh {
        node_x: vec![0.0, 1.0, 1.0, 0.0],
        node_y: vec![0.0, 0.0, 1.0, 1.0],
        node_z: vec![-1.0, -2.0, -3.0, -4.0],
        edge_nodes: DMatrix::from_row_iterator(4, 2, [0, 1, 1, 2, 2, 3, 3, 0]),
        face_nodes: DMatrix::from_row_iterator(1, 4, [0, 1, 2, 3]),
    }
}

/// Scratch path for a NetCDF file inside a fresh temp directory. The
/// directory guard must stay alive for as long as the file is used.
pub fn temp_nc_path(name: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join(name);
    (dir, path)
}
