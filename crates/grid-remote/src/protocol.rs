//! Line-delimited JSON protocol between the proxy and the host process.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use grid_api::constants::NOERR;
use grid_api::{ErrorCode, GridResult, LocationType, OpenMode, UGridGlobalMetaData, UGridMeshType};

/// One operation forwarded to the host. Variants map one-to-one onto the
/// [`grid_api::GridApi`]/[`grid_api::UGridApi`] surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Request {
    Initialized,
    Open { path: String, mode: OpenMode },
    Close,
    CreateFile { path: String, metadata: UGridGlobalMetaData, mode: OpenMode },
    Convention,
    Version,
    ProbeConvention { path: String },
    MeshCount,
    CoordinateSystemCode,
    ZFillValue,
    SetZFillValue { value: f64 },
    MeshesByType { mesh_type: UGridMeshType },
    MeshIds { mesh_type: UGridMeshType },
    NetworkCount,
    NetworkIds,
    NodeCount { mesh_id: i32 },
    EdgeCount { mesh_id: i32 },
    FaceCount { mesh_id: i32 },
    MaxFaceNodes { mesh_id: i32 },
    NodeXCoordinates { mesh_id: i32 },
    NodeYCoordinates { mesh_id: i32 },
    NodeZCoordinates { mesh_id: i32 },
    EdgeNodes { mesh_id: i32 },
    FaceNodes { mesh_id: i32 },
    WriteXyCoordinates { mesh_id: i32, xs: Vec<f64>, ys: Vec<f64> },
    WriteZCoordinates {
        mesh_id: i32,
        location: LocationType,
        var_name: String,
        long_name: String,
        values: Vec<f64>,
    },
    ReadZCoordinates { mesh_id: i32, location: LocationType, var_name: String },
    MeshName { mesh_id: i32 },
    VarCount { mesh_id: i32, location: LocationType },
    VarIds { mesh_id: i32, location: LocationType },
    WriteGeomUgrid { path: String },
    WriteMapUgrid { path: String },
    Shutdown,
}

/// Reply to one request: the native status code plus an optional payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub code: i32,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub value: Value,
}

impl Response {
    pub fn ok() -> Self {
        Self { code: NOERR, value: Value::Null }
    }

    pub fn error(code: i32) -> Self {
        Self { code, value: Value::Null }
    }

    pub fn with_value<T: Serialize>(value: &T) -> Self {
        Self {
            code: NOERR,
            value: serde_json::to_value(value).unwrap_or(Value::Null),
        }
    }

    pub fn from_result<T: Serialize>(result: GridResult<T>) -> Self {
        match result {
            Ok(value) => Self::with_value(&value),
            Err(ErrorCode(code)) => Self::error(code),
        }
    }
}

/// Row-major connectivity table as it travels over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectivityTable {
    pub rows: usize,
    pub cols: usize,
    pub values: Vec<i32>,
}

impl From<&DMatrix<i32>> for ConnectivityTable {
    fn from(matrix: &DMatrix<i32>) -> Self {
        let mut values = Vec::with_capacity(matrix.nrows() * matrix.ncols());
        for row in matrix.row_iter() {
            values.extend(row.iter().copied());
        }
        Self {
            rows: matrix.nrows(),
            cols: matrix.ncols(),
            values,
        }
    }
}

impl ConnectivityTable {
    pub fn into_matrix(self) -> DMatrix<i32> {
        DMatrix::from_row_iterator(self.rows, self.cols, self.values)
    }
}
