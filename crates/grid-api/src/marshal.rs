//! Helpers for moving data between native buffer layouts and Rust types.

use nalgebra::DMatrix;

/// Rebuilds a 2D connectivity table from the flat row-major buffer the
/// native library fills: `out[(i, j)] == flat[i * cols + j]`.
///
/// The buffer must hold exactly `rows * cols` entries.
pub fn reshape_connectivity(flat: &[i32], rows: usize, cols: usize) -> DMatrix<i32> {
    debug_assert_eq!(flat.len(), rows * cols);
    DMatrix::from_row_iterator(rows, cols, flat.iter().copied())
}

/// Reads a native fixed-width name buffer into a `String`: stops at the
/// first NUL and trims the Fortran space padding.
pub fn string_from_fixed(buf: &[u8]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).trim_end().to_string()
}
