//! Legacy _net.nc access through the netcdf library.
//!
//! Pre-UGRID grid files store node data in flat `NetNode_*` variables with
//! no mesh topology object. The native kernel does not read them; this
//! module covers the few operations the helpers need on that path.

use std::path::Path;

use crate::error::{GridApiError, Result};
use crate::spatial::CoordinateSystem;

pub const NET_NODE_X: &str = "NetNode_x";
pub const NET_NODE_Y: &str = "NetNode_y";
pub const NET_NODE_Z: &str = "NetNode_z";
const NET_NODE_DIM: &str = "nNetNode";

/// The coordinate-system variable slots a grid file may carry. Both can be
/// present at once; see `file_helper::sync_coordinate_slots`.
pub const GEOGRAPHIC_SLOT: &str = "wgs84";
pub const PROJECTED_SLOT: &str = "projected_coordinate_system";

pub fn read_z_values(path: impl AsRef<Path>) -> Result<Vec<f64>> {
    let path = path.as_ref();
    let file = netcdf::open(path)?;
    let variable = file.variable(NET_NODE_Z).ok_or_else(|| {
        GridApiError::unavailable(format!("No {NET_NODE_Z} variable in {}", path.display()))
    })?;
    Ok(variable.get_values(..)?)
}

pub fn write_z_values(path: impl AsRef<Path>, values: &[f64]) -> Result<()> {
    let mut file = netcdf::append(&path)?;
    ensure_node_variable(&mut file, NET_NODE_Z, values.len())?;
    let mut variable = file
        .variable_mut(NET_NODE_Z)
        .ok_or_else(|| GridApiError::unavailable(format!("{NET_NODE_Z} missing after definition")))?;
    variable.put_values(values, ..)?;
    Ok(())
}

/// Rewrites the node X/Y coordinate variables of a legacy file.
pub fn write_xy_values(path: impl AsRef<Path>, xs: &[f64], ys: &[f64]) -> Result<()> {
    let mut file = netcdf::append(&path)?;
    ensure_node_variable(&mut file, NET_NODE_X, xs.len())?;
    ensure_node_variable(&mut file, NET_NODE_Y, ys.len())?;
    for (name, values) in [(NET_NODE_X, xs), (NET_NODE_Y, ys)] {
        let mut variable = file.variable_mut(name).ok_or_else(|| {
            GridApiError::unavailable(format!("{name} missing after definition"))
        })?;
        variable.put_values(values, ..)?;
    }
    Ok(())
}

/// Reads the coordinate system from whichever slot the file carries,
/// preferring the projected one. `Ok(None)` means an EPSG 0 / absent system.
pub fn read_coordinate_system(path: impl AsRef<Path>) -> Result<Option<CoordinateSystem>> {
    let file = netcdf::open(&path)?;
    for slot in [PROJECTED_SLOT, GEOGRAPHIC_SLOT] {
        if let Some(variable) = file.variable(slot) {
            let code = attr_i32(&variable, "epsg").unwrap_or(0);
            return Ok(CoordinateSystem::from_epsg(code));
        }
    }
    Ok(None)
}

/// Writes the coordinate system into the slot matching its kind.
pub fn write_coordinate_system(path: impl AsRef<Path>, cs: &CoordinateSystem) -> Result<()> {
    let mut file = netcdf::append(&path)?;
    let slot = if cs.is_geographic {
        GEOGRAPHIC_SLOT
    } else {
        PROJECTED_SLOT
    };
    write_coordinate_slot(&mut file, slot, Some(cs))
}

/// Writes the full coordinate-system attribute set onto one slot variable,
/// creating the scalar variable when absent. `None` writes the "unknown"
/// record with EPSG 0.
pub(crate) fn write_coordinate_slot(
    file: &mut netcdf::FileMut,
    slot: &str,
    cs: Option<&CoordinateSystem>,
) -> Result<()> {
    if file.variable_mut(slot).is_none() {
        file.add_variable::<i32>(slot, &[])?;
    }
    let mut variable = file
        .variable_mut(slot)
        .ok_or_else(|| GridApiError::unavailable(format!("{slot} missing after definition")))?;

    let epsg = cs.map_or(0, |c| c.epsg);
    variable.add_attribute(
        "name",
        cs.map_or_else(|| "Unknown projected".to_string(), |c| c.name.clone()),
    )?;
    variable.add_attribute("epsg", epsg)?;
    variable.add_attribute(
        "grid_mapping_name",
        if cs.is_some_and(|c| c.is_geographic) {
            "latitude_longitude".to_string()
        } else {
            "Unknown projected".to_string()
        },
    )?;
    variable.add_attribute("longitude_of_prime_meridian", 0.0)?;
    variable.add_attribute("semi_major_axis", cs.map_or(6378137.0, |c| c.semi_major_axis))?;
    variable.add_attribute(
        "semi_minor_axis",
        cs.map_or(6356752.314245, |c| c.semi_minor_axis),
    )?;
    variable.add_attribute(
        "inverse_flattening",
        cs.map_or(298.257223563, |c| c.inverse_flattening),
    )?;
    if let Some(proj4) = cs.and_then(|c| c.proj4.clone()) {
        variable.add_attribute("proj4_params", proj4)?;
    }
    variable.add_attribute("EPSG_code", format!("EPSG:{epsg}"))?;
    if let Some(cs) = cs {
        variable.add_attribute("projection_name", "unknown".to_string())?;
        if let Some(wkt) = cs.wkt.clone() {
            variable.add_attribute("wkt", wkt)?;
        }
    }
    Ok(())
}

fn ensure_node_variable(file: &mut netcdf::FileMut, name: &str, len: usize) -> Result<()> {
    if file.variable_mut(name).is_some() {
        return Ok(());
    }
    if file.dimension(NET_NODE_DIM).is_none() {
        file.add_dimension(NET_NODE_DIM, len)?;
    }
    file.add_variable::<f64>(name, &[NET_NODE_DIM])?;
    Ok(())
}

fn attr_i32(variable: &netcdf::Variable, name: &str) -> Option<i32> {
    // Checking for presence first avoids the noisy HDF5 error output on
    // missing attributes.
    if !variable.attributes().any(|attr| attr.name() == name) {
        return None;
    }
    let value = variable.attribute_value(name)?.ok()?;
    i32::try_from(value).ok()
}
