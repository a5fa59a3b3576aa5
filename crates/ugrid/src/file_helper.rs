//! Whole-file helper operations branching on the detected convention.
//!
//! Every entry point here follows the same shape: detect the convention of
//! the file, take the UGRID path through [`UGrid`] or the legacy path
//! through [`crate::netfile`], and never leave a dataset handle open.

use std::path::Path;

use tracing::warn;

use grid_api::constants::UG_CONV_MIN_VERSION;
use grid_api::{DataSetConvention, OpenMode, UGridGlobalMetaData};

use crate::error::Result;
use crate::factory::create_api;
use crate::netfile;
use crate::spatial::CoordinateSystem;
use crate::ugrid::UGrid;

/// Where bed-level values live in a grid file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BedLevelLocation {
    Faces = 1,
    CellEdges = 2,
    NodesMeanLev = 3,
    NodesMinLev = 4,
    NodesMaxLev = 5,
    FacesMeanLevFromNodes = 6,
}

/// Detects the convention of the file at `path`. `Null` when no grid API
/// can be created on this machine.
pub fn get_convention(path: impl AsRef<Path>) -> DataSetConvention {
    match create_api() {
        None => DataSetConvention::Null,
        Some(mut api) => api.probe_convention(&path.as_ref().to_string_lossy()),
    }
}

/// Reads bed-level values at the requested location. Non-UGRID files and
/// unsupported locations yield an empty result with a warning, matching the
/// tolerant behavior callers rely on during imports.
pub fn read_z_values(path: impl AsRef<Path>, location: BedLevelLocation) -> Result<Vec<f64>> {
    let path = path.as_ref();
    match get_convention(path) {
        DataSetConvention::Ugrid => {
            let mut ugrid = UGrid::new(path);
            match location {
                BedLevelLocation::Faces | BedLevelLocation::FacesMeanLevFromNodes => {
                    ugrid.read_z_values_at_faces_for_mesh_id(1)
                }
                BedLevelLocation::CellEdges => {
                    warn!("Unable to read z values at this location: cell edges are not supported");
                    Ok(Vec::new())
                }
                BedLevelLocation::NodesMeanLev
                | BedLevelLocation::NodesMinLev
                | BedLevelLocation::NodesMaxLev => ugrid.read_z_values_at_nodes_for_mesh_id(1),
            }
        }
        _ => {
            warn!(
                path = %path.display(),
                "Unable to read z values, file is not UGrid convention"
            );
            Ok(Vec::new())
        }
    }
}

/// Writes bed-level values at the requested location, taking the UGRID or
/// legacy path as the file dictates.
pub fn write_z_values(
    path: impl AsRef<Path>,
    location: BedLevelLocation,
    values: &[f64],
) -> Result<()> {
    let path = path.as_ref();
    match get_convention(path) {
        DataSetConvention::Ugrid => {
            let mut ugrid = UGrid::with_open_mode(path, OpenMode::ReadWrite);
            match location {
                BedLevelLocation::Faces | BedLevelLocation::FacesMeanLevFromNodes => {
                    ugrid.write_z_values_at_faces_for_mesh_id(1, values)
                }
                BedLevelLocation::CellEdges => {
                    warn!("Unable to write z values at this location: cell edges are not supported");
                    Ok(())
                }
                BedLevelLocation::NodesMeanLev
                | BedLevelLocation::NodesMinLev
                | BedLevelLocation::NodesMaxLev => {
                    ugrid.write_z_values_at_nodes_for_mesh_id(1, values)
                }
            }
        }
        DataSetConvention::Other => netfile::write_z_values(path, values),
        _ => Ok(()),
    }
}

/// Reads the coordinate system of a grid file on either path.
pub fn get_coordinate_system(path: impl AsRef<Path>) -> Result<Option<CoordinateSystem>> {
    let path = path.as_ref();
    match get_convention(path) {
        DataSetConvention::Ugrid => {
            let mut ugrid = UGrid::new(path);
            if !ugrid.is_initialized() {
                ugrid.initialize()?;
            }
            Ok(ugrid.coordinate_system().cloned())
        }
        DataSetConvention::Other => netfile::read_coordinate_system(path),
        _ => Ok(None),
    }
}

/// Sets the coordinate system. On the UGRID path the node-Z variable's
/// `grid_mapping` attribute must be updated along with the system itself.
pub fn set_coordinate_system(path: impl AsRef<Path>, cs: &CoordinateSystem) -> Result<()> {
    let path = path.as_ref();
    let convention = get_convention(path);
    if convention == DataSetConvention::Null {
        return Ok(());
    }

    if convention == DataSetConvention::Ugrid {
        let mesh_name = {
            let mut ugrid = UGrid::new(path);
            ugrid.get_mesh_name(1)?
        };
        if mesh_name.is_empty() {
            return Ok(());
        }

        let node_z_name = format!("{mesh_name}_node_z");
        let mut file = netcdf::append(path)?;
        match file.variable_mut(&node_z_name) {
            Some(mut variable) => {
                variable
                    .add_attribute("grid_mapping", netfile::PROJECTED_SLOT.to_string())?;
            }
            None => return Ok(()),
        }
    }

    netfile::write_coordinate_system(path, cs)
}

/// Writes `new_cs` into the file's coordinate-system slots, skipping writes
/// that would change nothing. `write_null_coordinate_system` forces an
/// EPSG 0 record when `new_cs` is `None`.
pub fn write_coordinate_system_to_file(
    path: impl AsRef<Path>,
    new_cs: Option<&CoordinateSystem>,
    write_null_coordinate_system: bool,
) -> Result<()> {
    let path = path.as_ref();
    let (has_cs, current) = file_contains_coordinate_system(path)?;

    if new_cs.is_none() && !write_null_coordinate_system {
        return Ok(());
    }
    if has_cs && current.is_none() && new_cs.is_none() {
        // A null system is already on file.
        return Ok(());
    }
    if let (Some(current), Some(new)) = (&current, new_cs) {
        if has_cs && current.epsg == new.epsg {
            return Ok(());
        }
    }

    sync_coordinate_slots(path, current.as_ref(), new_cs)
}

/// The dual-slot rule: a grid file may carry both a `wgs84` and a
/// `projected_coordinate_system` variable, and variables cannot be removed
/// from an existing NetCDF file. Whenever the geographic/projected kind is
/// involved on either side of the transition, the corresponding slot is
/// rewritten with the new system so the two never disagree. Neither slot is
/// ever deleted.
pub fn sync_coordinate_slots(
    path: impl AsRef<Path>,
    current: Option<&CoordinateSystem>,
    new_cs: Option<&CoordinateSystem>,
) -> Result<()> {
    let mut file = netcdf::append(&path)?;

    if current.is_some_and(|c| c.is_geographic) || new_cs.is_some_and(|c| c.is_geographic) {
        netfile::write_coordinate_slot(&mut file, netfile::GEOGRAPHIC_SLOT, new_cs)?;
    }

    if new_cs.map_or(true, |c| !c.is_geographic) || current.is_some_and(|c| !c.is_geographic) {
        netfile::write_coordinate_slot(&mut file, netfile::PROJECTED_SLOT, new_cs)?;
    }

    Ok(())
}

/// Whether the file defines either coordinate-system slot, along with the
/// system currently readable from it (`None` may mean an EPSG 0 record).
pub fn file_contains_coordinate_system(
    path: impl AsRef<Path>,
) -> Result<(bool, Option<CoordinateSystem>)> {
    let path = path.as_ref();
    let has_slot = {
        let file = netcdf::open(path)?;
        file.variable(netfile::GEOGRAPHIC_SLOT).is_some()
            || file.variable(netfile::PROJECTED_SLOT).is_some()
    };
    let current = netfile::read_coordinate_system(path)?;
    Ok((has_slot, current))
}

/// Creates a new grid file containing only the UGRID global metadata.
pub fn write_empty_unstructured_grid_file(path: impl AsRef<Path>) -> Result<()> {
    let metadata = UGridGlobalMetaData::new(
        "Unknown model",
        "ugrid-io",
        UG_CONV_MIN_VERSION.to_string(),
    );
    let mut ugrid = UGrid::with_metadata(path, metadata);
    ugrid.create_file()
}

/// Rewrites the node coordinates of the first mesh (UGRID) or the legacy
/// coordinate variables.
pub fn rewrite_grid_coordinates(path: impl AsRef<Path>, xs: &[f64], ys: &[f64]) -> Result<()> {
    let path = path.as_ref();
    match get_convention(path) {
        DataSetConvention::Ugrid => {
            let mut ugrid = UGrid::with_open_mode(path, OpenMode::ReadWrite);
            ugrid.rewrite_grid_coordinates_for_mesh_id(1, xs, ys)
        }
        DataSetConvention::Other => netfile::write_xy_values(path, xs, ys),
        _ => Ok(()),
    }
}

/// Runs `action` against the file only when it is a UGRID dataset.
pub fn do_if_ugrid(
    path: impl AsRef<Path>,
    action: impl FnOnce(&mut UGrid) -> Result<()>,
) -> Result<()> {
    let path = path.as_ref();
    if get_convention(path) != DataSetConvention::Ugrid {
        return Ok(());
    }
    let mut ugrid = UGrid::new(path);
    action(&mut ugrid)
}
