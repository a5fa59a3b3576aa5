//! Request dispatch and the serve loop.

use std::io::{BufRead, Write};

use anyhow::Result;
use tracing::{debug, warn};

use grid_api::constants::GENERAL_FATAL_ERR;
use grid_api::{GridApi, UGridApi};
use grid_remote::protocol::{ConnectivityTable, Request, Response};

/// Maps one request onto the API and packs the outcome.
pub fn dispatch<A: UGridApi>(api: &mut A, request: Request) -> Response {
    match request {
        Request::Initialized => Response::with_value(&api.initialized()),
        Request::Open { path, mode } => Response::from_result(api.open(&path, mode)),
        Request::Close => Response::from_result(api.close()),
        Request::CreateFile { path, metadata, mode } => {
            Response::from_result(api.create_file(&path, &metadata, mode))
        }
        Request::Convention => Response::with_value(&api.convention()),
        Request::Version => Response::with_value(&api.version()),
        Request::ProbeConvention { path } => Response::with_value(&api.probe_convention(&path)),
        Request::MeshCount => Response::from_result(api.mesh_count()),
        Request::CoordinateSystemCode => Response::from_result(api.coordinate_system_code()),
        Request::ZFillValue => Response::with_value(&api.z_coordinate_fill_value()),
        Request::SetZFillValue { value } => {
            api.set_z_coordinate_fill_value(value);
            Response::ok()
        }
        Request::MeshesByType { mesh_type } => {
            Response::from_result(api.number_of_meshes_by_type(mesh_type))
        }
        Request::MeshIds { mesh_type } => Response::from_result(api.mesh_ids(mesh_type)),
        Request::NetworkCount => Response::from_result(api.number_of_networks()),
        Request::NetworkIds => Response::from_result(api.network_ids()),
        Request::NodeCount { mesh_id } => Response::from_result(api.number_of_nodes(mesh_id)),
        Request::EdgeCount { mesh_id } => Response::from_result(api.number_of_edges(mesh_id)),
        Request::FaceCount { mesh_id } => Response::from_result(api.number_of_faces(mesh_id)),
        Request::MaxFaceNodes { mesh_id } => Response::from_result(api.max_face_nodes(mesh_id)),
        Request::NodeXCoordinates { mesh_id } => {
            Response::from_result(api.node_x_coordinates(mesh_id))
        }
        Request::NodeYCoordinates { mesh_id } => {
            Response::from_result(api.node_y_coordinates(mesh_id))
        }
        Request::NodeZCoordinates { mesh_id } => {
            Response::from_result(api.node_z_coordinates(mesh_id))
        }
        Request::EdgeNodes { mesh_id } => Response::from_result(
            api.edge_nodes(mesh_id)
                .map(|table| ConnectivityTable::from(&table)),
        ),
        Request::FaceNodes { mesh_id } => Response::from_result(
            api.face_nodes(mesh_id)
                .map(|table| ConnectivityTable::from(&table)),
        ),
        Request::WriteXyCoordinates { mesh_id, xs, ys } => {
            Response::from_result(api.write_xy_coordinates(mesh_id, &xs, &ys))
        }
        Request::WriteZCoordinates {
            mesh_id,
            location,
            var_name,
            long_name,
            values,
        } => Response::from_result(api.write_z_coordinates(
            mesh_id,
            location,
            &var_name,
            &long_name,
            &values,
        )),
        Request::ReadZCoordinates {
            mesh_id,
            location,
            var_name,
        } => Response::from_result(api.read_z_coordinates(mesh_id, location, &var_name)),
        Request::MeshName { mesh_id } => Response::from_result(api.mesh_name(mesh_id)),
        Request::VarCount { mesh_id, location } => {
            Response::from_result(api.var_count(mesh_id, location))
        }
        Request::VarIds { mesh_id, location } => {
            Response::from_result(api.var_ids(mesh_id, location))
        }
        Request::WriteGeomUgrid { path } => Response::from_result(api.write_geom_ugrid(&path)),
        Request::WriteMapUgrid { path } => Response::from_result(api.write_map_ugrid(&path)),
        Request::Shutdown => Response::ok(),
    }
}

/// Serves requests until shutdown or end of input.
pub fn serve<A: UGridApi>(api: &mut A, input: impl BufRead, mut output: impl Write) -> Result<()> {
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let (response, stop) = match serde_json::from_str::<Request>(&line) {
            Ok(request) => {
                debug!(?request, "dispatching");
                let stop = matches!(request, Request::Shutdown);
                (dispatch(api, request), stop)
            }
            Err(error) => {
                warn!(%error, "unparseable request line");
                (Response::error(GENERAL_FATAL_ERR), false)
            }
        };

        serde_json::to_writer(&mut output, &response)?;
        output.write_all(b"\n")?;
        output.flush()?;

        if stop {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_api::{DataSetConvention, ErrorCode};
    use test_utils::FakeUGridApi;

    #[test]
    fn dispatch_packs_values_and_codes() {
        let mut api = FakeUGridApi::default();

        let reply = dispatch(&mut api, Request::MeshCount);
        assert_eq!(reply.code, 0);
        assert_eq!(reply.value, serde_json::json!(2));

        let reply = dispatch(&mut api, Request::Convention);
        let convention: DataSetConvention = serde_json::from_value(reply.value).unwrap();
        assert_eq!(convention, DataSetConvention::Ugrid);

        api.node_count = Err(ErrorCode::FATAL);
        let reply = dispatch(&mut api, Request::NodeCount { mesh_id: 1 });
        assert_eq!(reply.code, GENERAL_FATAL_ERR);
        assert!(reply.value.is_null());
    }

    #[test]
    fn dispatch_flattens_connectivity_tables() {
        let mut api = FakeUGridApi::default();
        let reply = dispatch(&mut api, Request::EdgeNodes { mesh_id: 1 });
        let table: ConnectivityTable = serde_json::from_value(reply.value).unwrap();
        assert_eq!((table.rows, table.cols), (2, 2));
        assert_eq!(table.values, vec![0, 1, 1, 2]);
    }

    #[test]
    fn serve_replies_per_line_and_stops_on_shutdown() {
        let mut api = FakeUGridApi::default();
        let input = [
            serde_json::to_string(&Request::MeshCount).unwrap(),
            serde_json::to_string(&Request::Shutdown).unwrap(),
            serde_json::to_string(&Request::MeshCount).unwrap(),
        ]
        .join("\n");

        let mut output = Vec::new();
        serve(&mut api, input.as_bytes(), &mut output).unwrap();

        let replies: Vec<Response> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        // The request after shutdown is never served.
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0].code, 0);
    }

    #[test]
    fn serve_answers_garbage_with_a_fatal_code() {
        let mut api = FakeUGridApi::default();
        let mut output = Vec::new();
        serve(&mut api, "not json\n".as_bytes(), &mut output).unwrap();

        let reply: Response = serde_json::from_str(String::from_utf8(output).unwrap().trim()).unwrap();
        assert_eq!(reply.code, GENERAL_FATAL_ERR);
    }
}
