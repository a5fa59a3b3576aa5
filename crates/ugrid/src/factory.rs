//! Chooses how grid API instances are created.

use std::env;

use tracing::warn;

use grid_api::{create_native_ugrid_api, UGridApi};
use grid_remote::RemoteUGridApi;

/// Environment variable selecting the execution context: `local` (default)
/// runs the kernel in-process, `remote` isolates it in a host process.
pub const API_MODE_ENV: &str = "UGRID_API_MODE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiMode {
    #[default]
    Local,
    Remote,
}

impl ApiMode {
    pub fn from_env() -> Self {
        match env::var(API_MODE_ENV).as_deref() {
            Ok("remote") => ApiMode::Remote,
            Ok("local") | Err(_) => ApiMode::Local,
            Ok(other) => {
                warn!(mode = other, "unknown {API_MODE_ENV} value, using local");
                ApiMode::Local
            }
        }
    }
}

/// Creates a grid API in the configured mode, or `None` when neither the
/// kernel nor a host process is available. Callers treat `None` as "the
/// UGRID code path does not exist on this machine".
pub fn create_api() -> Option<Box<dyn UGridApi>> {
    create_api_with_mode(ApiMode::from_env())
}

pub fn create_api_with_mode(mode: ApiMode) -> Option<Box<dyn UGridApi>> {
    match mode {
        ApiMode::Local => {
            create_native_ugrid_api().map(|api| Box::new(api) as Box<dyn UGridApi>)
        }
        ApiMode::Remote => {
            let api = RemoteUGridApi::spawn();
            if api.is_alive() {
                Some(Box::new(api))
            } else {
                None
            }
        }
    }
}
