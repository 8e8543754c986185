//! Saved API responses served through the engine's [`Transport`] boundary.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use viewkit_engine::{PagingMode, Transport, TransportError};
use viewkit_model::{Query, ResolvedKey};

/// Read-only transport answering every `get` with the contents of one file.
#[derive(Debug, Clone)]
pub struct FileTransport {
    path: PathBuf,
}

impl FileTransport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_only(&self, resource: &str) -> TransportError {
        TransportError::Status {
            resource: resource.to_string(),
            status: 405,
            message: format!("{} is a read-only snapshot", self.path.display()),
        }
    }
}

/// Paging mode for a view over a saved snapshot.
///
/// A snapshot ignores query parameters, so an active query has to be
/// filtered locally.
pub fn snapshot_paging_mode(query: &Query, client: bool) -> PagingMode {
    if client || query.is_active() {
        PagingMode::ClientFiltered
    } else {
        PagingMode::ServerPaged
    }
}

/// Read and parse a JSON document.
pub fn read_json(path: &Path, resource: &str) -> Result<Value, TransportError> {
    let text = fs::read_to_string(path).map_err(|error| TransportError::Request {
        resource: resource.to_string(),
        message: format!("{}: {error}", path.display()),
    })?;
    serde_json::from_str(&text).map_err(|source| TransportError::Decode {
        resource: resource.to_string(),
        source,
    })
}

impl Transport for FileTransport {
    async fn get(
        &self,
        resource: &str,
        params: &[(String, String)],
    ) -> Result<Value, TransportError> {
        tracing::debug!(
            resource,
            path = %self.path.display(),
            params = params.len(),
            "Serving saved response"
        );
        read_json(&self.path, resource)
    }

    async fn create(&self, resource: &str, _body: &Value) -> Result<Value, TransportError> {
        Err(self.read_only(resource))
    }

    async fn update(
        &self,
        resource: &str,
        _key: &ResolvedKey,
        _body: &Value,
    ) -> Result<Value, TransportError> {
        Err(self.read_only(resource))
    }

    async fn delete(&self, resource: &str, _key: &ResolvedKey) -> Result<(), TransportError> {
        Err(self.read_only(resource))
    }
}
