//! Export of stub rules as WireMock mapping documents.
//!
//! Rules are either bundled into one `{"mappings": [...]}` document, the
//! body accepted by `POST /__admin/mappings/import`, or written as one
//! `<id>.json` file each into a `mappings/` directory the server loads at
//! startup.

use crate::error::{Result, StubError};
use crate::stub::StubRule;
use serde_json::{json, Value};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// Bundle rules into a single import document, preserving order.
pub fn mappings_document<'a>(rules: impl IntoIterator<Item = &'a StubRule>) -> Value {
    let mappings: Vec<Value> = rules.into_iter().map(StubRule::to_value).collect();
    json!({ "mappings": mappings })
}

/// Whether `id` can name a file directly inside the mappings directory.
pub fn is_valid_mapping_id(id: &str) -> bool {
    if id.is_empty() || id.contains('/') || id.contains('\\') || id.contains("..") {
        return false;
    }
    let mut components = Path::new(id).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Write one pretty-printed mapping file per rule into `dir`.
///
/// The directory is created if it does not exist. Existing files with the
/// same name are overwritten. Returns the written paths in input order.
/// Every id is checked before anything is written.
pub fn write_mapping_files(dir: &Path, rules: &[(String, StubRule)]) -> Result<Vec<PathBuf>> {
    if let Some((id, _)) = rules.iter().find(|(id, _)| !is_valid_mapping_id(id)) {
        return Err(StubError::InvalidId(id.clone()));
    }

    std::fs::create_dir_all(dir).map_err(|source| StubError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(rules.len());
    for (id, rule) in rules {
        let path = dir.join(format!("{}.json", id));
        let json = rule.to_json_pretty()?;
        std::fs::write(&path, json).map_err(|source| StubError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(id = %id, path = %path.display(), "Wrote mapping file");
        written.push(path);
    }

    info!(dir = %dir.display(), count = written.len(), "Exported stub mappings");
    Ok(written)
}
