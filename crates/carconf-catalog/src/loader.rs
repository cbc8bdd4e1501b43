//! Reading catalogs and engine configuration from disk.

use std::path::{Path, PathBuf};

use sha2::Digest;
use tracing::debug;

use carconf_model::{CatalogDocument, EngineOptions};

use crate::error::CatalogError;
use crate::index::Catalog;

const CATALOG_ENV_VAR: &str = "CARCONF_CATALOG";

/// Catalog path from the `CARCONF_CATALOG` environment variable.
pub fn default_catalog_path() -> Option<PathBuf> {
    std::env::var_os(CATALOG_ENV_VAR).map(PathBuf::from)
}

pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    let contents = std::fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;
    let catalog = Catalog::from_json_str(&contents)?;
    debug!(
        path = %path.display(),
        fingerprint = catalog.fingerprint(),
        "loaded catalog"
    );
    Ok(catalog)
}

/// Engine options from a TOML file; missing keys keep their defaults.
pub fn load_engine_options(path: &Path) -> Result<EngineOptions, CatalogError> {
    let contents = std::fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;
    toml::from_str(&contents).map_err(|e| CatalogError::Toml {
        path: path.to_path_buf(),
        source: e,
    })
}

impl Catalog {
    pub fn from_json_str(contents: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument =
            serde_json::from_str(contents).map_err(|source| CatalogError::Json { source })?;
        Self::build(document, sha256_hex(contents.as_bytes()))
    }

    /// Index an in-memory document. The fingerprint covers its JSON form.
    pub fn from_document(document: CatalogDocument) -> Result<Self, CatalogError> {
        let bytes = serde_json::to_vec(&document).map_err(|source| CatalogError::Json { source })?;
        Self::build(document, sha256_hex(&bytes))
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(sha2::Sha256::digest(bytes))
}
