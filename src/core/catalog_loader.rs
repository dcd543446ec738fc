/*
 * Loads the content catalog (orientation text plus artworks) from a JSON
 * content descriptor. The on-disk shape uses snake_case keys and an `image`
 * field; it is mapped into the core's `Catalog` which sorts works by
 * `display_order`.
 *
 * Loading goes through the `CatalogLoaderOperations` trait so the app logic can
 * be tested against a mock loader that fails or returns canned content.
 */
use super::models::{ArtworkDescriptor, Catalog, OrientationContent};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum CatalogError {
    Io(io::Error),
    Serde(serde_json::Error),
    NotFound(PathBuf),
    DuplicateWorkId(String),
}

impl From<io::Error> for CatalogError {
    fn from(err: io::Error) -> Self {
        CatalogError::Io(err)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Serde(err)
    }
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Io(e) => write!(f, "Catalog I/O error: {e}"),
            CatalogError::Serde(e) => write!(f, "Catalog parse error: {e}"),
            CatalogError::NotFound(path) => write!(f, "Catalog source not found: {path:?}"),
            CatalogError::DuplicateWorkId(id) => write!(f, "Duplicate work id in catalog: {id}"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Io(e) => Some(e),
            CatalogError::Serde(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    orientation: OrientationRecord,
    works: Vec<WorkRecord>,
}

#[derive(Debug, Default, Deserialize)]
struct OrientationRecord {
    #[serde(default)]
    title: String,
    #[serde(default)]
    statement: String,
}

#[derive(Debug, Deserialize)]
struct WorkRecord {
    id: String,
    display_order: i64,
    #[serde(default)]
    section_header: Option<String>,
    #[serde(default)]
    framing_text: String,
    image: String,
    #[serde(default)]
    context_text: String,
}

impl From<WorkRecord> for ArtworkDescriptor {
    fn from(record: WorkRecord) -> Self {
        ArtworkDescriptor {
            id: record.id,
            display_order: record.display_order,
            section_header: record.section_header.unwrap_or_default(),
            framing_text: record.framing_text,
            context_text: record.context_text,
            image_ref: record.image,
        }
    }
}

pub trait CatalogLoaderOperations: Send + Sync {
    fn load_catalog(&self) -> Result<Catalog>;
}

/*
 * Parses a content descriptor from any JSON string. Work ids must be unique,
 * since the arrangement refers to works by id only.
 */
pub fn parse_catalog(json: &str) -> Result<Catalog> {
    let file: CatalogFile = serde_json::from_str(json)?;
    build_catalog(file)
}

fn build_catalog(file: CatalogFile) -> Result<Catalog> {
    let mut works: Vec<ArtworkDescriptor> = Vec::with_capacity(file.works.len());
    for record in file.works {
        if works.iter().any(|w| w.id == record.id) {
            return Err(CatalogError::DuplicateWorkId(record.id));
        }
        works.push(record.into());
    }
    let orientation = OrientationContent {
        title: file.orientation.title,
        statement: file.orientation.statement,
    };
    Ok(Catalog::new(orientation, works))
}

pub struct CoreCatalogLoader {
    source_path: PathBuf,
}

impl CoreCatalogLoader {
    pub fn new(source_path: &Path) -> Self {
        CoreCatalogLoader {
            source_path: source_path.to_path_buf(),
        }
    }
}

impl CatalogLoaderOperations for CoreCatalogLoader {
    fn load_catalog(&self) -> Result<Catalog> {
        log::trace!("CoreCatalogLoader: Loading catalog from {:?}", self.source_path);
        if !self.source_path.is_file() {
            return Err(CatalogError::NotFound(self.source_path.clone()));
        }
        let json = fs::read_to_string(&self.source_path)?;
        let catalog = parse_catalog(&json)?;
        log::debug!(
            "CoreCatalogLoader: Loaded {} works from {:?}",
            catalog.len(),
            self.source_path
        );
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"{
        "orientation": { "title": "Walk-up", "statement": "Choose what stays." },
        "works": [
            { "id": "W3", "display_order": 3, "section_header": "III", "framing_text": "f3", "image": "img/3.jpg", "context_text": "c3" },
            { "id": "W1", "display_order": 1, "section_header": "I", "framing_text": "f1", "image": "img/1.jpg", "context_text": "c1" },
            { "id": "W2", "display_order": 2, "framing_text": "f2", "image": "img/2.jpg", "context_text": "c2" }
        ]
    }"#;

    #[test]
    fn test_parse_catalog_sorts_and_maps_fields() {
        let catalog = parse_catalog(SAMPLE).unwrap();
        let ids: Vec<&str> = catalog.works().iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["W1", "W2", "W3"]);
        assert_eq!(catalog.orientation().title, "Walk-up");
        assert_eq!(catalog.works()[0].image_ref, "img/1.jpg");
        // A missing section header becomes an empty string.
        assert_eq!(catalog.works()[1].section_header, "");
    }

    #[test]
    fn test_parse_catalog_rejects_duplicate_ids() {
        let json = r#"{ "works": [
            { "id": "A", "display_order": 1, "image": "a" },
            { "id": "A", "display_order": 2, "image": "b" }
        ] }"#;
        match parse_catalog(json) {
            Err(CatalogError::DuplicateWorkId(id)) => assert_eq!(id, "A"),
            other => panic!("Expected DuplicateWorkId, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_catalog_invalid_json() {
        assert!(matches!(parse_catalog("{ nope"), Err(CatalogError::Serde(_))));
    }

    #[test]
    fn test_core_loader_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let loader = CoreCatalogLoader::new(file.path());
        let catalog = loader.load_catalog().unwrap();
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_core_loader_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let loader = CoreCatalogLoader::new(&dir.path().join("works.json"));
        assert!(matches!(loader.load_catalog(), Err(CatalogError::NotFound(_))));
    }
}
