//! Format detection and deserialization helpers shared by every loader.

use flowgrid_core::catalog::CatalogError;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

use crate::layout::LayoutError;

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur while loading data files.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// The recipe list does not form a valid catalog.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The entity list could not be turned into a layout.
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

/// Origin used in error messages for data that did not come from a file.
pub(crate) const INLINE_ORIGIN: &str = "<inline>";

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(origin: &Path, detail: impl ToString) -> DataLoadError {
    DataLoadError::Parse {
        file: origin.to_path_buf(),
        detail: detail.to_string(),
    }
}

/// Deserialize a whole document. `origin` only labels errors.
pub fn parse_str<T: DeserializeOwned>(
    content: &str,
    format: Format,
    origin: &Path,
) -> Result<T, DataLoadError> {
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_error(origin, e)),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_error(origin, e)),
        Format::Toml => toml::from_str(content).map_err(|e| parse_error(origin, e)),
    }
}

/// Deserialize a list. TOML has no top-level arrays, so for TOML the array
/// is read from `toml_key` of the top-level table. RON and JSON documents
/// are the list itself.
pub fn parse_list_str<T: DeserializeOwned>(
    content: &str,
    format: Format,
    toml_key: &str,
    origin: &Path,
) -> Result<Vec<T>, DataLoadError> {
    match format {
        Format::Ron | Format::Json => parse_str(content, format, origin),
        Format::Toml => {
            let table: toml::Value = toml::from_str(content).map_err(|e| parse_error(origin, e))?;
            let array = table
                .get(toml_key)
                .ok_or_else(|| parse_error(origin, format!("missing key '{toml_key}' in TOML file")))?
                .clone();
            array
                .try_into()
                .map_err(|e: toml::de::Error| parse_error(origin, e))
        }
    }
}

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    parse_str(&content, format, path)
}

/// Read a list from a file. See [`parse_list_str`] for the TOML layout.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    parse_list_str(&content, format, toml_key, path)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::fs;

    /// Create a temporary directory with a unique name for test isolation.
    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "flowgrid_data_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Entry {
        name: String,
        qty: u32,
    }

    // -----------------------------------------------------------------------
    // detect_format
    // -----------------------------------------------------------------------

    #[test]
    fn detect_format_by_extension() {
        assert_eq!(detect_format(Path::new("recipes.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("recipes.toml")).unwrap(), Format::Toml);
        assert_eq!(detect_format(Path::new("recipes.json")).unwrap(), Format::Json);
    }

    #[test]
    fn detect_format_unsupported() {
        assert!(matches!(
            detect_format(Path::new("recipes.yaml")),
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            detect_format(Path::new("recipes")),
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // parse_list_str
    // -----------------------------------------------------------------------

    #[test]
    fn parse_list_json() {
        let entries: Vec<Entry> = parse_list_str(
            r#"[{"name": "iron-plate", "qty": 2}]"#,
            Format::Json,
            "entries",
            Path::new(INLINE_ORIGIN),
        )
        .unwrap();
        assert_eq!(entries, vec![Entry { name: "iron-plate".into(), qty: 2 }]);
    }

    #[test]
    fn parse_list_ron() {
        let entries: Vec<Entry> = parse_list_str(
            r#"[(name: "iron-plate", qty: 2), (name: "copper-cable", qty: 3)]"#,
            Format::Ron,
            "entries",
            Path::new(INLINE_ORIGIN),
        )
        .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].qty, 3);
    }

    #[test]
    fn parse_list_toml_reads_key() {
        let toml = r#"
[[entries]]
name = "iron-plate"
qty = 2
"#;
        let entries: Vec<Entry> =
            parse_list_str(toml, Format::Toml, "entries", Path::new(INLINE_ORIGIN)).unwrap();
        assert_eq!(entries, vec![Entry { name: "iron-plate".into(), qty: 2 }]);
    }

    #[test]
    fn parse_list_toml_missing_key() {
        let result: Result<Vec<Entry>, _> =
            parse_list_str("other = 1", Format::Toml, "entries", Path::new("x.toml"));
        match result {
            Err(DataLoadError::Parse { file, detail }) => {
                assert_eq!(file, PathBuf::from("x.toml"));
                assert!(detail.contains("missing key 'entries'"), "got: {detail}");
            }
            other => panic!("expected Parse error, got: {other:?}"),
        }
    }

    #[test]
    fn parse_error_names_origin() {
        let result: Result<Vec<Entry>, _> =
            parse_list_str("[{", Format::Json, "entries", Path::new("broken.json"));
        let err = result.unwrap_err();
        assert!(err.to_string().starts_with("parse error in broken.json"), "got: {err}");
    }

    // -----------------------------------------------------------------------
    // Files
    // -----------------------------------------------------------------------

    #[test]
    fn deserialize_list_from_file() {
        let dir = make_test_dir("list_file");
        let path = dir.join("entries.ron");
        fs::write(&path, r#"[(name: "gear", qty: 1)]"#).unwrap();

        let entries: Vec<Entry> = deserialize_list(&path, "entries").unwrap();
        assert_eq!(entries[0].name, "gear");

        cleanup(&dir);
    }

    #[test]
    fn deserialize_file_missing_is_io_error() {
        let dir = make_test_dir("missing_file");
        let result: Result<Vec<Entry>, _> = deserialize_file(&dir.join("absent.json"));
        assert!(matches!(result, Err(DataLoadError::Io(_))));
        cleanup(&dir);
    }

    #[test]
    fn deserialize_file_unsupported_format_checked_before_read() {
        let result: Result<Vec<Entry>, _> = deserialize_file(Path::new("/nonexistent/data.yaml"));
        assert!(matches!(result, Err(DataLoadError::UnsupportedFormat { .. })));
    }
}
