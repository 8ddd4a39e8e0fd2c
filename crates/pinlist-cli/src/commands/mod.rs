pub mod completions;
pub mod digest;
pub mod flatten;
pub mod man_pages;
pub mod sections;
pub mod validate;

use pinlist_schema::{FlattenedManifest, LoadOptions, Loader};
use std::path::Path;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_MANIFEST_ERROR: u8 = 2;
pub const EXIT_CONFLICT: u8 = 3;

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

pub fn load_manifest(path: &Path, options: &LoadOptions) -> Result<FlattenedManifest, String> {
    Loader::with_options(options.clone())
        .load(path)
        .map_err(|e| format!("manifest error: {e}"))
}

pub fn colorize_section(label: &str) -> String {
    use console::Style;
    Style::new().cyan().bold().apply_to(label).to_string()
}

pub fn colorize_status(ok: bool, msg: &str) -> String {
    use console::Style;
    if ok {
        Style::new().green().apply_to(msg).to_string()
    } else {
        Style::new().red().bold().apply_to(msg).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_pretty_serializes_string() {
        let val = serde_json::json!({"key": "value"});
        let result = json_pretty(&val).unwrap();
        assert!(result.contains("\"key\""));
        assert!(result.contains("\"value\""));
    }

    #[test]
    fn colorize_keeps_text() {
        assert!(colorize_section("docs").contains("docs"));
        assert!(colorize_status(true, "ok").contains("ok"));
        assert!(colorize_status(false, "conflict").contains("conflict"));
    }

    #[test]
    fn load_manifest_prefixes_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_manifest(&dir.path().join("absent.txt"), &LoadOptions::default())
            .unwrap_err();
        assert!(err.starts_with("manifest error: manifest not found"), "{err}");
    }

    #[test]
    fn load_manifest_reads_pins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("requirements.txt");
        std::fs::write(&path, "mock==2.0.0\n").unwrap();
        let flat = load_manifest(&path, &LoadOptions::default()).unwrap();
        assert_eq!(flat.len(), 1);
    }

    #[test]
    fn exit_codes_are_distinct() {
        assert_ne!(EXIT_SUCCESS, EXIT_FAILURE);
        assert_ne!(EXIT_FAILURE, EXIT_MANIFEST_ERROR);
        assert_ne!(EXIT_MANIFEST_ERROR, EXIT_CONFLICT);
    }
}
