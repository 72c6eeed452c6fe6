//! Pre-recorded reply templates
//!
//! Templates live in `<audio_files_dir>/templates.json`:
//!
//! ```json
//! {
//!   "gabbar": { "description": "dramatic moment", "file": "gabbar.mp3" }
//! }
//! ```
//!
//! The registry is re-read on every lookup so edits take effect without a
//! restart. Entries are validated at load; whether the audio file exists is
//! only checked when a template is played.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::{Error, Result};

/// A named clip and when to use it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Template {
    pub description: String,
    /// File name relative to the audio files directory
    pub file: String,
}

/// Templates keyed by name, in file order
pub type Templates = IndexMap<String, Template>;

/// Reads `templates.json` from the audio files directory
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    audio_dir: PathBuf,
    path: PathBuf,
}

impl TemplateRegistry {
    #[must_use]
    pub fn new(audio_dir: impl Into<PathBuf>) -> Self {
        let audio_dir = audio_dir.into();
        let path = audio_dir.join("templates.json");
        Self { audio_dir, path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and validate every template
    ///
    /// A missing registry file yields an empty map.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Template`] if the file cannot be read, is not valid
    /// JSON, or contains an entry without a `description` or a bare `file` name
    pub async fn load(&self) -> Result<Templates> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Templates::new()),
            Err(e) => {
                return Err(Error::Template(format!("{}: {e}", self.path.display())));
            }
        };

        let templates = parse_templates(&content)
            .map_err(|e| Error::Template(format!("{}: {e}", self.path.display())))?;

        tracing::debug!(path = %self.path.display(), count = templates.len(), "loaded templates");
        Ok(templates)
    }

    /// Absolute path of a template's audio file
    #[must_use]
    pub fn audio_path(&self, template: &Template) -> PathBuf {
        self.audio_dir.join(&template.file)
    }
}

/// Parse and validate registry JSON
fn parse_templates(content: &str) -> std::result::Result<Templates, String> {
    let templates: Templates = serde_json::from_str(content).map_err(|e| e.to_string())?;

    for (name, template) in &templates {
        if !is_bare_file_name(&template.file) {
            return Err(format!(
                "template {name:?} file {:?} must be a file name inside the audio directory",
                template.file
            ));
        }
    }

    Ok(templates)
}

/// True when `name` is a single normal path component (no separators, no `..`)
pub(crate) fn is_bare_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(std::path::Component::Normal(_)), None)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preserves_file_order() {
        let templates = parse_templates(
            r#"{
                "zeta": {"description": "last letter", "file": "z.mp3"},
                "alpha": {"description": "first letter", "file": "a.mp3"}
            }"#,
        )
        .unwrap();

        let names: Vec<&str> = templates.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let err = parse_templates(r#"{"gabbar": {"description": "dramatic"}}"#).unwrap_err();
        assert!(err.contains("file"));
    }

    #[test]
    fn test_path_escape_is_rejected() {
        let err =
            parse_templates(r#"{"x": {"description": "d", "file": "../secret.mp3"}}"#).unwrap_err();
        assert!(err.contains("../secret.mp3"));
    }

    #[test]
    fn test_blank_description_is_accepted() {
        let templates =
            parse_templates(r#"{"quiet": {"description": "", "file": "q.mp3"}}"#).unwrap();
        assert_eq!(templates["quiet"].description, "");
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let templates =
            parse_templates(r#"{"x": {"description": "d", "file": "x.mp3", "lang": "hi"}}"#)
                .unwrap();
        assert_eq!(templates["x"].file, "x.mp3");
    }

    #[test]
    fn test_is_bare_file_name() {
        assert!(is_bare_file_name("clip.mp3"));
        assert!(!is_bare_file_name(""));
        assert!(!is_bare_file_name("sub/clip.mp3"));
        assert!(!is_bare_file_name("/etc/passwd"));
        assert!(!is_bare_file_name(".."));
    }

    #[tokio::test]
    async fn test_missing_registry_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let registry = TemplateRegistry::new(dir.path());
        assert!(registry.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_registry_names_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("templates.json"), "{ not json").unwrap();

        let registry = TemplateRegistry::new(dir.path());
        let err = registry.load().await.unwrap_err();
        assert_eq!(err.kind(), "template_invalid");
        assert!(err.to_string().contains("templates.json"));
    }
}
