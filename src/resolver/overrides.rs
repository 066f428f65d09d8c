//! Manual artist-mapping overrides.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// Static internal-id -> Spotify-id mappings loaded at resolution start.
///
/// An override always wins over automated resolution for its artist and
/// bypasses the network entirely.
#[derive(Debug, Default)]
pub struct ManualOverrides {
    mappings: HashMap<String, String>,
}

impl ManualOverrides {
    /// Load overrides from a JSON object file: `{"<internal_id>": "<spotify_id>"}`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read overrides file: {:?}", path))?;
        let mappings: HashMap<String, String> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse overrides file: {:?}", path))?;
        Ok(Self { mappings })
    }

    /// Empty override set, used when no overrides file is configured.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, internal_id: &str) -> Option<&str> {
        self.mappings.get(internal_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_valid_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"mc1": "sp42", "mc2": "sp43"}}"#).unwrap();

        let overrides = ManualOverrides::load(file.path()).unwrap();
        assert_eq!(overrides.len(), 2);
        assert_eq!(overrides.get("mc1"), Some("sp42"));
        assert_eq!(overrides.get("unknown"), None);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = ManualOverrides::load(Path::new("/nonexistent/overrides.json"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_invalid_json_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(ManualOverrides::load(file.path()).is_err());
    }

    #[test]
    fn test_empty_overrides() {
        let overrides = ManualOverrides::empty();
        assert!(overrides.is_empty());
        assert_eq!(overrides.get("mc1"), None);
    }
}
