//! # Settings
//!
//! Loader for the backend's sectioned key/value configuration file:
//!
//! ```text
//! [Server]
//! BACKEND_PORT = 8765   # inline comments are stripped
//! [Character]
//! CHARACTER_NAME = "小白"
//! ```
//!
//! Lookup falls back to the `default` section for keys written without a
//! section header, matching the older flat `KEY=value` files still in the
//! field. Missing keys resolve to a caller-supplied default and are never an
//! error.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{info, warn};

/// Section used for keys that appear before any `[section]` header.
const DEFAULT_SECTION: &str = "default";

/// Parsed configuration, keyed by section then key.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    sections: HashMap<String, HashMap<String, String>>,
    loaded_path: Option<PathBuf>,
}

impl Settings {
    /// Loads the first readable file among `primary` and
    /// `$HOME/.config/companion/.env`. A missing file is a warning, not an
    /// error: the result is an empty settings object and every lookup falls
    /// back to its default.
    pub fn load(primary: impl AsRef<Path>) -> Result<Self> {
        let mut candidates: Vec<PathBuf> = vec![primary.as_ref().to_path_buf()];
        if let Ok(home) = std::env::var("HOME") {
            candidates.push(Path::new(&home).join(".config/companion/.env"));
        }

        for path in &candidates {
            if path.exists() {
                let text = std::fs::read_to_string(path)?;
                let sections = parse(&text);
                info!(path = %path.display(), sections = sections.len(), "Loaded configuration file");
                return Ok(Self {
                    sections,
                    loaded_path: Some(path.clone()),
                });
            }
        }

        warn!("No configuration file found in any candidate path; using defaults only");
        Ok(Self::default())
    }

    /// Builds a settings object directly from pre-parsed sections. Test and
    /// embedding entry point.
    pub fn from_sections(sections: HashMap<String, HashMap<String, String>>) -> Self {
        Self {
            sections,
            loaded_path: None,
        }
    }

    /// Returns the value for `section.key`, falling back first to the
    /// `default` section and then to `default_value`.
    pub fn get(&self, section: &str, key: &str, default_value: &str) -> String {
        if let Some(sec) = self.sections.get(section) {
            if let Some(v) = sec.get(key) {
                return v.clone();
            }
        }
        if let Some(def) = self.sections.get(DEFAULT_SECTION) {
            if let Some(v) = def.get(key) {
                return v.clone();
            }
        }
        default_value.to_string()
    }

    /// Returns a whole section as a map; unknown sections are empty.
    pub fn section(&self, name: &str) -> HashMap<String, String> {
        self.sections.get(name).cloned().unwrap_or_default()
    }

    /// Path of the file that was actually loaded, if any.
    pub fn loaded_path(&self) -> Option<&Path> {
        self.loaded_path.as_deref()
    }
}

/// Parses the sectioned key/value format: `#` starts a comment, section
/// headers are `[name]`, values may be wrapped in double quotes.
fn parse(text: &str) -> HashMap<String, HashMap<String, String>> {
    let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
    let mut current = DEFAULT_SECTION.to_string();

    for raw_line in text.lines() {
        let line = match raw_line.find('#') {
            Some(pos) => &raw_line[..pos],
            None => raw_line,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            current = line[1..line.len() - 1].trim().to_string();
            continue;
        }

        if let Some(pos) = line.find('=') {
            let key = line[..pos].trim();
            let mut value = line[pos + 1..].trim();
            if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
                value = &value[1..value.len() - 1];
            }
            if !key.is_empty() {
                sections
                    .entry(current.clone())
                    .or_default()
                    .insert(key.to_string(), value.to_string());
            }
        }
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
# top-level comment
TOP_LEVEL = plain

[Server]
BACKEND_PORT = 8765  # trailing comment
DOCUMENT_ROOT = "frontend"

[EmotionMap]
happy = smile.png
sad = frown.png
"#;

    #[test]
    fn parses_sections_comments_and_quotes() {
        let settings = Settings::from_sections(parse(SAMPLE));
        assert_eq!(settings.get("Server", "BACKEND_PORT", "0"), "8765");
        assert_eq!(settings.get("Server", "DOCUMENT_ROOT", ""), "frontend");
    }

    #[test]
    fn sectionless_keys_land_in_default_and_back_lookups() {
        let settings = Settings::from_sections(parse(SAMPLE));
        // Direct hit in default section.
        assert_eq!(settings.get("default", "TOP_LEVEL", ""), "plain");
        // Any section falls back to default for unknown keys.
        assert_eq!(settings.get("Server", "TOP_LEVEL", ""), "plain");
    }

    #[test]
    fn missing_key_returns_caller_default() {
        let settings = Settings::from_sections(parse(SAMPLE));
        assert_eq!(settings.get("Server", "NO_SUCH_KEY", "fallback"), "fallback");
        assert_eq!(settings.get("NoSection", "KEY", "x"), "x");
    }

    #[test]
    fn whole_section_lookup() {
        let settings = Settings::from_sections(parse(SAMPLE));
        let map = settings.section("EmotionMap");
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("happy").map(String::as_str), Some("smile.png"));
        assert!(settings.section("EmotionSfxMap").is_empty());
    }

    #[test]
    fn load_reads_file_and_records_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[AI]\nMODEL = deepseek-chat\n").unwrap();

        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.get("AI", "MODEL", ""), "deepseek-chat");
        assert_eq!(settings.loaded_path(), Some(file.path()));
    }

    #[test]
    fn load_missing_file_yields_empty_settings() {
        let settings = Settings::load("/nonexistent/companion.env").unwrap();
        assert_eq!(settings.get("AI", "MODEL", "deepseek-chat"), "deepseek-chat");
        assert!(settings.loaded_path().is_none());
    }
}
