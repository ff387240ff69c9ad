//! CLI-level defaults (grounded on `core-config`): an optional `parinfer.toml`
//! carrying the mode and engine flags to use when the command line doesn't
//! override them. The engine itself takes no config — it only ever sees a
//! `parinfer_core::Options`.

use std::{fs, path::PathBuf};

use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DefaultMode {
    #[default]
    Smart,
    Indent,
    Paren,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub mode: DefaultMode,
    #[serde(default)]
    pub force_balance: bool,
    #[serde(default)]
    pub return_parens: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub file: ConfigFile,
}

/// Prefers a local `parinfer.toml` in the working directory; the caller
/// supplies an explicit override via `--config`.
pub fn discover() -> PathBuf {
    PathBuf::from("parinfer.toml")
}

/// Unknown fields in the file are ignored (`ConfigFile`'s `#[serde(default)]`
/// fields tolerate partial/forward-incompatible documents); a missing or
/// unparsable file falls back to defaults rather than erroring, matching
/// `core-config::load_from`.
pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => Ok(Config { file }),
        Err(_) => Ok(Config::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = load_from(Some(PathBuf::from("__no_such_parinfer_toml__"))).unwrap();
        assert_eq!(cfg.file.mode, DefaultMode::Smart);
        assert!(!cfg.file.force_balance);
    }

    #[test]
    fn parses_mode_and_flags() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "mode = \"paren\"\nforce_balance = true\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.file.mode, DefaultMode::Paren);
        assert!(cfg.file.force_balance);
    }

    #[test]
    fn unparsable_file_falls_back_to_defaults() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "not valid toml {{{").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.file.mode, DefaultMode::Smart);
    }
}
