use crate::engine::SearchEngineBuilder;
use crate::error::Error;
use crate::hash::{HashAlgorithm, HashMatcher};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_total_length() -> usize {
    16
}

/// Search parameters as stored in a JSON settings file.
///
/// ```json
/// { "bins": ["4"], "last_numbers": "1234", "hash": "…", "save_path": "found.txt" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub bins: Vec<String>,
    pub last_numbers: String,
    pub hash: String,
    /// Where the caller stores a recovered value. Not touched by the search.
    pub save_path: PathBuf,
    #[serde(default = "default_total_length")]
    pub total_length: usize,
    #[serde(default)]
    pub algorithm: HashAlgorithm,
    #[serde(default)]
    pub workers: Option<usize>,
}

impl Settings {
    pub fn from_json_str(raw: &str) -> Result<Self, Error> {
        let settings: Settings =
            serde_json::from_str(raw).map_err(|e| Error::Settings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Settings(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.bins.is_empty() {
            return Err(Error::InvalidConfig("bins must not be empty".into()));
        }
        if self.last_numbers.is_empty() {
            return Err(Error::InvalidConfig("last_numbers must not be empty".into()));
        }
        if self.workers == Some(0) {
            return Err(Error::InvalidConfig("workers must be >= 1".into()));
        }
        if self.save_path.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("save_path must not be empty".into()));
        }
        HashMatcher::new(self.algorithm, &self.hash)
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        Ok(())
    }

    /// A builder preloaded with these settings; callers may still override
    /// workers, cancellation or the deadline before building.
    pub fn engine_builder(&self) -> SearchEngineBuilder {
        let builder = SearchEngineBuilder::default()
            .prefixes(self.bins.clone())
            .suffix(self.last_numbers.clone())
            .total_length(self.total_length)
            .target(self.hash.clone())
            .algorithm(self.algorithm);
        match self.workers {
            Some(workers) => builder.workers(workers),
            None => builder,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json(hash: &str) -> String {
        format!(
            r#"{{"bins": ["4", "51"], "last_numbers": "1234", "hash": "{hash}", "save_path": "found.txt"}}"#
        )
    }

    #[test]
    fn parses_with_defaults() {
        let hash = HashAlgorithm::Sha224.hex_digest(b"4000000000001234");
        let settings = Settings::from_json_str(&sample_json(&hash)).expect("valid settings");
        assert_eq!(settings.bins, vec!["4", "51"]);
        assert_eq!(settings.total_length, 16);
        assert_eq!(settings.algorithm, HashAlgorithm::Sha224);
        assert_eq!(settings.workers, None);
        assert_eq!(settings.save_path, PathBuf::from("found.txt"));
    }

    #[test]
    fn rejects_malformed_json_and_bad_hash() {
        let err = Settings::from_json_str("{").expect_err("truncated json");
        assert!(matches!(err, Error::Settings(_)));

        let err = Settings::from_json_str(&sample_json("abc")).expect_err("short hash");
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn rejects_empty_bins() {
        let hash = HashAlgorithm::Sha224.hex_digest(b"x");
        let raw = format!(
            r#"{{"bins": [], "last_numbers": "1234", "hash": "{hash}", "save_path": "out.txt"}}"#
        );
        let err = Settings::from_json_str(&raw).expect_err("empty bins");
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Settings::load("/nonexistent/hashsweep-settings.json").expect_err("no file");
        assert!(matches!(err, Error::Settings(_)));
    }

    #[test]
    fn engine_builder_carries_settings_into_a_search() {
        let expected = "5100421234";
        let raw = format!(
            r#"{{"bins": ["4", "51"], "last_numbers": "1234", "hash": "{}",
                "save_path": "found.txt", "total_length": 10, "algorithm": "sha256", "workers": 3}}"#,
            HashAlgorithm::Sha256.hex_digest(expected.as_bytes())
        );
        let settings = Settings::from_json_str(&raw).expect("valid settings");

        let engine = settings
            .engine_builder()
            .build_validated()
            .expect("build engine");
        assert_eq!(engine.workers, 3);

        let result = engine.run().expect("search should succeed");
        assert_eq!(result.value(), Some(expected));
    }
}
