//! Configuration loading.
//!
//! Settings come from an optional TOML file; every key has a default, so an
//! absent file or an empty table is valid. The Solr origin is not part of the
//! file: it is read from the `SOLR_ORIGIN_WITH_PORT` environment variable by
//! [`solr_origin`].
//!
//! ```toml
//! [solr]
//! core_path = "/solr/findingaids"
//! timeout_secs = 30
//! max_retries = 3
//! retry_base_ms = 500
//! retry_max_ms = 8000
//!
//! [repository]
//! ead_globs = ["*/*.xml"]
//! ```

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use std::path::Path;

/// Environment variable holding the Solr origin, e.g. `http://localhost:8983`.
pub const SOLR_ORIGIN_VAR: &str = "SOLR_ORIGIN_WITH_PORT";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub solr: SolrConfig,
    #[serde(default)]
    pub repository: RepositoryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SolrConfig {
    #[serde(default = "default_core_path")]
    pub core_path: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,
    #[serde(default = "default_retry_max_ms")]
    pub retry_max_ms: u64,
}

fn default_core_path() -> String {
    "/solr/findingaids".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    3
}
fn default_retry_base_ms() -> u64 {
    500
}
fn default_retry_max_ms() -> u64 {
    8000
}

impl Default for SolrConfig {
    fn default() -> Self {
        Self {
            core_path: default_core_path(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_base_ms: default_retry_base_ms(),
            retry_max_ms: default_retry_max_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RepositoryConfig {
    /// Globs selecting EAD files by repository-relative path.
    #[serde(default = "default_ead_globs")]
    pub ead_globs: Vec<String>,
}

fn default_ead_globs() -> Vec<String> {
    vec!["*/*.xml".to_string()]
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            ead_globs: default_ead_globs(),
        }
    }
}

impl RepositoryConfig {
    /// Compile the EAD globs. `*` does not cross a `/`.
    pub fn ead_matcher(&self) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.ead_globs {
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .with_context(|| format!("Invalid repository.ead_globs pattern: '{}'", pattern))?;
            builder.add(glob);
        }
        builder
            .build()
            .with_context(|| "Failed to build repository.ead_globs matcher")
    }
}

/// Load configuration from `path`, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&content).with_context(|| "Failed to parse config file")?
        }
        None => Config::default(),
    };

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.solr.timeout_secs == 0 {
        anyhow::bail!("solr.timeout_secs must be > 0");
    }

    if config.solr.retry_base_ms > config.solr.retry_max_ms {
        anyhow::bail!(
            "solr.retry_base_ms ({}) must be <= solr.retry_max_ms ({})",
            config.solr.retry_base_ms,
            config.solr.retry_max_ms
        );
    }

    if !config.solr.core_path.starts_with('/') {
        anyhow::bail!(
            "solr.core_path must start with '/', got '{}'",
            config.solr.core_path
        );
    }

    if config.repository.ead_globs.is_empty() {
        anyhow::bail!("repository.ead_globs must not be empty");
    }
    config.repository.ead_matcher()?;

    Ok(())
}

/// Read the Solr origin from the environment.
pub fn solr_origin() -> Result<String> {
    let origin = std::env::var(SOLR_ORIGIN_VAR)
        .map_err(|_| anyhow::anyhow!("{} not set", SOLR_ORIGIN_VAR))?;
    let origin = origin.trim();
    if origin.is_empty() {
        anyhow::bail!("{} is empty", SOLR_ORIGIN_VAR);
    }
    Ok(origin.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_without_file() {
        let config = load_config(None).unwrap();
        assert_eq!(config.solr.core_path, "/solr/findingaids");
        assert_eq!(config.solr.timeout_secs, 30);
        assert_eq!(config.solr.max_retries, 3);
        assert_eq!(config.repository.ead_globs, vec!["*/*.xml"]);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let file = write_config("[solr]\nmax_retries = 5\n");
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.solr.max_retries, 5);
        assert_eq!(config.solr.retry_max_ms, 8000);
        assert_eq!(config.repository.ead_globs, vec!["*/*.xml"]);
    }

    #[test]
    fn test_validation_errors() {
        let cases = [
            ("[solr]\ntimeout_secs = 0\n", "timeout_secs"),
            ("[solr]\nretry_base_ms = 9000\n", "retry_base_ms"),
            ("[solr]\ncore_path = \"solr/x\"\n", "core_path"),
            ("[repository]\nead_globs = []\n", "ead_globs"),
            ("[repository]\nead_globs = [\"a/[\"]\n", "ead_globs"),
        ];
        for (content, needle) in cases {
            let file = write_config(content);
            let err = load_config(Some(file.path())).unwrap_err();
            assert!(
                format!("{:#}", err).contains(needle),
                "{}: {:#}",
                content,
                err
            );
        }
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/ead-indexer.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_ead_matcher_does_not_cross_directories() {
        let matcher = RepositoryConfig::default().ead_matcher().unwrap();
        assert!(matcher.is_match("mo/mos_2021.xml"));
        assert!(!matcher.is_match("mos_2021.xml"));
        assert!(!matcher.is_match("mo/nested/mos_2021.xml"));
        assert!(!matcher.is_match("mo/README.md"));
    }
}
