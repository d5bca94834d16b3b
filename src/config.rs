// src/config.rs

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use crate::cache::DEFAULT_TTL_MS;
use crate::error::SheetError;

/// Published CSV exports shipped as the default sheet set.
static DEFAULT_SHEET_URLS: &[(&str, &str)] = &[
    (
        "inmun",
        "https://docs.google.com/spreadsheets/d/e/2PACX-1vRSYCrY1GI-35QWWS5BnB9whdm259gOUvDWCi_raTAi-Egirt7szGtx_vrWk2imF3k3yVVwR2LDdDSH/pub?gid=227554641&single=true&output=csv",
    ),
    (
        "jayeon",
        "https://docs.google.com/spreadsheets/d/e/2PACX-1vRSYCrY1GI-35QWWS5BnB9whdm259gOUvDWCi_raTAi-Egirt7szGtx_vrWk2imF3k3yVVwR2LDdDSH/pub?gid=0&single=true&output=csv",
    ),
];

fn default_ttl_ms() -> i64 {
    DEFAULT_TTL_MS
}

/// Sheet key → published CSV URL, plus cache settings.
///
/// ```yaml
/// sheets:
///   inmun: https://docs.google.com/.../pub?gid=1&single=true&output=csv
/// cache_dir: cache
/// cache_ttl_ms: 300000
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SheetConfig {
    pub sheets: BTreeMap<String, String>,
    /// Where cached CSV rows are persisted. `None` keeps them in memory only.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    #[serde(default = "default_ttl_ms")]
    pub cache_ttl_ms: i64,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            sheets: DEFAULT_SHEET_URLS
                .iter()
                .map(|&(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            cache_dir: None,
            cache_ttl_ms: DEFAULT_TTL_MS,
        }
    }
}

impl SheetConfig {
    /// Build a config from an explicit key → URL table.
    pub fn new<K, V>(sheets: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            sheets: sheets
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            cache_dir: None,
            cache_ttl_ms: DEFAULT_TTL_MS,
        }
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Settle the cache directory: `no_cache` disables it, an explicit
    /// directory beats the configured one, and `fallback` fills any gap.
    pub fn resolve_cache_dir(
        &mut self,
        explicit: Option<PathBuf>,
        no_cache: bool,
        fallback: impl Into<PathBuf>,
    ) {
        self.cache_dir = if no_cache {
            None
        } else {
            explicit
                .or_else(|| self.cache_dir.take())
                .or_else(|| Some(fallback.into()))
        };
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("parsing sheet config YAML")
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).with_context(|| format!("reading config {:?}", path))?;
        Self::from_yaml_str(&text).with_context(|| format!("loading config {:?}", path))
    }

    /// Base URL for `key`, or `SheetError::Config` when it is not configured.
    pub fn url_for(&self, key: &str) -> Result<&str, SheetError> {
        self.sheets
            .get(key)
            .map(String::as_str)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| SheetError::Config {
                key: key.to_string(),
            })
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.sheets.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_both_sheets() {
        let cfg = SheetConfig::default();
        assert_eq!(cfg.keys().collect::<Vec<_>>(), vec!["inmun", "jayeon"]);
        assert!(cfg.url_for("inmun").unwrap().contains("gid=227554641"));
        assert_eq!(cfg.cache_ttl_ms, 300_000);
    }

    #[test]
    fn unknown_key_is_config_error() {
        let cfg = SheetConfig::new([("a", "https://example.com/pub?gid=1")]);
        match cfg.url_for("b") {
            Err(SheetError::Config { key }) => assert_eq!(key, "b"),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn empty_url_counts_as_unconfigured() {
        let cfg = SheetConfig::new([("a", "")]);
        assert!(matches!(cfg.url_for("a"), Err(SheetError::Config { .. })));
    }

    #[test]
    fn yaml_defaults_ttl() {
        let cfg = SheetConfig::from_yaml_str(
            "sheets:\n  x: https://example.com/pub?gid=3\ncache_dir: /tmp/sheets\n",
        )
        .unwrap();
        assert_eq!(cfg.url_for("x").unwrap(), "https://example.com/pub?gid=3");
        assert_eq!(cfg.cache_dir, Some(PathBuf::from("/tmp/sheets")));
        assert_eq!(cfg.cache_ttl_ms, DEFAULT_TTL_MS);
    }

    #[test]
    fn cache_dir_precedence() {
        let yaml = "sheets:\n  x: https://example.com/pub\ncache_dir: from-yaml\n";

        let mut cfg = SheetConfig::from_yaml_str(yaml).unwrap();
        cfg.resolve_cache_dir(Some(PathBuf::from("from-flag")), false, "./cache");
        assert_eq!(cfg.cache_dir, Some(PathBuf::from("from-flag")));

        let mut cfg = SheetConfig::from_yaml_str(yaml).unwrap();
        cfg.resolve_cache_dir(None, false, "./cache");
        assert_eq!(cfg.cache_dir, Some(PathBuf::from("from-yaml")));

        let mut cfg = SheetConfig::default();
        cfg.resolve_cache_dir(None, false, "./cache");
        assert_eq!(cfg.cache_dir, Some(PathBuf::from("./cache")));

        let mut cfg = SheetConfig::from_yaml_str(yaml).unwrap();
        cfg.resolve_cache_dir(Some(PathBuf::from("from-flag")), true, "./cache");
        assert_eq!(cfg.cache_dir, None);
    }

    #[test]
    fn yaml_without_sheets_is_rejected() {
        assert!(SheetConfig::from_yaml_str("cache_ttl_ms: 5").is_err());
    }
}
