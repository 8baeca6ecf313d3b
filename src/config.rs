// src/config.rs

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{env, fs, path::Path};

use crate::genres::GenreLocale;
use crate::query::{FacetFilter, SortKey};

pub const CONFIG_PATH_VAR: &str = "RATINGSCOPE_CONFIG";
const LOG_LEVEL_VAR: &str = "LOG_LEVEL";
const GENRE_LOCALE_VAR: &str = "RATINGSCOPE_GENRE_LOCALE";
const DEFAULT_SORT_VAR: &str = "RATINGSCOPE_DEFAULT_SORT";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tracing filter directive, e.g. `info` or `ratingscope=debug`.
    pub log_level: String,
    pub genre_locale: GenreLocale,
    pub default_sort: SortKey,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            genre_locale: GenreLocale::En,
            default_sort: SortKey::RatingDesc,
        }
    }
}

impl Config {
    /// Load from `path` (if the file exists), then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) if p.exists() => {
                let raw = fs::read_to_string(p)
                    .with_context(|| format!("reading config {}", p.display()))?;
                Self::from_yaml(&raw).with_context(|| format!("parsing config {}", p.display()))?
            }
            _ => Self::default(),
        };
        cfg.apply_overrides(|key| env::var(key).ok())?;
        Ok(cfg)
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw).context("invalid config yaml")
    }

    /// Override fields from `lookup` (the process environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup(LOG_LEVEL_VAR).filter(|v| !v.trim().is_empty()) {
            self.log_level = level;
        }
        if let Some(locale) = lookup(GENRE_LOCALE_VAR) {
            self.genre_locale = locale
                .parse()
                .with_context(|| format!("{} is invalid", GENRE_LOCALE_VAR))?;
        }
        if let Some(sort) = lookup(DEFAULT_SORT_VAR) {
            self.default_sort = sort
                .parse()
                .with_context(|| format!("{} is invalid", DEFAULT_SORT_VAR))?;
        }
        Ok(())
    }

    /// The filter a fresh upload starts from.
    pub fn default_filter(&self) -> FacetFilter {
        FacetFilter {
            sort: self.default_sort,
            locale: self.genre_locale,
            ..FacetFilter::default()
        }
    }
}
