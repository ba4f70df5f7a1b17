//! Interface labels (i18n)
//!
//! Built-in label sets ship for pt-BR and en. A site may override any label
//! with a flat `languages/<language>.yml` file.

use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::helpers::Locale;

const PT_BR: &str = include_str!("pt-BR.yml");
const EN: &str = include_str!("en.yml");

/// Labels for the configured language, with English fallback
#[derive(Debug, Clone)]
pub struct I18n {
    labels: HashMap<String, String>,
    fallback: HashMap<String, String>,
}

impl I18n {
    /// Create the label set for `locale`
    pub fn new(locale: Locale) -> Result<Self> {
        let labels = match locale {
            Locale::PtBr => parse_labels(PT_BR)?,
            Locale::En => parse_labels(EN)?,
        };
        Ok(Self {
            labels,
            fallback: parse_labels(EN)?,
        })
    }

    /// Apply overrides from `dir/<language>.yml`, if that file exists
    pub fn load_overrides<P: AsRef<Path>>(&mut self, dir: P, language: &str) -> Result<()> {
        let path = dir.as_ref().join(format!("{}.yml", language));
        if !path.exists() {
            return Ok(());
        }

        let content = fs::read_to_string(&path)?;
        match parse_labels(&content) {
            Ok(overrides) => {
                tracing::debug!("Loaded {} labels from {:?}", overrides.len(), path);
                self.labels.extend(overrides);
            }
            Err(e) => {
                tracing::warn!("Failed to parse language file {:?}: {}", path, e);
            }
        }
        Ok(())
    }

    /// Label for `key`; the key itself when no language defines it
    pub fn get(&self, key: &str) -> String {
        self.labels
            .get(key)
            .or_else(|| self.fallback.get(key))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// All labels, for the template context
    pub fn all(&self) -> HashMap<String, String> {
        let mut all = self.fallback.clone();
        all.extend(self.labels.clone());
        all
    }
}

fn parse_labels(content: &str) -> Result<HashMap<String, String>> {
    let raw: HashMap<String, serde_yaml::Value> = serde_yaml::from_str(content)?;
    Ok(raw
        .into_iter()
        .filter_map(|(key, value)| {
            let value = match value {
                serde_yaml::Value::String(s) => s,
                serde_yaml::Value::Number(n) => n.to_string(),
                serde_yaml::Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some((key, value))
        })
        .collect())
}
