//! YAML directory data source.
//!
//! Layout: `<root>/<domain>/<choice>.yaml`, one choice per file. Files are
//! read in sorted path order so every run sees the same sequence.

use amarantos_common::error::{AmarantosError, Result};
use amarantos_common::{Choice, EffectRecord};
use amarantos_ranker::source::ChoiceSource;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// On-disk shape of a choice file.
#[derive(Debug, Deserialize)]
struct ChoiceDocument {
    name: String,
    domain: String,
    #[serde(default)]
    specification: SpecificationDocument,
    /// Missing effects become a validation failure downstream, not a parse error.
    #[serde(default)]
    effects: Vec<EffectRecord>,
}

#[derive(Debug, Default, Deserialize)]
struct SpecificationDocument {
    #[serde(default)]
    annual_cost_usd: f64,
    #[serde(default, alias = "annual_hours")]
    annual_cost_h: f64,
}

impl From<ChoiceDocument> for Choice {
    fn from(doc: ChoiceDocument) -> Self {
        Choice {
            name: doc.name,
            domain: doc.domain,
            effects: doc.effects,
            annual_cost_usd: doc.specification.annual_cost_usd,
            annual_hours: doc.specification.annual_cost_h,
        }
    }
}

/// Parse one choice from YAML text.
pub fn parse_choice(content: &str) -> std::result::Result<Choice, serde_yaml::Error> {
    let doc: ChoiceDocument = serde_yaml::from_str(content)?;
    Ok(doc.into())
}

/// Loads choices from a directory tree of YAML files.
#[derive(Debug, Clone)]
pub struct YamlChoiceSource {
    root: PathBuf,
}

impl YamlChoiceSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn yaml_paths(&self, base: &Path) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in WalkDir::new(base).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            let is_yaml = matches!(
                entry.path().extension().and_then(|e| e.to_str()),
                Some("yaml") | Some("yml")
            );
            if entry.file_type().is_file() && is_yaml {
                paths.push(entry.into_path());
            }
        }
        Ok(paths)
    }

    fn load_file(path: &Path) -> Result<Choice> {
        let content = std::fs::read_to_string(path)?;
        parse_choice(&content).map_err(|e| {
            AmarantosError::validation(path.display().to_string(), format!("unreadable choice file: {e}"))
        })
    }
}

impl ChoiceSource for YamlChoiceSource {
    fn load_choices(&self, domain: Option<&str>) -> Result<Vec<Choice>> {
        if !self.root.is_dir() {
            return Err(AmarantosError::Config(format!(
                "data directory not found: {}",
                self.root.display()
            )));
        }

        let base = match domain {
            Some(d) => self.root.join(d),
            None => self.root.clone(),
        };
        if !base.is_dir() {
            debug!(path = %base.display(), "No such domain directory");
            return Ok(Vec::new());
        }

        let mut choices = Vec::new();
        for path in self.yaml_paths(&base)? {
            let choice = Self::load_file(&path)?;
            if domain.map_or(true, |d| choice.domain == d) {
                choices.push(choice);
            }
        }
        debug!(count = choices.len(), root = %self.root.display(), "Loaded choices");
        Ok(choices)
    }
}
