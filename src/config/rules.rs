//! Rule prompt configuration
//!
//! The system prompts for every model call live in plain text files so they
//! can be tuned without a rebuild.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::error::{ConfigError, ValidationError};

/// Paths of the rule files
#[derive(Debug, Clone, Deserialize)]
pub struct RulesConfig {
    #[serde(default = "default_dialogue")]
    pub dialogue_path: PathBuf,

    #[serde(default = "default_dialogue_cot")]
    pub dialogue_cot_path: PathBuf,

    #[serde(default = "default_finalizer")]
    pub finalizer_path: PathBuf,

    #[serde(default = "default_prompt_summary")]
    pub prompt_summary_path: PathBuf,

    #[serde(default = "default_history_summary")]
    pub history_summary_path: PathBuf,

    #[serde(default = "default_digest")]
    pub digest_path: PathBuf,
}

/// Loaded rule texts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rules {
    pub dialogue: String,
    pub dialogue_cot: String,
    pub finalizer: String,
    pub prompt_summary: String,
    pub history_summary: String,
    pub digest: String,
}

impl RulesConfig {
    /// Points every rule at `<dir>/<default file name>`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            dialogue_path: dir.join("dialogue.txt"),
            dialogue_cot_path: dir.join("dialogue_cot.txt"),
            finalizer_path: dir.join("finalizer.txt"),
            prompt_summary_path: dir.join("prompt_summary.txt"),
            history_summary_path: dir.join("history_summary.txt"),
            digest_path: dir.join("digest.txt"),
        }
    }

    /// Read every rule file.
    ///
    /// # Errors
    ///
    /// - `RuleFile` if a file cannot be read
    /// - `EmptyRuleFile` if a file holds only whitespace
    pub fn load(&self) -> Result<Rules, ConfigError> {
        Ok(Rules {
            dialogue: read_rule(&self.dialogue_path)?,
            dialogue_cot: read_rule(&self.dialogue_cot_path)?,
            finalizer: read_rule(&self.finalizer_path)?,
            prompt_summary: read_rule(&self.prompt_summary_path)?,
            history_summary: read_rule(&self.history_summary_path)?,
            digest: read_rule(&self.digest_path)?,
        })
    }

    /// Validate rule configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let paths = [
            (&self.dialogue_path, "rules.dialogue_path"),
            (&self.dialogue_cot_path, "rules.dialogue_cot_path"),
            (&self.finalizer_path, "rules.finalizer_path"),
            (&self.prompt_summary_path, "rules.prompt_summary_path"),
            (&self.history_summary_path, "rules.history_summary_path"),
            (&self.digest_path, "rules.digest_path"),
        ];

        for (path, name) in paths {
            if path.as_os_str().is_empty() {
                return Err(ValidationError::MissingRequired(name));
            }
        }
        Ok(())
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self::in_dir("rules")
    }
}

fn read_rule(path: &Path) -> Result<String, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::RuleFile {
        path: path.to_path_buf(),
        source,
    })?;

    let text = text.trim();
    if text.is_empty() {
        return Err(ConfigError::EmptyRuleFile(path.to_path_buf()));
    }
    Ok(text.to_string())
}

fn default_dialogue() -> PathBuf {
    PathBuf::from("rules/dialogue.txt")
}

fn default_dialogue_cot() -> PathBuf {
    PathBuf::from("rules/dialogue_cot.txt")
}

fn default_finalizer() -> PathBuf {
    PathBuf::from("rules/finalizer.txt")
}

fn default_prompt_summary() -> PathBuf {
    PathBuf::from("rules/prompt_summary.txt")
}

fn default_history_summary() -> PathBuf {
    PathBuf::from("rules/history_summary.txt")
}

fn default_digest() -> PathBuf {
    PathBuf::from("rules/digest.txt")
}
