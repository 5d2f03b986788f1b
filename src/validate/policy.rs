// src/validate/policy.rs
// =============================================================================
// The admission policy: every knob the validator turns.
//
// Policy::default() is the UCI crawl policy (four department domains plus the
// trap thresholds and extension denylist). Deployments can override any part
// of it with a JSON file; fields left out keep their default value.
//
// Example policy.json:
//   {
//     "allowed_domain_suffixes": [".ics.uci.edu"],
//     "max_url_length": 300
//   }
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Domains crawled by default. The leading dot forces a label boundary.
pub const DEFAULT_DOMAIN_SUFFIXES: &[&str] = &[
    ".ics.uci.edu",
    ".cs.uci.edu",
    ".informatics.uci.edu",
    ".stat.uci.edu",
];

/// Non-HTML resource types that are never worth fetching
pub const DEFAULT_DENIED_EXTENSIONS: &[&str] = &[
    // styles, scripts, images
    "css", "js", "bmp", "gif", "jpg", "jpeg", "ico", "png", "tif", "tiff",
    // audio and video
    "mid", "mp2", "mp3", "mp4", "wav", "avi", "mov", "mpeg", "ram", "m4v", "mkv", "ogg", "ogv",
    // documents
    "pdf", "ps", "eps", "tex", "ppt", "pptx", "doc", "docx", "xls", "xlsx", "names", "data",
    "dat",
    // binaries, installers and archives
    "exe", "bz2", "tar", "msi", "bin", "7z", "psd", "dmg", "iso", "epub", "dll", "cnf", "tgz",
    "sha1",
    // everything else
    "thmx", "mso", "arff", "rtf", "jar", "csv", "rm", "smil", "wmv", "swf", "wma", "zip", "rar",
    "gz",
];

pub const DEFAULT_MAX_QUERY_PARAMS: usize = 5;
pub const DEFAULT_MAX_URL_LENGTH: usize = 200;
pub const DEFAULT_MAX_PATH_SEGMENTS: usize = 10;

// Tunable admission policy
//
// #[serde(default)] lets a policy file mention only the fields it changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// Host must end with one of these (each starting with '.')
    pub allowed_domain_suffixes: Vec<String>,
    /// Reject when the query holds more than this many '=' characters
    pub max_query_params: usize,
    /// Reject URLs longer than this many characters
    pub max_url_length: usize,
    /// Reject when the path splits on '/' into more segments than this
    pub max_path_segments: usize,
    /// File extensions (no dot, any case) that are never admitted
    pub denied_extensions: Vec<String>,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            allowed_domain_suffixes: DEFAULT_DOMAIN_SUFFIXES.iter().map(|s| s.to_string()).collect(),
            max_query_params: DEFAULT_MAX_QUERY_PARAMS,
            max_url_length: DEFAULT_MAX_URL_LENGTH,
            max_path_segments: DEFAULT_MAX_PATH_SEGMENTS,
            denied_extensions: DEFAULT_DENIED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

// Problems with a policy that would make the validator misbehave
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("allowed domain list is empty, nothing could ever be admitted")]
    NoDomains,
    #[error("domain suffix '{0}' must start with '.' to match on a label boundary")]
    SuffixWithoutDot(String),
    #[error("domain suffix '{0}' has no labels after the leading dot")]
    EmptySuffix(String),
    #[error("denied extension list contains an empty entry")]
    EmptyExtension,
}

impl Policy {
    // Parses a policy from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let policy: Policy = serde_json::from_str(json).context("policy is not valid JSON")?;
        policy.validate()?;
        Ok(policy)
    }

    // Loads a policy file from disk
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read policy file {}", path.display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("invalid policy file {}", path.display()))
    }

    // Checks that the policy can be applied as written
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.allowed_domain_suffixes.is_empty() {
            return Err(PolicyError::NoDomains);
        }

        for suffix in &self.allowed_domain_suffixes {
            if !suffix.starts_with('.') {
                return Err(PolicyError::SuffixWithoutDot(suffix.clone()));
            }
            if suffix.len() == 1 {
                return Err(PolicyError::EmptySuffix(suffix.clone()));
            }
        }

        if self
            .denied_extensions
            .iter()
            .any(|ext| ext.trim_start_matches('.').trim().is_empty())
        {
            return Err(PolicyError::EmptyExtension);
        }

        Ok(())
    }
}
