// src/validate/rules.rs
// =============================================================================
// The admission pipeline.
//
// Checks run in a fixed order and the first one that fails decides:
//   1. scheme is http or https
//   2. host ends with an allowed ".suffix"
//   3. query holds at most max_query_params '=' characters
//   4. the URL is at most max_url_length characters
//   5. the path splits on '/' into at most max_path_segments pieces
//   6. the path does not end in a denied file extension
//
// The validator only reads its Policy, so the same URL always gets the same
// answer and a Validator can be shared across threads freely.
// =============================================================================

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;
use url::Url;

use super::policy::{Policy, PolicyError};

// Why a URL was not admitted
//
// Each variant carries the value that tripped the check so reports can show it
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    #[error("malformed URL ({detail})")]
    Malformed { detail: String },
    #[error("scheme '{scheme}' is not http or https")]
    Scheme { scheme: String },
    #[error("host '{host}' is outside the allowed domains")]
    Domain { host: String },
    #[error("query has {count} parameters (max {max})")]
    TooManyQueryParams { count: usize, max: usize },
    #[error("URL is {length} characters long (max {max})")]
    TooLong { length: usize, max: usize },
    #[error("path has {segments} segments (max {max})")]
    TooDeep { segments: usize, max: usize },
    #[error("path ends in denied extension '.{extension}'")]
    DeniedExtension { extension: String },
}

// A rejected URL together with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedLink {
    pub url: String,
    #[serde(flatten)]
    pub rejection: Rejection,
}

// Decides whether candidate links may enter the frontier
#[derive(Debug, Clone)]
pub struct Validator {
    policy: Policy,
    // lowercase, no leading dot
    denied_extensions: HashSet<String>,
    // lowercase, leading dot kept
    domain_suffixes: Vec<String>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::build(Policy::default())
    }
}

impl Validator {
    // Builds a validator after checking the policy
    pub fn new(policy: Policy) -> Result<Self, PolicyError> {
        policy.validate()?;
        Ok(Self::build(policy))
    }

    // Normalises the policy lists once so every check is a plain lookup
    //
    // collect() builds a HashSet or a Vec here: the target type comes from
    // the struct fields below
    fn build(policy: Policy) -> Self {
        let denied_extensions = policy
            .denied_extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        let domain_suffixes = policy
            .allowed_domain_suffixes
            .iter()
            .map(|suffix| suffix.trim().to_ascii_lowercase())
            .collect();

        Self {
            policy,
            denied_extensions,
            domain_suffixes,
        }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Admit or reject `url`. Never panics; unparseable input is rejected.
    pub fn is_valid(&self, url: &str) -> bool {
        self.evaluate(url).is_ok()
    }

    // Runs the pipeline and reports the first failing check
    pub fn evaluate(&self, url: &str) -> Result<(), Rejection> {
        let parsed = Url::parse(url).map_err(|e| Rejection::Malformed {
            detail: e.to_string(),
        })?;

        self.check_scheme(&parsed)?;
        self.check_domain(&parsed)?;
        self.check_query(&parsed)?;
        self.check_length(url)?;
        self.check_depth(&parsed)?;
        self.check_extension(&parsed)
    }

    // Splits a batch into admitted links and rejected links with reasons
    //
    // Input order is preserved on both sides.
    pub fn partition<I, S>(&self, urls: I) -> (Vec<String>, Vec<RejectedLink>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut admitted = Vec::new();
        let mut rejected = Vec::new();

        for url in urls {
            let url = url.into();
            match self.evaluate(&url) {
                Ok(()) => admitted.push(url),
                Err(rejection) => rejected.push(RejectedLink { url, rejection }),
            }
        }

        (admitted, rejected)
    }

    fn check_scheme(&self, url: &Url) -> Result<(), Rejection> {
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(Rejection::Scheme {
                scheme: other.to_string(),
            }),
        }
    }

    // The host has to end with ".suffix", so "evilics.uci.edu" never matches
    // ".ics.uci.edu" and neither does the bare apex "ics.uci.edu"
    fn check_domain(&self, url: &Url) -> Result<(), Rejection> {
        let host = url.host_str().unwrap_or_default();
        let host_lower = host.to_ascii_lowercase();

        if self
            .domain_suffixes
            .iter()
            .any(|suffix| host_lower.ends_with(suffix.as_str()))
        {
            Ok(())
        } else {
            Err(Rejection::Domain {
                host: host.to_string(),
            })
        }
    }

    fn check_query(&self, url: &Url) -> Result<(), Rejection> {
        // map_or(0, ...) covers "no query at all" and "count the query" in one
        // expression; a URL without '?' has zero parameters
        let count = url.query().map_or(0, |q| q.matches('=').count());
        if count > self.policy.max_query_params {
            return Err(Rejection::TooManyQueryParams {
                count,
                max: self.policy.max_query_params,
            });
        }
        Ok(())
    }

    // Measured in characters of the decoded URL
    //
    // Extracted links come out of Url::join percent-encoded, so "é" shows up
    // as "%C3%A9". Decoding first means a non-ASCII path is measured by what
    // it says, not by how many bytes its encoding takes.
    fn check_length(&self, raw: &str) -> Result<(), Rejection> {
        let length = decoded_len(raw);
        if length > self.policy.max_url_length {
            return Err(Rejection::TooLong {
                length,
                max: self.policy.max_url_length,
            });
        }
        Ok(())
    }

    // "/a/b/c" splits into ["", "a", "b", "c"]: 4 segments
    fn check_depth(&self, url: &Url) -> Result<(), Rejection> {
        let segments = url.path().split('/').count();
        if segments > self.policy.max_path_segments {
            return Err(Rejection::TooDeep {
                segments,
                max: self.policy.max_path_segments,
            });
        }
        Ok(())
    }

    // Only the path is inspected: "/doc.pdf?x=1" is still a pdf
    fn check_extension(&self, url: &Url) -> Result<(), Rejection> {
        match path_extension(url.path()) {
            Some(extension) if self.denied_extensions.contains(&extension) => {
                Err(Rejection::DeniedExtension { extension })
            }
            _ => Ok(()),
        }
    }
}

// Character count of `raw` after percent-decoding
//
// decode_binary never fails: a stray '%' that isn't followed by two hex
// digits is kept as is. Byte runs that don't form valid UTF-8 count as
// replacement characters.
fn decoded_len(raw: &str) -> usize {
    let bytes = urlencoding::decode_binary(raw.as_bytes());
    String::from_utf8_lossy(&bytes).chars().count()
}

// Lowercased text after the last '.' of the path, if that dot is in the
// final path segment
//
// rsplit_once splits at the LAST '.', so "/src.tar.gz" gives ("/src.tar", "gz").
// It returns None when there is no '.', and the ? hands that None straight
// back to the caller.
fn path_extension(path: &str) -> Option<String> {
    let (_, extension) = path.rsplit_once('.')?;
    if extension.contains('/') {
        return None;
    }
    Some(extension.to_ascii_lowercase())
}
