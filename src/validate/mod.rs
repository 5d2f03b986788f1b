// src/validate/mod.rs
// =============================================================================
// The URL validator: decides which candidate links the crawler may queue.
//
// Submodules:
// - policy: the tunable knobs (domains, trap thresholds, extension denylist)
// - rules: the Validator itself and the Rejection reasons it reports
// =============================================================================

mod policy;
mod rules;

pub use policy::{
    Policy, PolicyError, DEFAULT_DENIED_EXTENSIONS, DEFAULT_DOMAIN_SUFFIXES,
    DEFAULT_MAX_PATH_SEGMENTS, DEFAULT_MAX_QUERY_PARAMS, DEFAULT_MAX_URL_LENGTH,
};
pub use rules::{RejectedLink, Rejection, Validator};
