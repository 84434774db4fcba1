// SPDX-License-Identifier: MIT

//! Typed error handling for criterion evaluation
//!
//! Only configuration faults are errors here: a missing definition or one
//! that doesn't parse. Signal absence — an unresolvable IP, an empty
//! page-view history — is a normal state each evaluator branches on and is
//! never raised as a fault.

use thiserror::Error;

/// Errors raised while evaluating a criterion definition.
///
/// These always surface to the host/administrator layer; treating a
/// misconfigured definition as "visitor does not match" would hide the
/// mistake indefinitely. Visitors only ever see a binary verdict.
#[derive(Debug, Error)]
pub enum CriterionError {
    /// Definition string was empty; nothing was parsed
    #[error("definition for criterion '{alias}' is missing or empty")]
    ArgumentMissing { alias: &'static str },

    /// Definition was present but is not valid JSON, or does not match the
    /// criterion's schema
    #[error("invalid definition for criterion '{alias}': {message}")]
    InvalidDefinition {
        alias: &'static str,
        message: String,
    },
}

impl CriterionError {
    /// Create an argument-missing fault
    pub fn argument_missing(alias: &'static str) -> Self {
        Self::ArgumentMissing { alias }
    }

    /// Create an invalid-definition fault
    pub fn invalid_definition(alias: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            alias,
            message: message.into(),
        }
    }
}
