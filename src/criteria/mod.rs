// SPDX-License-Identifier: MIT

//! Criterion contract and evaluators
//!
//! Each criterion is an independent leaf implementation of the [`Criterion`]
//! trait: parse a JSON definition, consult the relevant signal providers,
//! return a boolean verdict. Evaluators hold only injected provider
//! references and no per-request state, so one instance serves concurrent
//! evaluations. Adding a criterion kind means adding a module here and
//! registering it; existing criteria are never touched.

pub mod country;
pub mod date_time;
mod error;
pub mod pages_viewed;
pub mod region;
pub mod registry;

pub use country::CountryCriterion;
pub use date_time::DateTimeCriterion;
pub use error::CriterionError;
pub use pages_viewed::PagesViewedCriterion;
pub use region::RegionCriterion;
pub use registry::{CriteriaRegistry, CriterionDescriptor};

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Trait implemented by every personalisation criterion.
///
/// Implementations are stateless with respect to visitor data: providers go
/// in at construction, a definition string goes into each evaluation, and a
/// verdict comes out. Nothing else escapes — provider lookup failures are
/// absorbed into `Option` results and resolved by each criterion's match
/// rules, never propagated as faults.
#[async_trait]
pub trait Criterion: Send + Sync {
    /// Machine-readable identifier the host routes stored definitions by.
    /// Must never change once shipped; persisted definitions key on it.
    fn alias(&self) -> &'static str;

    /// Human-readable name for the management surface. Presentation only.
    fn name(&self) -> &str;

    /// Human-readable description for the management surface.
    /// Presentation only.
    fn description(&self) -> &str;

    /// JSON Schema of the definition format, for the definition editor
    fn definition_schema(&self) -> Value;

    /// Evaluate the given JSON definition against the current visitor.
    ///
    /// # Errors
    ///
    /// [`CriterionError::ArgumentMissing`] when `definition` is empty,
    /// [`CriterionError::InvalidDefinition`] when it is not valid JSON for
    /// the criterion's schema. No provider is consulted in either case.
    async fn matches_visitor(&self, definition: &str) -> Result<bool, CriterionError>;
}

/// How a geographic definition relates to the visitor's resolved location.
///
/// Shared by the `region` and `country` criteria. `CouldNotBeLocated`
/// matches visitors whose address yields no location at all — that is a
/// meaningful audience, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum GeoLocationMatch {
    IsLocatedIn,
    IsNotLocatedIn,
    CouldNotBeLocated,
}

/// Parse a criterion definition string into its typed settings.
///
/// An empty or blank definition is an `ArgumentMissing` fault; anything that
/// fails to deserialize into the expected shape (bad JSON, missing required
/// fields, unrecognized match-mode values) is an `InvalidDefinition` fault.
/// Unknown extra fields are ignored. Callers run this before touching any
/// provider so a malformed definition never triggers a lookup.
pub(crate) fn parse_definition<T: DeserializeOwned>(
    alias: &'static str,
    definition: &str,
) -> Result<T, CriterionError> {
    if definition.trim().is_empty() {
        return Err(CriterionError::argument_missing(alias));
    }

    serde_json::from_str(definition)
        .map_err(|e| CriterionError::invalid_definition(alias, e.to_string()))
}
