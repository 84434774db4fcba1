// SPDX-License-Identifier: MIT

//! Pages-viewed criterion
//!
//! Matches the content nodes a visitor has viewed against a configured
//! target set.

use super::{parse_definition, Criterion, CriterionError};
use crate::providers::PagesViewedProvider;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// How the target node set relates to the visitor's viewed set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum PagesViewedMatch {
    ViewedAny,
    ViewedAll,
    NotViewedAny,
    NotViewedAll,
}

/// Parsed `pagesviewed` definition.
///
/// An empty `nodeIds` list is valid and follows plain set semantics: the
/// empty set is a subset of anything, so `ViewedAll` is vacuously true and
/// `NotViewedAll` vacuously false.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PagesViewedDefinition {
    #[serde(rename = "match")]
    pub match_mode: PagesViewedMatch,
    #[serde(rename = "nodeIds")]
    pub node_ids: Vec<i64>,
}

/// Matches the pages a visitor has viewed against a list of content nodes
pub struct PagesViewedCriterion {
    pages_provider: Arc<dyn PagesViewedProvider>,
}

impl PagesViewedCriterion {
    pub fn new(pages_provider: Arc<dyn PagesViewedProvider>) -> Self {
        Self { pages_provider }
    }
}

#[async_trait]
impl Criterion for PagesViewedCriterion {
    fn alias(&self) -> &'static str {
        "pagesviewed"
    }

    fn name(&self) -> &str {
        "Pages viewed"
    }

    fn description(&self) -> &str {
        "Matches pages the visitor has viewed against a given list of pages"
    }

    fn definition_schema(&self) -> Value {
        serde_json::to_value(schemars::schema_for!(PagesViewedDefinition)).unwrap_or_default()
    }

    async fn matches_visitor(&self, definition: &str) -> Result<bool, CriterionError> {
        let settings: PagesViewedDefinition = parse_definition(self.alias(), definition)?;

        let viewed = self.pages_provider.viewed_node_ids();

        // Extra viewed pages never disqualify: ViewedAll is a subset test,
        // not an equality test.
        let viewed_any = settings.node_ids.iter().any(|id| viewed.contains(id));
        let viewed_all = settings.node_ids.iter().all(|id| viewed.contains(id));

        Ok(match settings.match_mode {
            PagesViewedMatch::ViewedAny => viewed_any,
            PagesViewedMatch::ViewedAll => viewed_all,
            PagesViewedMatch::NotViewedAny => !viewed_any,
            PagesViewedMatch::NotViewedAll => !viewed_all,
        })
    }
}
