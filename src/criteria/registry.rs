// SPDX-License-Identifier: MIT

//! Criteria registry
//!
//! The host discovers criteria implementations through its own pipeline;
//! this is the registry it registers them into and routes stored
//! definitions through, keyed by alias.

use super::{
    CountryCriterion, Criterion, DateTimeCriterion, PagesViewedCriterion, RegionCriterion,
};
use crate::providers::{Clock, GeoLocationProvider, IpProvider, PagesViewedProvider};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Listing entry for the host management surface
#[derive(Debug, Clone, Serialize)]
pub struct CriterionDescriptor {
    pub alias: String,
    pub name: String,
    pub description: String,
}

#[derive(Clone)]
pub struct CriteriaRegistry {
    criteria: Arc<RwLock<HashMap<String, Arc<dyn Criterion>>>>,
}

impl CriteriaRegistry {
    pub fn new() -> Self {
        Self {
            criteria: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn register(&self, criterion: Arc<dyn Criterion>) {
        let mut criteria = self.criteria.write().await;
        criteria.insert(criterion.alias().to_string(), criterion);
    }

    pub async fn get(&self, alias: &str) -> Option<Arc<dyn Criterion>> {
        let criteria = self.criteria.read().await;
        criteria.get(alias).cloned()
    }

    /// Alias, name, and description of every registered criterion, sorted by
    /// alias, for the management surface
    pub async fn descriptors(&self) -> Vec<CriterionDescriptor> {
        let criteria = self.criteria.read().await;
        let mut descriptors: Vec<CriterionDescriptor> = criteria
            .values()
            .map(|criterion| CriterionDescriptor {
                alias: criterion.alias().to_string(),
                name: criterion.name().to_string(),
                description: criterion.description().to_string(),
            })
            .collect();
        descriptors.sort_by(|a, b| a.alias.cmp(&b.alias));
        descriptors
    }
}

impl Default for CriteriaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Register the built-in criteria against the given providers.
///
/// This is the outermost wiring path; evaluators themselves never construct
/// providers.
pub async fn register_builtin(
    registry: &CriteriaRegistry,
    ip_provider: Arc<dyn IpProvider>,
    geo_provider: Arc<dyn GeoLocationProvider>,
    pages_provider: Arc<dyn PagesViewedProvider>,
    clock: Arc<dyn Clock>,
) {
    registry
        .register(Arc::new(CountryCriterion::new(
            ip_provider.clone(),
            geo_provider.clone(),
        )))
        .await;
    registry
        .register(Arc::new(RegionCriterion::new(ip_provider, geo_provider)))
        .await;
    registry
        .register(Arc::new(PagesViewedCriterion::new(pages_provider)))
        .await;
    registry
        .register(Arc::new(DateTimeCriterion::new(clock)))
        .await;
}
