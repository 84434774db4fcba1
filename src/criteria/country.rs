// SPDX-License-Identifier: MIT

//! Country criterion
//!
//! Matches the visitor's country, derived from their IP address, against a
//! configured list of country codes.

use super::{parse_definition, Criterion, CriterionError, GeoLocationMatch};
use crate::providers::{GeoLocationProvider, IpProvider};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Parsed `country` definition.
///
/// The definition editor also emits a `names` array for display; it carries
/// no matching behavior and is ignored here along with any other extra
/// fields.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CountryDefinition {
    #[serde(rename = "match")]
    pub match_mode: GeoLocationMatch,
    /// ISO 3166-1 alpha-2 codes, compared case-insensitively
    pub codes: Vec<String>,
}

/// Matches visitor country derived from their IP address
pub struct CountryCriterion {
    ip_provider: Arc<dyn IpProvider>,
    geo_provider: Arc<dyn GeoLocationProvider>,
}

impl CountryCriterion {
    pub fn new(
        ip_provider: Arc<dyn IpProvider>,
        geo_provider: Arc<dyn GeoLocationProvider>,
    ) -> Self {
        Self {
            ip_provider,
            geo_provider,
        }
    }
}

#[async_trait]
impl Criterion for CountryCriterion {
    fn alias(&self) -> &'static str {
        "country"
    }

    fn name(&self) -> &str {
        "Country"
    }

    fn description(&self) -> &str {
        "Matches visitor country derived from their IP address to a given list of countries"
    }

    fn definition_schema(&self) -> Value {
        serde_json::to_value(schemars::schema_for!(CountryDefinition)).unwrap_or_default()
    }

    async fn matches_visitor(&self, definition: &str) -> Result<bool, CriterionError> {
        let settings: CountryDefinition = parse_definition(self.alias(), definition)?;

        let Some(ip) = self.ip_provider.requester_ip() else {
            return Ok(settings.match_mode == GeoLocationMatch::CouldNotBeLocated);
        };

        let Some(country) = self.geo_provider.country_for_ip(&ip).await else {
            return Ok(settings.match_mode == GeoLocationMatch::CouldNotBeLocated);
        };

        if settings.match_mode == GeoLocationMatch::CouldNotBeLocated {
            // The visitor could be located, contradicting the setting.
            return Ok(false);
        }

        let matched = settings
            .codes
            .iter()
            .any(|code| code.eq_ignore_ascii_case(&country.code));

        Ok(match settings.match_mode {
            GeoLocationMatch::IsLocatedIn => matched,
            GeoLocationMatch::IsNotLocatedIn => !matched,
            GeoLocationMatch::CouldNotBeLocated => false,
        })
    }
}
