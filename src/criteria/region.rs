// SPDX-License-Identifier: MIT

//! Region criterion
//!
//! Matches the visitor's region, derived from their IP address, against a
//! configured list of region names within one country.

use super::{parse_definition, Criterion, CriterionError, GeoLocationMatch};
use crate::providers::{GeoLocationProvider, IpProvider};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Parsed `region` definition
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RegionDefinition {
    #[serde(rename = "match")]
    pub match_mode: GeoLocationMatch,
    /// ISO 3166-1 alpha-2 code of the country the regions belong to
    #[serde(rename = "countryCode")]
    pub country_code: String,
    /// Acceptable region name variants, compared case-insensitively
    pub names: Vec<String>,
}

/// Matches visitor region derived from their IP address
pub struct RegionCriterion {
    ip_provider: Arc<dyn IpProvider>,
    geo_provider: Arc<dyn GeoLocationProvider>,
}

impl RegionCriterion {
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
impl Criterion for RegionCriterion {
    fn alias(&self) -> &'static str {
        "region"
    }

    fn name(&self) -> &str {
        "Region"
    }

    fn description(&self) -> &str {
        "Matches visitor region derived from their IP address to a given list of regions"
    }

    fn definition_schema(&self) -> Value {
        serde_json::to_value(schemars::schema_for!(RegionDefinition)).unwrap_or_default()
    }

    async fn matches_visitor(&self, definition: &str) -> Result<bool, CriterionError> {
        let settings: RegionDefinition = parse_definition(self.alias(), definition)?;

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

        let matched_country = country.code.eq_ignore_ascii_case(&settings.country_code);

        // A country match with no matching region name is still a negative
        // region match, distinct from "could not be located".
        let mut matched_region = false;
        if matched_country {
            if let Some(region) = self.geo_provider.region_for_ip(&ip).await {
                matched_region = region.all_names().any(|name| {
                    settings
                        .names
                        .iter()
                        .any(|wanted| wanted.to_lowercase() == name.to_lowercase())
                });
            }
        }

        Ok(match settings.match_mode {
            GeoLocationMatch::IsLocatedIn => matched_region,
            GeoLocationMatch::IsNotLocatedIn => !matched_region,
            GeoLocationMatch::CouldNotBeLocated => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{Country, Region, StaticIpProvider};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock geolocation provider with call counting
    struct MockGeoProvider {
        country: Option<Country>,
        region: Option<Region>,
        calls: AtomicUsize,
    }

    impl MockGeoProvider {
        fn new(country: Option<Country>, region: Option<Region>) -> Self {
            Self {
                country,
                region,
                calls: AtomicUsize::new(0),
            }
        }

        fn located(region_names: &[&str]) -> Self {
            Self::new(
                Some(Country {
                    code: "US".to_string(),
                    name: "United States".to_string(),
                }),
                Some(Region {
                    country_code: "US".to_string(),
                    names: region_names.iter().map(|n| n.to_string()).collect(),
                }),
            )
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GeoLocationProvider for MockGeoProvider {
        async fn country_for_ip(&self, _ip: &str) -> Option<Country> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.country.clone()
        }

        async fn region_for_ip(&self, _ip: &str) -> Option<Region> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.region.clone()
        }
    }

    fn criterion(ip: Arc<dyn IpProvider>, geo: Arc<MockGeoProvider>) -> RegionCriterion {
        RegionCriterion::new(ip, geo)
    }

    const DEFINITION: &str =
        r#"{"match": "IsLocatedIn", "countryCode": "US", "names": ["California"]}"#;

    #[tokio::test]
    async fn test_empty_definition_is_argument_missing() {
        let geo = Arc::new(MockGeoProvider::located(&["California"]));
        let criteria = criterion(Arc::new(StaticIpProvider::new("1.2.3.4")), geo.clone());

        let result = criteria.matches_visitor("").await;
        assert!(matches!(result, Err(CriterionError::ArgumentMissing { .. })));
        assert_eq!(geo.call_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_definition_makes_no_provider_calls() {
        let geo = Arc::new(MockGeoProvider::located(&["California"]));
        let criteria = criterion(Arc::new(StaticIpProvider::new("1.2.3.4")), geo.clone());

        let result = criteria.matches_visitor("invalid").await;
        assert!(matches!(
            result,
            Err(CriterionError::InvalidDefinition { .. })
        ));
        assert_eq!(geo.call_count(), 0);
    }

    #[tokio::test]
    async fn test_located_in_matching_region_returns_true() {
        let geo = Arc::new(MockGeoProvider::located(&["California"]));
        let criteria = criterion(Arc::new(StaticIpProvider::new("1.2.3.4")), geo);

        assert!(criteria.matches_visitor(DEFINITION).await.unwrap());
    }

    #[tokio::test]
    async fn test_located_in_different_region_returns_false() {
        let geo = Arc::new(MockGeoProvider::located(&["Texas"]));
        let criteria = criterion(Arc::new(StaticIpProvider::new("1.2.3.4")), geo);

        assert!(!criteria.matches_visitor(DEFINITION).await.unwrap());
    }

    #[tokio::test]
    async fn test_region_name_comparison_is_case_insensitive() {
        let geo = Arc::new(MockGeoProvider::located(&["CALIFORNIA"]));
        let criteria = criterion(Arc::new(StaticIpProvider::new("1.2.3.4")), geo);

        assert!(criteria.matches_visitor(DEFINITION).await.unwrap());
    }

    #[tokio::test]
    async fn test_country_code_comparison_is_case_insensitive() {
        let geo = Arc::new(MockGeoProvider::located(&["California"]));
        let criteria = criterion(Arc::new(StaticIpProvider::new("1.2.3.4")), geo);

        let definition =
            r#"{"match": "IsLocatedIn", "countryCode": "us", "names": ["California"]}"#;
        assert!(criteria.matches_visitor(definition).await.unwrap());
    }

    #[tokio::test]
    async fn test_not_located_in_inverts_region_match() {
        let geo = Arc::new(MockGeoProvider::located(&["Texas"]));
        let criteria = criterion(Arc::new(StaticIpProvider::new("1.2.3.4")), geo);

        let definition =
            r#"{"match": "IsNotLocatedIn", "countryCode": "US", "names": ["California"]}"#;
        assert!(criteria.matches_visitor(definition).await.unwrap());
    }

    #[tokio::test]
    async fn test_absent_ip_matches_only_could_not_be_located() {
        let geo = Arc::new(MockGeoProvider::located(&["California"]));
        let criteria = criterion(Arc::new(StaticIpProvider::unresolved()), geo.clone());

        let definition =
            r#"{"match": "CouldNotBeLocated", "countryCode": "US", "names": ["California"]}"#;
        assert!(criteria.matches_visitor(definition).await.unwrap());
        assert!(!criteria.matches_visitor(DEFINITION).await.unwrap());
        // Short-circuited before any geolocation lookup.
        assert_eq!(geo.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unresolvable_country_matches_could_not_be_located() {
        let geo = Arc::new(MockGeoProvider::new(None, None));
        let criteria = criterion(Arc::new(StaticIpProvider::new("10.0.0.1")), geo);

        let definition =
            r#"{"match": "CouldNotBeLocated", "countryCode": "US", "names": ["California"]}"#;
        assert!(criteria.matches_visitor(definition).await.unwrap());
    }

    #[tokio::test]
    async fn test_located_visitor_contradicts_could_not_be_located() {
        let geo = Arc::new(MockGeoProvider::located(&["California"]));
        let criteria = criterion(Arc::new(StaticIpProvider::new("1.2.3.4")), geo);

        let definition =
            r#"{"match": "CouldNotBeLocated", "countryCode": "US", "names": ["California"]}"#;
        assert!(!criteria.matches_visitor(definition).await.unwrap());
    }

    #[tokio::test]
    async fn test_country_match_without_region_data_is_not_a_region_match() {
        let geo = Arc::new(MockGeoProvider::new(
            Some(Country {
                code: "US".to_string(),
                name: "United States".to_string(),
            }),
            None,
        ));
        let criteria = criterion(Arc::new(StaticIpProvider::new("1.2.3.4")), geo);

        assert!(!criteria.matches_visitor(DEFINITION).await.unwrap());
    }

    #[tokio::test]
    async fn test_evaluation_is_idempotent() {
        let geo = Arc::new(MockGeoProvider::located(&["California"]));
        let criteria = criterion(Arc::new(StaticIpProvider::new("1.2.3.4")), geo);

        let first = criteria.matches_visitor(DEFINITION).await.unwrap();
        let second = criteria.matches_visitor(DEFINITION).await.unwrap();
        assert_eq!(first, second);
    }
}
