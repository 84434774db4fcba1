// SPDX-License-Identifier: MIT

//! Date/time criterion
//!
//! Matches the present moment against allowed weekdays and/or a time-of-day
//! window. Both window boundaries are inclusive; a window whose `from` is
//! later than its `to` wraps past midnight.

use super::{parse_definition, Criterion, CriterionError};
use crate::providers::Clock;
use async_trait::async_trait;
use chrono::{Datelike, NaiveTime, Weekday};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Whether the definition describes the period to be inside of or outside of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum DateTimeMatch {
    InPeriod,
    OutsidePeriod,
}

/// Weekday in a `datetime` definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    fn to_weekday(self) -> Weekday {
        match self {
            Self::Monday => Weekday::Mon,
            Self::Tuesday => Weekday::Tue,
            Self::Wednesday => Weekday::Wed,
            Self::Thursday => Weekday::Thu,
            Self::Friday => Weekday::Fri,
            Self::Saturday => Weekday::Sat,
            Self::Sunday => Weekday::Sun,
        }
    }
}

/// Parsed `datetime` definition.
///
/// `days` empty or absent means every day qualifies. `from`/`to` must be
/// given as a pair (formats `HH:MM` or `HH:MM:SS`); both absent means any
/// time of day.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DateTimeDefinition {
    #[serde(rename = "match")]
    pub match_mode: DateTimeMatch,
    #[serde(default)]
    pub days: Vec<Day>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

impl DateTimeDefinition {
    /// Resolve the time-of-day window, validating both boundaries before any
    /// signal is consulted
    fn window(&self, alias: &'static str) -> Result<Option<(NaiveTime, NaiveTime)>, CriterionError> {
        match (&self.from, &self.to) {
            (None, None) => Ok(None),
            (Some(from), Some(to)) => Ok(Some((
                parse_time(alias, from)?,
                parse_time(alias, to)?,
            ))),
            _ => Err(CriterionError::invalid_definition(
                alias,
                "'from' and 'to' must be provided together",
            )),
        }
    }
}

fn parse_time(alias: &'static str, value: &str) -> Result<NaiveTime, CriterionError> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| {
            CriterionError::invalid_definition(
                alias,
                format!("'{}' is not a time of day (expected HH:MM or HH:MM:SS)", value),
            )
        })
}

/// Matches the current date and time against a configured period
pub struct DateTimeCriterion {
    clock: Arc<dyn Clock>,
}

impl DateTimeCriterion {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

#[async_trait]
impl Criterion for DateTimeCriterion {
    fn alias(&self) -> &'static str {
        "datetime"
    }

    fn name(&self) -> &str {
        "Date and time"
    }

    fn description(&self) -> &str {
        "Matches the current date and time against allowed days of the week and a time of day window"
    }

    fn definition_schema(&self) -> Value {
        serde_json::to_value(schemars::schema_for!(DateTimeDefinition)).unwrap_or_default()
    }

    async fn matches_visitor(&self, definition: &str) -> Result<bool, CriterionError> {
        let settings: DateTimeDefinition = parse_definition(self.alias(), definition)?;
        let window = settings.window(self.alias())?;

        let now = self.clock.current_date_time();

        let day_matches = settings.days.is_empty()
            || settings
                .days
                .iter()
                .any(|day| day.to_weekday() == now.weekday());

        // Both boundaries are inclusive. from > to wraps past midnight.
        let time_matches = match window {
            None => true,
            Some((from, to)) if from <= to => now.time() >= from && now.time() <= to,
            Some((from, to)) => now.time() >= from || now.time() <= to,
        };

        let in_period = day_matches && time_matches;

        Ok(match settings.match_mode {
            DateTimeMatch::InPeriod => in_period,
            DateTimeMatch::OutsidePeriod => !in_period,
        })
    }
}
