// SPDX-License-Identifier: MIT

//! cohort-rs — visitor cohort personalisation criteria
//!
//! Classifies site visitors into named cohorts by evaluating
//! administrator-authored JSON criterion definitions against live visitor
//! signals: IP address, geographic location, page-view history, and the
//! clock. The two halves of the crate are:
//!
//! - [`providers`] — narrow read-only signal sources, one visitor fact each
//! - [`criteria`] — the [`criteria::Criterion`] contract, one evaluator per
//!   criterion kind, and the registry hosts route definitions through

pub mod criteria;
pub mod providers;
