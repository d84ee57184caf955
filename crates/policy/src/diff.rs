//! Plan diffing
//!
//! Compares a tenant's current effective entitlement against a target
//! plan/add-on state so upgrade and downgrade screens can spell out exactly
//! what is gained or lost. All four comparisons are pure and total, and the
//! unlimited sentinel is handled as its own case — never as an ordinary
//! number.

use std::collections::BTreeMap;

use serde::Serialize;
use tenantry_shared::{Catalog, LimitValue};

use crate::entitlement::Entitlement;

/// A feature the tenant would gain or lose
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureChange {
    pub key: String,
    pub label: String,
}

/// A limit that changes between current and target, rendered for display
/// (`-1` shows as "Unlimited")
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LimitChange {
    pub key: String,
    pub label: String,
    pub from: String,
    pub to: String,
}

fn feature_label(catalog: &Catalog, key: &str) -> String {
    catalog
        .feature(key)
        .map(|entry| entry.label.clone())
        .unwrap_or_else(|| key.to_string())
}

fn limit_label(catalog: &Catalog, key: &str) -> String {
    catalog
        .limit(key)
        .map(|entry| entry.label.clone())
        .unwrap_or_else(|| key.to_string())
}

/// Features enabled now but not in the target — the downgrade warning list.
pub fn lost_features(
    current: &BTreeMap<String, bool>,
    target: &BTreeMap<String, bool>,
    catalog: &Catalog,
) -> Vec<FeatureChange> {
    current
        .iter()
        .filter(|(key, enabled)| **enabled && !target.get(*key).copied().unwrap_or(false))
        .map(|(key, _)| FeatureChange {
            key: key.clone(),
            label: feature_label(catalog, key),
        })
        .collect()
}

/// Features the target enables that the tenant lacks today — upgrade
/// messaging.
pub fn gained_features(
    current: &BTreeMap<String, bool>,
    target: &BTreeMap<String, bool>,
    catalog: &Catalog,
) -> Vec<FeatureChange> {
    lost_features(target, current, catalog)
}

fn is_reduction(current: LimitValue, target: LimitValue) -> bool {
    match (current, target) {
        // Losing unlimited is always a reduction
        (LimitValue::Unlimited, LimitValue::Unlimited) => false,
        (LimitValue::Unlimited, _) => true,
        (_, LimitValue::Unlimited) => false,
        // Both finite: raw comparison is safe (values are >= 0)
        (current, target) => target.as_raw() < current.as_raw(),
    }
}

/// Limits that shrink when moving to the target (unlimited -> capped, a
/// smaller cap, or a cap dropping to unavailable).
pub fn reduced_limits(
    current: &BTreeMap<String, LimitValue>,
    target: &BTreeMap<String, LimitValue>,
    catalog: &Catalog,
) -> Vec<LimitChange> {
    current
        .iter()
        .filter_map(|(key, from)| {
            let to = target.get(key).copied().unwrap_or(LimitValue::Unavailable);
            is_reduction(*from, to).then(|| LimitChange {
                key: key.clone(),
                label: limit_label(catalog, key),
                from: from.to_string(),
                to: to.to_string(),
            })
        })
        .collect()
}

/// Limits that grow when moving to the target (capped -> unlimited or a
/// larger cap).
pub fn increased_limits(
    current: &BTreeMap<String, LimitValue>,
    target: &BTreeMap<String, LimitValue>,
    catalog: &Catalog,
) -> Vec<LimitChange> {
    target
        .iter()
        .filter_map(|(key, to)| {
            let from = current.get(key).copied().unwrap_or(LimitValue::Unavailable);
            is_reduction(*to, from).then(|| LimitChange {
                key: key.clone(),
                label: limit_label(catalog, key),
                from: from.to_string(),
                to: to.to_string(),
            })
        })
        .collect()
}

/// Full comparison between two resolved entitlements
#[derive(Debug, Clone, Serialize)]
pub struct PlanDiff {
    pub lost_features: Vec<FeatureChange>,
    pub gained_features: Vec<FeatureChange>,
    pub reduced_limits: Vec<LimitChange>,
    pub increased_limits: Vec<LimitChange>,
}

impl PlanDiff {
    pub fn between(current: &Entitlement, target: &Entitlement, catalog: &Catalog) -> Self {
        Self {
            lost_features: lost_features(&current.features, &target.features, catalog),
            gained_features: gained_features(&current.features, &target.features, catalog),
            reduced_limits: reduced_limits(&current.limits, &target.limits, catalog),
            increased_limits: increased_limits(&current.limits, &target.limits, catalog),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lost_features.is_empty()
            && self.gained_features.is_empty()
            && self.reduced_limits.is_empty()
            && self.increased_limits.is_empty()
    }
}
