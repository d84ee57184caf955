//! Plan validation
//!
//! Validation never throws on bad input: every check accumulates into a
//! [`ValidationReport`] so admin screens can show all problems in one pass.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use tenantry_shared::{Catalog, PlanTier};

/// Fixed country -> currency mapping. Plans must price in the local currency.
const COUNTRY_CURRENCIES: &[(&str, &str)] = &[
    ("IN", "INR"),
    ("US", "USD"),
    ("GB", "GBP"),
    ("AE", "AED"),
    ("SG", "SGD"),
    ("MY", "MYR"),
    ("AU", "AUD"),
    ("CA", "CAD"),
];

/// Allowed base price points for India. Super-admin override bypasses this
/// whitelist only, never the currency check.
const INDIA_PRICE_POINTS: &[Decimal] = &[dec!(0), dec!(99), dec!(199)];

/// Accumulated validation outcome
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Fold another report into this one, accumulating its errors
    pub fn merge(mut self, other: ValidationReport) -> Self {
        self.errors.extend(other.errors);
        self.valid = self.errors.is_empty();
        self
    }
}

fn expected_currency(country_code: &str) -> Option<&'static str> {
    COUNTRY_CURRENCIES
        .iter()
        .find(|(country, _)| *country == country_code)
        .map(|(_, currency)| *currency)
}

/// Validate a plan's feature flags against the catalog and tier rules.
///
/// Every key must exist in the feature catalog, and free-tier plans may not
/// enable features flagged `restricted_on_free`.
pub fn validate_feature_flags(
    flags: &BTreeMap<String, bool>,
    tier: PlanTier,
    catalog: &Catalog,
) -> ValidationReport {
    let mut errors = Vec::new();
    for (key, enabled) in flags {
        match catalog.feature(key) {
            None => errors.push(format!("Unknown feature key: {}", key)),
            Some(entry) => {
                if tier.is_free() && entry.restricted_on_free && *enabled {
                    errors.push(format!(
                        "Feature {} is not available on the free tier",
                        key
                    ));
                }
            }
        }
    }
    ValidationReport::from_errors(errors)
}

/// Validate raw limit values against the catalog.
///
/// Values arrive in wire form: -1 unlimited, 0 unavailable, n > 0 a hard cap.
/// Anything below -1 is rejected.
pub fn validate_limits(limits: &BTreeMap<String, i64>, catalog: &Catalog) -> ValidationReport {
    let mut errors = Vec::new();
    for (key, value) in limits {
        if !catalog.has_limit(key) {
            errors.push(format!("Unknown limit key: {}", key));
        }
        if *value < -1 {
            errors.push(format!(
                "Limit {} must be -1 (unlimited), 0 (unavailable), or a positive cap; got {}",
                key, value
            ));
        }
    }
    ValidationReport::from_errors(errors)
}

/// Validate the country / currency / price combination.
pub fn validate_country_pricing(
    country_code: &str,
    currency_code: &str,
    base_price: Decimal,
    is_super_admin_override: bool,
) -> ValidationReport {
    let mut errors = Vec::new();

    match expected_currency(country_code) {
        None => errors.push(format!("Unsupported country: {}", country_code)),
        Some(expected) => {
            if currency_code != expected {
                errors.push(format!(
                    "Currency for {} must be {}, got {}",
                    country_code, expected, currency_code
                ));
            }
        }
    }

    if base_price < Decimal::ZERO {
        errors.push(format!("Base price must be non-negative, got {}", base_price));
    }

    // India prices are locked to fixed points unless a super-admin overrides.
    if country_code == "IN"
        && !is_super_admin_override
        && !INDIA_PRICE_POINTS.contains(&base_price)
    {
        let allowed: Vec<String> = INDIA_PRICE_POINTS.iter().map(|p| p.to_string()).collect();
        errors.push(format!(
            "Base price {} is not an allowed India price point ({})",
            base_price,
            allowed.join(", ")
        ));
    }

    ValidationReport::from_errors(errors)
}

/// Validate a full candidate plan. Runs every check and accumulates all
/// errors; never short-circuits.
#[allow(clippy::too_many_arguments)]
pub fn validate_plan(
    tier: PlanTier,
    country_code: &str,
    currency_code: &str,
    base_price: Decimal,
    feature_flags: Option<&BTreeMap<String, bool>>,
    limits: Option<&BTreeMap<String, i64>>,
    is_super_admin_override: bool,
    catalog: &Catalog,
) -> ValidationReport {
    let mut report =
        validate_country_pricing(country_code, currency_code, base_price, is_super_admin_override);
    if let Some(flags) = feature_flags {
        report = report.merge(validate_feature_flags(flags, tier, catalog));
    }
    if let Some(limits) = limits {
        report = report.merge(validate_limits(limits, catalog));
    }
    report
}
