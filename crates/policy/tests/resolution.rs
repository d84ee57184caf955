//! End-to-end policy engine tests
//!
//! Exercises the full admin flow over pure inputs: validate a candidate
//! plan, resolve the tenant's entitlement under country policy and add-on
//! subscriptions, diff against an upgrade target, and quote the checkout
//! price.

#![allow(clippy::unwrap_used)]

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal_macros::dec;
use tenantry_policy::{
    calculate_savings, compute_quote, resolve_entitlement, validate_plan, AddonCountryConfig,
    AddonRegistry, AddonRolloutStatus, AddonRolloutSubPolicy, AddonSubscription,
    CountryRolloutPolicy, CountryStatus, Coupon, DiscountKind, Offer, PlanDiff, PolicyError,
};
use tenantry_shared::{BillingCycle, Catalog, CycleOption, LimitValue, Plan, PlanTier, TenantId};
use time::macros::datetime;

fn cycle(price: rust_decimal::Decimal, enabled: bool) -> CycleOption {
    CycleOption {
        price,
        enabled,
        badge: None,
    }
}

fn free_plan() -> Plan {
    Plan {
        code: "free_in".to_string(),
        name: "Free".to_string(),
        tier: PlanTier::Free,
        country_code: "IN".to_string(),
        currency_code: "INR".to_string(),
        base_price: dec!(0),
        billing_cycles: [(BillingCycle::Monthly, cycle(dec!(0), true))].into(),
        feature_flags: [
            ("online_booking".to_string(), true),
            ("customer_crm".to_string(), true),
        ]
        .into(),
        limits: [
            ("max_staff".to_string(), LimitValue::Capped(2)),
            ("max_customers".to_string(), LimitValue::Capped(100)),
        ]
        .into(),
        included_addons: Vec::new(),
        max_users: LimitValue::Capped(2),
        is_recommended: false,
        sort_order: 0,
    }
}

fn pro_plan() -> Plan {
    Plan {
        code: "pro_in".to_string(),
        name: "Pro".to_string(),
        tier: PlanTier::Pro,
        country_code: "IN".to_string(),
        currency_code: "INR".to_string(),
        base_price: dec!(199),
        billing_cycles: [
            (BillingCycle::Monthly, cycle(dec!(199), true)),
            (BillingCycle::Yearly, cycle(dec!(1990), true)),
            (BillingCycle::HalfYearly, cycle(dec!(1100), false)),
        ]
        .into(),
        feature_flags: [
            ("online_booking".to_string(), true),
            ("customer_crm".to_string(), true),
            ("whatsapp_automation".to_string(), true),
            ("advanced_reports".to_string(), true),
            ("staff_management".to_string(), true),
        ]
        .into(),
        limits: [
            ("max_staff".to_string(), LimitValue::Unlimited),
            ("max_customers".to_string(), LimitValue::Unlimited),
            ("max_appointments_per_month".to_string(), LimitValue::Unlimited),
        ]
        .into(),
        included_addons: Vec::new(),
        max_users: LimitValue::Unlimited,
        is_recommended: true,
        sort_order: 2,
    }
}

fn india_policy() -> CountryRolloutPolicy {
    CountryRolloutPolicy {
        country_code: "IN".to_string(),
        status: CountryStatus::Enabled,
        registration_enabled: true,
        billing_enabled: true,
        enabled_business_types: BTreeSet::new(),
        disabled_features: BTreeSet::new(),
        enabled_addons: ["payroll".to_string()].into(),
        enabled_modules: ["appointments".to_string(), "billing".to_string()].into(),
        addon_policies: BTreeMap::new(),
        notes: None,
    }
}

#[test]
fn admin_validates_and_tenant_resolves_a_plan() -> anyhow::Result<()> {
    let catalog = Catalog::standard();
    let plan = pro_plan();

    let raw_limits: BTreeMap<String, i64> = plan
        .limits
        .iter()
        .map(|(k, v)| (k.clone(), v.as_raw()))
        .collect();
    let report = validate_plan(
        plan.tier,
        &plan.country_code,
        &plan.currency_code,
        plan.base_price,
        Some(&plan.feature_flags),
        Some(&raw_limits),
        false,
        &catalog,
    );
    assert!(report.valid, "unexpected errors: {:?}", report.errors);

    let tenant = TenantId::new();
    let resolved = resolve_entitlement(
        tenant,
        &plan,
        Some(&india_policy()),
        &[],
        &AddonRegistry::standard(),
        &catalog,
    );
    assert!(resolved.has_feature("whatsapp_automation"));
    assert_eq!(resolved.limit("max_staff"), LimitValue::Unlimited);
    Ok(())
}

#[test]
fn downgrade_diff_reports_losses_and_reductions() {
    let catalog = Catalog::standard();
    let tenant = TenantId::new();
    let policy = india_policy();
    let registry = AddonRegistry::standard();

    let current = resolve_entitlement(tenant, &pro_plan(), Some(&policy), &[], &registry, &catalog);
    let target = resolve_entitlement(tenant, &free_plan(), Some(&policy), &[], &registry, &catalog);

    let diff = PlanDiff::between(&current, &target, &catalog);
    let lost: Vec<&str> = diff.lost_features.iter().map(|f| f.key.as_str()).collect();
    assert!(lost.contains(&"whatsapp_automation"));
    assert!(lost.contains(&"advanced_reports"));
    assert!(diff.gained_features.is_empty());

    let staff = diff
        .reduced_limits
        .iter()
        .find(|c| c.key == "max_staff")
        .unwrap();
    assert_eq!(staff.from, "Unlimited");
    assert_eq!(staff.to, "2");
    assert!(diff.increased_limits.is_empty());

    // Upgrade is the mirror image
    let upgrade = PlanDiff::between(&target, &current, &catalog);
    assert!(upgrade.lost_features.is_empty());
    assert!(!upgrade.gained_features.is_empty());
}

#[test]
fn payroll_beta_cohort_and_lifecycle_drive_entitlement() -> anyhow::Result<()> {
    let catalog = Catalog::standard();
    let registry = AddonRegistry::standard();
    let insider = TenantId::new();
    let outsider = TenantId::new();
    let now = datetime!(2025-06-01 09:00 UTC);

    let mut policy = india_policy();
    policy.addon_policies.insert(
        "payroll".to_string(),
        AddonRolloutSubPolicy {
            status: AddonRolloutStatus::Beta,
            cohort_tenant_ids: [insider].into(),
            disclaimer_text: Some("Payroll is rolling out gradually".to_string()),
        },
    );

    let config = AddonCountryConfig::payroll_india();
    let tier = config.default_tier().unwrap().clone();

    // Cohort member in trial gets the add-on
    let sub = AddonSubscription::start(insider, &config, &tier, 6, now);
    let resolved = resolve_entitlement(
        insider,
        &pro_plan(),
        Some(&policy),
        std::slice::from_ref(&sub),
        &registry,
        &catalog,
    );
    assert!(resolved.has_feature("payroll_processing"));

    // Same subscription state outside the cohort resolves closed
    let outsider_sub = AddonSubscription::start(outsider, &config, &tier, 6, now);
    let resolved = resolve_entitlement(
        outsider,
        &pro_plan(),
        Some(&policy),
        &[outsider_sub],
        &registry,
        &catalog,
    );
    assert!(!resolved.has_feature("payroll_processing"));

    // Trial expires unresolved: entitlement drops
    let mut expired = sub;
    expired.expire()?;
    let resolved = resolve_entitlement(
        insider,
        &pro_plan(),
        Some(&policy),
        &[expired],
        &registry,
        &catalog,
    );
    assert!(!resolved.has_feature("payroll_processing"));
    Ok(())
}

#[test]
fn checkout_quote_matches_pricing_page() -> anyhow::Result<()> {
    let plan = pro_plan();
    let offer = Offer {
        id: "festive".to_string(),
        name: "Festive Offer".to_string(),
        kind: DiscountKind::Percent,
        value: dec!(10),
        plan_codes: vec!["pro_in".to_string()],
        cycles: vec![BillingCycle::Yearly],
    };
    let coupon = Coupon {
        code: "NEW50".to_string(),
        name: "New Tenant 50".to_string(),
        kind: DiscountKind::Flat,
        value: dec!(50),
        plan_codes: Vec::new(),
        cycles: Vec::new(),
    };

    let quote = compute_quote(&plan, BillingCycle::Yearly, Some(&offer), Some(&coupon))?;
    assert_eq!(quote.subtotal, dec!(1990));
    assert_eq!(quote.breakdown.offer_discount, dec!(199));
    assert_eq!(quote.breakdown.coupon_discount, dec!(50));
    assert_eq!(quote.total, dec!(1741));
    assert_eq!(quote.amount_in_minor_units, 174_100);
    assert_eq!(quote.effective_price_per_month, dec!(145.08));

    // Savings banner vs paying monthly all year
    let savings = calculate_savings(dec!(199), dec!(1990), 12);
    assert_eq!(savings.amount, dec!(398));
    assert_eq!(savings.percent, 17);

    // Quoting a disabled cycle is a caller bug, not a validation failure
    let err = compute_quote(&plan, BillingCycle::HalfYearly, None, None).unwrap_err();
    assert!(matches!(err, PolicyError::CycleUnavailable { .. }));
    Ok(())
}

#[test]
fn free_plan_restrictions_surface_every_violation_at_once() {
    let catalog = Catalog::standard();
    let mut plan = free_plan();
    plan.feature_flags
        .insert("whatsapp_automation".to_string(), true);
    plan.feature_flags.insert("made_up_feature".to_string(), true);
    plan.base_price = dec!(49);

    let raw_limits: BTreeMap<String, i64> = [("max_staff".to_string(), -4)].into();
    let report = validate_plan(
        plan.tier,
        &plan.country_code,
        &plan.currency_code,
        plan.base_price,
        Some(&plan.feature_flags),
        Some(&raw_limits),
        false,
        &catalog,
    );
    assert!(!report.valid);
    // price whitelist + restricted feature + unknown key + bad limit
    assert_eq!(report.errors.len(), 4);
}
