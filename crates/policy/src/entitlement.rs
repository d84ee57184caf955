//! Entitlement resolution
//!
//! Combines a plan, the country rollout policy, and the tenant's add-on
//! subscriptions into the final feature/limit maps that gating collaborators
//! consume. Same inputs always produce the same output; the resolver never
//! errors — missing configuration resolves to the most restrictive state, so
//! a tenant is never granted access by accident.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tenantry_shared::{Catalog, LimitValue, Plan, TenantId};

use crate::addons::AddonRegistry;
use crate::rollout::CountryRolloutPolicy;
use crate::subscription::AddonSubscription;

/// The final, resolved set of features and limits a tenant may use
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entitlement {
    pub features: BTreeMap<String, bool>,
    pub limits: BTreeMap<String, LimitValue>,
}

impl Entitlement {
    /// Fail-closed feature check: unknown keys are off
    pub fn has_feature(&self, key: &str) -> bool {
        self.features.get(key).copied().unwrap_or(false)
    }

    /// Fail-closed limit lookup: unknown keys are unavailable
    pub fn limit(&self, key: &str) -> LimitValue {
        self.limits
            .get(key)
            .copied()
            .unwrap_or(LimitValue::Unavailable)
    }
}

/// Resolve the effective entitlement for one tenant.
///
/// 1. Start from the plan's flags and limits; catalog keys the plan omits
///    default to off / the catalog default.
/// 2. Country `disabled_features` force the flag off — a one-directional
///    ceiling the plan cannot exceed. Numeric limits are taken from the plan
///    as-is; country policy never overrides them.
/// 3. Add-ons bundled with the plan or carried by a subscription in
///    trial/active/grace merge their contributions, but only when the country
///    has the add-on enabled (and, for beta rollouts, the tenant is in the
///    cohort). Cancelled and expired subscriptions contribute nothing.
pub fn resolve_entitlement(
    tenant_id: TenantId,
    plan: &Plan,
    policy: Option<&CountryRolloutPolicy>,
    subscriptions: &[AddonSubscription],
    registry: &AddonRegistry,
    catalog: &Catalog,
) -> Entitlement {
    let Some(policy) = policy else {
        // Country not configured: everything off, limits at catalog defaults.
        tracing::warn!(
            tenant_id = %tenant_id,
            plan_code = %plan.code,
            "no rollout policy for country; resolving fail-closed"
        );
        return Entitlement {
            features: catalog.default_feature_flags(),
            limits: catalog.default_limits(),
        };
    };

    let mut features: BTreeMap<String, bool> = catalog
        .feature_keys()
        .map(|key| (key.to_string(), plan.has_feature_flag(key)))
        .collect();
    let mut limits: BTreeMap<String, LimitValue> = catalog
        .limits()
        .map(|entry| {
            let value = plan
                .limits
                .get(&entry.key)
                .copied()
                .unwrap_or(entry.default_value);
            (entry.key.clone(), value)
        })
        .collect();

    // Merge contributions from bundled add-ons and live subscriptions.
    let bundled = plan.included_addons.iter().map(String::as_str);
    let subscribed = subscriptions
        .iter()
        .filter(|sub| sub.contributes_entitlements())
        .map(|sub| sub.addon_id.as_str());
    for addon_id in bundled.chain(subscribed) {
        if !policy.resolve_addon_access(addon_id, tenant_id).is_live() {
            continue;
        }
        let Some(addon) = registry.get(addon_id) else {
            tracing::debug!(addon_id, "add-on not in registry; contributes nothing");
            continue;
        };
        for key in &addon.features {
            if let Some(flag) = features.get_mut(key) {
                *flag = true;
            }
        }
        for (key, contributed) in &addon.limits {
            if let Some(current) = limits.get_mut(key) {
                *current = current.most_permissive(*contributed);
            }
        }
    }

    // Country restriction is a ceiling: it also caps add-on contributions.
    for key in &policy.disabled_features {
        if let Some(flag) = features.get_mut(key) {
            *flag = false;
        }
    }

    tracing::debug!(
        tenant_id = %tenant_id,
        plan_code = %plan.code,
        enabled = features.values().filter(|on| **on).count(),
        "resolved entitlement"
    );

    Entitlement { features, limits }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use rust_decimal_macros::dec;
    use tenantry_shared::{BillingCycle, CycleOption, PlanTier};
    use time::macros::datetime;

    use crate::addons::{AddonCountryConfig, ADDON_MARKETING_PLUS, ADDON_PAYROLL};
    use crate::rollout::CountryStatus;

    fn plan() -> Plan {
        Plan {
            code: "pro_in".to_string(),
            name: "Pro".to_string(),
            tier: PlanTier::Pro,
            country_code: "IN".to_string(),
            currency_code: "INR".to_string(),
            base_price: dec!(199),
            billing_cycles: [(
                BillingCycle::Monthly,
                CycleOption {
                    price: dec!(199),
                    enabled: true,
                    badge: None,
                },
            )]
            .into(),
            feature_flags: [
                ("online_booking".to_string(), true),
                ("whatsapp_automation".to_string(), true),
                ("analytics_dashboard".to_string(), true),
            ]
            .into(),
            limits: [
                ("max_staff".to_string(), LimitValue::Capped(10)),
                ("max_customers".to_string(), LimitValue::Unlimited),
            ]
            .into(),
            included_addons: Vec::new(),
            max_users: LimitValue::Capped(10),
            is_recommended: true,
            sort_order: 2,
        }
    }

    fn open_policy() -> CountryRolloutPolicy {
        CountryRolloutPolicy {
            country_code: "IN".to_string(),
            status: CountryStatus::Enabled,
            registration_enabled: true,
            billing_enabled: true,
            enabled_business_types: BTreeSet::new(),
            disabled_features: BTreeSet::new(),
            enabled_addons: [ADDON_PAYROLL.to_string(), ADDON_MARKETING_PLUS.to_string()].into(),
            enabled_modules: BTreeSet::new(),
            addon_policies: std::collections::BTreeMap::new(),
            notes: None,
        }
    }

    fn payroll_sub(tenant: TenantId) -> AddonSubscription {
        let config = AddonCountryConfig::payroll_india();
        let tier = config.default_tier().unwrap().clone();
        AddonSubscription::start(tenant, &config, &tier, 8, datetime!(2025-06-01 10:00 UTC))
    }

    #[test]
    fn test_plan_flags_and_defaults() {
        let tenant = TenantId::new();
        let catalog = Catalog::standard();
        let resolved = resolve_entitlement(
            tenant,
            &plan(),
            Some(&open_policy()),
            &[],
            &AddonRegistry::standard(),
            &catalog,
        );

        assert!(resolved.has_feature("online_booking"));
        // Catalog key the plan never mentions defaults to off
        assert!(!resolved.has_feature("priority_support"));
        assert_eq!(resolved.limit("max_staff"), LimitValue::Capped(10));
        // Limit the plan omits falls back to the catalog default
        assert_eq!(resolved.limit("max_locations"), LimitValue::Capped(1));
        // Unknown key lookups fail closed
        assert!(!resolved.has_feature("nonexistent"));
        assert_eq!(resolved.limit("nonexistent"), LimitValue::Unavailable);
    }

    #[test]
    fn test_country_disabled_feature_always_wins() {
        let tenant = TenantId::new();
        let catalog = Catalog::standard();
        let mut policy = open_policy();
        policy.disabled_features.insert("whatsapp_automation".to_string());

        let resolved = resolve_entitlement(
            tenant,
            &plan(),
            Some(&policy),
            &[],
            &AddonRegistry::standard(),
            &catalog,
        );
        assert!(!resolved.has_feature("whatsapp_automation"));
    }

    #[test]
    fn test_country_ceiling_caps_addon_contributions() {
        let tenant = TenantId::new();
        let catalog = Catalog::standard();
        let registry = AddonRegistry::standard();
        let mut policy = open_policy();
        policy.disabled_features.insert("whatsapp_automation".to_string());

        // Marketing Plus would grant whatsapp_automation and email_campaigns
        let mut p = plan();
        p.included_addons.push(ADDON_MARKETING_PLUS.to_string());

        let resolved = resolve_entitlement(tenant, &p, Some(&policy), &[], &registry, &catalog);
        assert!(resolved.has_feature("email_campaigns"));
        assert!(!resolved.has_feature("whatsapp_automation"));
        // Marketing Plus raises the SMS cap over the catalog default
        assert_eq!(resolved.limit("max_sms_per_month"), LimitValue::Capped(1_000));
    }

    #[test]
    fn test_grace_contributes_and_terminal_does_not() {
        let tenant = TenantId::new();
        let catalog = Catalog::standard();
        let registry = AddonRegistry::standard();
        let policy = open_policy();
        let now = datetime!(2025-06-10 10:00 UTC);

        let mut graced = payroll_sub(tenant);
        graced.record_payment_success(now).unwrap();
        graced.record_payment_failure(now, 7).unwrap();
        let resolved =
            resolve_entitlement(tenant, &plan(), Some(&policy), &[graced], &registry, &catalog);
        assert!(resolved.has_feature("payroll_processing"));
        assert_eq!(resolved.limit("max_payroll_employees"), LimitValue::Unlimited);

        for terminal in [
            {
                let mut sub = payroll_sub(tenant);
                sub.expire().unwrap();
                sub
            },
            {
                let mut sub = payroll_sub(tenant);
                sub.cancel(now).unwrap();
                sub
            },
        ] {
            let resolved = resolve_entitlement(
                tenant,
                &plan(),
                Some(&policy),
                &[terminal],
                &registry,
                &catalog,
            );
            assert!(!resolved.has_feature("payroll_processing"));
            assert_eq!(
                resolved.limit("max_payroll_employees"),
                LimitValue::Unavailable
            );
        }
    }

    #[test]
    fn test_addon_needs_country_enablement() {
        let tenant = TenantId::new();
        let catalog = Catalog::standard();
        let registry = AddonRegistry::standard();
        let mut policy = open_policy();
        policy.enabled_addons.remove(ADDON_PAYROLL);

        let resolved = resolve_entitlement(
            tenant,
            &plan(),
            Some(&policy),
            &[payroll_sub(tenant)],
            &registry,
            &catalog,
        );
        assert!(!resolved.has_feature("payroll_processing"));
    }

    #[test]
    fn test_missing_policy_resolves_fail_closed() {
        let tenant = TenantId::new();
        let catalog = Catalog::standard();
        let resolved = resolve_entitlement(
            tenant,
            &plan(),
            None,
            &[payroll_sub(tenant)],
            &AddonRegistry::standard(),
            &catalog,
        );
        assert!(resolved.features.values().all(|on| !on));
        assert_eq!(resolved.limit("max_staff"), LimitValue::Capped(2));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let tenant = TenantId::new();
        let catalog = Catalog::standard();
        let registry = AddonRegistry::standard();
        let policy = open_policy();
        let subs = vec![payroll_sub(tenant)];

        let first =
            resolve_entitlement(tenant, &plan(), Some(&policy), &subs, &registry, &catalog);
        let second =
            resolve_entitlement(tenant, &plan(), Some(&policy), &subs, &registry, &catalog);
        assert_eq!(first, second);
    }
}
