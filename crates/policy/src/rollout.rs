//! Country rollout policy
//!
//! A super-admin restricts availability per country independently of what any
//! plan allows: which business types may register, which features are blocked
//! outright, and which add-ons/modules are open. Country policy always wins
//! over plan entitlement.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tenantry_shared::TenantId;

/// Overall availability of the platform in a country
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountryStatus {
    Enabled,
    Disabled,
    Maintenance,
    ComingSoon,
}

/// Rollout stage of a cohort-gated add-on within a country
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddonRolloutStatus {
    Disabled,
    Beta,
    Live,
}

/// Resolved add-on access for one tenant. Beta collapses to Live for cohort
/// members and Disabled for everyone else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddonAccess {
    Disabled,
    Live,
}

impl AddonAccess {
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }
}

/// Per-add-on rollout controls nested inside a country policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddonRolloutSubPolicy {
    pub status: AddonRolloutStatus,
    /// Only meaningful when status is Beta
    #[serde(default)]
    pub cohort_tenant_ids: BTreeSet<TenantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disclaimer_text: Option<String>,
}

/// Country-level restrictions that cap what any plan or add-on may expose
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryRolloutPolicy {
    pub country_code: String,
    pub status: CountryStatus,
    pub registration_enabled: bool,
    pub billing_enabled: bool,
    /// Empty set means every business type is allowed (open policy)
    #[serde(default)]
    pub enabled_business_types: BTreeSet<String>,
    /// Features listed here are blocked even if a plan enables them
    #[serde(default)]
    pub disabled_features: BTreeSet<String>,
    #[serde(default)]
    pub enabled_addons: BTreeSet<String>,
    #[serde(default)]
    pub enabled_modules: BTreeSet<String>,
    #[serde(default)]
    pub addon_policies: BTreeMap<String, AddonRolloutSubPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CountryRolloutPolicy {
    /// True when the set is empty (no restriction configured) or contains the
    /// type.
    pub fn is_business_type_allowed(&self, business_type: &str) -> bool {
        self.enabled_business_types.is_empty()
            || self.enabled_business_types.contains(business_type)
    }

    pub fn is_feature_blocked(&self, feature_key: &str) -> bool {
        self.disabled_features.contains(feature_key)
    }

    pub fn is_addon_enabled(&self, addon_id: &str) -> bool {
        self.enabled_addons.contains(addon_id)
    }

    pub fn is_module_enabled(&self, module_id: &str) -> bool {
        self.enabled_modules.contains(module_id)
    }

    /// Resolve the effective access a tenant has to a cohort-gated add-on.
    ///
    /// Disabled and Live pass through unmodified. Beta grants Live access only
    /// to tenants in the cohort. An add-on without a sub-policy follows the
    /// plain `enabled_addons` switch.
    pub fn resolve_addon_access(&self, addon_id: &str, tenant_id: TenantId) -> AddonAccess {
        if !self.is_addon_enabled(addon_id) {
            return AddonAccess::Disabled;
        }
        match self.addon_policies.get(addon_id) {
            None => AddonAccess::Live,
            Some(sub) => match sub.status {
                AddonRolloutStatus::Disabled => AddonAccess::Disabled,
                AddonRolloutStatus::Live => AddonAccess::Live,
                AddonRolloutStatus::Beta => {
                    if sub.cohort_tenant_ids.contains(&tenant_id) {
                        AddonAccess::Live
                    } else {
                        AddonAccess::Disabled
                    }
                }
            },
        }
    }

    /// Disclaimer to surface next to an add-on, if the country configured one
    pub fn addon_disclaimer(&self, addon_id: &str) -> Option<&str> {
        self.addon_policies
            .get(addon_id)
            .and_then(|sub| sub.disclaimer_text.as_deref())
    }
}
