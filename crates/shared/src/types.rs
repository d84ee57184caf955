//! Common types used across Tenantry

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// ID Wrappers
// =============================================================================

/// Tenant ID wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(pub Uuid);

impl TenantId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TenantId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for TenantId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Enums
// =============================================================================

/// Base-plan tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Starter,
    Basic,
    Pro,
    Enterprise,
}

impl Default for PlanTier {
    fn default() -> Self {
        Self::Free
    }
}

impl PlanTier {
    /// Whether plans on this tier are subject to free-tier feature restrictions
    pub fn is_free(&self) -> bool {
        matches!(self, Self::Free)
    }
}

impl std::fmt::Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Starter => write!(f, "starter"),
            Self::Basic => write!(f, "basic"),
            Self::Pro => write!(f, "pro"),
            Self::Enterprise => write!(f, "enterprise"),
        }
    }
}

impl std::str::FromStr for PlanTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "starter" => Ok(Self::Starter),
            "basic" => Ok(Self::Basic),
            "pro" => Ok(Self::Pro),
            "enterprise" => Ok(Self::Enterprise),
            _ => Err(format!("Invalid plan tier: {}", s)),
        }
    }
}

/// Billing cycle for a plan price
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingCycle {
    Monthly,
    Quarterly,
    HalfYearly,
    Yearly,
}

impl BillingCycle {
    /// Number of months covered by one charge on this cycle
    pub fn months(&self) -> u32 {
        match self {
            Self::Monthly => 1,
            Self::Quarterly => 3,
            Self::HalfYearly => 6,
            Self::Yearly => 12,
        }
    }

    pub fn all() -> [Self; 4] {
        [Self::Monthly, Self::Quarterly, Self::HalfYearly, Self::Yearly]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::HalfYearly => "half_yearly",
            Self::Yearly => "yearly",
        }
    }
}

impl std::fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BillingCycle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "half_yearly" => Ok(Self::HalfYearly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(format!("Invalid billing cycle: {}", s)),
        }
    }
}

// =============================================================================
// Limit Values
// =============================================================================

/// A usage limit value.
///
/// Stores persist limits as plain integers where `-1` means unlimited, `0`
/// means unavailable, and `n > 0` is a hard cap. Inside the engine the
/// sentinel is a dedicated variant so `-1` never reaches an ordinary
/// comparison; conversion happens only at the serde boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitValue {
    Unlimited,
    Unavailable,
    Capped(u32),
}

impl LimitValue {
    /// Parse a raw wire value. Anything below -1 is rejected.
    pub fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            -1 => Some(Self::Unlimited),
            0 => Some(Self::Unavailable),
            n if n > 0 && n <= u32::MAX as i64 => Some(Self::Capped(n as u32)),
            _ => None,
        }
    }

    /// Wire representation (-1 / 0 / n)
    pub fn as_raw(&self) -> i64 {
        match self {
            Self::Unlimited => -1,
            Self::Unavailable => 0,
            Self::Capped(n) => *n as i64,
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, Self::Unlimited)
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }

    /// The more permissive of two limits (Unlimited > larger cap > Unavailable)
    pub fn most_permissive(self, other: Self) -> Self {
        match (self, other) {
            (Self::Unlimited, _) | (_, Self::Unlimited) => Self::Unlimited,
            (Self::Capped(a), Self::Capped(b)) => Self::Capped(a.max(b)),
            (Self::Capped(a), Self::Unavailable) | (Self::Unavailable, Self::Capped(a)) => {
                Self::Capped(a)
            }
            (Self::Unavailable, Self::Unavailable) => Self::Unavailable,
        }
    }
}

impl std::fmt::Display for LimitValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unlimited => write!(f, "Unlimited"),
            Self::Unavailable => write!(f, "0"),
            Self::Capped(n) => write!(f, "{}", n),
        }
    }
}

impl Serialize for LimitValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_raw())
    }
}

impl<'de> Deserialize<'de> for LimitValue {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        LimitValue::from_raw(raw).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid limit value {} (must be >= -1)", raw))
        })
    }
}

// =============================================================================
// Plan Model
// =============================================================================

/// One purchasable price point on a plan (per billing cycle)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleOption {
    /// Price for the whole cycle in major currency units
    pub price: Decimal,
    pub enabled: bool,
    /// Optional marketing badge, e.g. "Save 17%"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
}

/// A purchasable bundle of features and limits at a tier, country, and currency
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub code: String,
    pub name: String,
    pub tier: PlanTier,
    pub country_code: String,
    pub currency_code: String,
    /// Monthly base price in major currency units
    pub base_price: Decimal,
    pub billing_cycles: BTreeMap<BillingCycle, CycleOption>,
    /// Feature key -> enabled. Keys must exist in the feature catalog.
    pub feature_flags: BTreeMap<String, bool>,
    /// Limit key -> value. Keys must exist in the limit catalog.
    pub limits: BTreeMap<String, LimitValue>,
    /// Add-ons bundled with the plan (no separate subscription required)
    #[serde(default)]
    pub included_addons: Vec<String>,
    pub max_users: LimitValue,
    pub is_recommended: bool,
    pub sort_order: i32,
}

impl Plan {
    /// Look up the cycle option for a billing cycle, if the plan offers it
    pub fn cycle(&self, cycle: BillingCycle) -> Option<&CycleOption> {
        self.billing_cycles.get(&cycle)
    }

    pub fn has_feature_flag(&self, key: &str) -> bool {
        self.feature_flags.get(key).copied().unwrap_or(false)
    }
}

// =============================================================================
// Tests
// =============================================================================
