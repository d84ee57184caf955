//! Add-on definitions and per-country configuration
//!
//! An add-on is an optional module (e.g. payroll) sold and gated
//! independently of the base plan. The registry records what each add-on
//! contributes to a tenant's entitlement; the per-country config carries
//! visibility, trial length, and pricing tiers.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tenantry_shared::LimitValue;

pub const ADDON_PAYROLL: &str = "payroll";
pub const ADDON_MARKETING_PLUS: &str = "marketing_plus";

/// What an add-on grants on top of the base plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddonDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Catalog feature keys this add-on switches on
    pub features: Vec<String>,
    /// Catalog limits this add-on raises (merged most-permissive-wins)
    pub limits: BTreeMap<String, LimitValue>,
}

/// Registry of every known add-on, loaded once at startup
#[derive(Debug, Clone, Default)]
pub struct AddonRegistry {
    addons: BTreeMap<String, AddonDefinition>,
}

impl AddonRegistry {
    /// The add-ons shipped with the platform
    pub fn standard() -> Self {
        let mut registry = Self::default();
        registry.register(AddonDefinition {
            id: ADDON_PAYROLL.to_string(),
            name: "Payroll".to_string(),
            description: "Payroll runs, payslips, and statutory deductions".to_string(),
            features: vec!["payroll_processing".to_string()],
            limits: [("max_payroll_employees".to_string(), LimitValue::Unlimited)].into(),
        });
        registry.register(AddonDefinition {
            id: ADDON_MARKETING_PLUS.to_string(),
            name: "Marketing Plus".to_string(),
            description: "WhatsApp automation and bulk email campaigns".to_string(),
            features: vec![
                "whatsapp_automation".to_string(),
                "email_campaigns".to_string(),
            ],
            limits: [("max_sms_per_month".to_string(), LimitValue::Capped(1_000))].into(),
        });
        registry
    }

    pub fn register(&mut self, addon: AddonDefinition) {
        self.addons.insert(addon.id.clone(), addon);
    }

    pub fn get(&self, addon_id: &str) -> Option<&AddonDefinition> {
        self.addons.get(addon_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AddonDefinition> {
        self.addons.values()
    }
}

/// How an add-on is billed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingType {
    /// Fixed monthly amount
    Flat,
    /// Monthly amount per employee on payroll
    PerEmployee,
}

/// One purchasable pricing tier for an add-on in a country
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingTier {
    pub id: String,
    pub name: String,
    pub pricing_type: PricingType,
    /// Major currency units
    pub price: Decimal,
    pub currency: String,
    pub is_default: bool,
}

/// Whether an add-on is offered in a country's storefront
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddonVisibility {
    Live,
    Hidden,
}

/// Per-country commercial configuration for an add-on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddonCountryConfig {
    pub addon_id: String,
    pub country_code: String,
    pub visibility: AddonVisibility,
    /// Zero means no trial: subscriptions start Active pending payment
    pub trial_days: u32,
    pub pricing_tiers: Vec<PricingTier>,
}

impl AddonCountryConfig {
    pub fn has_trial(&self) -> bool {
        self.trial_days > 0
    }

    /// The tier pre-selected in the storefront, if any is marked default
    pub fn default_tier(&self) -> Option<&PricingTier> {
        self.pricing_tiers.iter().find(|t| t.is_default)
    }

    pub fn tier(&self, tier_id: &str) -> Option<&PricingTier> {
        self.pricing_tiers.iter().find(|t| t.id == tier_id)
    }

    /// Reference payroll config for India: 14-day trial, per-employee pricing
    pub fn payroll_india() -> Self {
        Self {
            addon_id: ADDON_PAYROLL.to_string(),
            country_code: "IN".to_string(),
            visibility: AddonVisibility::Live,
            trial_days: 14,
            pricing_tiers: vec![
                PricingTier {
                    id: "payroll_upto_10".to_string(),
                    name: "Up to 10 employees".to_string(),
                    pricing_type: PricingType::Flat,
                    price: dec!(499),
                    currency: "INR".to_string(),
                    is_default: true,
                },
                PricingTier {
                    id: "payroll_per_employee".to_string(),
                    name: "Per employee".to_string(),
                    pricing_type: PricingType::PerEmployee,
                    price: dec!(49),
                    currency: "INR".to_string(),
                    is_default: false,
                },
            ],
        }
    }
}
