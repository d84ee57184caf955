//! Feature and limit catalogs
//!
//! The catalogs are the closed registries of every feature key and limit key
//! the platform knows about. They are loaded once at process start and never
//! mutated; any lookup of an unknown key is a validation error upstream,
//! never a silent default.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::types::LimitValue;

/// UI grouping for catalog features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureGroup {
    CoreModules,
    Notifications,
    Analytics,
    Support,
}

/// One entry in the feature catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureCatalogEntry {
    pub key: String,
    pub label: String,
    pub description: String,
    pub group: FeatureGroup,
    /// Free-tier plans may not enable this feature
    pub restricted_on_free: bool,
}

/// One entry in the limit catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitCatalogEntry {
    pub key: String,
    pub label: String,
    pub description: String,
    pub default_value: LimitValue,
}

struct FeatureSpec {
    key: &'static str,
    label: &'static str,
    description: &'static str,
    group: FeatureGroup,
    restricted_on_free: bool,
}

struct LimitSpec {
    key: &'static str,
    label: &'static str,
    description: &'static str,
    default_raw: i64,
}

const FEATURES: &[FeatureSpec] = &[
    // --- Core modules ---
    FeatureSpec {
        key: "online_booking",
        label: "Online Booking",
        description: "Customer-facing appointment booking page",
        group: FeatureGroup::CoreModules,
        restricted_on_free: false,
    },
    FeatureSpec {
        key: "pos_billing",
        label: "POS & Billing",
        description: "Point-of-sale invoicing with GST-ready receipts",
        group: FeatureGroup::CoreModules,
        restricted_on_free: false,
    },
    FeatureSpec {
        key: "customer_crm",
        label: "Customer CRM",
        description: "Customer profiles, visit history, and notes",
        group: FeatureGroup::CoreModules,
        restricted_on_free: false,
    },
    FeatureSpec {
        key: "inventory_management",
        label: "Inventory Management",
        description: "Product stock tracking and low-stock alerts",
        group: FeatureGroup::CoreModules,
        restricted_on_free: true,
    },
    FeatureSpec {
        key: "staff_management",
        label: "Staff Management",
        description: "Staff rosters, shifts, and commission tracking",
        group: FeatureGroup::CoreModules,
        restricted_on_free: false,
    },
    FeatureSpec {
        key: "multi_location",
        label: "Multi-location",
        description: "Manage multiple outlets under one account",
        group: FeatureGroup::CoreModules,
        restricted_on_free: true,
    },
    FeatureSpec {
        key: "payroll_processing",
        label: "Payroll Processing",
        description: "Monthly payroll runs, payslips, and statutory deductions",
        group: FeatureGroup::CoreModules,
        restricted_on_free: true,
    },
    // --- Notifications ---
    FeatureSpec {
        key: "sms_notifications",
        label: "SMS Notifications",
        description: "Appointment reminders and confirmations over SMS",
        group: FeatureGroup::Notifications,
        restricted_on_free: false,
    },
    FeatureSpec {
        key: "email_campaigns",
        label: "Email Campaigns",
        description: "Bulk promotional email to customer segments",
        group: FeatureGroup::Notifications,
        restricted_on_free: true,
    },
    FeatureSpec {
        key: "whatsapp_automation",
        label: "WhatsApp Automation",
        description: "Automated WhatsApp reminders and marketing flows",
        group: FeatureGroup::Notifications,
        restricted_on_free: true,
    },
    // --- Analytics ---
    FeatureSpec {
        key: "analytics_dashboard",
        label: "Analytics Dashboard",
        description: "Daily revenue, bookings, and staff performance",
        group: FeatureGroup::Analytics,
        restricted_on_free: false,
    },
    FeatureSpec {
        key: "advanced_reports",
        label: "Advanced Reports",
        description: "Exportable cohort, retention, and revenue reports",
        group: FeatureGroup::Analytics,
        restricted_on_free: true,
    },
    // --- Support ---
    FeatureSpec {
        key: "priority_support",
        label: "Priority Support",
        description: "Same-day support over phone and chat",
        group: FeatureGroup::Support,
        restricted_on_free: true,
    },
];

const LIMITS: &[LimitSpec] = &[
    LimitSpec {
        key: "max_staff",
        label: "Staff members",
        description: "Staff accounts that can log in",
        default_raw: 2,
    },
    LimitSpec {
        key: "max_customers",
        label: "Customer records",
        description: "Customer profiles stored in the CRM",
        default_raw: 100,
    },
    LimitSpec {
        key: "max_appointments_per_month",
        label: "Appointments / month",
        description: "Appointments that can be booked per calendar month",
        default_raw: 50,
    },
    LimitSpec {
        key: "max_sms_per_month",
        label: "SMS credits / month",
        description: "Outbound SMS messages included per month",
        default_raw: 0,
    },
    LimitSpec {
        key: "max_invoices_per_month",
        label: "Invoices / month",
        description: "POS invoices that can be issued per month",
        default_raw: 100,
    },
    LimitSpec {
        key: "max_payroll_employees",
        label: "Payroll employees",
        description: "Employees that can be included in a payroll run",
        default_raw: 0,
    },
    LimitSpec {
        key: "max_locations",
        label: "Locations",
        description: "Outlets manageable under one account",
        default_raw: 1,
    },
];

/// The process-wide feature and limit registries
#[derive(Debug, Clone)]
pub struct Catalog {
    features: BTreeMap<String, FeatureCatalogEntry>,
    limits: BTreeMap<String, LimitCatalogEntry>,
}

impl Catalog {
    /// The standard catalog shipped with the platform
    pub fn standard() -> Self {
        let features = FEATURES
            .iter()
            .map(|spec| {
                (
                    spec.key.to_string(),
                    FeatureCatalogEntry {
                        key: spec.key.to_string(),
                        label: spec.label.to_string(),
                        description: spec.description.to_string(),
                        group: spec.group,
                        restricted_on_free: spec.restricted_on_free,
                    },
                )
            })
            .collect();
        let limits = LIMITS
            .iter()
            .map(|spec| {
                let default_value = LimitValue::from_raw(spec.default_raw)
                    .unwrap_or(LimitValue::Unavailable);
                (
                    spec.key.to_string(),
                    LimitCatalogEntry {
                        key: spec.key.to_string(),
                        label: spec.label.to_string(),
                        description: spec.description.to_string(),
                        default_value,
                    },
                )
            })
            .collect();
        Self { features, limits }
    }

    /// Shared immutable instance, built on first access
    pub fn global() -> &'static Catalog {
        static CATALOG: OnceLock<Catalog> = OnceLock::new();
        CATALOG.get_or_init(Catalog::standard)
    }

    pub fn feature(&self, key: &str) -> Option<&FeatureCatalogEntry> {
        self.features.get(key)
    }

    pub fn limit(&self, key: &str) -> Option<&LimitCatalogEntry> {
        self.limits.get(key)
    }

    pub fn has_feature(&self, key: &str) -> bool {
        self.features.contains_key(key)
    }

    pub fn has_limit(&self, key: &str) -> bool {
        self.limits.contains_key(key)
    }

    pub fn features(&self) -> impl Iterator<Item = &FeatureCatalogEntry> {
        self.features.values()
    }

    pub fn limits(&self) -> impl Iterator<Item = &LimitCatalogEntry> {
        self.limits.values()
    }

    pub fn feature_keys(&self) -> impl Iterator<Item = &str> {
        self.features.keys().map(String::as_str)
    }

    pub fn limit_keys(&self) -> impl Iterator<Item = &str> {
        self.limits.keys().map(String::as_str)
    }

    /// All catalog features, disabled — the starting point for a new plan form
    pub fn default_feature_flags(&self) -> BTreeMap<String, bool> {
        self.features.keys().map(|k| (k.clone(), false)).collect()
    }

    /// All catalog limits at their default values
    pub fn default_limits(&self) -> BTreeMap<String, LimitValue> {
        self.limits
            .iter()
            .map(|(k, entry)| (k.clone(), entry.default_value))
            .collect()
    }
}
