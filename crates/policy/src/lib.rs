//! Tenantry Entitlement & Billing Policy Engine
//!
//! Pure, deterministic policy logic behind plan administration: plan
//! validation, country rollout policy, effective entitlement resolution,
//! plan diffing, add-on subscription lifecycle, and billing-cycle quotes.
//!
//! Every function here is side-effect-free over immutable snapshots; the
//! persistence layer, payment gateway, and HTTP surface live elsewhere and
//! hand this crate consistent inputs per call.

pub mod addons;
pub mod diff;
pub mod entitlement;
pub mod error;
pub mod quote;
pub mod rollout;
pub mod subscription;
pub mod validator;

pub use addons::{
    AddonCountryConfig, AddonDefinition, AddonRegistry, AddonVisibility, PricingTier, PricingType,
};
pub use diff::{
    gained_features, increased_limits, lost_features, reduced_limits, FeatureChange, LimitChange,
    PlanDiff,
};
pub use entitlement::{resolve_entitlement, Entitlement};
pub use error::{PolicyError, PolicyResult};
pub use quote::{
    calculate_savings, compute_quote, compute_quote_by_code, plan_by_code, select_best_offer,
    AppliedPromotion, Coupon, DiscountKind, Offer, Quote, QuoteBreakdown, Savings,
};
pub use rollout::{
    AddonAccess, AddonRolloutStatus, AddonRolloutSubPolicy, CountryRolloutPolicy, CountryStatus,
};
pub use subscription::{AddonSubscription, AddonSubscriptionStatus};
pub use validator::{
    validate_country_pricing, validate_feature_flags, validate_limits, validate_plan,
    ValidationReport,
};
