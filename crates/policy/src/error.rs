//! Policy engine error types

use thiserror::Error;

use crate::subscription::AddonSubscriptionStatus;

/// Hard errors raised by the policy engine.
///
/// These indicate caller-programming mistakes (quoting a disabled cycle,
/// driving an illegal lifecycle transition), not user-correctable input.
/// User-facing validation problems are reported through
/// [`crate::ValidationReport`] instead and never surface here.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Billing cycle {cycle} is not available on plan {plan_code}")]
    CycleUnavailable { plan_code: String, cycle: String },

    #[error("Plan not found: {0}")]
    PlanNotFound(String),

    #[error("Illegal subscription transition: {from} -> {to}")]
    IllegalTransition {
        from: AddonSubscriptionStatus,
        to: AddonSubscriptionStatus,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type PolicyResult<T> = Result<T, PolicyError>;
