//! Add-on subscription lifecycle
//!
//! Tracks a tenant's purchase of an add-on through
//! trial -> active -> grace -> cancelled/expired. Only the legal transition
//! set is implemented, as total functions returning a typed error for
//! anything else; transitions are driven externally (payment webhooks, the
//! scheduled sweep comparing `now` against the trial/grace deadlines). This
//! module never schedules timers itself.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tenantry_shared::TenantId;

use crate::addons::{AddonCountryConfig, PricingTier, PricingType};
use crate::error::{PolicyError, PolicyResult};

/// Lifecycle state of a per-tenant add-on purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddonSubscriptionStatus {
    /// Trial window active, no payment yet
    Trial,
    /// Paid and in good standing
    Active,
    /// Payment failed; access continues until the grace window ends
    Grace,
    /// Explicitly cancelled (terminal)
    Cancelled,
    /// Trial or grace window elapsed without resolution (terminal)
    Expired,
}

impl AddonSubscriptionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Expired)
    }

    /// Whether a subscription in this state still grants its entitlements.
    /// Grace keeps access (payment overdue, still functional); terminal
    /// states grant nothing.
    pub fn contributes_entitlements(&self) -> bool {
        matches!(self, Self::Trial | Self::Active | Self::Grace)
    }
}

impl std::fmt::Display for AddonSubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trial => write!(f, "trial"),
            Self::Active => write!(f, "active"),
            Self::Grace => write!(f, "grace"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Expired => write!(f, "expired"),
        }
    }
}

/// A tenant's subscription to one add-on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddonSubscription {
    pub tenant_id: TenantId,
    pub addon_id: String,
    /// Pricing tier id from the add-on's country config
    pub addon_tier: String,
    pub employee_count: u32,
    /// Major currency units per month
    pub monthly_amount: Decimal,
    pub currency_code: String,
    pub status: AddonSubscriptionStatus,
    pub trial_ends_at: Option<OffsetDateTime>,
    pub activated_at: Option<OffsetDateTime>,
    pub grace_period_ends_at: Option<OffsetDateTime>,
    pub cancelled_at: Option<OffsetDateTime>,
}

fn tier_monthly_amount(tier: &PricingTier, employee_count: u32) -> Decimal {
    match tier.pricing_type {
        PricingType::Flat => tier.price,
        PricingType::PerEmployee => tier.price * Decimal::from(employee_count),
    }
}

impl AddonSubscription {
    /// Create the subscription when a tenant first enables the add-on.
    ///
    /// Starts in Trial when the country config carries trial days, otherwise
    /// Active pending payment.
    pub fn start(
        tenant_id: TenantId,
        config: &AddonCountryConfig,
        tier: &PricingTier,
        employee_count: u32,
        now: OffsetDateTime,
    ) -> Self {
        let (status, trial_ends_at, activated_at) = if config.has_trial() {
            (
                AddonSubscriptionStatus::Trial,
                Some(now + Duration::days(config.trial_days as i64)),
                None,
            )
        } else {
            (AddonSubscriptionStatus::Active, None, Some(now))
        };
        Self {
            tenant_id,
            addon_id: config.addon_id.clone(),
            addon_tier: tier.id.clone(),
            employee_count,
            monthly_amount: tier_monthly_amount(tier, employee_count),
            currency_code: tier.currency.clone(),
            status,
            trial_ends_at,
            activated_at,
            grace_period_ends_at: None,
            cancelled_at: None,
        }
    }

    fn illegal(&self, to: AddonSubscriptionStatus) -> PolicyError {
        PolicyError::IllegalTransition {
            from: self.status,
            to,
        }
    }

    /// Payment succeeded: trial or grace converts to active.
    pub fn record_payment_success(&mut self, now: OffsetDateTime) -> PolicyResult<()> {
        match self.status {
            AddonSubscriptionStatus::Trial | AddonSubscriptionStatus::Grace => {
                self.status = AddonSubscriptionStatus::Active;
                self.activated_at = Some(now);
                self.grace_period_ends_at = None;
                Ok(())
            }
            _ => Err(self.illegal(AddonSubscriptionStatus::Active)),
        }
    }

    /// Payment failed: an active subscription enters its grace window.
    pub fn record_payment_failure(
        &mut self,
        now: OffsetDateTime,
        grace_days: u32,
    ) -> PolicyResult<()> {
        match self.status {
            AddonSubscriptionStatus::Active => {
                self.status = AddonSubscriptionStatus::Grace;
                self.grace_period_ends_at = Some(now + Duration::days(grace_days as i64));
                Ok(())
            }
            _ => Err(self.illegal(AddonSubscriptionStatus::Grace)),
        }
    }

    /// Trial or grace window elapsed without resolution.
    pub fn expire(&mut self) -> PolicyResult<()> {
        match self.status {
            AddonSubscriptionStatus::Trial | AddonSubscriptionStatus::Grace => {
                self.status = AddonSubscriptionStatus::Expired;
                Ok(())
            }
            _ => Err(self.illegal(AddonSubscriptionStatus::Expired)),
        }
    }

    /// Explicit cancellation from any non-terminal state. Terminal.
    pub fn cancel(&mut self, now: OffsetDateTime) -> PolicyResult<()> {
        if self.status.is_terminal() {
            return Err(self.illegal(AddonSubscriptionStatus::Cancelled));
        }
        self.status = AddonSubscriptionStatus::Cancelled;
        self.cancelled_at = Some(now);
        Ok(())
    }

    pub fn is_in_grace(&self) -> bool {
        self.status == AddonSubscriptionStatus::Grace
    }

    pub fn contributes_entitlements(&self) -> bool {
        self.status.contributes_entitlements()
    }

    /// Whole days until the trial ends; negative once past, None when no
    /// trial deadline is set.
    pub fn days_until_trial_end(&self, now: OffsetDateTime) -> Option<i64> {
        self.trial_ends_at.map(|end| (end - now).whole_days())
    }

    /// Whole days until the grace window ends; None outside grace.
    pub fn days_until_grace_end(&self, now: OffsetDateTime) -> Option<i64> {
        self.grace_period_ends_at.map(|end| (end - now).whole_days())
    }
}
