//! Billing-cycle price quotes
//!
//! Computes the exact amounts a checkout page shows and the payment gateway
//! charges: cycle price, offer and coupon discounts, effective monthly
//! price, and the minor-unit amount. Offer applies first, coupon applies to
//! the post-offer subtotal, and the total never drops below zero.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tenantry_shared::{BillingCycle, Plan};

use crate::error::{PolicyError, PolicyResult};

/// How a promotion discounts the cycle price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DiscountKind {
    Percent,
    Flat,
}

/// A promotional offer attached to plans by the storefront
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub id: String,
    pub name: String,
    pub kind: DiscountKind,
    /// Percent (0-100) or flat major-unit amount, per `kind`
    pub value: Decimal,
    /// Empty means the offer applies to every plan
    #[serde(default)]
    pub plan_codes: Vec<String>,
    /// Empty means the offer applies to every cycle
    #[serde(default)]
    pub cycles: Vec<BillingCycle>,
}

impl Offer {
    pub fn applies_to(&self, plan_code: &str, cycle: BillingCycle) -> bool {
        (self.plan_codes.is_empty() || self.plan_codes.iter().any(|c| c == plan_code))
            && (self.cycles.is_empty() || self.cycles.contains(&cycle))
    }
}

/// A coupon code entered by the tenant at checkout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    pub code: String,
    pub name: String,
    pub kind: DiscountKind,
    pub value: Decimal,
    #[serde(default)]
    pub plan_codes: Vec<String>,
    #[serde(default)]
    pub cycles: Vec<BillingCycle>,
}

impl Coupon {
    pub fn applies_to(&self, plan_code: &str, cycle: BillingCycle) -> bool {
        (self.plan_codes.is_empty() || self.plan_codes.iter().any(|c| c == plan_code))
            && (self.cycles.is_empty() || self.cycles.contains(&cycle))
    }
}

/// Promotion metadata echoed back for receipts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedPromotion {
    pub id: String,
    pub name: String,
}

/// Line-item breakdown of a quote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteBreakdown {
    /// Plan's monthly base price
    pub base_price: Decimal,
    /// Price for the full cycle before discounts
    pub cycle_price: Decimal,
    pub offer_discount: Decimal,
    pub coupon_discount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_description: Option<String>,
}

/// Derived price quote; never persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub currency_code: String,
    pub breakdown: QuoteBreakdown,
    pub effective_price_per_month: Decimal,
    /// Integer minor units for gateway submission (round(total x 100))
    pub amount_in_minor_units: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_offer: Option<AppliedPromotion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_coupon: Option<AppliedPromotion>,
}

/// Discount amount against a base, capped so the result never goes negative
fn discount_amount(kind: DiscountKind, value: Decimal, base: Decimal) -> Decimal {
    let raw = match kind {
        DiscountKind::Percent => base * value / dec!(100),
        DiscountKind::Flat => value,
    };
    raw.max(Decimal::ZERO).min(base)
}

/// Pick the applicable offer with the largest discount on this plan+cycle.
/// Ties keep the first offer in store order.
pub fn select_best_offer<'a>(
    offers: &'a [Offer],
    plan: &Plan,
    cycle: BillingCycle,
) -> Option<&'a Offer> {
    let cycle_price = plan.cycle(cycle).filter(|c| c.enabled)?.price;
    offers
        .iter()
        .filter(|offer| offer.applies_to(&plan.code, cycle))
        .fold(None, |best: Option<(&Offer, Decimal)>, offer| {
            let amount = discount_amount(offer.kind, offer.value, cycle_price);
            match best {
                Some((_, best_amount)) if best_amount >= amount => best,
                _ => Some((offer, amount)),
            }
        })
        .map(|(offer, _)| offer)
}

/// Compute the quote for one plan + billing cycle.
///
/// A missing or disabled cycle is a hard error — that is a caller mistake,
/// not a user-correctable validation failure.
pub fn compute_quote(
    plan: &Plan,
    cycle: BillingCycle,
    offer: Option<&Offer>,
    coupon: Option<&Coupon>,
) -> PolicyResult<Quote> {
    let option = plan
        .cycle(cycle)
        .filter(|c| c.enabled)
        .ok_or_else(|| PolicyError::CycleUnavailable {
            plan_code: plan.code.clone(),
            cycle: cycle.to_string(),
        })?;
    let cycle_price = option.price;

    let offer = offer.filter(|o| o.applies_to(&plan.code, cycle));
    let offer_discount = offer
        .map(|o| discount_amount(o.kind, o.value, cycle_price))
        .unwrap_or(Decimal::ZERO);
    let after_offer = cycle_price - offer_discount;

    let coupon = coupon.filter(|c| c.applies_to(&plan.code, cycle));
    let coupon_discount = coupon
        .map(|c| discount_amount(c.kind, c.value, after_offer))
        .unwrap_or(Decimal::ZERO);
    let total = after_offer - coupon_discount;

    let months = Decimal::from(cycle.months());
    let effective_price_per_month = (total / months).round_dp(2);

    // Half-up, not banker's: a half-cent total charges the extra paisa.
    let minor =
        (total * dec!(100)).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let amount_in_minor_units = minor.to_i64().ok_or_else(|| {
        PolicyError::InvalidInput(format!("quote total {} out of range", total))
    })?;

    let mut description_parts = Vec::new();
    if let Some(o) = offer {
        if offer_discount > Decimal::ZERO {
            description_parts.push(format!("{} (-{})", o.name, offer_discount));
        }
    }
    if let Some(c) = coupon {
        if coupon_discount > Decimal::ZERO {
            description_parts.push(format!("{} (-{})", c.name, coupon_discount));
        }
    }

    tracing::debug!(
        plan_code = %plan.code,
        cycle = %cycle,
        %total,
        amount_in_minor_units,
        "computed quote"
    );

    Ok(Quote {
        subtotal: cycle_price,
        discount: offer_discount + coupon_discount,
        total,
        currency_code: plan.currency_code.clone(),
        breakdown: QuoteBreakdown {
            base_price: plan.base_price,
            cycle_price,
            offer_discount,
            coupon_discount,
            discount_description: (!description_parts.is_empty())
                .then(|| description_parts.join(" + ")),
        },
        effective_price_per_month,
        amount_in_minor_units,
        applied_offer: offer.map(|o| AppliedPromotion {
            id: o.id.clone(),
            name: o.name.clone(),
        }),
        applied_coupon: coupon.map(|c| AppliedPromotion {
            id: c.code.clone(),
            name: c.name.clone(),
        }),
    })
}

/// Look up a plan by code in a store snapshot
pub fn plan_by_code<'a>(plans: &'a [Plan], code: &str) -> PolicyResult<&'a Plan> {
    plans
        .iter()
        .find(|plan| plan.code == code)
        .ok_or_else(|| PolicyError::PlanNotFound(code.to_string()))
}

/// Quote a plan selected by code, the way checkout submits it
pub fn compute_quote_by_code(
    plans: &[Plan],
    plan_code: &str,
    cycle: BillingCycle,
    offer: Option<&Offer>,
    coupon: Option<&Coupon>,
) -> PolicyResult<Quote> {
    compute_quote(plan_by_code(plans, plan_code)?, cycle, offer, coupon)
}

/// Savings from choosing a longer cycle over paying month by month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Savings {
    /// Major currency units saved over the cycle; zero when not cheaper
    pub amount: Decimal,
    /// Percent saved, rounded to the nearest integer, clamped to >= 0
    pub percent: u32,
}

pub fn calculate_savings(
    monthly_price: Decimal,
    cycle_price: Decimal,
    cycle_months: u32,
) -> Savings {
    let expected = monthly_price * Decimal::from(cycle_months);
    let amount = (expected - cycle_price).max(Decimal::ZERO);
    let percent = if expected > Decimal::ZERO {
        (amount / expected * dec!(100))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u32()
            .unwrap_or(0)
    } else {
        0
    };
    Savings { amount, percent }
}
