use crate::error::{CampaignError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize, Serializer};

/// Fixed campaign targets. Both are strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Goals {
    amount: Decimal,
    donors: u64,
}

impl Goals {
    pub fn new(amount: Decimal, donors: u64) -> Result<Self> {
        if amount <= Decimal::ZERO {
            return Err(CampaignError::Config(
                "Goal amount must be positive".to_string(),
            ));
        }
        if donors == 0 {
            return Err(CampaignError::Config(
                "Goal donor count must be positive".to_string(),
            ));
        }
        Ok(Self { amount, donors })
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn donors(&self) -> u64 {
        self.donors
    }
}

/// `min(100, 100 * actual / goal)` rounded half away from zero to one decimal.
///
/// Overflow can only happen far above the goal, so it clamps to 100.
pub fn progress_percent(actual: Decimal, goal: Decimal) -> Decimal {
    if actual <= Decimal::ZERO || goal <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    actual
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(goal))
        .map_or(Decimal::ONE_HUNDRED, |percent| percent.min(Decimal::ONE_HUNDRED))
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// Fundraising progress at a point in time. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignSummary {
    pub donor_count: u64,
    pub total_amount: Decimal,
    pub goal_donors: u64,
    pub goal_amount: Decimal,
    pub amount_percent: Decimal,
    pub donor_percent: Decimal,
    #[serde(serialize_with = "serialize_millis")]
    pub last_updated: DateTime<Utc>,
}

/// RFC 3339 in UTC with exactly three fractional digits, e.g. `2026-01-02T03:04:05.000Z`.
fn serialize_millis<S: Serializer>(
    at: &DateTime<Utc>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
}

impl CampaignSummary {
    pub fn new(donor_count: u64, total_amount: Decimal, goals: Goals, now: DateTime<Utc>) -> Self {
        Self {
            donor_count,
            total_amount,
            goal_donors: goals.donors(),
            goal_amount: goals.amount(),
            amount_percent: progress_percent(total_amount, goals.amount()),
            donor_percent: progress_percent(Decimal::from(donor_count), Decimal::from(goals.donors())),
            last_updated: now,
        }
    }
}
