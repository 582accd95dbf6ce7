use crate::error::CampaignError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Settlement outcome of an upstream payment.
///
/// Only `Completed` records are ever counted towards a campaign.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Completed,
    Pending,
    Failed,
    Canceled,
    #[default]
    #[serde(other)]
    Unknown,
}

/// An amount expressed in the smallest currency unit (e.g. cents).
///
/// Sums saturate instead of wrapping so a corrupt upstream value can never
/// turn a total negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct MinorUnits(pub u64);

impl MinorUnits {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Converts to major currency units with two decimal places, exactly.
    pub fn to_major(self) -> Decimal {
        Decimal::from_i128_with_scale(i128::from(self.0), 2)
    }
}

impl Add for MinorUnits {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for MinorUnits {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for MinorUnits {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// Links a payment to a campaign.
///
/// `tag` is an explicit label set on the payment (Stripe metadata), `link` is
/// the payment-link identifier embedded by the checkout flow.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
pub struct CampaignRef {
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl CampaignRef {
    pub fn is_empty(&self) -> bool {
        self.tag.is_none() && self.link.is_none()
    }
}

/// One upstream transaction, reduced to what aggregation needs.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub id: String,
    #[serde(default)]
    pub status: PaymentStatus,
    #[serde(default)]
    pub amount_minor_units: Option<i64>,
    #[serde(default, skip_serializing_if = "CampaignRef::is_empty")]
    pub campaign_ref: CampaignRef,
}

impl PaymentRecord {
    pub fn new(id: impl Into<String>, status: PaymentStatus, amount_minor_units: i64) -> Self {
        Self {
            id: id.into(),
            status,
            amount_minor_units: Some(amount_minor_units),
            campaign_ref: CampaignRef::default(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.campaign_ref.tag = Some(tag.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.campaign_ref.link = Some(link.into());
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == PaymentStatus::Completed
    }

    /// The amount this record contributes, or why it cannot contribute.
    pub fn amount(&self) -> Result<MinorUnits, CampaignError> {
        let raw = self
            .amount_minor_units
            .ok_or_else(|| self.malformed("missing amount"))?;
        u64::try_from(raw)
            .map(MinorUnits)
            .map_err(|_| self.malformed("negative amount"))
    }

    fn malformed(&self, reason: &'static str) -> CampaignError {
        CampaignError::MalformedRecord {
            id: self.id.clone(),
            reason,
        }
    }
}
