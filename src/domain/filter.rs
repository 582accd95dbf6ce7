use super::payment::PaymentRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which upstream object counts as a donation, and how it is tied to a campaign.
///
/// `Transaction` counts settled payment intents matched on either the
/// metadata tag or the embedded payment link. `Session` counts paid checkout
/// sessions matched on their payment link only.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum FilterPolicy {
    #[default]
    Transaction,
    Session,
}

impl FilterPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterPolicy::Transaction => "transaction",
            FilterPolicy::Session => "session",
        }
    }
}

impl fmt::Display for FilterPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "transaction" => Ok(FilterPolicy::Transaction),
            "session" => Ok(FilterPolicy::Session),
            other => Err(format!(
                "unknown filter policy '{other}' (expected 'transaction' or 'session')"
            )),
        }
    }
}

/// Decides whether a record belongs to the configured campaign.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CampaignFilter {
    pub policy: FilterPolicy,
    /// `None` counts every completed record, associated or not.
    pub campaign_id: Option<String>,
}

impl CampaignFilter {
    pub fn new(policy: FilterPolicy, campaign_id: Option<String>) -> Self {
        let campaign_id = campaign_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        Self {
            policy,
            campaign_id,
        }
    }

    pub fn matches(&self, record: &PaymentRecord) -> bool {
        if !record.is_completed() {
            return false;
        }
        let Some(campaign_id) = self.campaign_id.as_deref() else {
            return true;
        };
        let link = record.campaign_ref.link.as_deref();
        match self.policy {
            FilterPolicy::Transaction => {
                record.campaign_ref.tag.as_deref() == Some(campaign_id)
                    || link == Some(campaign_id)
            }
            FilterPolicy::Session => link == Some(campaign_id),
        }
    }
}
