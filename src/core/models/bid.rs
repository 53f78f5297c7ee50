use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::common::{
    lenient_decimal, lenient_label, lenient_optional_label, lenient_string, lenient_timestamp, normalize_label,
    HasStatus, Timestamped,
};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BidStatus {
    Submitted,
    UnderReview,
    Accepted,
    Rejected,
    Completed,
    Other(String),
}

impl BidStatus {
    pub fn as_str(&self) -> &str {
        match self {
            BidStatus::Submitted => "submitted",
            BidStatus::UnderReview => "under_review",
            BidStatus::Accepted => "accepted",
            BidStatus::Rejected => "rejected",
            BidStatus::Completed => "completed",
            BidStatus::Other(raw) => raw,
        }
    }

    /// A bid is won once the tender owner accepted it, and stays won after
    /// the work is completed.
    pub fn is_won(&self) -> bool {
        matches!(self, BidStatus::Accepted | BidStatus::Completed)
    }
}

impl From<String> for BidStatus {
    fn from(raw: String) -> Self {
        match normalize_label(&raw).as_str() {
            "submitted" => BidStatus::Submitted,
            "under_review" => BidStatus::UnderReview,
            "accepted" => BidStatus::Accepted,
            "rejected" => BidStatus::Rejected,
            "completed" => BidStatus::Completed,
            _ => BidStatus::Other(raw),
        }
    }
}

impl From<BidStatus> for String {
    fn from(status: BidStatus) -> Self {
        status.as_str().to_string()
    }
}

impl Default for BidStatus {
    fn default() -> Self {
        BidStatus::Submitted
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Other(String),
}

impl PaymentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for PaymentStatus {
    fn from(raw: String) -> Self {
        match normalize_label(&raw).as_str() {
            "pending" => PaymentStatus::Pending,
            "completed" | "paid" => PaymentStatus::Completed,
            "failed" => PaymentStatus::Failed,
            _ => PaymentStatus::Other(raw),
        }
    }
}

impl From<PaymentStatus> for String {
    fn from(status: PaymentStatus) -> Self {
        status.as_str().to_string()
    }
}

/// The tender a bid points at. The API returns either the bare id or the
/// populated tender document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TenderRef {
    Id(String),
    Populated {
        #[serde(rename = "_id", alias = "id")]
        id: String,
        #[serde(default)]
        title: Option<String>,
    },
}

impl TenderRef {
    pub fn id(&self) -> &str {
        match self {
            TenderRef::Id(id) => id,
            TenderRef::Populated { id, .. } => id,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            TenderRef::Id(_) => None,
            TenderRef::Populated { title, .. } => title.as_deref(),
        }
    }
}

/// A tender reference that matches neither shape is dropped instead of
/// failing the bid.
fn lenient_tender_ref<'de, D>(deserializer: D) -> Result<Option<TenderRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| TenderRef::deserialize(v).ok()))
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    #[serde(rename = "_id", alias = "id", default, deserialize_with = "lenient_string")]
    id: String,
    #[serde(default, deserialize_with = "lenient_tender_ref")]
    tender: Option<TenderRef>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient_label")]
    status: BidStatus,
    #[serde(default, deserialize_with = "lenient_optional_label")]
    payment_status: Option<PaymentStatus>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    created_at: Option<DateTime<Utc>>,
}

impl Bid {
    pub fn new(
        id: impl Into<String>,
        tender_id: impl Into<String>,
        amount: Option<f64>,
        status: BidStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            tender: Some(TenderRef::Id(tender_id.into())),
            amount,
            status,
            payment_status: None,
            created_at: Some(created_at),
        }
    }

    pub fn with_payment_status(mut self, payment_status: PaymentStatus) -> Self {
        self.payment_status = Some(payment_status);
        self
    }

    // Getter methods
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tender(&self) -> Option<&TenderRef> {
        self.tender.as_ref()
    }

    pub fn raw_amount(&self) -> Option<f64> {
        self.amount
    }

    /// Amount with an absent or non-numeric value treated as zero.
    pub fn amount(&self) -> f64 {
        self.amount.unwrap_or(0.0)
    }

    pub fn status(&self) -> &BidStatus {
        &self.status
    }

    pub fn payment_status(&self) -> Option<&PaymentStatus> {
        self.payment_status.as_ref()
    }

    pub fn is_won(&self) -> bool {
        self.status.is_won()
    }
}

impl Timestamped for Bid {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

impl HasStatus for Bid {
    fn status_label(&self) -> &str {
        self.status.as_str()
    }
}
