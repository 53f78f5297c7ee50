use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{
    lenient_count, lenient_decimal, lenient_label, lenient_string, lenient_timestamp, normalize_label,
    HasStatus, Timestamped,
};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TenderStatus {
    Draft,
    Active,
    Closed,
    Completed,
    Awarded,
    Rejected,
    Other(String),
}

impl TenderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TenderStatus::Draft => "draft",
            TenderStatus::Active => "active",
            TenderStatus::Closed => "closed",
            TenderStatus::Completed => "completed",
            TenderStatus::Awarded => "awarded",
            TenderStatus::Rejected => "rejected",
            TenderStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for TenderStatus {
    fn from(raw: String) -> Self {
        match normalize_label(&raw).as_str() {
            "draft" => TenderStatus::Draft,
            "active" => TenderStatus::Active,
            "closed" => TenderStatus::Closed,
            "completed" => TenderStatus::Completed,
            "awarded" => TenderStatus::Awarded,
            "rejected" => TenderStatus::Rejected,
            _ => TenderStatus::Other(raw),
        }
    }
}

impl From<TenderStatus> for String {
    fn from(status: TenderStatus) -> Self {
        status.as_str().to_string()
    }
}

impl Default for TenderStatus {
    fn default() -> Self {
        TenderStatus::Draft
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tender {
    #[serde(rename = "_id", alias = "id", default, deserialize_with = "lenient_string")]
    id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    title: String,
    #[serde(default, deserialize_with = "lenient_label")]
    status: TenderStatus,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    estimated_budget: Option<f64>,
    #[serde(default, deserialize_with = "lenient_count")]
    bid_count: Option<u64>,
}

impl Tender {
    pub fn new(id: impl Into<String>, title: impl Into<String>, status: TenderStatus, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status,
            created_at: Some(created_at),
            updated_at: Some(created_at),
            estimated_budget: None,
            bid_count: None,
        }
    }

    pub fn with_bid_count(mut self, bid_count: u64) -> Self {
        self.bid_count = Some(bid_count);
        self
    }

    pub fn with_estimated_budget(mut self, budget: f64) -> Self {
        self.estimated_budget = Some(budget);
        self
    }

    // Getter methods
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn status(&self) -> &TenderStatus {
        &self.status
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn estimated_budget(&self) -> Option<f64> {
        self.estimated_budget
    }

    /// Raw bid count as reported by the API, `None` when the field was absent.
    pub fn raw_bid_count(&self) -> Option<u64> {
        self.bid_count
    }

    /// Bid count with an absent field treated as zero.
    pub fn bid_count(&self) -> u64 {
        self.bid_count.unwrap_or(0)
    }

    pub fn is_active(&self) -> bool {
        self.status == TenderStatus::Active
    }

    pub fn is_completed(&self) -> bool {
        self.status == TenderStatus::Completed
    }
}

impl Timestamped for Tender {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

impl HasStatus for Tender {
    fn status_label(&self) -> &str {
        self.status.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tender_deserializes_api_shape() {
        let json = r#"{
            "_id": "t1",
            "title": "Office renovation",
            "status": "Active",
            "createdAt": "2024-05-01T10:00:00.000Z",
            "updatedAt": "2024-05-02T10:00:00.000Z",
            "estimatedBudget": "12,000",
            "bidCount": 4
        }"#;
        let tender: Tender = serde_json::from_str(json).unwrap();
        assert_eq!(tender.id(), "t1");
        assert_eq!(tender.status(), &TenderStatus::Active);
        assert_eq!(tender.estimated_budget(), Some(12000.0));
        assert_eq!(tender.bid_count(), 4);
        assert!(tender.created_at().is_some());
    }

    #[test]
    fn test_missing_bid_count_is_zero() {
        let tender: Tender = serde_json::from_str(r#"{"id": "t2", "title": "x", "status": "draft"}"#).unwrap();
        assert_eq!(tender.raw_bid_count(), None);
        assert_eq!(tender.bid_count(), 0);
        assert_eq!(tender.created_at(), None);
    }

    #[test]
    fn test_unknown_status_is_kept_verbatim() {
        let tender: Tender = serde_json::from_str(r#"{"id": "t3", "status": "on_hold"}"#).unwrap();
        assert_eq!(tender.status(), &TenderStatus::Other("on_hold".to_string()));
        assert_eq!(tender.status_label(), "on_hold");

        let json = serde_json::to_value(&tender).unwrap();
        assert_eq!(json["status"], "on_hold");
    }

    #[test]
    fn test_null_fields_decode_to_defaults() {
        let json = r#"{"_id": null, "title": null, "status": null, "bidCount": 1}"#;
        let tender: Tender = serde_json::from_str(json).unwrap();
        assert_eq!(tender.id(), "");
        assert_eq!(tender.title(), "");
        assert_eq!(tender.status(), &TenderStatus::Draft);
        assert_eq!(tender.bid_count(), 1);
    }

    #[test]
    fn test_one_sparse_tender_keeps_the_rest() {
        let json = r#"[
            {"_id": "t1", "title": "ok", "bidCount": 2},
            {"_id": "t2", "title": null, "bidCount": 1}
        ]"#;
        let tenders: Vec<Tender> = serde_json::from_str(json).unwrap();
        assert_eq!(tenders.len(), 2);
        assert_eq!(tenders[0].title(), "ok");
        assert_eq!(tenders[1].id(), "t2");
        assert_eq!(tenders.iter().map(Tender::bid_count).sum::<u64>(), 3);
    }
}
