use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::core::file_system::{FileSystem, Snapshot};
use crate::core::models::{Bid, Tender};
use crate::error::ApiError;

/// Source of the tender and bid collections a report is computed from.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TenderApi: Send + Sync {
    async fn fetch_tenders_for_user(&self, user_id: &str) -> Result<Vec<Tender>, ApiError>;
    /// Bids placed by the authenticated user.
    async fn fetch_bids_for_user(&self) -> Result<Vec<Bid>, ApiError>;
}

/// Collection endpoints answer either with a bare array or wrapped in `data`.
#[derive(Deserialize)]
struct Wrapped<T> {
    data: Vec<T>,
}

fn decode_collection<T: DeserializeOwned>(body: &[u8]) -> Result<Vec<T>, ApiError> {
    let first = body.iter().find(|b| !b.is_ascii_whitespace());
    if first == Some(&b'[') {
        Ok(serde_json::from_slice(body)?)
    } else {
        let wrapped: Wrapped<T> = serde_json::from_slice(body)?;
        Ok(wrapped.data)
    }
}

pub struct HttpTenderApi {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpTenderApi {
    pub fn new(base_url: &str, auth_token: Option<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_collection<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let url = self.endpoint(path);
        debug!("GET {}", url);

        let mut request = self.client.get(&url);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { status, url });
        }
        let body = response.bytes().await?;
        decode_collection(&body)
    }
}

#[async_trait]
impl TenderApi for HttpTenderApi {
    async fn fetch_tenders_for_user(&self, user_id: &str) -> Result<Vec<Tender>, ApiError> {
        self.get_collection(&format!("tenders/user/{}", user_id)).await
    }

    async fn fetch_bids_for_user(&self) -> Result<Vec<Bid>, ApiError> {
        self.get_collection("bids/my-bids").await
    }
}

/// Serves collections from a snapshot file, for offline reports.
pub struct SnapshotTenderApi {
    snapshot: Snapshot,
}

impl SnapshotTenderApi {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    pub fn from_file(path: &Path) -> Result<Self, ApiError> {
        Ok(Self::new(FileSystem::load_snapshot(path)?))
    }
}

#[async_trait]
impl TenderApi for SnapshotTenderApi {
    async fn fetch_tenders_for_user(&self, user_id: &str) -> Result<Vec<Tender>, ApiError> {
        debug!("Serving {} snapshot tenders for user {}", self.snapshot.tenders.len(), user_id);
        Ok(self.snapshot.tenders.clone())
    }

    async fn fetch_bids_for_user(&self) -> Result<Vec<Bid>, ApiError> {
        Ok(self.snapshot.bids.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{BidStatus, TenderStatus};
    use chrono::Utc;

    #[test]
    fn test_decode_bare_and_wrapped_collections() {
        let bare: Vec<Tender> = decode_collection(br#"[{"_id": "t1", "status": "active"}]"#).unwrap();
        assert_eq!(bare.len(), 1);

        let wrapped: Vec<Bid> = decode_collection(br#"{"data": [{"_id": "b1"}, {"_id": "b2"}]}"#).unwrap();
        assert_eq!(wrapped.len(), 2);

        let padded: Vec<Bid> = decode_collection(b"  \n [{\"_id\": \"b1\"}]").unwrap();
        assert_eq!(padded.len(), 1);

        let broken = decode_collection::<Bid>(br#"{"error": "unauthorized"}"#);
        assert!(matches!(broken, Err(ApiError::Json(_))));
    }

    #[test]
    fn test_decode_error_keeps_serde_detail() {
        match decode_collection::<Bid>(br#"{"error": "unauthorized"}"#) {
            Err(ApiError::Json(e)) => assert!(e.to_string().contains("missing field `data`"), "{}", e),
            other => panic!("expected a JSON error, got {:?}", other.map(|bids| bids.len())),
        }

        match decode_collection::<Tender>(br#"[{"_id": "t1"}, 5]"#) {
            Err(ApiError::Json(e)) => {
                assert!(e.is_data());
                assert_eq!(e.line(), 1);
                assert!(!e.to_string().contains("did not match any variant"), "{}", e);
            }
            other => panic!("expected a JSON error, got {:?}", other.map(|tenders| tenders.len())),
        }
    }

    #[test]
    fn test_sparse_records_do_not_fail_the_collection() {
        let tenders: Vec<Tender> = decode_collection(
            br#"[{"_id": "t1", "title": "ok", "bidCount": 2}, {"_id": "t2", "title": null, "bidCount": 1}]"#,
        )
        .unwrap();
        assert_eq!(tenders.len(), 2);
        assert_eq!(tenders[1].title(), "");
        assert_eq!(tenders[1].bid_count(), 1);

        let bids: Vec<Bid> = decode_collection(br#"{"data": [{"_id": "b1", "amount": 5, "status": null}]}"#).unwrap();
        assert_eq!(bids.len(), 1);
        assert_eq!(bids[0].status(), &BidStatus::Submitted);
        assert_eq!(bids[0].amount(), 5.0);

        let bids: Vec<Bid> = decode_collection(br#"[{"_id": null, "tender": {"title": "x"}, "amount": 3}]"#).unwrap();
        assert_eq!(bids[0].id(), "");
        assert!(bids[0].tender().is_none());
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let api = HttpTenderApi::new("https://api.example.com/api/", None, Duration::from_secs(5)).unwrap();
        assert_eq!(api.endpoint("/bids/my-bids"), "https://api.example.com/api/bids/my-bids");
        assert_eq!(api.endpoint("tenders/user/u1"), "https://api.example.com/api/tenders/user/u1");
    }

    #[tokio::test]
    async fn test_snapshot_api_serves_copies() {
        let snapshot = Snapshot {
            tenders: vec![Tender::new("t1", "Fence", TenderStatus::Active, Utc::now())],
            bids: vec![Bid::new("b1", "t1", Some(10.0), BidStatus::Submitted, Utc::now())],
        };
        let api = SnapshotTenderApi::new(snapshot);
        assert_eq!(api.fetch_tenders_for_user("u1").await.unwrap().len(), 1);
        assert_eq!(api.fetch_bids_for_user().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_mock_api_can_fail() {
        let mut api = MockTenderApi::new();
        api.expect_fetch_bids_for_user()
            .returning(|| Err(ApiError::Io(std::io::Error::new(std::io::ErrorKind::Other, "offline"))));
        assert!(api.fetch_bids_for_user().await.is_err());
    }
}
