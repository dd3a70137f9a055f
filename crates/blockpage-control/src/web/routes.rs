//! REST route definitions

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use blockpage_core::{BlockId, BlockLayoutRecord};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared in-memory record list, in insertion order
#[derive(Debug, Clone, Default)]
pub struct LayoutDb {
    records: Arc<RwLock<Vec<BlockLayoutRecord>>>,
}

impl LayoutDb {
    /// Create a database seeded with records
    pub fn with_records(records: Vec<BlockLayoutRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    /// Snapshot of every stored record
    pub async fn all(&self) -> Vec<BlockLayoutRecord> {
        self.records.read().await.clone()
    }

    /// Look up a record by uuid
    pub async fn get(&self, uuid: &BlockId) -> Option<BlockLayoutRecord> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| &r.uuid == uuid)
            .cloned()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// True when nothing is stored
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

/// Build the API router
pub fn build_router() -> Router<LayoutDb> {
    Router::new()
        .route("/create-page-component", post(create_page_component))
        .route("/update-page-component-by-uuid", put(update_page_component))
        .route("/page-components/by-url", get(list_page_components))
        .route("/page-component/by-uuid/:uuid", delete(delete_page_component))
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    #[serde(rename = "pagePath")]
    page_path: String,
}

/// POST /create-page-component
async fn create_page_component(
    State(db): State<LayoutDb>,
    Json(mut record): Json<BlockLayoutRecord>,
) -> Result<Json<BlockLayoutRecord>, StatusCode> {
    if record.uuid.is_empty() {
        record.uuid = BlockId::generate();
    }

    let mut records = db.records.write().await;
    if records.iter().any(|r| r.uuid == record.uuid) {
        tracing::warn!("Rejecting duplicate uuid {}", record.uuid);
        return Err(StatusCode::CONFLICT);
    }
    tracing::info!(
        "Created {} '{}' on {}",
        record.component_type,
        record.uuid,
        record.page_path
    );
    records.push(record.clone());
    Ok(Json(record))
}

/// PUT /update-page-component-by-uuid
async fn update_page_component(
    State(db): State<LayoutDb>,
    Json(record): Json<BlockLayoutRecord>,
) -> Result<Json<BlockLayoutRecord>, StatusCode> {
    let mut records = db.records.write().await;
    let existing = records
        .iter_mut()
        .find(|r| r.uuid == record.uuid)
        .ok_or(StatusCode::NOT_FOUND)?;
    *existing = record.clone();
    tracing::debug!("Updated '{}'", record.uuid);
    Ok(Json(record))
}

/// GET /page-components/by-url?pagePath=...
async fn list_page_components(
    State(db): State<LayoutDb>,
    Query(query): Query<PageQuery>,
) -> Json<Vec<BlockLayoutRecord>> {
    let records = db.records.read().await;
    let page: Vec<_> = records
        .iter()
        .filter(|r| r.page_path == query.page_path)
        .cloned()
        .collect();
    Json(page)
}

/// DELETE /page-component/by-uuid/:uuid
async fn delete_page_component(
    State(db): State<LayoutDb>,
    Path(uuid): Path<String>,
) -> StatusCode {
    let uuid = BlockId::new(uuid);
    let mut records = db.records.write().await;
    let before = records.len();
    records.retain(|r| r.uuid != uuid);
    if records.len() == before {
        return StatusCode::NOT_FOUND;
    }
    tracing::info!("Deleted '{}'", uuid);
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use blockpage_core::Geometry;
    use tower::ServiceExt;

    fn record(uuid: &str, page: &str) -> BlockLayoutRecord {
        BlockLayoutRecord::new(
            BlockId::new(uuid),
            page,
            "cup_preview",
            Geometry::new(10, 10, 200, 150),
        )
    }

    async fn body_json<T: serde::de::DeserializeOwned>(resp: axum::response::Response) -> T {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_list_filters_by_page() {
        let db = LayoutDb::with_records(vec![
            record("a", "/home"),
            record("b", "/about"),
            record("c", "/home"),
        ]);
        let app = build_router().with_state(db);

        let resp = app
            .oneshot(
                Request::get("/page-components/by-url?pagePath=%2Fhome")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let records: Vec<BlockLayoutRecord> = body_json(resp).await;
        let ids: Vec<_> = records.iter().map(|r| r.uuid.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_create_generates_missing_uuid() {
        let db = LayoutDb::default();
        let app = build_router().with_state(db.clone());

        let mut body = record("", "/home");
        body.uuid = BlockId::default();
        let resp = app
            .oneshot(
                Request::post("/create-page-component")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let stored: BlockLayoutRecord = body_json(resp).await;
        assert!(!stored.uuid.is_empty());
        assert_eq!(db.len().await, 1);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate() {
        let db = LayoutDb::with_records(vec![record("a", "/home")]);
        let app = build_router().with_state(db.clone());

        let resp = app
            .oneshot(
                Request::post("/create-page-component")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::to_vec(&record("a", "/home")).unwrap(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(db.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_uuid() {
        let db = LayoutDb::default();
        let app = build_router().with_state(db);

        let resp = app
            .clone()
            .oneshot(
                Request::put("/update-page-component-by-uuid")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::to_vec(&record("ghost", "/home")).unwrap(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = app
            .oneshot(
                Request::delete("/page-component/by-uuid/ghost")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let db = LayoutDb::with_records(vec![record("a", "/home"), record("b", "/home")]);
        let app = build_router().with_state(db.clone());

        let resp = app
            .oneshot(
                Request::delete("/page-component/by-uuid/a")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(db.get(&BlockId::new("a")).await.is_none());
        assert_eq!(db.len().await, 1);
    }
}
