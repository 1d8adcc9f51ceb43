//! Clip endpoints (/api/clips)

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::post,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::AppState;
use crate::constants::{CLIPS_COLLECTION, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use crate::error::ApiError;
use crate::schema::NewClip;
use crate::storage::Document;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/clips", post(create_clip).get(list_clips))
}

#[derive(Serialize)]
struct CreateClipResponse {
    id: String,
    message: &'static str,
}

/// POST /api/clips - validate a clip payload and persist it
async fn create_clip(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewClip>,
) -> Result<Json<CreateClipResponse>, ApiError> {
    let clip = payload.validate()?;

    let id = state
        .store()?
        .create_document(CLIPS_COLLECTION, &clip)
        .await?;

    Ok(Json(CreateClipResponse {
        id,
        message: "Clip saved",
    }))
}

#[derive(Deserialize)]
struct ListClipsQuery {
    limit: Option<i64>,
}

#[derive(Serialize)]
struct ListClipsResponse {
    items: Vec<Map<String, Value>>,
}

/// GET /api/clips - list stored clips, newest first
async fn list_clips(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListClipsQuery>,
) -> Result<Json<ListClipsResponse>, ApiError> {
    let limit = effective_limit(query.limit)?;

    let documents = state
        .store()?
        .get_documents(CLIPS_COLLECTION, &Map::new(), limit)
        .await?;

    let items = documents.into_iter().map(shape_item).collect();
    Ok(Json(ListClipsResponse { items }))
}

/// Apply the default and the hard ceiling to a requested limit; non-positive
/// values are a client error.
fn effective_limit(requested: Option<i64>) -> Result<i64, ApiError> {
    match requested {
        None => Ok(DEFAULT_LIST_LIMIT),
        Some(n) if n < 1 => Err(ApiError::bad_request("limit must be a positive integer")),
        Some(n) => Ok(n.min(MAX_LIST_LIMIT)),
    }
}

/// Merge the store identifier into the body as a plain string `id` field.
fn shape_item(document: Document) -> Map<String, Value> {
    let mut item = document.body;
    item.insert("id".to_string(), Value::String(document.id.to_string()));
    item
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_effective_limit_default() {
        assert_eq!(effective_limit(None).unwrap(), DEFAULT_LIST_LIMIT);
    }

    #[test]
    fn test_effective_limit_passthrough() {
        assert_eq!(effective_limit(Some(7)).unwrap(), 7);
    }

    #[test]
    fn test_effective_limit_clamped_to_ceiling() {
        assert_eq!(effective_limit(Some(100_000)).unwrap(), MAX_LIST_LIMIT);
    }

    #[test]
    fn test_effective_limit_rejects_non_positive() {
        assert!(effective_limit(Some(0)).is_err());
        assert!(effective_limit(Some(-5)).is_err());
    }

    #[test]
    fn test_shape_item_exposes_id_as_string() {
        let id = Uuid::new_v4();
        let mut body = Map::new();
        body.insert("title".to_string(), Value::String("Op1".to_string()));

        let item = shape_item(Document { id, body });

        assert_eq!(item["id"], Value::String(id.to_string()));
        assert_eq!(item["title"], Value::String("Op1".to_string()));
    }

    #[test]
    fn test_shape_item_ids_are_distinct() {
        let a = shape_item(Document {
            id: Uuid::new_v4(),
            body: Map::new(),
        });
        let b = shape_item(Document {
            id: Uuid::new_v4(),
            body: Map::new(),
        });
        assert_ne!(a["id"], b["id"]);
        assert!(!a["id"].as_str().unwrap().is_empty());
    }
}
