use axum::body::Bytes;
use axum::extract::{FromRequestParts, Path, RawQuery, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use yoink_api::{Content, Yoink};
use yoink_engine::{parse_count, RawParams};

use super::error::ApiError;
use super::AppState;

// ═══════════════════════════════════════════════════════════════
//  Parameters
// ═══════════════════════════════════════════════════════════════

/// Add every `key=value` pair of a urlencoded string, duplicates included.
fn extend_urlencoded(params: &mut RawParams, input: &[u8]) {
    params.extend(
        url::form_urlencoded::parse(input).map(|(k, v)| (k.into_owned(), v.into_owned())),
    );
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

/// `Path` whose rejections render as the JSON error body.
#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(ApiError))]
pub(crate) struct YoinkPath<T>(T);

#[derive(Deserialize)]
pub(crate) struct LastPath {
    topic: String,
    number: String,
}

/// Zero-value yoink served when a topic has nothing yet.
#[derive(Serialize, Default)]
struct EmptyYoink {
    id: i64,
    topic: &'static str,
    timestamp: &'static str,
    content: Content,
}

// ═══════════════════════════════════════════════════════════════
//  Publish
//  GET  /publish/yoink/for/{topic}?k=v
//  POST /yoink/{topic}            (query + form body)
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_publish_query(
    State(state): State<AppState>,
    YoinkPath(topic): YoinkPath<String>,
    RawQuery(query): RawQuery,
) -> Result<Json<Yoink>, ApiError> {
    let mut params = RawParams::new();
    if let Some(q) = query {
        extend_urlencoded(&mut params, q.as_bytes());
    }
    Ok(Json(state.publisher.publish(&topic, &params).await?))
}

pub(crate) async fn handle_publish_form(
    State(state): State<AppState>,
    YoinkPath(topic): YoinkPath<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Yoink>, ApiError> {
    let mut params = RawParams::new();
    if let Some(q) = query {
        extend_urlencoded(&mut params, q.as_bytes());
    }
    if is_form(&headers) {
        extend_urlencoded(&mut params, &body);
    }
    Ok(Json(state.publisher.publish(&topic, &params).await?))
}

// ═══════════════════════════════════════════════════════════════
//  Retrieve
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_latest(
    State(state): State<AppState>,
    YoinkPath(topic): YoinkPath<String>,
) -> Result<Response, ApiError> {
    Ok(match state.retriever.latest(&topic).await? {
        Some(yoink) => Json(yoink).into_response(),
        None => Json(EmptyYoink::default()).into_response(),
    })
}

pub(crate) async fn handle_last_n(
    State(state): State<AppState>,
    YoinkPath(path): YoinkPath<LastPath>,
) -> Result<Json<Vec<Yoink>>, ApiError> {
    let n = parse_count(&path.number)?;
    Ok(Json(state.retriever.last_n(&path.topic, n).await?))
}

pub(crate) async fn handle_all(
    State(state): State<AppState>,
    YoinkPath(topic): YoinkPath<String>,
) -> Result<Json<Vec<Yoink>>, ApiError> {
    Ok(Json(state.retriever.all(&topic).await?))
}
