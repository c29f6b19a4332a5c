use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use metrics::counter;
use serde::Deserialize;

use weir_core::telemetry::SELECT_REQUESTS_TOTAL;

use super::types::{ErrorBody, HealthDto, ShardSelectionDto};
use super::AppState;

#[derive(Debug, Deserialize)]
pub(crate) struct SelectParams {
    /// Request type to select a shard for, e.g. ?type=analytics
    #[serde(rename = "type")]
    pub(crate) request_type: Option<String>,
}

/// GET /select_shard?type={request_type}
///
/// Answers from the published selections only; no scoring happens on the
/// request path. An unknown request type is a caller error (400), a known
/// one without a published selection yet is retriable (404).
pub(crate) async fn select_shard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SelectParams>,
) -> Response {
    let request_type = match params.request_type.as_deref() {
        Some(request_type) if !request_type.is_empty() => request_type,
        _ => {
            counter!(SELECT_REQUESTS_TOTAL.name, "result" => "bad_request").increment(1);
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody::new("missing required query parameter: type")),
            )
                .into_response();
        }
    };

    if !state.config.profiles.contains_key(request_type) {
        counter!(SELECT_REQUESTS_TOTAL.name, "result" => "unknown_type").increment(1);
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new(format!(
                "unknown request type: {}",
                request_type
            ))),
        )
            .into_response();
    }

    match state.store.read(request_type) {
        Some(selection) => {
            counter!(SELECT_REQUESTS_TOTAL.name, "result" => "ok").increment(1);
            Json(ShardSelectionDto::from_selection(&selection)).into_response()
        }
        None => {
            counter!(SELECT_REQUESTS_TOTAL.name, "result" => "not_ready").increment(1);
            (
                StatusCode::NOT_FOUND,
                Json(ErrorBody::new(format!(
                    "no selection published yet for request type: {}",
                    request_type
                ))),
            )
                .into_response()
        }
    }
}

/// GET /healthz
///
/// Reports how many request types are published and whether the newest
/// publication is stale, i.e. older than two refresh intervals.
pub(crate) async fn healthz(State(state): State<Arc<AppState>>) -> Json<HealthDto> {
    let selections = state.store.selections();
    let newest = selections.values().map(|s| s.snapshot_at).max();
    let stale = match newest {
        Some(at) => {
            let age_seconds = (Utc::now() - at).num_seconds();
            age_seconds > 2 * state.config.refresh_interval.as_secs() as i64
        }
        None => true,
    };

    Json(HealthDto {
        status: "ok",
        request_types: selections.len(),
        last_updated: newest.map(|at| at.to_rfc3339()),
        stale,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use std::collections::BTreeMap;
    use std::time::Duration;
    use weir_core::{RequestProfile, Selection, SelectionStore, SelectorConfig, Shard};

    fn app_state() -> Arc<AppState> {
        let config = SelectorConfig::new(
            BTreeMap::from([("cpu".to_string(), 1.0)]),
            BTreeMap::from([("cpu".to_string(), 2.0)]),
            BTreeMap::from([
                (
                    "analytics".to_string(),
                    RequestProfile::from(BTreeMap::from([("cpu".to_string(), 1.0)])),
                ),
                (
                    "simple_read".to_string(),
                    RequestProfile::from(BTreeMap::from([("cpu".to_string(), 0.5)])),
                ),
            ]),
            Duration::from_secs(30),
            Duration::from_secs(10),
        )
        .unwrap();

        Arc::new(AppState {
            store: Arc::new(SelectionStore::new()),
            config: Arc::new(config),
        })
    }

    fn publish(state: &AppState, request_type: &str, shard_name: &str, snapshot_at: chrono::DateTime<Utc>) {
        let selection = Arc::new(Selection {
            request_type: request_type.to_string(),
            shard: Shard {
                name: shard_name.to_string(),
                usage: BTreeMap::from([("cpu".to_string(), 0.5)]),
            },
            score: 0.25,
            ranked: Vec::new(),
            snapshot_at,
        });
        let mut map = state.store.selections().as_ref().clone();
        map.insert(request_type.to_string(), selection);
        state.store.publish(map);
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn known_type_with_selection_is_ok() {
        let state = app_state();
        publish(&state, "analytics", "shard-b", Utc::now());

        let response = select_shard(
            State(state),
            Query(SelectParams {
                request_type: Some("analytics".to_string()),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["selected_shard"], "shard-b");
        assert_eq!(json["selected_metrics"]["cpu"], 0.5);
    }

    #[tokio::test]
    async fn missing_type_parameter_is_bad_request() {
        let state = app_state();

        let response = select_shard(State(state), Query(SelectParams { request_type: None })).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("type"));
    }

    #[tokio::test]
    async fn empty_type_parameter_is_bad_request() {
        let state = app_state();

        let response = select_shard(
            State(state),
            Query(SelectParams {
                request_type: Some(String::new()),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_type_is_bad_request_with_distinct_body() {
        let state = app_state();
        publish(&state, "analytics", "shard-b", Utc::now());

        let response = select_shard(
            State(state),
            Query(SelectParams {
                request_type: Some("video_transcode".to_string()),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"]
            .as_str()
            .unwrap()
            .contains("unknown request type"));
    }

    #[tokio::test]
    async fn known_type_without_selection_is_not_found() {
        let state = app_state();
        // analytics is published, simple_read is configured but not yet published
        publish(&state, "analytics", "shard-b", Utc::now());

        let response = select_shard(
            State(state),
            Query(SelectParams {
                request_type: Some("simple_read".to_string()),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert!(json["error"]
            .as_str()
            .unwrap()
            .contains("no selection published yet"));
    }

    #[tokio::test]
    async fn healthz_reports_empty_store_as_stale() {
        let state = app_state();

        let Json(health) = healthz(State(state)).await;

        assert_eq!(health.status, "ok");
        assert_eq!(health.request_types, 0);
        assert!(health.last_updated.is_none());
        assert!(health.stale);
    }

    #[tokio::test]
    async fn healthz_reports_fresh_and_stale_publications() {
        let state = app_state();
        publish(&state, "analytics", "shard-b", Utc::now());

        let Json(fresh) = healthz(State(state.clone())).await;
        assert_eq!(fresh.request_types, 1);
        assert!(!fresh.stale);

        // Re-publish with a timestamp beyond two refresh intervals.
        publish(
            &state,
            "analytics",
            "shard-b",
            Utc::now() - ChronoDuration::seconds(120),
        );
        let Json(stale) = healthz(State(state)).await;
        assert!(stale.stale);
    }
}
