//! HTTP request handlers for the Roster Cost Engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{EntryUpdate, Period, ProjectId, RosterId, StaffId};

use super::request::{BatchEntryRequest, EntryRequest, PeriodQuery, ReciprocalQuery};
use super::response::{ApiError, ApiErrorResponse, ProjectCostResponse, ReciprocalResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/staff/:staff_id/attendance", get(attendance_handler))
        .route("/projects/:project_id/cost", get(project_cost_handler))
        .route(
            "/projects/:project_id/cost-sharing",
            get(cost_sharing_handler),
        )
        .route("/projects/:project_id/deductions", get(deductions_handler))
        .route("/reports/portfolio", get(portfolio_handler))
        .route("/reports/overview", get(overview_handler))
        .route("/sharing/reciprocal", get(reciprocal_handler))
        .route("/rosters/:roster_id/entries", put(update_entry_handler))
        .route(
            "/rosters/:roster_id/entries/batch",
            post(batch_update_handler),
        )
        .route(
            "/rosters/:roster_id/days/:day/stats",
            get(day_stats_handler),
        )
        .with_state(state)
}

/// Handler for GET /staff/:staff_id/attendance.
async fn attendance_handler(
    State(state): State<AppState>,
    Path(staff_id): Path<String>,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, staff_id = %staff_id, "Processing attendance request");

    let period = match period_from(correlation_id, query) {
        Ok(period) => period,
        Err(response) => return response,
    };

    match state
        .engine()
        .monthly_attendance(&StaffId::new(staff_id), period)
    {
        Ok(monthly) => json_ok(monthly),
        Err(err) => engine_error(correlation_id, err),
    }
}

/// Handler for GET /projects/:project_id/cost.
async fn project_cost_handler(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(
        correlation_id = %correlation_id,
        project_id = %project_id,
        "Processing project cost request"
    );

    let period = match period_from(correlation_id, query) {
        Ok(period) => period,
        Err(response) => return response,
    };

    let project_id = ProjectId::new(project_id);
    match state.engine().compute_project_cost(&project_id, period) {
        Ok(original_cost) => json_ok(ProjectCostResponse {
            project_id,
            period,
            original_cost,
        }),
        Err(err) => engine_error(correlation_id, err),
    }
}

/// Handler for GET /projects/:project_id/cost-sharing.
async fn cost_sharing_handler(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(
        correlation_id = %correlation_id,
        project_id = %project_id,
        "Processing cost sharing request"
    );

    let period = match period_from(correlation_id, query) {
        Ok(period) => period,
        Err(response) => return response,
    };

    match state
        .engine()
        .compute_project_sharing(&ProjectId::new(project_id), period)
    {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                net_cost = %result.net_cost,
                warnings = result.warnings.len(),
                "Cost sharing resolved"
            );
            json_ok(result)
        }
        Err(err) => engine_error(correlation_id, err),
    }
}

/// Handler for GET /projects/:project_id/deductions.
async fn deductions_handler(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(
        correlation_id = %correlation_id,
        project_id = %project_id,
        "Processing deduction report request"
    );

    let period = match period_from(correlation_id, query) {
        Ok(period) => period,
        Err(response) => return response,
    };

    match state
        .engine()
        .project_deduction_report(&ProjectId::new(project_id), period)
    {
        Ok(report) => json_ok(report),
        Err(err) => engine_error(correlation_id, err),
    }
}

/// Handler for GET /reports/portfolio.
///
/// Projects are evaluated on the blocking pool.
async fn portfolio_handler(
    State(state): State<AppState>,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing portfolio request");

    let period = match period_from(correlation_id, query) {
        Ok(period) => period,
        Err(response) => return response,
    };

    let start_time = Instant::now();
    match state.shared_engine().compute_portfolio_concurrent(period).await {
        Ok(report) => {
            info!(
                correlation_id = %correlation_id,
                projects = report.projects.len(),
                duration_us = start_time.elapsed().as_micros(),
                "Portfolio request completed"
            );
            json_ok(report)
        }
        Err(err) => engine_error(correlation_id, err),
    }
}

/// Handler for GET /reports/overview.
async fn overview_handler(
    State(state): State<AppState>,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing financial overview request");

    let period = match period_from(correlation_id, query) {
        Ok(period) => period,
        Err(response) => return response,
    };

    match state.engine().financial_overview(period) {
        Ok(overview) => json_ok(overview),
        Err(err) => engine_error(correlation_id, err),
    }
}

/// Handler for GET /sharing/reciprocal.
async fn reciprocal_handler(
    State(state): State<AppState>,
    query: Result<Query<ReciprocalQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return query_rejected(correlation_id, rejection),
    };
    let (source, destination) = query.pair();
    let reciprocal = state.engine().has_reciprocal_sharing(&source, &destination);
    info!(
        correlation_id = %correlation_id,
        source = %source,
        destination = %destination,
        reciprocal,
        "Reciprocal sharing checked"
    );

    json_ok(ReciprocalResponse {
        source,
        destination,
        reciprocal,
    })
}

/// Handler for PUT /rosters/:roster_id/entries.
async fn update_entry_handler(
    State(state): State<AppState>,
    Path(roster_id): Path<String>,
    payload: Result<Json<EntryRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, roster_id = %roster_id, "Processing entry update");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejected(correlation_id, rejection),
    };

    let result = EntryUpdate::try_from(request)
        .and_then(|update| state.engine().update_entry(&RosterId::new(roster_id), update));
    match result {
        Ok(entry) => json_ok(entry),
        Err(err) => engine_error(correlation_id, err),
    }
}

/// Handler for POST /rosters/:roster_id/entries/batch.
///
/// Either every entry is written or none is.
async fn batch_update_handler(
    State(state): State<AppState>,
    Path(roster_id): Path<String>,
    payload: Result<Json<BatchEntryRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejected(correlation_id, rejection),
    };
    info!(
        correlation_id = %correlation_id,
        roster_id = %roster_id,
        entries = request.entries.len(),
        "Processing batch entry update"
    );

    let result = request.into_updates().and_then(|updates| {
        state
            .engine()
            .batch_update_entries(&RosterId::new(roster_id), updates)
    });
    match result {
        Ok(entries) => json_ok(entries),
        Err(err) => engine_error(correlation_id, err),
    }
}

/// Handler for GET /rosters/:roster_id/days/:day/stats.
async fn day_stats_handler(
    State(state): State<AppState>,
    Path((roster_id, day)): Path<(String, String)>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(
        correlation_id = %correlation_id,
        roster_id = %roster_id,
        day = %day,
        "Processing day stats request"
    );

    let result = day
        .parse::<u32>()
        .map_err(|_| EngineError::invalid("day", format!("'{}' is not a day of month", day)))
        .and_then(|day| state.engine().roster_day_stats(&RosterId::new(roster_id), day));
    match result {
        Ok(stats) => json_ok(stats),
        Err(err) => engine_error(correlation_id, err),
    }
}

fn json_ok<T: Serialize>(body: T) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn engine_error(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Request failed"
    );
    let api_error: ApiErrorResponse = err.into();
    (
        api_error.status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(api_error.error),
    )
        .into_response()
}

fn period_from(
    correlation_id: Uuid,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> Result<Period, Response> {
    match query {
        Ok(Query(query)) => query
            .period()
            .map_err(|err| engine_error(correlation_id, err)),
        Err(rejection) => Err(query_rejected(correlation_id, rejection)),
    }
}

fn query_rejected(correlation_id: Uuid, rejection: QueryRejection) -> Response {
    let body_text = rejection.body_text();
    warn!(
        correlation_id = %correlation_id,
        error = %body_text,
        "Query string rejected"
    );
    let api_error = ApiErrorResponse::bad_request(ApiError::invalid_query(body_text));
    (
        api_error.status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(api_error.error),
    )
        .into_response()
}

fn json_rejected(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::new("VALIDATION_ERROR", body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    (
        StatusCode::BAD_REQUEST,
        [(header::CONTENT_TYPE, "application/json")],
        Json(error),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine::CostEngine;
    use crate::models::{Project, Staff};
    use crate::store::MemoryStore;
    use axum::{body::Body, http::Request};
    use rust_decimal::Decimal;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn create_test_state() -> AppState {
        let store = MemoryStore::new();
        store.add_project(Project::new("p1", "Tower A")).unwrap();
        store
            .add_staff(Staff::new("s1", "p1", "Anan", Decimal::new(450, 0)))
            .unwrap();
        AppState::new(CostEngine::new(Arc::new(store), EngineConfig::default()).unwrap())
    }

    async fn error_body(response: Response) -> ApiError {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_project_cost_returns_200() {
        let router = create_router(create_test_state());

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/projects/p1/cost?year=2025&month=1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers().get("content-type").unwrap();
        assert_eq!(content_type, "application/json");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let result: ProjectCostResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(result.original_cost, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_month_13_returns_400() {
        let router = create_router(create_test_state());

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/projects/p1/cost?year=2025&month=13")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_body(response).await.code, "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_missing_query_returns_400() {
        let router = create_router(create_test_state());

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/reports/overview")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_body(response).await.code, "INVALID_QUERY");
    }

    #[tokio::test]
    async fn test_unknown_project_returns_404() {
        let router = create_router(create_test_state());

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/projects/ghost/cost-sharing?year=2025&month=1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(error_body(response).await.code, "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_malformed_json_returns_400() {
        let router = create_router(create_test_state());

        let response = router
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/rosters/rst_1/entries")
                    .header("Content-Type", "application/json")
                    .body(Body::from("{invalid json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_body(response).await.code, "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_non_numeric_day_returns_400() {
        let router = create_router(create_test_state());

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/rosters/rst_1/days/first/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
