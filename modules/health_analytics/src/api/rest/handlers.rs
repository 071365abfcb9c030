use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query,
    },
    http::StatusCode,
    response::Json,
    Extension,
};
use serde::de::DeserializeOwned;
use tracing::{error, info, warn};

use crate::api::rest::dto::{CreatedDto, DailySummaryQuery, RecordListDto, WeeklySummaryQuery};
use crate::api::rest::error::{domain_problem, json_rejection, query_rejection, ProblemResponse};
use crate::contract::{model::HealthSummary, CallContext};
use crate::domain::{
    entity::Entity, error::DomainError, repository::Repository, summary::SummaryAggregator,
};

/// Deadline applied to every call made on behalf of a request.
#[derive(Debug, Clone, Copy)]
pub struct CallTimeout(pub Duration);

impl CallTimeout {
    fn context(self) -> CallContext {
        CallContext::with_timeout(self.0)
    }
}

fn collection_path<E: Entity>() -> String {
    format!("/v1/{}", E::KIND.collection())
}

fn record_path<E: Entity>(id: &str) -> String {
    format!("/v1/{}/{id}", E::KIND.collection())
}

fn problem(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::NotFound { .. }
        | DomainError::InvalidIdentity { .. }
        | DomainError::InvalidDateRange { .. }
        | DomainError::AlreadyExists { .. }
        | DomainError::Cancelled => warn!(instance, error = %e, "Request rejected"),
        _ => error!(instance, error = %e, "Request failed"),
    }
    domain_problem(e, instance)
}

/// List records of one kind; query parameters form an equality filter
pub async fn list_records<E: Entity>(
    Extension(repo): Extension<Arc<Repository<E>>>,
    Extension(timeout): Extension<CallTimeout>,
    query: Result<Query<E::Filter>, QueryRejection>,
) -> Result<Json<RecordListDto<E>>, ProblemResponse>
where
    E::Filter: DeserializeOwned,
{
    let instance = collection_path::<E>();
    let Query(filter) = query.map_err(|r| query_rejection(&r, &instance))?;

    let records = repo
        .list(&timeout.context(), &filter)
        .await
        .map_err(|e| problem(&e, &instance))?;
    Ok(Json(records.into()))
}

/// Get one record by id
pub async fn get_record<E: Entity>(
    Extension(repo): Extension<Arc<Repository<E>>>,
    Extension(timeout): Extension<CallTimeout>,
    Path(id): Path<String>,
) -> Result<Json<E>, ProblemResponse> {
    repo.get(&timeout.context(), &id)
        .await
        .map(Json)
        .map_err(|e| problem(&e, &record_path::<E>(&id)))
}

/// Create a record; an `id` in the body is honoured
pub async fn create_record<E: Entity>(
    Extension(repo): Extension<Arc<Repository<E>>>,
    Extension(timeout): Extension<CallTimeout>,
    body: Result<Json<E>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedDto>), ProblemResponse> {
    let instance = collection_path::<E>();
    let Json(record) = body.map_err(|r| json_rejection(&r, &instance))?;
    info!(kind = %E::KIND, user_id = %record.user_id(), "Creating record");

    let id = repo
        .create(&timeout.context(), record)
        .await
        .map_err(|e| problem(&e, &instance))?;
    Ok((StatusCode::CREATED, Json(CreatedDto { id })))
}

/// Merge-update a record; the path id overrides any id in the body
pub async fn update_record<E: Entity>(
    Extension(repo): Extension<Arc<Repository<E>>>,
    Extension(timeout): Extension<CallTimeout>,
    Path(id): Path<String>,
    body: Result<Json<E>, JsonRejection>,
) -> Result<StatusCode, ProblemResponse> {
    let instance = record_path::<E>(&id);
    let Json(mut record) = body.map_err(|r| json_rejection(&r, &instance))?;
    record.set_id(id);

    repo.update(&timeout.context(), record)
        .await
        .map_err(|e| problem(&e, &instance))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a record by id
pub async fn delete_record<E: Entity>(
    Extension(repo): Extension<Arc<Repository<E>>>,
    Extension(timeout): Extension<CallTimeout>,
    Path(id): Path<String>,
) -> Result<StatusCode, ProblemResponse> {
    repo.delete(&timeout.context(), &id)
        .await
        .map_err(|e| problem(&e, &record_path::<E>(&id)))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Everything a user created on one day
pub async fn daily_summary(
    Extension(aggregator): Extension<Arc<SummaryAggregator>>,
    Extension(timeout): Extension<CallTimeout>,
    query: Result<Query<DailySummaryQuery>, QueryRejection>,
) -> Result<Json<HealthSummary>, ProblemResponse> {
    let instance = "/v1/summaries/daily";
    let Query(q) = query.map_err(|r| query_rejection(&r, instance))?;

    aggregator
        .daily(&timeout.context(), &q.user_id, &q.date)
        .await
        .map(Json)
        .map_err(|e| problem(&e, instance))
}

/// Everything a user created within an inclusive date range
pub async fn weekly_summary(
    Extension(aggregator): Extension<Arc<SummaryAggregator>>,
    Extension(timeout): Extension<CallTimeout>,
    query: Result<Query<WeeklySummaryQuery>, QueryRejection>,
) -> Result<Json<HealthSummary>, ProblemResponse> {
    let instance = "/v1/summaries/weekly";
    let Query(q) = query.map_err(|r| query_rejection(&r, instance))?;

    aggregator
        .weekly(&timeout.context(), &q.user_id, &q.start_date, &q.end_date)
        .await
        .map(Json)
        .map_err(|e| problem(&e, instance))
}
