use std::sync::Arc;
use std::time::Duration;

use axum::{middleware::from_fn, routing::get, Extension, Router};
use serde::de::DeserializeOwned;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::api::rest::{handlers, request_id};
use crate::contract::model::{
    GeneticData, HealthRecommendation, LifestyleData, MedicalRecord, WearableData,
};
use crate::domain::{entity::Entity, repository::Repository, summary::SummaryAggregator};

const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Everything the REST facade serves from.
#[derive(Clone)]
pub struct RestState {
    pub medical_records: Arc<Repository<MedicalRecord>>,
    pub genetic_data: Arc<Repository<GeneticData>>,
    pub lifestyle_data: Arc<Repository<LifestyleData>>,
    pub wearable_data: Arc<Repository<WearableData>>,
    pub health_recommendations: Arc<Repository<HealthRecommendation>>,
    pub aggregator: Arc<SummaryAggregator>,
    pub call_timeout: Duration,
}

/// CRUD routes for one kind under `/v1/<collection>`.
fn record_routes<E: Entity>(repo: Arc<Repository<E>>) -> Router
where
    E::Filter: DeserializeOwned,
{
    let collection = E::KIND.collection();
    Router::new()
        .route(
            &format!("/v1/{collection}"),
            get(handlers::list_records::<E>).post(handlers::create_record::<E>),
        )
        .route(
            &format!("/v1/{collection}/{{id}}"),
            get(handlers::get_record::<E>)
                .put(handlers::update_record::<E>)
                .delete(handlers::delete_record::<E>),
        )
        .layer(Extension(repo))
}

pub fn router(state: RestState) -> Router {
    let summaries = Router::new()
        .route("/v1/summaries/daily", get(handlers::daily_summary))
        .route("/v1/summaries/weekly", get(handlers::weekly_summary))
        .layer(Extension(state.aggregator));

    let x_request_id = request_id::header();

    Router::new()
        .route("/health", get(handlers::health_check))
        .merge(record_routes(state.medical_records))
        .merge(record_routes(state.genetic_data))
        .merge(record_routes(state.lifestyle_data))
        .merge(record_routes(state.wearable_data))
        .merge(record_routes(state.health_recommendations))
        .merge(summaries)
        .layer(Extension(handlers::CallTimeout(state.call_timeout)))
        // Outermost first: assign id, echo it back, open the span, expose the id to handlers.
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(
                    x_request_id.clone(),
                    request_id::MakeReqId,
                ))
                .layer(PropagateRequestIdLayer::new(x_request_id))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(request_id::http_span)
                        .on_response(request_id::record_response),
                )
                .layer(from_fn(request_id::push_req_id_to_extensions)),
        )
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
}
