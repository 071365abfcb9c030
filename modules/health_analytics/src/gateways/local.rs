use async_trait::async_trait;
use std::sync::Arc;

use crate::contract::{
    client::{EntityApi, HealthAnalyticsApi, SummaryApi},
    context::CallContext,
    error::HealthAnalyticsError,
    model::{
        GeneticData, HealthRecommendation, HealthSummary, LifestyleData, MedicalRecord,
        WearableData,
    },
};
use crate::domain::{
    entity::Entity, error::DomainError, repository::Repository, summary::SummaryAggregator,
};

/// In-process `EntityApi` that delegates to the domain repository
pub struct LocalEntityClient<E: Entity> {
    repo: Arc<Repository<E>>,
}

impl<E: Entity> LocalEntityClient<E> {
    pub fn new(repo: Arc<Repository<E>>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl<E: Entity> EntityApi<E> for LocalEntityClient<E> {
    async fn create(&self, ctx: &CallContext, record: E) -> Result<String, HealthAnalyticsError> {
        self.repo.create(ctx, record).await.map_err(map_domain_error)
    }

    async fn get(&self, ctx: &CallContext, id: &str) -> Result<E, HealthAnalyticsError> {
        self.repo.get(ctx, id).await.map_err(map_domain_error)
    }

    async fn update(&self, ctx: &CallContext, record: E) -> Result<(), HealthAnalyticsError> {
        self.repo.update(ctx, record).await.map_err(map_domain_error)
    }

    async fn delete(&self, ctx: &CallContext, id: &str) -> Result<(), HealthAnalyticsError> {
        self.repo.delete(ctx, id).await.map_err(map_domain_error)
    }

    async fn list(
        &self,
        ctx: &CallContext,
        filter: E::Filter,
    ) -> Result<Vec<E>, HealthAnalyticsError> {
        self.repo.list(ctx, &filter).await.map_err(map_domain_error)
    }
}

/// In-process `SummaryApi` backed by the aggregator
pub struct LocalSummaryClient {
    aggregator: Arc<SummaryAggregator>,
}

impl LocalSummaryClient {
    pub fn new(aggregator: Arc<SummaryAggregator>) -> Self {
        Self { aggregator }
    }
}

#[async_trait]
impl SummaryApi for LocalSummaryClient {
    async fn daily_summary(
        &self,
        ctx: &CallContext,
        user_id: &str,
        date: &str,
    ) -> Result<HealthSummary, HealthAnalyticsError> {
        self.aggregator
            .daily(ctx, user_id, date)
            .await
            .map_err(map_domain_error)
    }

    async fn weekly_summary(
        &self,
        ctx: &CallContext,
        user_id: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<HealthSummary, HealthAnalyticsError> {
        self.aggregator
            .weekly(ctx, user_id, start_date, end_date)
            .await
            .map_err(map_domain_error)
    }
}

/// Local implementation of the HealthAnalyticsApi trait
pub struct HealthAnalyticsLocalClient {
    medical_records: Arc<dyn EntityApi<MedicalRecord>>,
    genetic_data: Arc<dyn EntityApi<GeneticData>>,
    lifestyle_data: Arc<dyn EntityApi<LifestyleData>>,
    wearable_data: Arc<dyn EntityApi<WearableData>>,
    health_recommendations: Arc<dyn EntityApi<HealthRecommendation>>,
    summaries: Arc<dyn SummaryApi>,
}

impl HealthAnalyticsLocalClient {
    pub fn new(
        medical_records: Arc<Repository<MedicalRecord>>,
        genetic_data: Arc<Repository<GeneticData>>,
        lifestyle_data: Arc<Repository<LifestyleData>>,
        wearable_data: Arc<Repository<WearableData>>,
        health_recommendations: Arc<Repository<HealthRecommendation>>,
        aggregator: Arc<SummaryAggregator>,
    ) -> Self {
        Self {
            medical_records: Arc::new(LocalEntityClient::new(medical_records)),
            genetic_data: Arc::new(LocalEntityClient::new(genetic_data)),
            lifestyle_data: Arc::new(LocalEntityClient::new(lifestyle_data)),
            wearable_data: Arc::new(LocalEntityClient::new(wearable_data)),
            health_recommendations: Arc::new(LocalEntityClient::new(health_recommendations)),
            summaries: Arc::new(LocalSummaryClient::new(aggregator)),
        }
    }
}

impl HealthAnalyticsApi for HealthAnalyticsLocalClient {
    fn medical_records(&self) -> Arc<dyn EntityApi<MedicalRecord>> {
        self.medical_records.clone()
    }

    fn genetic_data(&self) -> Arc<dyn EntityApi<GeneticData>> {
        self.genetic_data.clone()
    }

    fn lifestyle_data(&self) -> Arc<dyn EntityApi<LifestyleData>> {
        self.lifestyle_data.clone()
    }

    fn wearable_data(&self) -> Arc<dyn EntityApi<WearableData>> {
        self.wearable_data.clone()
    }

    fn health_recommendations(&self) -> Arc<dyn EntityApi<HealthRecommendation>> {
        self.health_recommendations.clone()
    }

    fn summaries(&self) -> Arc<dyn SummaryApi> {
        self.summaries.clone()
    }
}

/// Map domain errors to contract errors
fn map_domain_error(domain_error: DomainError) -> HealthAnalyticsError {
    match domain_error {
        DomainError::NotFound { kind, id } => {
            HealthAnalyticsError::not_found(format!("{kind} {id}"))
        }
        DomainError::InvalidIdentity { .. } | DomainError::InvalidDateRange { .. } => {
            HealthAnalyticsError::validation(domain_error.to_string())
        }
        DomainError::AlreadyExists { kind, id } => {
            HealthAnalyticsError::conflict(format!("{kind} {id} already exists"))
        }
        DomainError::Cancelled => HealthAnalyticsError::cancelled(),
        DomainError::StoreUnavailable { .. } => HealthAnalyticsError::unavailable(),
        DomainError::CorruptDocument { .. } | DomainError::Encode { .. } => {
            HealthAnalyticsError::internal()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::EntityKind;

    #[test]
    fn domain_errors_map_to_contract_categories() {
        assert!(matches!(
            map_domain_error(DomainError::not_found(EntityKind::GeneticData, "x")),
            HealthAnalyticsError::NotFound { .. }
        ));
        assert!(matches!(
            map_domain_error(DomainError::invalid_date_range("bad")),
            HealthAnalyticsError::Validation { .. }
        ));
        assert!(matches!(
            map_domain_error(DomainError::already_exists(EntityKind::MedicalRecord, "x")),
            HealthAnalyticsError::Conflict { .. }
        ));
        assert_eq!(
            map_domain_error(DomainError::store_unavailable("down")),
            HealthAnalyticsError::Unavailable
        );
        assert_eq!(
            map_domain_error(DomainError::cancelled()),
            HealthAnalyticsError::Cancelled
        );
        assert_eq!(
            map_domain_error(DomainError::encode("data_value", "boom")),
            HealthAnalyticsError::Internal
        );
    }
}
