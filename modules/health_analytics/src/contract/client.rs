use std::sync::Arc;

use async_trait::async_trait;

use crate::contract::{
    context::CallContext,
    error::HealthAnalyticsError,
    kind::HealthRecord,
    model::{
        GeneticData, HealthRecommendation, HealthSummary, LifestyleData, MedicalRecord,
        WearableData,
    },
};

/// CRUD access to one record kind.
#[async_trait]
pub trait EntityApi<E: HealthRecord>: Send + Sync {
    /// Store a new record. A non-empty `id` is used verbatim; otherwise one is generated.
    async fn create(&self, ctx: &CallContext, record: E) -> Result<String, HealthAnalyticsError>;

    async fn get(&self, ctx: &CallContext, id: &str) -> Result<E, HealthAnalyticsError>;

    /// Merge the non-empty fields of `record` into the stored record with the same id.
    async fn update(&self, ctx: &CallContext, record: E) -> Result<(), HealthAnalyticsError>;

    async fn delete(&self, ctx: &CallContext, id: &str) -> Result<(), HealthAnalyticsError>;

    async fn list(
        &self,
        ctx: &CallContext,
        filter: E::Filter,
    ) -> Result<Vec<E>, HealthAnalyticsError>;
}

/// Cross-kind summaries for one user.
#[async_trait]
pub trait SummaryApi: Send + Sync {
    /// Everything created on `date` (`YYYY-MM-DD`).
    async fn daily_summary(
        &self,
        ctx: &CallContext,
        user_id: &str,
        date: &str,
    ) -> Result<HealthSummary, HealthAnalyticsError>;

    /// Everything created from `start_date` through `end_date`, both inclusive.
    async fn weekly_summary(
        &self,
        ctx: &CallContext,
        user_id: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<HealthSummary, HealthAnalyticsError>;
}

/// Public API of the health_analytics module that other modules can use
pub trait HealthAnalyticsApi: Send + Sync {
    fn medical_records(&self) -> Arc<dyn EntityApi<MedicalRecord>>;
    fn genetic_data(&self) -> Arc<dyn EntityApi<GeneticData>>;
    fn lifestyle_data(&self) -> Arc<dyn EntityApi<LifestyleData>>;
    fn wearable_data(&self) -> Arc<dyn EntityApi<WearableData>>;
    fn health_recommendations(&self) -> Arc<dyn EntityApi<HealthRecommendation>>;
    fn summaries(&self) -> Arc<dyn SummaryApi>;
}
