use std::sync::Arc;

use chrono::{DateTime, Days, FixedOffset, NaiveDate, TimeZone, Utc};
use tracing::{debug, instrument};

use crate::contract::model::{
    GeneticData, HealthRecommendation, HealthSummary, LifestyleData, MedicalRecord, WearableData,
};
use crate::contract::CallContext;
use crate::domain::clock::Clock;
use crate::domain::document::{Filter, TimeWindow};
use crate::domain::error::DomainError;
use crate::domain::repo::DocumentStore;
use crate::domain::repository::Repository;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Fans one user/window query out to all five collections.
#[derive(Clone)]
pub struct SummaryAggregator {
    medical_records: Repository<MedicalRecord>,
    genetic_data: Repository<GeneticData>,
    lifestyle_data: Repository<LifestyleData>,
    wearable_data: Repository<WearableData>,
    health_recommendations: Repository<HealthRecommendation>,
    zone: FixedOffset,
}

impl SummaryAggregator {
    /// `zone` is the reference offset in which calendar dates are interpreted.
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>, zone: FixedOffset) -> Self {
        Self {
            medical_records: Repository::new(store.clone(), clock.clone()),
            genetic_data: Repository::new(store.clone(), clock.clone()),
            lifestyle_data: Repository::new(store.clone(), clock.clone()),
            wearable_data: Repository::new(store.clone(), clock.clone()),
            health_recommendations: Repository::new(store, clock),
            zone,
        }
    }

    /// `[date 00:00, date+1 00:00)` in the reference zone.
    pub fn daily_window(&self, date: &str) -> Result<TimeWindow, DomainError> {
        let day = parse_date("date", date)?;
        self.window_between(day, day)
    }

    /// `[start 00:00, end+1 00:00)` in the reference zone.
    pub fn range_window(&self, start_date: &str, end_date: &str) -> Result<TimeWindow, DomainError> {
        let start = parse_date("start_date", start_date)?;
        let end = parse_date("end_date", end_date)?;
        if end < start {
            return Err(DomainError::invalid_date_range(format!(
                "end_date {end_date} is before start_date {start_date}"
            )));
        }
        self.window_between(start, end)
    }

    fn window_between(&self, first: NaiveDate, last: NaiveDate) -> Result<TimeWindow, DomainError> {
        let after_last = last
            .checked_add_days(Days::new(1))
            .ok_or_else(|| DomainError::invalid_date_range(format!("{last} is out of range")))?;
        Ok(TimeWindow::new(
            self.midnight(first)?,
            self.midnight(after_last)?,
        ))
    }

    fn midnight(&self, day: NaiveDate) -> Result<DateTime<Utc>, DomainError> {
        self.zone
            .from_local_datetime(&day.and_time(chrono::NaiveTime::MIN))
            .single()
            .map(|t| t.with_timezone(&Utc))
            .ok_or_else(|| DomainError::invalid_date_range(format!("{day} is out of range")))
    }

    #[instrument(
        name = "health_analytics.summary.daily",
        skip(self, ctx),
        fields(user_id = %user_id, date = %date)
    )]
    pub async fn daily(
        &self,
        ctx: &CallContext,
        user_id: &str,
        date: &str,
    ) -> Result<HealthSummary, DomainError> {
        let window = self.daily_window(date)?;
        self.collect(ctx, user_id, window).await
    }

    #[instrument(
        name = "health_analytics.summary.weekly",
        skip(self, ctx),
        fields(user_id = %user_id, start_date = %start_date, end_date = %end_date)
    )]
    pub async fn weekly(
        &self,
        ctx: &CallContext,
        user_id: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<HealthSummary, DomainError> {
        let window = self.range_window(start_date, end_date)?;
        self.collect(ctx, user_id, window).await
    }

    async fn collect(
        &self,
        ctx: &CallContext,
        user_id: &str,
        window: TimeWindow,
    ) -> Result<HealthSummary, DomainError> {
        debug!(start = %window.start, end = %window.end, "Collecting summary");
        let filter = Filter::new().eq("user_id", user_id).created_within(window);

        let (medical_records, genetic_data, lifestyle_data, wearable_data, health_recommendations) = tokio::try_join!(
            self.medical_records.find(ctx, &filter),
            self.genetic_data.find(ctx, &filter),
            self.lifestyle_data.find(ctx, &filter),
            self.wearable_data.find(ctx, &filter),
            self.health_recommendations.find(ctx, &filter),
        )?;

        Ok(HealthSummary {
            medical_records,
            genetic_data,
            lifestyle_data,
            wearable_data,
            health_recommendations,
        })
    }
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| {
        DomainError::invalid_date_range(format!("{field} '{raw}' is not YYYY-MM-DD: {e}"))
    })
}
