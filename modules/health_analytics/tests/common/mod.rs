#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use health_analytics::config::HealthAnalyticsConfig;
use health_analytics::domain::clock::FixedClock;
use health_analytics::infra::storage::InMemoryDocumentStore;
use health_analytics::HealthAnalytics;

pub fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

pub fn new_store() -> Arc<InMemoryDocumentStore> {
    Arc::new(InMemoryDocumentStore::new())
}

/// A module over `store` whose clock is frozen at `now`.
pub fn module_at(store: &Arc<InMemoryDocumentStore>, now: &str) -> HealthAnalytics {
    module_with_config(store, now, HealthAnalyticsConfig::default())
}

pub fn module_with_config(
    store: &Arc<InMemoryDocumentStore>,
    now: &str,
    config: HealthAnalyticsConfig,
) -> HealthAnalytics {
    HealthAnalytics::new(
        store.clone(),
        Arc::new(FixedClock(at(now))),
        config,
        Duration::from_secs(5),
    )
    .expect("module builds")
}
