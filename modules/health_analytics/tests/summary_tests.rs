mod common;

use health_analytics::config::HealthAnalyticsConfig;
use health_analytics::contract::{
    CallContext, HealthAnalyticsError, HealthRecommendation, LifestyleData, MedicalRecord,
    WearableData,
};

use common::{module_at, module_with_config, new_store};

fn lifestyle(user: &str, recorded: &str) -> LifestyleData {
    LifestyleData {
        user_id: user.into(),
        data_type: "steps".into(),
        recorded_date: recorded.into(),
        ..Default::default()
    }
}

/// Seed lifestyle records created at four instants around 2024-01-05 (UTC).
async fn seed(store: &std::sync::Arc<health_analytics::infra::storage::InMemoryDocumentStore>) {
    let ctx = CallContext::background();
    for (now, tag) in [
        ("2024-01-04T23:30:00Z", "late-4th"),
        ("2024-01-05T00:00:00Z", "start-5th"),
        ("2024-01-05T23:59:59Z", "end-5th"),
        ("2024-01-06T00:00:00Z", "start-6th"),
    ] {
        module_at(store, now)
            .client()
            .lifestyle_data()
            .create(&ctx, lifestyle("u1", tag))
            .await
            .unwrap();
    }
    module_at(store, "2024-01-05T12:00:00Z")
        .client()
        .lifestyle_data()
        .create(&ctx, lifestyle("u2", "other-user"))
        .await
        .unwrap();
}

fn tags(records: &[LifestyleData]) -> Vec<&str> {
    let mut t: Vec<&str> = records.iter().map(|r| r.recorded_date.as_str()).collect();
    t.sort_unstable();
    t
}

#[tokio::test]
async fn daily_window_is_half_open_and_scoped_to_user() {
    let store = new_store();
    seed(&store).await;
    let api = module_at(&store, "2024-02-01T00:00:00Z").client();

    let day = api
        .summaries()
        .daily_summary(&CallContext::background(), "u1", "2024-01-05")
        .await
        .unwrap();
    assert_eq!(tags(&day.lifestyle_data), vec!["end-5th", "start-5th"]);
    assert!(day.medical_records.is_empty());
}

#[tokio::test]
async fn ranged_window_includes_the_whole_end_date() {
    let store = new_store();
    seed(&store).await;
    let api = module_at(&store, "2024-02-01T00:00:00Z").client();
    let ctx = CallContext::background();

    let week = api
        .summaries()
        .weekly_summary(&ctx, "u1", "2024-01-01", "2024-01-05")
        .await
        .unwrap();
    assert_eq!(
        tags(&week.lifestyle_data),
        vec!["end-5th", "late-4th", "start-5th"]
    );

    let single = api
        .summaries()
        .weekly_summary(&ctx, "u1", "2024-01-05", "2024-01-05")
        .await
        .unwrap();
    let daily = api
        .summaries()
        .daily_summary(&ctx, "u1", "2024-01-05")
        .await
        .unwrap();
    assert_eq!(tags(&single.lifestyle_data), tags(&daily.lifestyle_data));
}

#[tokio::test]
async fn reference_offset_shifts_day_boundaries() {
    let store = new_store();
    seed(&store).await;

    let mut config = HealthAnalyticsConfig::default();
    config.summary.utc_offset_minutes = 120;
    let api = module_with_config(&store, "2024-02-01T00:00:00Z", config).client();

    // 2024-01-05 at UTC+2 is [2024-01-04T22:00Z, 2024-01-05T22:00Z).
    let day = api
        .summaries()
        .daily_summary(&CallContext::background(), "u1", "2024-01-05")
        .await
        .unwrap();
    assert_eq!(tags(&day.lifestyle_data), vec!["late-4th", "start-5th"]);
}

#[tokio::test]
async fn summary_collects_every_kind() {
    let store = new_store();
    let api = module_at(&store, "2024-03-10T08:00:00Z").client();
    let ctx = CallContext::background();

    api.medical_records()
        .create(&ctx, MedicalRecord { user_id: "u1".into(), ..Default::default() })
        .await
        .unwrap();
    api.lifestyle_data()
        .create(&ctx, lifestyle("u1", "2024-03-10"))
        .await
        .unwrap();
    api.wearable_data()
        .create(&ctx, WearableData { user_id: "u1".into(), ..Default::default() })
        .await
        .unwrap();
    api.health_recommendations()
        .create(&ctx, HealthRecommendation { user_id: "u1".into(), ..Default::default() })
        .await
        .unwrap();

    let day = api
        .summaries()
        .daily_summary(&ctx, "u1", "2024-03-10")
        .await
        .unwrap();
    assert_eq!(day.medical_records.len(), 1);
    assert!(day.genetic_data.is_empty());
    assert_eq!(day.lifestyle_data.len(), 1);
    assert_eq!(day.wearable_data.len(), 1);
    assert_eq!(day.health_recommendations.len(), 1);

    let empty = api
        .summaries()
        .daily_summary(&ctx, "u1", "2024-03-11")
        .await
        .unwrap();
    assert!(empty.is_empty());
}

#[tokio::test]
async fn invalid_dates_are_validation_errors() {
    let store = new_store();
    let api = module_at(&store, "2024-02-01T00:00:00Z").client();
    let ctx = CallContext::background();

    let err = api
        .summaries()
        .weekly_summary(&ctx, "u1", "2024-01-07", "2024-01-01")
        .await
        .unwrap_err();
    assert!(matches!(err, HealthAnalyticsError::Validation { .. }));

    let err = api
        .summaries()
        .daily_summary(&ctx, "u1", "05/01/2024")
        .await
        .unwrap_err();
    assert!(matches!(err, HealthAnalyticsError::Validation { .. }));
}

#[tokio::test]
async fn store_outage_fails_the_whole_summary() {
    let store = new_store();
    let api = module_at(&store, "2024-02-01T00:00:00Z").client();
    store.set_offline(true);

    let err = api
        .summaries()
        .daily_summary(&CallContext::background(), "u1", "2024-01-05")
        .await
        .unwrap_err();
    assert_eq!(err, HealthAnalyticsError::Unavailable);
}
