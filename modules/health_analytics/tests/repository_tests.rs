mod common;

use std::fmt::Debug;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use health_analytics::contract::{
    CallContext, DataValue, EntityApi, GeneticData, GeneticDataFilter, HealthAnalyticsError,
    HealthRecommendation, HealthRecommendationFilter, HealthRecord, HeartRateData, LifestyleData,
    MedicalRecord, OpaquePayload, SleepData, WearableData,
};
use serde_json::json;

use common::{at, module_at, new_store};

fn genetic(user: &str) -> GeneticData {
    GeneticData {
        user_id: user.to_string(),
        data_type: "DNA".to_string(),
        analysis_date: "2024-01-05".to_string(),
        data_value: Some(DataValue::Sleep(SleepData {
            user_id: user.to_string(),
            duration_minutes: 420,
            quality: "good".to_string(),
            recorded_date: "2024-01-04".to_string(),
        })),
        ..Default::default()
    }
}

#[tokio::test]
async fn create_then_get_round_trips_business_fields() -> Result<()> {
    let store = new_store();
    let api = module_at(&store, "2024-01-05T10:00:00Z").client();
    let ctx = CallContext::background();

    let input = genetic("u1");
    let id = api.genetic_data().create(&ctx, input.clone()).await?;
    assert_eq!(id.len(), 24);

    let stored = api.genetic_data().get(&ctx, &id).await?;
    assert_eq!(stored.id, id);
    assert_eq!(stored.created_at, Some(at("2024-01-05T10:00:00Z")));
    assert_eq!(stored.updated_at, stored.created_at);

    let expected = GeneticData {
        id: id.clone(),
        created_at: stored.created_at,
        updated_at: stored.updated_at,
        ..input
    };
    assert_eq!(stored, expected);
    Ok(())
}

/// Create `input`, read it back and compare every field once `stamp` has filled
/// in the id and the clock's timestamps.
async fn assert_round_trip<E, S>(api: Arc<dyn EntityApi<E>>, input: E, stamp: S) -> Result<()>
where
    E: HealthRecord + PartialEq + Debug,
    S: FnOnce(&mut E, String, Option<DateTime<Utc>>),
{
    let ctx = CallContext::background();
    let id = api.create(&ctx, input.clone()).await?;
    let stored = api.get(&ctx, &id).await?;

    let mut expected = input;
    stamp(&mut expected, id, Some(at("2024-01-05T10:00:00Z")));
    assert_eq!(stored, expected);
    Ok(())
}

#[tokio::test]
async fn every_kind_and_payload_variant_round_trips() -> Result<()> {
    let store = new_store();
    let api = module_at(&store, "2024-01-05T10:00:00Z").client();

    assert_round_trip(
        api.medical_records(),
        MedicalRecord {
            user_id: "u1".into(),
            record_type: "lab".into(),
            record_date: "2024-01-02".into(),
            description: "lipid panel".into(),
            doctor_id: "d7".into(),
            attachments: vec!["scan-1.pdf".into(), "scan-2.pdf".into()],
            ..Default::default()
        },
        |r, id, t| {
            r.id = id;
            r.created_at = t;
            r.updated_at = t;
        },
    )
    .await?;

    assert_round_trip(
        api.genetic_data(),
        GeneticData {
            user_id: "u1".into(),
            data_type: "cardio".into(),
            analysis_date: "2024-01-03".into(),
            data_value: Some(DataValue::HeartRate(HeartRateData {
                user_id: "u1".into(),
                heart_rate: 61,
                recorded_timestamp: "2024-01-03T06:00:00Z".into(),
            })),
            ..Default::default()
        },
        |r, id, t| {
            r.id = id;
            r.created_at = t;
            r.updated_at = t;
        },
    )
    .await?;

    assert_round_trip(
        api.genetic_data(),
        GeneticData {
            user_id: "u1".into(),
            data_type: "raw".into(),
            data_value: Some(DataValue::Opaque(OpaquePayload {
                type_url: "type.example.com/raw.Reads".into(),
                value: vec![0x00, 0xff, 0x10, 0x80],
            })),
            ..Default::default()
        },
        |r, id, t| {
            r.id = id;
            r.created_at = t;
            r.updated_at = t;
        },
    )
    .await?;

    assert_round_trip(
        api.lifestyle_data(),
        LifestyleData {
            user_id: "u2".into(),
            data_type: "sleep".into(),
            recorded_date: "2024-01-04".into(),
            data_value: Some(DataValue::Sleep(SleepData {
                user_id: "u2".into(),
                duration_minutes: 390,
                quality: "fair".into(),
                recorded_date: "2024-01-04".into(),
            })),
            ..Default::default()
        },
        |r, id, t| {
            r.id = id;
            r.created_at = t;
            r.updated_at = t;
        },
    )
    .await?;

    let body = json!({"steps": 8421, "zones": ["fat_burn", "cardio"], "synced": true});
    let serde_json::Value::Object(record) = body else {
        unreachable!("object literal");
    };
    assert_round_trip(
        api.wearable_data(),
        WearableData {
            user_id: "u2".into(),
            device_type: "watch".into(),
            data_type: "activity".into(),
            recorded_timestamp: "2024-01-04T21:00:00Z".into(),
            data_value: Some(DataValue::Record(record)),
            ..Default::default()
        },
        |r, id, t| {
            r.id = id;
            r.created_at = t;
            r.updated_at = t;
        },
    )
    .await?;

    assert_round_trip(
        api.health_recommendations(),
        HealthRecommendation {
            user_id: "u2".into(),
            recommendation_type: "sleep".into(),
            description: "Go to bed earlier".into(),
            priority: -3,
            ..Default::default()
        },
        |r, id, t| {
            r.id = id;
            r.created_at = t;
            r.updated_at = t;
        },
    )
    .await?;

    Ok(())
}

#[tokio::test]
async fn replaying_an_explicit_id_conflicts_and_keeps_the_first_record() -> Result<()> {
    let store = new_store();
    let api = module_at(&store, "2024-01-05T10:00:00Z").client();
    let ctx = CallContext::background();
    let id = "65a0f0f0f0f0f0f0f0f0f0f0".to_string();

    let first = MedicalRecord {
        id: id.clone(),
        user_id: "u1".into(),
        record_type: "diagnosis".into(),
        description: "first".into(),
        ..Default::default()
    };
    assert_eq!(api.medical_records().create(&ctx, first).await?, id);

    let replay = MedicalRecord {
        id: id.clone(),
        user_id: "u1".into(),
        description: "second".into(),
        ..Default::default()
    };
    let err = api.medical_records().create(&ctx, replay).await.unwrap_err();
    assert!(matches!(err, HealthAnalyticsError::Conflict { .. }), "{err:?}");

    let kept = api.medical_records().get(&ctx, &id).await?;
    assert_eq!(kept.description, "first");
    assert_eq!(kept.record_type, "diagnosis");
    Ok(())
}

#[tokio::test]
async fn partial_update_never_clears_by_omission() -> Result<()> {
    let store = new_store();
    let ctx = CallContext::background();
    let created_by = module_at(&store, "2024-01-05T10:00:00Z").client();
    let updated_by = module_at(&store, "2024-01-06T08:30:00Z").client();

    let id = created_by
        .medical_records()
        .create(
            &ctx,
            MedicalRecord {
                user_id: "u1".into(),
                record_type: "lab".into(),
                description: "cholesterol".into(),
                doctor_id: "d7".into(),
                attachments: vec!["a.pdf".into()],
                ..Default::default()
            },
        )
        .await?;

    updated_by
        .medical_records()
        .update(
            &ctx,
            MedicalRecord {
                id: id.clone(),
                description: "cholesterol, repeat".into(),
                ..Default::default()
            },
        )
        .await?;

    let merged = created_by.medical_records().get(&ctx, &id).await?;
    assert_eq!(merged.description, "cholesterol, repeat");
    assert_eq!(merged.doctor_id, "d7");
    assert_eq!(merged.record_type, "lab");
    assert_eq!(merged.user_id, "u1");
    assert_eq!(merged.attachments, vec!["a.pdf".to_string()]);
    assert_eq!(merged.created_at, Some(at("2024-01-05T10:00:00Z")));
    assert_eq!(merged.updated_at, Some(at("2024-01-06T08:30:00Z")));
    Ok(())
}

#[tokio::test]
async fn delete_then_get_is_not_found() -> Result<()> {
    let store = new_store();
    let api = module_at(&store, "2024-01-05T10:00:00Z").client();
    let ctx = CallContext::background();

    let id = api.genetic_data().create(&ctx, genetic("u1")).await?;
    api.genetic_data().delete(&ctx, &id).await?;

    let err = api.genetic_data().get(&ctx, &id).await.unwrap_err();
    assert!(matches!(err, HealthAnalyticsError::NotFound { .. }));
    let err = api.genetic_data().delete(&ctx, &id).await.unwrap_err();
    assert!(matches!(err, HealthAnalyticsError::NotFound { .. }));
    Ok(())
}

#[tokio::test]
async fn malformed_ids() {
    let store = new_store();
    let api = module_at(&store, "2024-01-05T10:00:00Z").client();
    let ctx = CallContext::background();

    let err = api.genetic_data().get(&ctx, "nope").await.unwrap_err();
    assert!(matches!(err, HealthAnalyticsError::NotFound { .. }));

    let bad = GeneticData {
        id: "nope".into(),
        ..genetic("u1")
    };
    let err = api.genetic_data().update(&ctx, bad.clone()).await.unwrap_err();
    assert!(matches!(err, HealthAnalyticsError::Validation { .. }));
    let err = api.genetic_data().create(&ctx, bad).await.unwrap_err();
    assert!(matches!(err, HealthAnalyticsError::Validation { .. }));
}

#[tokio::test]
async fn update_of_unknown_record_is_not_found() {
    let store = new_store();
    let api = module_at(&store, "2024-01-05T10:00:00Z").client();
    let missing = GeneticData {
        id: "65a0f0f0f0f0f0f0f0f0f0f1".into(),
        data_type: "RNA".into(),
        ..Default::default()
    };
    let err = api
        .genetic_data()
        .update(&CallContext::background(), missing)
        .await
        .unwrap_err();
    assert!(matches!(err, HealthAnalyticsError::NotFound { .. }));
}

#[tokio::test]
async fn list_applies_equality_filters() -> Result<()> {
    let store = new_store();
    let api = module_at(&store, "2024-01-05T10:00:00Z").client();
    let ctx = CallContext::background();

    api.genetic_data().create(&ctx, genetic("u1")).await?;
    api.genetic_data().create(&ctx, genetic("u2")).await?;
    api.genetic_data()
        .create(
            &ctx,
            GeneticData {
                data_type: "RNA".into(),
                ..genetic("u1")
            },
        )
        .await?;

    let all = api.genetic_data().list(&ctx, GeneticDataFilter::default()).await?;
    assert_eq!(all.len(), 3);

    let u1_dna = api
        .genetic_data()
        .list(
            &ctx,
            GeneticDataFilter {
                user_id: Some("u1".into()),
                data_type: Some("DNA".into()),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(u1_dna.len(), 1);
    assert_eq!(u1_dna[0].user_id, "u1");

    for priority in [1, 3] {
        api.health_recommendations()
            .create(
                &ctx,
                HealthRecommendation {
                    user_id: "u1".into(),
                    recommendation_type: "exercise".into(),
                    priority,
                    ..Default::default()
                },
            )
            .await?;
    }
    let urgent = api
        .health_recommendations()
        .list(
            &ctx,
            HealthRecommendationFilter {
                priority: Some(3),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(urgent.len(), 1);
    assert_eq!(urgent[0].priority, 3);
    Ok(())
}

#[tokio::test]
async fn unavailable_store_and_cancelled_calls_surface_distinct_errors() {
    let store = new_store();
    let api = module_at(&store, "2024-01-05T10:00:00Z").client();

    let cancelled = CallContext::background();
    cancelled.cancel();
    let err = api
        .genetic_data()
        .create(&cancelled, genetic("u1"))
        .await
        .unwrap_err();
    assert_eq!(err, HealthAnalyticsError::Cancelled);
    assert_eq!(store.count("genetic_data"), 0);

    store.set_offline(true);
    let err = api
        .genetic_data()
        .list(&CallContext::background(), GeneticDataFilter::default())
        .await
        .unwrap_err();
    assert_eq!(err, HealthAnalyticsError::Unavailable);
}
