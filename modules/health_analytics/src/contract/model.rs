use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A clinical record: diagnosis, lab result, prescription and the like.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicalRecord {
    pub id: String,
    pub user_id: String,
    pub record_type: String,
    pub record_date: String,
    pub description: String,
    pub doctor_id: String,
    pub attachments: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticData {
    pub id: String,
    pub user_id: String,
    pub data_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_value: Option<DataValue>,
    pub analysis_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifestyleData {
    pub id: String,
    pub user_id: String,
    pub data_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_value: Option<DataValue>,
    pub recorded_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A reading pushed by a wearable device (smartwatch, ring, band).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WearableData {
    pub id: String,
    pub user_id: String,
    pub device_type: String,
    pub data_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_value: Option<DataValue>,
    pub recorded_timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthRecommendation {
    pub id: String,
    pub user_id: String,
    pub recommendation_type: String,
    pub description: String,
    /// Higher is more urgent; `0` means "unset".
    pub priority: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Self-describing payload carried by genetic, lifestyle and wearable records.
///
/// Serialized as `{"type": "<tag>", "body": {...}}`; the store keeps that JSON text verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "body", rename_all = "snake_case")]
pub enum DataValue {
    Sleep(SleepData),
    HeartRate(HeartRateData),
    /// Free-form structured body.
    Record(serde_json::Map<String, serde_json::Value>),
    /// Foreign payload kept as raw bytes under its type URL.
    Opaque(OpaquePayload),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SleepData {
    pub user_id: String,
    pub duration_minutes: u32,
    pub quality: String,
    pub recorded_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartRateData {
    pub user_id: String,
    pub heart_rate: u32,
    pub recorded_timestamp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpaquePayload {
    pub type_url: String,
    #[serde(with = "base64_bytes")]
    pub value: Vec<u8>,
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let raw = String::deserialize(d)?;
        STANDARD.decode(raw).map_err(serde::de::Error::custom)
    }
}

// --- list filters ---
// Every field is an equality constraint; empty strings and zero priority are ignored.

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicalRecordFilter {
    pub user_id: Option<String>,
    pub record_type: Option<String>,
    pub record_date: Option<String>,
    pub description: Option<String>,
    pub doctor_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticDataFilter {
    pub user_id: Option<String>,
    pub data_type: Option<String>,
    pub analysis_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifestyleDataFilter {
    pub user_id: Option<String>,
    pub data_type: Option<String>,
    pub recorded_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WearableDataFilter {
    pub user_id: Option<String>,
    pub device_type: Option<String>,
    pub data_type: Option<String>,
    pub recorded_timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthRecommendationFilter {
    pub user_id: Option<String>,
    pub recommendation_type: Option<String>,
    pub priority: Option<i32>,
}

/// Everything one user produced inside a summary window, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthSummary {
    pub medical_records: Vec<MedicalRecord>,
    pub genetic_data: Vec<GeneticData>,
    pub lifestyle_data: Vec<LifestyleData>,
    pub wearable_data: Vec<WearableData>,
    pub health_recommendations: Vec<HealthRecommendation>,
}

impl HealthSummary {
    pub fn is_empty(&self) -> bool {
        self.medical_records.is_empty()
            && self.genetic_data.is_empty()
            && self.lifestyle_data.is_empty()
            && self.wearable_data.is_empty()
            && self.health_recommendations.is_empty()
    }
}
