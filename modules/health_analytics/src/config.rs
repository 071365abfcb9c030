use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::contract::EntityKind;

/// Configuration for the health_analytics module (`modules.health_analytics`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HealthAnalyticsConfig {
    pub topics: TopicsConfig,
    pub notifications: NotificationsConfig,
    pub summary: SummaryConfig,
}

/// Topic name per record kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TopicsConfig {
    pub medical_record: String,
    pub genetic_data: String,
    pub lifestyle_data: String,
    pub wearable_data: String,
    pub health_recommendation: String,
}

impl Default for TopicsConfig {
    fn default() -> Self {
        Self {
            medical_record: EntityKind::MedicalRecord.key_prefix().to_string(),
            genetic_data: EntityKind::GeneticData.key_prefix().to_string(),
            lifestyle_data: EntityKind::LifestyleData.key_prefix().to_string(),
            wearable_data: EntityKind::WearableData.key_prefix().to_string(),
            health_recommendation: EntityKind::HealthRecommendation.key_prefix().to_string(),
        }
    }
}

impl TopicsConfig {
    pub fn topic(&self, kind: EntityKind) -> &str {
        match kind {
            EntityKind::MedicalRecord => &self.medical_record,
            EntityKind::GeneticData => &self.genetic_data,
            EntityKind::LifestyleData => &self.lifestyle_data,
            EntityKind::WearableData => &self.wearable_data,
            EntityKind::HealthRecommendation => &self.health_recommendation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotificationsConfig {
    /// Notifications go to `<subject_prefix>.<user_id>`.
    pub subject_prefix: String,
    pub queue_capacity: usize,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            subject_prefix: "notifications".to_string(),
            queue_capacity: 1024,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SummaryConfig {
    /// Offset of the zone summary dates are interpreted in; 0 is UTC.
    pub utc_offset_minutes: i32,
}

impl SummaryConfig {
    pub fn zone(&self) -> anyhow::Result<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "summary.utc_offset_minutes out of range: {}",
                    self.utc_offset_minutes
                )
            })
    }
}

impl HealthAnalyticsConfig {
    /// Read the module section from a raw config value; absent means defaults.
    pub fn from_value(value: Option<&serde_json::Value>) -> anyhow::Result<Self> {
        match value {
            None | Some(serde_json::Value::Null) => Ok(Self::default()),
            Some(v) => serde_json::from_value(v.clone())
                .map_err(|e| anyhow::anyhow!("invalid health_analytics config: {e}")),
        }
    }
}
