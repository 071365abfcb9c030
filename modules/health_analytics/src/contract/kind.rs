use std::fmt;

use serde::{Deserialize, Serialize};

use crate::contract::model::{
    GeneticData, GeneticDataFilter, HealthRecommendation, HealthRecommendationFilter,
    LifestyleData, LifestyleDataFilter, MedicalRecord, MedicalRecordFilter, WearableData,
    WearableDataFilter,
};

/// The five record kinds the service stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    MedicalRecord,
    GeneticData,
    LifestyleData,
    WearableData,
    HealthRecommendation,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::MedicalRecord,
        EntityKind::GeneticData,
        EntityKind::LifestyleData,
        EntityKind::WearableData,
        EntityKind::HealthRecommendation,
    ];

    /// Document store collection.
    pub const fn collection(self) -> &'static str {
        match self {
            Self::MedicalRecord => "medical_records",
            Self::GeneticData => "genetic_data",
            Self::LifestyleData => "lifestyle_data",
            Self::WearableData => "wearable_data",
            Self::HealthRecommendation => "health_recommendations",
        }
    }

    /// Message key prefix (`<prefix>.create`); also the default topic name.
    pub const fn key_prefix(self) -> &'static str {
        match self {
            Self::MedicalRecord => "medical_record",
            Self::GeneticData => "genetic_data",
            Self::LifestyleData => "lifestyle_data",
            Self::WearableData => "wearable_data",
            Self::HealthRecommendation => "health_recommendation",
        }
    }

    pub const fn consumer_group(self) -> &'static str {
        match self {
            Self::MedicalRecord => "medical-record-group",
            Self::GeneticData => "genetic-data-group",
            Self::LifestyleData => "lifestyle-data-group",
            Self::WearableData => "wearable-data-group",
            Self::HealthRecommendation => "health-recommendation-group",
        }
    }

    /// User-facing message sent after a consumed `create`, if any.
    pub const fn created_message(self) -> Option<&'static str> {
        match self {
            Self::MedicalRecord => Some("Your medical record has been created."),
            Self::GeneticData => Some("Your genetic data has been created."),
            Self::LifestyleData => Some("Your lifestyle data has been recorded."),
            Self::WearableData => None,
            Self::HealthRecommendation => Some("You have a new health recommendation."),
        }
    }

    /// User-facing message sent after a consumed `update`, if any.
    pub const fn updated_message(self) -> Option<&'static str> {
        match self {
            Self::MedicalRecord => Some("Your medical record has been updated."),
            Self::GeneticData => Some("Your genetic data has been updated."),
            Self::LifestyleData => Some("Your lifestyle data has been updated."),
            Self::WearableData => None,
            Self::HealthRecommendation => Some("A health recommendation has been updated."),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key_prefix())
    }
}

/// Ties a record type to its kind and its list filter.
pub trait HealthRecord: Clone + Send + Sync + 'static {
    type Filter: Clone + Default + Send + Sync + 'static;
    const KIND: EntityKind;
}

impl HealthRecord for MedicalRecord {
    type Filter = MedicalRecordFilter;
    const KIND: EntityKind = EntityKind::MedicalRecord;
}

impl HealthRecord for GeneticData {
    type Filter = GeneticDataFilter;
    const KIND: EntityKind = EntityKind::GeneticData;
}

impl HealthRecord for LifestyleData {
    type Filter = LifestyleDataFilter;
    const KIND: EntityKind = EntityKind::LifestyleData;
}

impl HealthRecord for WearableData {
    type Filter = WearableDataFilter;
    const KIND: EntityKind = EntityKind::WearableData;
}

impl HealthRecord for HealthRecommendation {
    type Filter = HealthRecommendationFilter;
    const KIND: EntityKind = EntityKind::HealthRecommendation;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wearable_data_is_silent() {
        assert!(EntityKind::WearableData.created_message().is_none());
        assert!(EntityKind::WearableData.updated_message().is_none());
        for kind in EntityKind::ALL {
            if kind != EntityKind::WearableData {
                assert!(kind.created_message().is_some(), "{kind}");
                assert!(kind.updated_message().is_some(), "{kind}");
            }
        }
    }

    #[test]
    fn collections_and_groups_are_distinct() {
        let collections: std::collections::HashSet<_> =
            EntityKind::ALL.iter().map(|k| k.collection()).collect();
        assert_eq!(collections.len(), 5);
        assert_eq!(EntityKind::HealthRecommendation.collection(), "health_recommendations");
        assert_eq!(EntityKind::GeneticData.consumer_group(), "genetic-data-group");
    }
}
