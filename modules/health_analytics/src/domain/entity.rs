use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};

use crate::contract::model::{
    DataValue, GeneticData, GeneticDataFilter, HealthRecommendation, HealthRecommendationFilter,
    LifestyleData, LifestyleDataFilter, MedicalRecord, MedicalRecordFilter, WearableData,
    WearableDataFilter,
};
use crate::contract::HealthRecord;
use crate::domain::document::{push_text_eq, FieldValue, Fields, Filter, Predicate, StoredDocument};
use crate::domain::error::DomainError;

/// A record kind the generic repository and ingest pipeline can handle.
///
/// Implementors describe how they flatten into document fields, which of those
/// fields an update may overwrite, and how a list filter narrows a collection.
pub trait Entity: HealthRecord + Serialize + DeserializeOwned + Debug {
    fn id(&self) -> &str;
    fn user_id(&self) -> &str;
    fn set_id(&mut self, id: String);

    /// Every business field, for insert.
    fn to_fields(&self) -> Result<Fields, DomainError>;

    /// Only fields carrying a value; empty strings, empty lists, absent payloads
    /// and zero priority are left out so the stored values survive.
    fn patch_fields(&self) -> Result<Fields, DomainError>;

    fn from_stored(doc: StoredDocument) -> Result<Self, DomainError>;

    fn filter(filter: &Self::Filter) -> Filter;
}

fn put_text(fields: &mut Fields, name: &str, value: &str) {
    fields.insert(name.to_string(), FieldValue::Text(value.to_string()));
}

fn put_text_if_set(fields: &mut Fields, name: &str, value: &str) {
    if !value.is_empty() {
        put_text(fields, name, value);
    }
}

fn put_data_value(fields: &mut Fields, value: &Option<DataValue>) -> Result<(), DomainError> {
    if let Some(v) = value {
        let text =
            serde_json::to_string(v).map_err(|e| DomainError::encode("data_value", e.to_string()))?;
        fields.insert("data_value".to_string(), FieldValue::Text(text));
    }
    Ok(())
}

fn read_data_value(doc: &StoredDocument) -> Result<Option<DataValue>, String> {
    match doc.non_empty_text("data_value")? {
        None => Ok(None),
        Some(text) => serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| format!("data_value: {e}")),
    }
}

fn corrupt<E: Entity>(id: &str) -> impl Fn(String) -> DomainError + '_ {
    move |message| DomainError::corrupt_document(E::KIND, id, message)
}

// --- MedicalRecord ---

impl Entity for MedicalRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn to_fields(&self) -> Result<Fields, DomainError> {
        let mut f = Fields::new();
        put_text(&mut f, "user_id", &self.user_id);
        put_text(&mut f, "record_type", &self.record_type);
        put_text(&mut f, "record_date", &self.record_date);
        put_text(&mut f, "description", &self.description);
        put_text(&mut f, "doctor_id", &self.doctor_id);
        f.insert(
            "attachments".to_string(),
            FieldValue::TextList(self.attachments.clone()),
        );
        Ok(f)
    }

    fn patch_fields(&self) -> Result<Fields, DomainError> {
        let mut f = Fields::new();
        put_text_if_set(&mut f, "user_id", &self.user_id);
        put_text_if_set(&mut f, "record_type", &self.record_type);
        put_text_if_set(&mut f, "record_date", &self.record_date);
        put_text_if_set(&mut f, "description", &self.description);
        put_text_if_set(&mut f, "doctor_id", &self.doctor_id);
        if !self.attachments.is_empty() {
            f.insert(
                "attachments".to_string(),
                FieldValue::TextList(self.attachments.clone()),
            );
        }
        Ok(f)
    }

    fn from_stored(doc: StoredDocument) -> Result<Self, DomainError> {
        let bad = corrupt::<Self>(&doc.id);
        Ok(Self {
            user_id: doc.text("user_id").map_err(&bad)?,
            record_type: doc.text("record_type").map_err(&bad)?,
            record_date: doc.text("record_date").map_err(&bad)?,
            description: doc.text("description").map_err(&bad)?,
            doctor_id: doc.text("doctor_id").map_err(&bad)?,
            attachments: doc.text_list("attachments").map_err(&bad)?,
            id: doc.id.clone(),
            created_at: Some(doc.created_at),
            updated_at: Some(doc.updated_at),
        })
    }

    fn filter(filter: &MedicalRecordFilter) -> Filter {
        let mut p = Vec::new();
        push_text_eq(&mut p, "user_id", &filter.user_id);
        push_text_eq(&mut p, "record_type", &filter.record_type);
        push_text_eq(&mut p, "record_date", &filter.record_date);
        push_text_eq(&mut p, "description", &filter.description);
        push_text_eq(&mut p, "doctor_id", &filter.doctor_id);
        Filter { predicates: p }
    }
}

// --- GeneticData ---

impl Entity for GeneticData {
    fn id(&self) -> &str {
        &self.id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn to_fields(&self) -> Result<Fields, DomainError> {
        let mut f = Fields::new();
        put_text(&mut f, "user_id", &self.user_id);
        put_text(&mut f, "data_type", &self.data_type);
        put_data_value(&mut f, &self.data_value)?;
        put_text(&mut f, "analysis_date", &self.analysis_date);
        Ok(f)
    }

    fn patch_fields(&self) -> Result<Fields, DomainError> {
        let mut f = Fields::new();
        put_text_if_set(&mut f, "user_id", &self.user_id);
        put_text_if_set(&mut f, "data_type", &self.data_type);
        put_data_value(&mut f, &self.data_value)?;
        put_text_if_set(&mut f, "analysis_date", &self.analysis_date);
        Ok(f)
    }

    fn from_stored(doc: StoredDocument) -> Result<Self, DomainError> {
        let bad = corrupt::<Self>(&doc.id);
        Ok(Self {
            user_id: doc.text("user_id").map_err(&bad)?,
            data_type: doc.text("data_type").map_err(&bad)?,
            data_value: read_data_value(&doc).map_err(&bad)?,
            analysis_date: doc.text("analysis_date").map_err(&bad)?,
            id: doc.id.clone(),
            created_at: Some(doc.created_at),
            updated_at: Some(doc.updated_at),
        })
    }

    fn filter(filter: &GeneticDataFilter) -> Filter {
        let mut p = Vec::new();
        push_text_eq(&mut p, "user_id", &filter.user_id);
        push_text_eq(&mut p, "data_type", &filter.data_type);
        push_text_eq(&mut p, "analysis_date", &filter.analysis_date);
        Filter { predicates: p }
    }
}

// --- LifestyleData ---

impl Entity for LifestyleData {
    fn id(&self) -> &str {
        &self.id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn to_fields(&self) -> Result<Fields, DomainError> {
        let mut f = Fields::new();
        put_text(&mut f, "user_id", &self.user_id);
        put_text(&mut f, "data_type", &self.data_type);
        put_data_value(&mut f, &self.data_value)?;
        put_text(&mut f, "recorded_date", &self.recorded_date);
        Ok(f)
    }

    fn patch_fields(&self) -> Result<Fields, DomainError> {
        let mut f = Fields::new();
        put_text_if_set(&mut f, "user_id", &self.user_id);
        put_text_if_set(&mut f, "data_type", &self.data_type);
        put_data_value(&mut f, &self.data_value)?;
        put_text_if_set(&mut f, "recorded_date", &self.recorded_date);
        Ok(f)
    }

    fn from_stored(doc: StoredDocument) -> Result<Self, DomainError> {
        let bad = corrupt::<Self>(&doc.id);
        Ok(Self {
            user_id: doc.text("user_id").map_err(&bad)?,
            data_type: doc.text("data_type").map_err(&bad)?,
            data_value: read_data_value(&doc).map_err(&bad)?,
            recorded_date: doc.text("recorded_date").map_err(&bad)?,
            id: doc.id.clone(),
            created_at: Some(doc.created_at),
            updated_at: Some(doc.updated_at),
        })
    }

    fn filter(filter: &LifestyleDataFilter) -> Filter {
        let mut p = Vec::new();
        push_text_eq(&mut p, "user_id", &filter.user_id);
        push_text_eq(&mut p, "data_type", &filter.data_type);
        push_text_eq(&mut p, "recorded_date", &filter.recorded_date);
        Filter { predicates: p }
    }
}

// --- WearableData ---

impl Entity for WearableData {
    fn id(&self) -> &str {
        &self.id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn to_fields(&self) -> Result<Fields, DomainError> {
        let mut f = Fields::new();
        put_text(&mut f, "user_id", &self.user_id);
        put_text(&mut f, "device_type", &self.device_type);
        put_text(&mut f, "data_type", &self.data_type);
        put_data_value(&mut f, &self.data_value)?;
        put_text(&mut f, "recorded_timestamp", &self.recorded_timestamp);
        Ok(f)
    }

    fn patch_fields(&self) -> Result<Fields, DomainError> {
        let mut f = Fields::new();
        put_text_if_set(&mut f, "user_id", &self.user_id);
        put_text_if_set(&mut f, "device_type", &self.device_type);
        put_text_if_set(&mut f, "data_type", &self.data_type);
        put_data_value(&mut f, &self.data_value)?;
        put_text_if_set(&mut f, "recorded_timestamp", &self.recorded_timestamp);
        Ok(f)
    }

    fn from_stored(doc: StoredDocument) -> Result<Self, DomainError> {
        let bad = corrupt::<Self>(&doc.id);
        Ok(Self {
            user_id: doc.text("user_id").map_err(&bad)?,
            device_type: doc.text("device_type").map_err(&bad)?,
            data_type: doc.text("data_type").map_err(&bad)?,
            data_value: read_data_value(&doc).map_err(&bad)?,
            recorded_timestamp: doc.text("recorded_timestamp").map_err(&bad)?,
            id: doc.id.clone(),
            created_at: Some(doc.created_at),
            updated_at: Some(doc.updated_at),
        })
    }

    fn filter(filter: &WearableDataFilter) -> Filter {
        let mut p = Vec::new();
        push_text_eq(&mut p, "user_id", &filter.user_id);
        push_text_eq(&mut p, "device_type", &filter.device_type);
        push_text_eq(&mut p, "data_type", &filter.data_type);
        push_text_eq(&mut p, "recorded_timestamp", &filter.recorded_timestamp);
        Filter { predicates: p }
    }
}

// --- HealthRecommendation ---

impl Entity for HealthRecommendation {
    fn id(&self) -> &str {
        &self.id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn to_fields(&self) -> Result<Fields, DomainError> {
        let mut f = Fields::new();
        put_text(&mut f, "user_id", &self.user_id);
        put_text(&mut f, "recommendation_type", &self.recommendation_type);
        put_text(&mut f, "description", &self.description);
        f.insert(
            "priority".to_string(),
            FieldValue::Int(i64::from(self.priority)),
        );
        Ok(f)
    }

    fn patch_fields(&self) -> Result<Fields, DomainError> {
        let mut f = Fields::new();
        put_text_if_set(&mut f, "user_id", &self.user_id);
        put_text_if_set(&mut f, "recommendation_type", &self.recommendation_type);
        put_text_if_set(&mut f, "description", &self.description);
        if self.priority != 0 {
            f.insert(
                "priority".to_string(),
                FieldValue::Int(i64::from(self.priority)),
            );
        }
        Ok(f)
    }

    fn from_stored(doc: StoredDocument) -> Result<Self, DomainError> {
        let bad = corrupt::<Self>(&doc.id);
        let priority = doc.int("priority").map_err(&bad)?;
        let priority = i32::try_from(priority)
            .map_err(|_| bad(format!("priority {priority} out of range")))?;
        Ok(Self {
            user_id: doc.text("user_id").map_err(&bad)?,
            recommendation_type: doc.text("recommendation_type").map_err(&bad)?,
            description: doc.text("description").map_err(&bad)?,
            priority,
            id: doc.id.clone(),
            created_at: Some(doc.created_at),
            updated_at: Some(doc.updated_at),
        })
    }

    fn filter(filter: &HealthRecommendationFilter) -> Filter {
        let mut p = Vec::new();
        push_text_eq(&mut p, "user_id", &filter.user_id);
        push_text_eq(&mut p, "recommendation_type", &filter.recommendation_type);
        if let Some(priority) = filter.priority.filter(|p| *p != 0) {
            p.push(Predicate::Eq {
                field: "priority".to_string(),
                value: FieldValue::Int(i64::from(priority)),
            });
        }
        Filter { predicates: p }
    }
}
