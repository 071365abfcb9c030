use bson::{doc, oid::ObjectId, Bson, DateTime as BsonDateTime, Document};

use crate::domain::document::{FieldValue, Fields, Filter, Predicate, StoredDocument};
use crate::domain::repo::StoreError;

pub const ID: &str = "_id";
pub const CREATED_AT: &str = "created_at";
pub const UPDATED_AT: &str = "updated_at";

pub fn object_id(id: &str) -> Result<ObjectId, StoreError> {
    ObjectId::parse_str(id).map_err(|e| StoreError::corrupt(id, format!("not an object id: {e}")))
}

pub fn field_to_bson(value: &FieldValue) -> Bson {
    match value {
        FieldValue::Text(s) => Bson::String(s.clone()),
        FieldValue::Int(v) => Bson::Int64(*v),
        FieldValue::TextList(items) => {
            Bson::Array(items.iter().cloned().map(Bson::String).collect())
        }
    }
}

fn bson_to_field(id: &str, name: &str, value: Bson) -> Result<Option<FieldValue>, StoreError> {
    let bad = |what: &str| StoreError::corrupt(id, format!("field '{name}': {what}"));
    Ok(match value {
        Bson::Null => None,
        Bson::String(s) => Some(FieldValue::Text(s)),
        Bson::Int32(v) => Some(FieldValue::Int(i64::from(v))),
        Bson::Int64(v) => Some(FieldValue::Int(v)),
        Bson::Array(items) => {
            let list = items
                .into_iter()
                .map(|b| match b {
                    Bson::String(s) => Ok(s),
                    other => Err(bad(&format!("non-string list item {other}"))),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Some(FieldValue::TextList(list))
        }
        other => return Err(bad(&format!("unsupported type {:?}", other.element_type()))),
    })
}

/// Domain document → BSON, with `_id` as ObjectId and timestamps as BSON dates.
pub fn to_bson(doc: &StoredDocument) -> Result<Document, StoreError> {
    let mut out = Document::new();
    out.insert(ID, object_id(&doc.id)?);
    for (name, value) in &doc.fields {
        out.insert(name.clone(), field_to_bson(value));
    }
    out.insert(CREATED_AT, BsonDateTime::from_chrono(doc.created_at));
    out.insert(UPDATED_AT, BsonDateTime::from_chrono(doc.updated_at));
    Ok(out)
}

pub fn from_bson(mut raw: Document) -> Result<StoredDocument, StoreError> {
    let id = match raw.remove(ID) {
        Some(Bson::ObjectId(oid)) => oid.to_hex(),
        Some(Bson::String(s)) => s,
        other => return Err(StoreError::corrupt("?", format!("invalid _id: {other:?}"))),
    };

    let mut stamp = |key: &str| match raw.remove(key) {
        Some(Bson::DateTime(t)) => Ok(t.to_chrono()),
        other => Err(StoreError::corrupt(&id, format!("invalid {key}: {other:?}"))),
    };
    let created_at = stamp(CREATED_AT)?;
    let updated_at = stamp(UPDATED_AT)?;

    let mut fields = Fields::new();
    for (name, value) in raw {
        if let Some(v) = bson_to_field(&id, &name, value)? {
            fields.insert(name, v);
        }
    }

    Ok(StoredDocument {
        id,
        fields,
        created_at,
        updated_at,
    })
}

/// Conjunctive filter → `{"$and": [...]}`; empty filter → `{}`.
pub fn filter_to_bson(filter: &Filter) -> Document {
    if filter.is_empty() {
        return Document::new();
    }
    let clauses: Vec<Bson> = filter
        .predicates
        .iter()
        .map(|p| match p {
            Predicate::Eq { field, value } => {
                let mut d = Document::new();
                d.insert(field.clone(), field_to_bson(value));
                Bson::Document(d)
            }
            Predicate::CreatedWithin(w) => {
                let mut d = Document::new();
                d.insert(
                    CREATED_AT,
                    doc! {
                        "$gte": BsonDateTime::from_chrono(w.start),
                        "$lt": BsonDateTime::from_chrono(w.end),
                    },
                );
                Bson::Document(d)
            }
        })
        .collect();
    doc! { "$and": clauses }
}

/// Merge patch → `{"$set": {...}}`, always refreshing `updated_at`.
pub fn patch_to_bson(patch: &Fields, updated_at: chrono::DateTime<chrono::Utc>) -> Document {
    let mut set = Document::new();
    for (name, value) in patch {
        set.insert(name.clone(), field_to_bson(value));
    }
    set.insert(UPDATED_AT, BsonDateTime::from_chrono(updated_at));
    doc! { "$set": set }
}
