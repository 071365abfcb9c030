use std::fmt;

use crate::contract::EntityKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
}

impl Operation {
    /// Notification text for this operation on `kind`, if the kind sends one.
    pub fn notification(self, kind: EntityKind) -> Option<&'static str> {
        match self {
            Self::Create => kind.created_message(),
            Self::Update => kind.updated_message(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Update => "update",
        })
    }
}

/// Match a `"<entity>.<operation>"` key against `kind`.
///
/// Keys for other kinds or unknown operations yield `None`.
pub fn route(kind: EntityKind, key: &str) -> Option<Operation> {
    let (prefix, op) = key.rsplit_once('.')?;
    if prefix != kind.key_prefix() {
        return None;
    }
    match op {
        "create" => Some(Operation::Create),
        "update" => Some(Operation::Update),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_create_and_update_for_own_kind() {
        let k = EntityKind::GeneticData;
        assert_eq!(route(k, "genetic_data.create"), Some(Operation::Create));
        assert_eq!(route(k, "genetic_data.update"), Some(Operation::Update));
    }

    #[test]
    fn rejects_foreign_or_unknown_keys() {
        let k = EntityKind::MedicalRecord;
        for key in [
            "medical_record.delete",
            "genetic_data.create",
            "medical_record",
            "",
            "medical_record.create.v2",
        ] {
            assert_eq!(route(k, key), None, "{key}");
        }
    }

    #[test]
    fn notification_follows_kind_table() {
        assert_eq!(
            Operation::Create.notification(EntityKind::HealthRecommendation),
            Some("You have a new health recommendation.")
        );
        assert_eq!(Operation::Update.notification(EntityKind::WearableData), None);
    }
}
