//! Records are plain JSON objects shaped by a [`ResourceDescriptor`].

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::descriptor::ResourceDescriptor;

pub type Record = Map<String, Value>;

/// Drop every field the descriptor does not declare.
pub fn strip_undeclared<D>(descriptor: &D, record: Record) -> Record
where
    D: ResourceDescriptor + ?Sized,
{
    record
        .into_iter()
        .filter(|(name, _)| {
            let declared = descriptor.field(name).is_some();
            if !declared {
                tracing::debug!(resource = descriptor.name(), field = %name, "Dropping undeclared field");
            }
            declared
        })
        .collect()
}

/// Fill a missing or null primary key with a fresh UUID v7 and return the id.
///
/// A present non-string key is left for validation to reject.
pub fn ensure_primary_key<D>(descriptor: &D, record: &mut Record) -> Option<String>
where
    D: ResourceDescriptor + ?Sized,
{
    let pk = descriptor.primary_key();
    match record.get(pk) {
        None | Some(Value::Null) => {
            let id = Uuid::now_v7().to_string();
            record.insert(pk.to_string(), Value::String(id.clone()));
            Some(id)
        }
        Some(Value::String(id)) => Some(id.clone()),
        Some(_) => None,
    }
}

/// Drop null-valued fields; a stored record never holds an explicit null.
///
/// Unique indexes treat a present null as a value, so two records with
/// `"email": null` would collide.
pub fn drop_nulls(record: Record) -> Record {
    record.into_iter().filter(|(_, value)| !value.is_null()).collect()
}
