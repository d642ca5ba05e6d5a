//! Resource descriptors: the static shape of a resource kind.

use serde_json::Value;
use validator::ValidateEmail;

use crate::record::Record;
use crate::store::UniqueIndex;

/// JSON type a declared field must hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    String,
    /// A string that must be a well-formed email address
    Email,
    Boolean,
    Number,
    Object,
    Array,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Email => "a valid email address",
            Self::Boolean => "a boolean",
            Self::Number => "a number",
            Self::Object => "an object",
            Self::Array => "an array",
        }
    }

    /// Whether `value` has this kind. `null` is handled by the caller.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::String, Value::String(_)) => true,
            (Self::Email, Value::String(s)) => s.validate_email(),
            (Self::Boolean, Value::Bool(_)) => true,
            (Self::Number, Value::Number(_)) => true,
            (Self::Object, Value::Object(_)) => true,
            (Self::Array, Value::Array(_)) => true,
            _ => false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }

    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }
}

/// Capability set every resource kind implements.
///
/// Descriptors are immutable once registered. The default `validate` and
/// `validate_patch` cover presence and kind checks; implementors add their
/// own predicates through [`ResourceDescriptor::check`].
pub trait ResourceDescriptor: Send + Sync + 'static {
    /// Resource kind, also the collection name
    fn name(&self) -> &'static str;

    fn primary_key(&self) -> &'static str {
        "id"
    }

    /// Declared fields in declaration order, primary key included
    fn fields(&self) -> &'static [FieldSpec];

    /// Unique-constrained fields in declaration order, primary key excluded
    fn unique_fields(&self) -> &'static [&'static str];

    fn required_fields(&self) -> Vec<&'static str> {
        self.fields()
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
            .collect()
    }

    fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|f| f.name == name)
    }

    /// Resource-specific predicates run after the generic checks
    fn check(&self, _record: &Record) -> Result<(), String> {
        Ok(())
    }

    /// Full-record validation for create and replace
    fn validate(&self, record: &Record) -> Result<(), String> {
        for spec in self.fields() {
            match record.get(spec.name) {
                None | Some(Value::Null) if spec.required => {
                    return Err(format!("{} is required", spec.name));
                }
                Some(value) => check_value(spec, value)?,
                None => {}
            }
        }
        self.check(record)
    }

    /// Partial validation for merges into the record stored under `id`
    fn validate_patch(&self, id: &str, patch: &Record) -> Result<(), String> {
        if let Some(pk) = patch.get(self.primary_key()) {
            if pk.as_str() != Some(id) {
                return Err(format!("{} cannot be changed", self.primary_key()));
            }
        }

        for (name, value) in patch {
            let Some(spec) = self.field(name) else {
                continue;
            };
            if value.is_null() && spec.required {
                return Err(format!("{} is required", spec.name));
            }
            check_value(spec, value)?;
        }
        self.check(patch)
    }

    /// Unique indexes the store must maintain: declared unique fields in
    /// declaration order, then the primary key.
    fn unique_indexes(&self) -> Vec<UniqueIndex> {
        let mut indexes: Vec<UniqueIndex> = self
            .unique_fields()
            .iter()
            .map(|name| UniqueIndex {
                field: name.to_string(),
                sparse: !self.field(name).is_some_and(|f| f.required),
            })
            .collect();

        indexes.push(UniqueIndex {
            field: self.primary_key().to_string(),
            sparse: false,
        });
        indexes
    }
}

/// Kind check for one present value; required strings must be non-empty.
fn check_value(spec: &FieldSpec, value: &Value) -> Result<(), String> {
    if value.is_null() {
        return Ok(());
    }
    if !spec.kind.accepts(value) {
        return Err(format!("{} must be {}", spec.name, spec.kind.as_str()));
    }
    if spec.required && value.as_str().is_some_and(|s| s.trim().is_empty()) {
        return Err(format!("{} is required", spec.name));
    }
    Ok(())
}
