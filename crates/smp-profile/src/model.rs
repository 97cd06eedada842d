//! Profile model definitions

use serde_json::{Map, Value};
use tracing::debug;

const KEY_ID: &str = "@id";
const KEY_TYPE: &str = "@type";
const KEY_CONTEXT: &str = "@context";
const KEY_IS_DATA_TYPE: &str = "cesmii:isDataType";
const KEY_FIELDS: &str = "cesmii:fields";
const KEY_FIELD_NAME: &str = "cesmii:fieldName";
const KEY_ATTRIBUTES: &str = "cesmii:attributes";
const KEY_BROWSE_NAME: &str = "cesmii:browseName";
const KEY_DATA_TYPE: &str = "cesmii:dataType";
const KEY_IS_ARRAY: &str = "cesmii:isArray";
const KEY_PROFILE_REFERENCE: &str = "cesmii:profileReference";

/// A parsed SM profile: its namespace, field table, and type context
#[derive(Debug, Clone, Default)]
pub struct Profile {
    /// The profile's own identifier (`@id`), empty when undeclared
    pub namespace: String,
    /// DataType profiles declare fields, ObjectType profiles declare attributes
    pub is_data_type: bool,
    /// Field definitions in declaration order
    pub fields: Vec<FieldDefinition>,
    context: Map<String, Value>,
}

/// Definition of a single field or attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    pub name: String,
    pub data_type: Option<DataTypeRef>,
    pub is_array: bool,
}

/// The `cesmii:dataType` descriptor of a field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataTypeRef {
    /// OPC UA (or custom) type identifier, e.g. `opc:Int32`
    pub id: Option<String>,
    /// Namespace of another profile describing the nested structure
    pub profile_reference: Option<String>,
}

impl Profile {
    /// Parse a profile document into its field table.
    ///
    /// Parsing is lenient: anything that does not have the expected shape is
    /// ignored rather than rejected, so a malformed document yields a profile
    /// with no fields.
    pub fn from_document(document: &Value) -> Self {
        let is_data_type = document
            .get(KEY_IS_DATA_TYPE)
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let (collection_key, name_key) = if is_data_type {
            (KEY_FIELDS, KEY_FIELD_NAME)
        } else {
            (KEY_ATTRIBUTES, KEY_BROWSE_NAME)
        };

        let mut fields: Vec<FieldDefinition> = Vec::new();
        let entries = document
            .get(collection_key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for entry in entries {
            let Some(field) = FieldDefinition::from_entry(entry, name_key) else {
                debug!("Skipping {} entry without a {}", collection_key, name_key);
                continue;
            };

            // Later declarations win but keep the first position
            match fields.iter_mut().find(|f| f.name == field.name) {
                Some(existing) => *existing = field,
                None => fields.push(field),
            }
        }

        let context = document
            .get(KEY_CONTEXT)
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        Self {
            namespace: Self::namespace_of(document).unwrap_or_default().to_string(),
            is_data_type,
            fields,
            context,
        }
    }

    /// The `@id` of a profile document, if it declares one
    pub fn namespace_of(document: &Value) -> Option<&str> {
        document
            .get(KEY_ID)
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
    }

    /// Look up a field definition by name
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The `@type` hint recorded for a field in the profile's `@context`
    pub fn context_type(&self, field_name: &str) -> Option<&str> {
        self.context
            .get(field_name)
            .and_then(Value::as_object)
            .and_then(|entry| entry.get(KEY_TYPE))
            .and_then(Value::as_str)
    }

    /// Resolve the type identifier of a field.
    ///
    /// The field's own `cesmii:dataType.@id` takes precedence; the `@context`
    /// entry is the fallback.
    pub fn resolved_type<'a>(&'a self, field: &'a FieldDefinition) -> Option<&'a str> {
        field
            .type_id()
            .or_else(|| self.context_type(&field.name))
    }
}

impl FieldDefinition {
    fn from_entry(entry: &Value, name_key: &str) -> Option<Self> {
        let name = entry.get(name_key).and_then(Value::as_str)?.to_string();

        let data_type = entry
            .get(KEY_DATA_TYPE)
            .and_then(Value::as_object)
            .map(|descriptor| DataTypeRef {
                id: non_empty_string(descriptor.get(KEY_ID)),
                profile_reference: non_empty_string(descriptor.get(KEY_PROFILE_REFERENCE)),
            });

        let is_array = entry
            .get(KEY_IS_ARRAY)
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Some(Self {
            name,
            data_type,
            is_array,
        })
    }

    /// The explicit type identifier declared on the field
    pub fn type_id(&self) -> Option<&str> {
        self.data_type.as_ref().and_then(|dt| dt.id.as_deref())
    }

    /// The namespace of the profile this field nests, if any
    pub fn profile_reference(&self) -> Option<&str> {
        self.data_type
            .as_ref()
            .and_then(|dt| dt.profile_reference.as_deref())
    }
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
