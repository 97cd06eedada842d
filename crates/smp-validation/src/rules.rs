//! OPC UA primitive type rules

use crate::engine::ValidationError;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static DATETIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}").unwrap());

static UTCTIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}.*Z\n?\z").unwrap());

static GUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}\n?\z")
        .unwrap()
});

const OPC_PREFIX: &str = "opc:";
const OPC_URI_PREFIX: &str = "http://opcfoundation.org/UA/";

const INT16_LABEL: &str = "integer (-32768 to 32767)";
const BOOLEAN_LABEL: &str = "boolean";

/// OPC UA data types with built-in validation rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpcType {
    Boolean,
    Int16,
    Int32,
    Int64,
    UInt16,
    UInt32,
    UInt64,
    Float,
    Double,
    String,
    DateTime,
    UtcTime,
    Guid,
    /// Structure of `offset` (Int16) and `daylightSavingInOffset` (Boolean)
    TimeZoneDataType,
}

impl OpcType {
    pub const ALL: [OpcType; 14] = [
        OpcType::Boolean,
        OpcType::Int16,
        OpcType::Int32,
        OpcType::Int64,
        OpcType::UInt16,
        OpcType::UInt32,
        OpcType::UInt64,
        OpcType::Float,
        OpcType::Double,
        OpcType::String,
        OpcType::DateTime,
        OpcType::UtcTime,
        OpcType::Guid,
        OpcType::TimeZoneDataType,
    ];

    /// The OPC UA browse name of the type
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            OpcType::Boolean => "Boolean",
            OpcType::Int16 => "Int16",
            OpcType::Int32 => "Int32",
            OpcType::Int64 => "Int64",
            OpcType::UInt16 => "UInt16",
            OpcType::UInt32 => "UInt32",
            OpcType::UInt64 => "UInt64",
            OpcType::Float => "Float",
            OpcType::Double => "Double",
            OpcType::String => "String",
            OpcType::DateTime => "DateTime",
            OpcType::UtcTime => "UtcTime",
            OpcType::Guid => "Guid",
            OpcType::TimeZoneDataType => "TimeZoneDataType",
        }
    }

    /// Resolve a type identifier (`opc:Int32`, the OPC UA URI form, or the
    /// bare name). Custom identifiers return `None`.
    #[must_use]
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        let name = identifier
            .strip_prefix(OPC_PREFIX)
            .or_else(|| identifier.strip_prefix(OPC_URI_PREFIX))
            .unwrap_or(identifier);

        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Human-readable description of the values the type accepts
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            OpcType::Boolean => BOOLEAN_LABEL,
            OpcType::Int16 => INT16_LABEL,
            OpcType::Int32 => "integer (-2147483648 to 2147483647)",
            OpcType::Int64 => "integer (64-bit)",
            OpcType::UInt16 => "unsigned integer (0 to 65535)",
            OpcType::UInt32 => "unsigned integer (0 to 4294967295)",
            OpcType::UInt64 => "unsigned integer (64-bit)",
            OpcType::Float => "float",
            OpcType::Double => "double",
            OpcType::String => "string",
            OpcType::DateTime => "ISO 8601 datetime",
            OpcType::UtcTime => "ISO 8601 UTC time (ending with Z)",
            OpcType::Guid => "GUID/UUID",
            OpcType::TimeZoneDataType => "object with offset and daylightSavingInOffset",
        }
    }

    /// Whether a scalar value satisfies the type.
    ///
    /// For `TimeZoneDataType` this is only the shape test; field-level
    /// findings come from [`validate_timezone`].
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            OpcType::Boolean => value.is_boolean(),
            OpcType::Int16 => is_int16(value),
            OpcType::Int32 => integer_in_range(value, i32::MIN.into(), i32::MAX.into()),
            OpcType::Int64 => integer_in_range(value, i64::MIN.into(), i64::MAX.into()),
            OpcType::UInt16 => integer_in_range(value, 0, u16::MAX.into()),
            OpcType::UInt32 => integer_in_range(value, 0, u32::MAX.into()),
            OpcType::UInt64 => integer_in_range(value, 0, u64::MAX.into()),
            // Booleans count as numeric here; only the integer types exclude them
            OpcType::Float | OpcType::Double => value.is_number() || value.is_boolean(),
            OpcType::String => value.is_string(),
            OpcType::DateTime => value.as_str().is_some_and(|s| DATETIME_RE.is_match(s)),
            OpcType::UtcTime => value.as_str().is_some_and(|s| UTCTIME_RE.is_match(s)),
            OpcType::Guid => value.as_str().is_some_and(|s| GUID_RE.is_match(s)),
            OpcType::TimeZoneDataType => value.is_object(),
        }
    }
}

impl std::fmt::Display for OpcType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{OPC_PREFIX}{}", self.name())
    }
}

/// Name of a JSON value's runtime type, as reported in `actual`
#[must_use]
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Check a value against a type identifier.
///
/// Identifiers that do not name a known OPC UA type pass through without
/// findings.
#[must_use]
pub fn validate_opc_type(value: &Value, identifier: &str, path: &str) -> Vec<ValidationError> {
    match OpcType::from_identifier(identifier) {
        Some(OpcType::TimeZoneDataType) => validate_timezone(value, path),
        Some(opc_type) if !opc_type.accepts(value) => vec![ValidationError::invalid_type(
            path,
            opc_type.label(),
            value,
        )],
        _ => Vec::new(),
    }
}

/// Check the `TimeZoneDataType` structure. Both members are required and are
/// checked independently of each other.
#[must_use]
pub fn validate_timezone(value: &Value, path: &str) -> Vec<ValidationError> {
    let Some(object) = value.as_object() else {
        return vec![ValidationError::new(path, "TimeZoneDataType must be an object").with_types(
            OpcType::TimeZoneDataType.label(),
            type_name(value),
        )];
    };

    let mut errors = Vec::new();

    let offset_path = format!("{path}.offset");
    match object.get("offset") {
        None => errors.push(ValidationError::missing_field(offset_path)),
        Some(offset) if !is_int16(offset) => {
            errors.push(ValidationError::invalid_type(offset_path, INT16_LABEL, offset));
        }
        Some(_) => {}
    }

    let dst_path = format!("{path}.daylightSavingInOffset");
    match object.get("daylightSavingInOffset") {
        None => errors.push(ValidationError::missing_field(dst_path)),
        Some(dst) if !dst.is_boolean() => {
            errors.push(ValidationError::invalid_type(dst_path, BOOLEAN_LABEL, dst));
        }
        Some(_) => {}
    }

    errors
}

fn is_int16(value: &Value) -> bool {
    integer_in_range(value, i16::MIN.into(), i16::MAX.into())
}

/// Integer test on JSON numbers. Booleans are a distinct JSON type and never
/// pass; numbers written with a fraction or exponent are not integers.
fn integer_in_range(value: &Value, min: i128, max: i128) -> bool {
    let Value::Number(number) = value else {
        return false;
    };

    let integer = number
        .as_i64()
        .map(i128::from)
        .or_else(|| number.as_u64().map(i128::from));

    integer.is_some_and(|n| (min..=max).contains(&n))
}
