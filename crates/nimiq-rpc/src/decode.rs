//! Typed decoding of JSON-RPC `result` payloads.
//!
//! Every value the client can return implements [`FromJson`], a single-pass
//! transformation from an already-parsed JSON tree into a typed value. The
//! error taxonomy matters here: wrong-kind values produce
//! [`DecodeError::TypeMismatch`] while absent fields produce
//! [`DecodeError::Missing`], and polymorphic results fall back to their next
//! candidate shape only on the former.

use serde_json::Value;

use crate::error::{DecodeError, RpcError};

/// Decode a typed value out of a JSON-RPC `result` payload.
pub trait FromJson: Sized {
    fn from_json(value: &Value) -> Result<Self, RpcError>;
}

/// The JSON kind name of a value, for error messages.
pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub(crate) fn mismatch(
    context: impl Into<String>,
    expected: &'static str,
    value: &Value,
) -> DecodeError {
    DecodeError::TypeMismatch {
        context: context.into(),
        expected,
        found: kind(value).to_owned(),
    }
}

// ==============================================================================
// Record — field accessors over a JSON object
// ==============================================================================

/// A view over a JSON object being decoded into a fixed record.
///
/// Field accessors classify failures precisely: an absent field is
/// [`DecodeError::Missing`], a present field of the wrong kind (or out of
/// range) is [`DecodeError::TypeMismatch`]. The `opt_*` accessors treat
/// absent and JSON null identically as `None` but still reject wrong-kind
/// values.
pub(crate) struct Record<'a> {
    context: &'static str,
    fields: &'a serde_json::Map<String, Value>,
}

impl<'a> Record<'a> {
    pub(crate) fn open(value: &'a Value, context: &'static str) -> Result<Self, DecodeError> {
        match value.as_object() {
            Some(fields) => Ok(Self { context, fields }),
            None => Err(mismatch(context, "object", value)),
        }
    }

    /// All key/value pairs present in the underlying object, for records
    /// that carry dynamically-named fields next to their fixed ones.
    pub(crate) fn entries(&self) -> impl Iterator<Item = (&'a String, &'a Value)> {
        self.fields.iter()
    }

    pub(crate) fn context(&self) -> &'static str {
        self.context
    }

    fn at(&self, field: &'static str) -> String {
        format!("{}.{}", self.context, field)
    }

    fn required(&self, field: &'static str) -> Result<&'a Value, DecodeError> {
        self.fields.get(field).ok_or(DecodeError::Missing {
            context: self.context.to_owned(),
            field,
        })
    }

    fn optional(&self, field: &'static str) -> Option<&'a Value> {
        self.fields.get(field).filter(|value| !value.is_null())
    }

    /// Raw access to a required field, for nested decoding.
    pub(crate) fn field(&self, field: &'static str) -> Result<&'a Value, DecodeError> {
        self.required(field)
    }

    pub(crate) fn str_field(&self, field: &'static str) -> Result<String, DecodeError> {
        let value = self.required(field)?;
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| mismatch(self.at(field), "string", value))
    }

    pub(crate) fn opt_str_field(&self, field: &'static str) -> Result<Option<String>, DecodeError> {
        match self.optional(field) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .map(|s| Some(s.to_owned()))
                .ok_or_else(|| mismatch(self.at(field), "string", value)),
        }
    }

    pub(crate) fn bool_field(&self, field: &'static str) -> Result<bool, DecodeError> {
        let value = self.required(field)?;
        value
            .as_bool()
            .ok_or_else(|| mismatch(self.at(field), "boolean", value))
    }

    /// Decode a required unsigned integer field, narrowing to the target
    /// width. Narrowing failures count as type mismatches.
    pub(crate) fn uint_field<T: TryFrom<u64>>(
        &self,
        field: &'static str,
    ) -> Result<T, DecodeError> {
        let value = self.required(field)?;
        narrow_uint(self.at(field), value)
    }

    pub(crate) fn opt_uint_field<T: TryFrom<u64>>(
        &self,
        field: &'static str,
    ) -> Result<Option<T>, DecodeError> {
        match self.optional(field) {
            None => Ok(None),
            Some(value) => narrow_uint(self.at(field), value).map(Some),
        }
    }

    /// Decode a required array field element by element, reporting the
    /// field's path when the value is not an array at all.
    pub(crate) fn seq_field<T: FromJson>(&self, field: &'static str) -> Result<Vec<T>, RpcError> {
        let value = self.required(field)?;
        decode_seq(value, self.at(field))
    }

    pub(crate) fn opt_i64_field(&self, field: &'static str) -> Result<Option<i64>, DecodeError> {
        match self.optional(field) {
            None => Ok(None),
            Some(value) => value
                .as_i64()
                .map(Some)
                .ok_or_else(|| mismatch(self.at(field), "integer", value)),
        }
    }
}

fn narrow_uint<T: TryFrom<u64>>(context: String, value: &Value) -> Result<T, DecodeError> {
    let n = value
        .as_u64()
        .ok_or_else(|| mismatch(context.clone(), "unsigned integer", value))?;
    T::try_from(n).map_err(|_| DecodeError::TypeMismatch {
        context,
        expected: "unsigned integer",
        found: format!("number {n} out of range"),
    })
}

// ==============================================================================
// Scalar and container impls
// ==============================================================================

impl FromJson for bool {
    fn from_json(value: &Value) -> Result<Self, RpcError> {
        value
            .as_bool()
            .ok_or_else(|| mismatch("result", "boolean", value).into())
    }
}

impl FromJson for String {
    fn from_json(value: &Value) -> Result<Self, RpcError> {
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| mismatch("result", "string", value).into())
    }
}

impl FromJson for f64 {
    fn from_json(value: &Value) -> Result<Self, RpcError> {
        value
            .as_f64()
            .ok_or_else(|| mismatch("result", "number", value).into())
    }
}

impl FromJson for u8 {
    fn from_json(value: &Value) -> Result<Self, RpcError> {
        narrow_uint("result".to_owned(), value).map_err(RpcError::from)
    }
}

impl FromJson for u32 {
    fn from_json(value: &Value) -> Result<Self, RpcError> {
        narrow_uint("result".to_owned(), value).map_err(RpcError::from)
    }
}

impl FromJson for u64 {
    fn from_json(value: &Value) -> Result<Self, RpcError> {
        value
            .as_u64()
            .ok_or_else(|| mismatch("result", "unsigned integer", value).into())
    }
}

impl FromJson for i64 {
    fn from_json(value: &Value) -> Result<Self, RpcError> {
        value
            .as_i64()
            .ok_or_else(|| mismatch("result", "integer", value).into())
    }
}

/// Methods that return nothing meaningful discard the payload entirely.
impl FromJson for () {
    fn from_json(_value: &Value) -> Result<Self, RpcError> {
        Ok(())
    }
}

impl<T: FromJson> FromJson for Option<T> {
    fn from_json(value: &Value) -> Result<Self, RpcError> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_json(value).map(Some)
        }
    }
}

impl<T: FromJson> FromJson for Vec<T> {
    fn from_json(value: &Value) -> Result<Self, RpcError> {
        decode_seq(value, "result")
    }
}

pub(crate) fn decode_seq<T: FromJson>(
    value: &Value,
    context: impl Into<String>,
) -> Result<Vec<T>, RpcError> {
    let items = value
        .as_array()
        .ok_or_else(|| mismatch(context, "array", value))?;
    items.iter().map(T::from_json).collect()
}
