use serde_json::{Map, Value};

use super::models;
use crate::{
    error::{Error, Result},
    raw::{CString, RawArrayBuf, RawBson, RawDocumentBuf, RawJavaScriptCodeWithScope},
};

/// Parses a JSON document (`{...}`) into BSON bytes.
pub fn from_str(json: &str) -> Result<RawDocumentBuf> {
    match serde_json::from_str(json)? {
        Value::Object(map) => object_to_document(map),
        other => Err(Error::json_parse(
            format!("expected a document at the top level, got {}", json_kind(&other)),
            1,
            1,
        )),
    }
}

/// Parses a JSON array (`[...]`) into BSON bytes.
pub fn array_from_str(json: &str) -> Result<RawArrayBuf> {
    match serde_json::from_str(json)? {
        Value::Array(values) => values_to_array(values),
        other => Err(Error::json_parse(
            format!("expected an array at the top level, got {}", json_kind(&other)),
            1,
            1,
        )),
    }
}

/// Parses a JSON document from UTF-16 code units.
pub fn from_utf16(units: &[u16]) -> Result<RawDocumentBuf> {
    from_str(&utf16_to_string(units)?)
}

/// Parses a JSON array from UTF-16 code units.
pub fn array_from_utf16(units: &[u16]) -> Result<RawArrayBuf> {
    array_from_str(&utf16_to_string(units)?)
}

/// Parses a JSON document from UTF-32 code units.
pub fn from_utf32(units: &[u32]) -> Result<RawDocumentBuf> {
    from_str(&utf32_to_string(units)?)
}

/// Parses a JSON array from UTF-32 code units.
pub fn array_from_utf32(units: &[u32]) -> Result<RawArrayBuf> {
    array_from_str(&utf32_to_string(units)?)
}

fn utf16_to_string(units: &[u16]) -> Result<String> {
    char::decode_utf16(units.iter().copied())
        .enumerate()
        .map(|(index, result)| {
            result.map_err(|_| {
                Error::json_parse(format!("invalid UTF-16 code unit at index {}", index), 0, index)
            })
        })
        .collect()
}

fn utf32_to_string(units: &[u32]) -> Result<String> {
    units
        .iter()
        .enumerate()
        .map(|(index, &unit)| {
            char::from_u32(unit).ok_or_else(|| {
                Error::json_parse(format!("invalid UTF-32 code unit at index {}", index), 0, index)
            })
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a document",
    }
}

fn object_to_document(map: Map<String, Value>) -> Result<RawDocumentBuf> {
    let mut doc = RawDocumentBuf::new();
    for (key, value) in map {
        let bson = value_to_bson(value).map_err(|e| match e.key {
            Some(_) => e,
            None => e.with_key(key.clone()),
        })?;
        let key: CString = key.try_into()?;
        doc.append(key, bson);
    }
    Ok(doc)
}

fn values_to_array(values: Vec<Value>) -> Result<RawArrayBuf> {
    let mut arr = RawArrayBuf::new();
    for value in values {
        arr.push(value_to_bson(value)?);
    }
    Ok(arr)
}

/// Converts one JSON value into a BSON value, reconstructing `$`-keyed
/// extended types.
///
/// Integer literals become int32 when representable and int64 otherwise;
/// any fractional or exponent form parses as a double.
fn value_to_bson(value: Value) -> Result<RawBson> {
    Ok(match value {
        Value::Null => RawBson::Null,
        Value::Bool(b) => RawBson::Boolean(b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                if let Ok(small) = i32::try_from(i) {
                    RawBson::Int32(small)
                } else {
                    RawBson::Int64(i)
                }
            } else if n.is_u64() {
                return Err(Error::json_parse(
                    format!("integer out of range: {}", n),
                    0,
                    0,
                ));
            } else {
                // unwrap is ok here: a serde_json number is i64, u64, or f64
                RawBson::Double(n.as_f64().unwrap())
            }
        }
        Value::String(s) => RawBson::String(s),
        Value::Array(values) => RawBson::Array(values_to_array(values)?),
        Value::Object(map) => object_to_bson(map)?,
    })
}

fn object_to_bson(map: Map<String, Value>) -> Result<RawBson> {
    if map.contains_key("$oid") {
        let oid: models::ObjectId = from_map(map)?;
        return Ok(RawBson::ObjectId(oid.parse()?));
    }

    if map.contains_key("$date") {
        let date: models::DateTime = from_map(map)?;
        return Ok(RawBson::DateTime(date.parse()?));
    }

    if map.contains_key("$binary") {
        let binary: models::Binary = from_map(map)?;
        return Ok(RawBson::Binary(binary.parse()?));
    }

    if map.contains_key("$regex") {
        let regex: models::Regex = from_map(map)?;
        return Ok(RawBson::RegularExpression(regex.parse()?));
    }

    if map.contains_key("$timestamp") {
        let timestamp: models::Timestamp = from_map(map)?;
        return Ok(RawBson::Timestamp(timestamp.parse()));
    }

    if map.contains_key("$code") {
        let code: models::JavaScriptCode = from_map(map)?;
        return Ok(match code.scope {
            Some(scope) => {
                RawBson::JavaScriptCodeWithScope(RawJavaScriptCodeWithScope {
                    code: code.code,
                    scope: object_to_document(scope)?,
                })
            }
            None => RawBson::JavaScriptCode(code.code),
        });
    }

    if map.contains_key("$symbol") {
        let symbol: models::Symbol = from_map(map)?;
        return Ok(RawBson::Symbol(symbol.value));
    }

    if map.contains_key("$minKey") {
        let _: models::MinKey = from_map(map)?;
        return Ok(RawBson::MinKey);
    }

    if map.contains_key("$maxKey") {
        let _: models::MaxKey = from_map(map)?;
        return Ok(RawBson::MaxKey);
    }

    if map.contains_key("$dbPointer") {
        let dbp: models::DbPointer = from_map(map)?;
        return Ok(RawBson::DbPointer(dbp.parse()?));
    }

    Ok(RawBson::Document(object_to_document(map)?))
}

fn from_map<T: serde::de::DeserializeOwned>(map: Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(map)).map_err(Error::from)
}
