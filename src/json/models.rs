//! Serde models for the `$`-keyed JSON forms of non-JSON BSON types.

use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ObjectId {
    #[serde(rename = "$oid")]
    pub(crate) oid: String,
}

impl ObjectId {
    pub(crate) fn parse(self) -> Result<crate::oid::ObjectId> {
        crate::oid::ObjectId::parse_str(&self.oid)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct DateTime {
    #[serde(rename = "$date")]
    pub(crate) body: DateTimeBody,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum DateTimeBody {
    Rfc3339(String),
    Millis(i64),
    NumberLong {
        #[serde(rename = "$numberLong")]
        millis: String,
    },
}

impl DateTime {
    pub(crate) fn parse(self) -> Result<crate::DateTime> {
        match self.body {
            DateTimeBody::Rfc3339(s) => crate::DateTime::parse_rfc3339_str(s),
            DateTimeBody::Millis(ms) => Ok(crate::DateTime::from_millis(ms)),
            DateTimeBody::NumberLong { millis } => {
                let ms: i64 = millis.parse().map_err(|_| {
                    Error::incompatible_type_conversion(format!(
                        "invalid $numberLong value: {:?}",
                        millis
                    ))
                })?;
                Ok(crate::DateTime::from_millis(ms))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Binary {
    #[serde(rename = "$binary")]
    pub(crate) base64: String,

    #[serde(rename = "$type")]
    pub(crate) subtype: String,
}

impl Binary {
    pub(crate) fn parse(self) -> Result<crate::raw::Binary> {
        let bytes = crate::base64::decode(&self.base64).map_err(|e| {
            Error::incompatible_type_conversion(format!("invalid $binary base64: {}", e))
        })?;

        let mut subtype = [0u8; 1];
        hex::decode_to_slice(&self.subtype, &mut subtype).map_err(|e| {
            Error::incompatible_type_conversion(format!("invalid $type hex: {}", e))
        })?;

        Ok(crate::raw::Binary {
            subtype: subtype[0].into(),
            bytes,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Regex {
    #[serde(rename = "$regex")]
    pub(crate) pattern: String,

    #[serde(rename = "$options", default)]
    pub(crate) options: String,
}

impl Regex {
    pub(crate) fn parse(self) -> Result<crate::raw::Regex> {
        Ok(crate::raw::Regex {
            pattern: self.pattern.try_into()?,
            options: self.options.try_into()?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Timestamp {
    #[serde(rename = "$timestamp")]
    pub(crate) body: TimestampBody,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TimestampBody {
    pub(crate) t: u32,
    pub(crate) i: u32,
}

impl Timestamp {
    pub(crate) fn parse(self) -> crate::datetime::Timestamp {
        crate::datetime::Timestamp {
            time: self.body.t,
            increment: self.body.i,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct JavaScriptCode {
    #[serde(rename = "$code")]
    pub(crate) code: String,

    #[serde(rename = "$scope")]
    pub(crate) scope: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Symbol {
    #[serde(rename = "$symbol")]
    pub(crate) value: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct MinKey {
    #[serde(rename = "$minKey")]
    pub(crate) value: i32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct MaxKey {
    #[serde(rename = "$maxKey")]
    pub(crate) value: i32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct DbPointer {
    #[serde(rename = "$dbPointer")]
    pub(crate) body: DbPointerBody,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct DbPointerBody {
    #[serde(rename = "$ref")]
    pub(crate) namespace: String,

    #[serde(rename = "$id")]
    pub(crate) id: ObjectId,
}

impl DbPointer {
    pub(crate) fn parse(self) -> Result<crate::raw::DbPointer> {
        Ok(crate::raw::DbPointer {
            namespace: self.body.namespace,
            id: self.body.id.parse()?,
        })
    }
}
