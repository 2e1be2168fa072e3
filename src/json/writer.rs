use std::fmt::Write;

use crate::{
    error::{Error, Result},
    raw::{RawArray, RawBsonRef, RawDocument},
};

/// Writes a document as canonical JSON: no whitespace, elements in iteration
/// order, and non-JSON types in their `$`-keyed forms.
pub fn to_string(doc: &RawDocument) -> Result<String> {
    let mut out = String::with_capacity(doc.byte_size());
    write_document(&mut out, doc)?;
    Ok(out)
}

/// Writes an array as canonical JSON.
pub fn array_to_string(arr: &RawArray) -> Result<String> {
    let mut out = String::with_capacity(arr.byte_size());
    write_array(&mut out, arr)?;
    Ok(out)
}

fn write_document(out: &mut String, doc: &RawDocument) -> Result<()> {
    out.push('{');
    let mut first = true;
    for result in doc.iter() {
        let elem = result?;
        if !first {
            out.push(',');
        }
        first = false;
        write_escaped_string(out, elem.name());
        out.push(':');
        write_value(out, elem.value()?)?;
    }
    out.push('}');
    Ok(())
}

fn write_array(out: &mut String, arr: &RawArray) -> Result<()> {
    out.push('[');
    let mut first = true;
    for result in arr.iter() {
        let value = result?;
        if !first {
            out.push(',');
        }
        first = false;
        write_value(out, value)?;
    }
    out.push(']');
    Ok(())
}

fn write_value(out: &mut String, value: RawBsonRef<'_>) -> Result<()> {
    match value {
        RawBsonRef::Double(d) => write_f64(out, d)?,
        RawBsonRef::String(s) => write_escaped_string(out, s),
        RawBsonRef::Document(doc) => write_document(out, doc)?,
        RawBsonRef::Array(arr) => write_array(out, arr)?,
        RawBsonRef::Boolean(b) => out.push_str(if b { "true" } else { "false" }),
        RawBsonRef::Null | RawBsonRef::Undefined => out.push_str("null"),
        RawBsonRef::Int32(i) => {
            // writing a decimal integer cannot fail
            write!(out, "{}", i).unwrap()
        }
        RawBsonRef::Int64(i) => write!(out, "{}", i).unwrap(),
        RawBsonRef::ObjectId(oid) => {
            out.push_str("{\"$oid\":");
            write_escaped_string(out, &oid.to_hex());
            out.push('}');
        }
        RawBsonRef::DateTime(dt) => {
            out.push_str("{\"$date\":");
            let year_in_range = dt
                .to_time_opt()
                .map(|t| t.year() <= 9999)
                .unwrap_or(false);
            if dt.timestamp_millis() >= 0 && year_in_range {
                // unwrap is ok here: timestamps in the guarded range can always be formatted
                write_escaped_string(out, &dt.try_to_rfc3339_string().unwrap());
            } else {
                write!(out, "{{\"$numberLong\":\"{}\"}}", dt.timestamp_millis()).unwrap();
            }
            out.push('}');
        }
        RawBsonRef::Binary(b) => {
            out.push_str("{\"$binary\":");
            write_escaped_string(out, &crate::base64::encode(b.bytes));
            out.push_str(",\"$type\":");
            write_escaped_string(out, &hex::encode([u8::from(b.subtype)]));
            out.push('}');
        }
        RawBsonRef::RegularExpression(re) => {
            out.push_str("{\"$regex\":");
            write_escaped_string(out, re.pattern);
            out.push_str(",\"$options\":");
            write_escaped_string(out, re.options);
            out.push('}');
        }
        RawBsonRef::JavaScriptCode(code) => {
            out.push_str("{\"$code\":");
            write_escaped_string(out, code);
            out.push('}');
        }
        RawBsonRef::JavaScriptCodeWithScope(c_w_s) => {
            out.push_str("{\"$code\":");
            write_escaped_string(out, c_w_s.code);
            out.push_str(",\"$scope\":");
            write_document(out, c_w_s.scope)?;
            out.push('}');
        }
        RawBsonRef::Symbol(s) => {
            out.push_str("{\"$symbol\":");
            write_escaped_string(out, s);
            out.push('}');
        }
        RawBsonRef::Timestamp(ts) => {
            write!(
                out,
                "{{\"$timestamp\":{{\"t\":{},\"i\":{}}}}}",
                ts.time, ts.increment
            )
            .unwrap();
        }
        RawBsonRef::DbPointer(dbp) => {
            out.push_str("{\"$dbPointer\":{\"$ref\":");
            write_escaped_string(out, dbp.namespace);
            out.push_str(",\"$id\":{\"$oid\":");
            write_escaped_string(out, &dbp.id.to_hex());
            out.push_str("}}}");
        }
        RawBsonRef::MinKey => out.push_str("{\"$minKey\":1}"),
        RawBsonRef::MaxKey => out.push_str("{\"$maxKey\":1}"),
    }
    Ok(())
}

/// BSON doubles may be non-finite, but JSON numbers may not.
fn write_f64(out: &mut String, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::incompatible_type_conversion(format!(
            "cannot represent {} as a JSON number",
            value
        )));
    }
    // Debug formatting always distinguishes doubles from integers ("1.0", "1e300")
    write!(out, "{:?}", value).unwrap();
    Ok(())
}

fn write_escaped_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c if (c as u32) < 0x20 => {
                write!(out, "\\u{:04x}", c as u32).unwrap();
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
