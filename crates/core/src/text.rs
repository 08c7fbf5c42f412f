//! Text marshaling for cell values.
//!
//! Scalars use their interchange form (`t`/`f`, decimal numbers, RFC 3339 timestamps,
//! `\x`-prefixed hex for bytes). Sequences use the brace literal `{a,b,"c d"}`.
//! `Null` handling (empty text) lives in [`Column`](crate::schema::Column).

use crate::types::DataType;
use crate::value::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

type DecodeResult<T> = core::result::Result<T, String>;

/// Encodes a value to its text form. `Null` encodes to the empty string.
pub(crate) fn encode(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Boolean(b) => encode_bool(*b).to_string(),
        Value::Int64(i) => i.to_string(),
        Value::Float64(f) => f.to_string(),
        Value::String(s) => s.clone(),
        Value::Timestamp(ts) => encode_timestamp(*ts),
        Value::Bytes(b) => encode_bytes(b),
        Value::BooleanArray(v) => encode_array(v.iter().map(|b| encode_bool(*b).to_string())),
        Value::Int64Array(v) => encode_array(v.iter().map(i64::to_string)),
        Value::Float64Array(v) => encode_array(v.iter().map(f64::to_string)),
        Value::StringArray(v) => encode_array(v.iter().cloned()),
        Value::TimestampArray(v) => encode_array(v.iter().map(|ts| encode_timestamp(*ts))),
        Value::BytesArray(v) => encode_array(v.iter().map(|b| encode_bytes(b))),
    }
}

/// Decodes non-empty text into a value of the given kind.
pub(crate) fn decode(dt: DataType, text: &str) -> DecodeResult<Value> {
    if !dt.is_array() {
        return decode_scalar(dt, text);
    }
    let elements = split_array(text)?;
    let elem_type = dt.element_type();
    let mut decoded = Vec::with_capacity(elements.len());
    for elem in &elements {
        decoded.push(decode_scalar(elem_type, elem)?);
    }
    // Each element matches `elem_type`, so the arms below only see their own variant.
    let value = match dt {
        DataType::BooleanArray => Value::BooleanArray(decoded.iter().filter_map(Value::as_bool).collect()),
        DataType::Int64Array => Value::Int64Array(decoded.iter().filter_map(Value::as_i64).collect()),
        DataType::Float64Array => Value::Float64Array(decoded.iter().filter_map(Value::as_f64).collect()),
        DataType::TimestampArray => {
            Value::TimestampArray(decoded.iter().filter_map(Value::as_timestamp).collect())
        }
        DataType::StringArray => Value::StringArray(
            decoded
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        DataType::BytesArray => Value::BytesArray(
            decoded
                .into_iter()
                .filter_map(|v| match v {
                    Value::Bytes(b) => Some(b),
                    _ => None,
                })
                .collect(),
        ),
        scalar => return Err(format!("{} is not a sequence kind", scalar)),
    };
    Ok(value)
}

fn decode_scalar(dt: DataType, text: &str) -> DecodeResult<Value> {
    match dt {
        DataType::Boolean => decode_bool(text).map(Value::Boolean),
        DataType::Int64 => text
            .parse::<i64>()
            .map(Value::Int64)
            .map_err(|e| e.to_string()),
        DataType::Float64 => text
            .parse::<f64>()
            .map(Value::Float64)
            .map_err(|e| e.to_string()),
        DataType::String => Ok(Value::String(text.to_string())),
        DataType::Timestamp => decode_timestamp(text).map(Value::Timestamp),
        DataType::Bytes => decode_bytes(text).map(Value::Bytes),
        array => Err(format!("nested sequence {} is not supported", array)),
    }
}

fn encode_bool(b: bool) -> &'static str {
    if b {
        "t"
    } else {
        "f"
    }
}

fn decode_bool(text: &str) -> DecodeResult<bool> {
    match text {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err("invalid boolean".into()),
    }
}

fn encode_timestamp(nanos: i64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(nanos as i128)
        .ok()
        .and_then(|ts| ts.format(&Rfc3339).ok())
        .unwrap_or_else(|| nanos.to_string())
}

fn decode_timestamp(text: &str) -> DecodeResult<i64> {
    // Raw nanoseconds are the fallback form of `encode_timestamp`.
    if let Ok(nanos) = text.parse::<i64>() {
        return Ok(nanos);
    }
    let ts = OffsetDateTime::parse(text, &Rfc3339).map_err(|e| e.to_string())?;
    i64::try_from(ts.unix_timestamp_nanos()).map_err(|_| "timestamp out of range".to_string())
}

fn encode_bytes(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return String::new();
    }
    format!("\\x{}", hex::encode(bytes))
}

fn decode_bytes(text: &str) -> DecodeResult<Vec<u8>> {
    if text.is_empty() {
        return Ok(Vec::new());
    }
    let digits = text
        .strip_prefix("\\x")
        .ok_or_else(|| format!("{} is invalid hex string", text))?;
    hex::decode(digits).map_err(|e| e.to_string())
}

fn needs_quotes(elem: &str) -> bool {
    elem.is_empty()
        || elem.eq_ignore_ascii_case("NULL")
        || elem
            .chars()
            .any(|c| matches!(c, ',' | '{' | '}' | '"' | '\\') || c.is_whitespace())
}

fn encode_array(elems: impl Iterator<Item = String>) -> String {
    let mut out = String::from("{");
    for (i, elem) in elems.enumerate() {
        if i > 0 {
            out.push(',');
        }
        if needs_quotes(&elem) {
            out.push('"');
            for c in elem.chars() {
                if c == '"' || c == '\\' {
                    out.push('\\');
                }
                out.push(c);
            }
            out.push('"');
        } else {
            out.push_str(&elem);
        }
    }
    out.push('}');
    out
}

/// Splits a brace literal into its unescaped element texts.
fn split_array(text: &str) -> DecodeResult<Vec<String>> {
    let inner = text
        .trim()
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .ok_or_else(|| "array literal must be enclosed in braces".to_string())?;

    let mut elems = Vec::new();
    if inner.trim().is_empty() {
        return Ok(elems);
    }

    let mut chars = inner.chars().peekable();
    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let mut elem = String::new();
        if chars.next_if_eq(&'"').is_some() {
            loop {
                match chars.next() {
                    Some('\\') => match chars.next() {
                        Some(c) => elem.push(c),
                        None => return Err("unterminated escape".into()),
                    },
                    Some('"') => break,
                    Some(c) => elem.push(c),
                    None => return Err("unterminated quoted element".into()),
                }
            }
            while chars.next_if(|c| c.is_whitespace()).is_some() {}
        } else {
            while let Some(c) = chars.next_if(|c| *c != ',') {
                if matches!(c, '"' | '{' | '}') {
                    return Err(format!("unexpected {:?} in unquoted element", c));
                }
                elem.push(c);
            }
            let trimmed = elem.trim_end();
            if trimmed.is_empty() {
                return Err("empty unquoted element".into());
            }
            if trimmed.eq_ignore_ascii_case("NULL") {
                return Err("null elements are not allowed".into());
            }
            elem.truncate(trimmed.len());
        }
        elems.push(elem);
        match chars.next() {
            Some(',') => continue,
            None => break,
            Some(c) => return Err(format!("expected ',' but found {:?}", c)),
        }
    }
    Ok(elems)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_forms() {
        assert_eq!(encode(&Value::Boolean(true)), "t");
        assert_eq!(encode(&Value::Int64(-12)), "-12");
        assert_eq!(encode(&Value::Float64(0.1)), "0.1");
        assert_eq!(encode(&Value::Bytes(vec![1, 2, 0xab])), "\\x0102ab");
        assert_eq!(encode(&Value::Bytes(vec![])), "");
        assert_eq!(encode(&Value::Timestamp(0)), "1970-01-01T00:00:00Z");
        assert_eq!(encode(&Value::Null), "");
    }

    #[test]
    fn test_decode_scalars() {
        assert_eq!(decode(DataType::Boolean, "TRUE"), Ok(Value::Boolean(true)));
        assert_eq!(decode(DataType::Boolean, "0"), Ok(Value::Boolean(false)));
        assert!(decode(DataType::Boolean, "yes").is_err());
        assert_eq!(decode(DataType::Int64, "42"), Ok(Value::Int64(42)));
        assert!(decode(DataType::Int64, "4.2").is_err());
        assert_eq!(decode(DataType::Bytes, "\\x0a0b"), Ok(Value::Bytes(vec![10, 11])));
        assert!(decode(DataType::Bytes, "0a0b").is_err());
        assert!(decode(DataType::Bytes, "\\xzz").is_err());
    }

    #[test]
    fn test_float_special_values() {
        for f in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, -0.0, 1e300, 5e-324] {
            let text = encode(&Value::Float64(f));
            assert_eq!(decode(DataType::Float64, &text), Ok(Value::Float64(f)), "{}", text);
        }
    }

    #[test]
    fn test_timestamp_nanosecond_precision() {
        let ts = 1_700_000_000_123_456_789i64;
        let text = encode(&Value::Timestamp(ts));
        assert!(text.starts_with("2023-11-14T22:13:20.123456789"));
        assert_eq!(decode(DataType::Timestamp, &text), Ok(Value::Timestamp(ts)));

        let before_epoch = -1_500_000_001i64;
        let text = encode(&Value::Timestamp(before_epoch));
        assert_eq!(decode(DataType::Timestamp, &text), Ok(Value::Timestamp(before_epoch)));

        assert_eq!(
            decode(DataType::Timestamp, "2000-01-01T00:00:00+01:00"),
            Ok(Value::Timestamp(946_681_200_000_000_000))
        );
        assert!(decode(DataType::Timestamp, "yesterday").is_err());
    }

    #[test]
    fn test_array_quoting() {
        let v = Value::from(vec!["plain", "with space", "", "a,b", "q\"uote", "NULL"]);
        let text = encode(&v);
        assert_eq!(text, r#"{plain,"with space","","a,b","q\"uote","NULL"}"#);
        assert_eq!(decode(DataType::StringArray, &text), Ok(v));
    }

    #[test]
    fn test_array_kinds() {
        let values = [
            Value::BooleanArray(vec![true, false]),
            Value::Int64Array(vec![1, -2, 3]),
            Value::Float64Array(vec![0.5, f64::NAN]),
            Value::TimestampArray(vec![0, 1_000_000_001]),
            Value::BytesArray(vec![vec![1, 2], vec![], vec![255]]),
            Value::StringArray(vec![]),
        ];
        for v in values {
            let dt = v.data_type().unwrap();
            let text = encode(&v);
            assert_eq!(decode(dt, &text), Ok(v), "{}", text);
        }
    }

    #[test]
    fn test_array_literal_errors() {
        assert!(decode(DataType::Int64Array, "1,2").is_err());
        assert!(decode(DataType::Int64Array, "{1,,2}").is_err());
        assert!(decode(DataType::Int64Array, "{1,NULL}").is_err());
        assert!(decode(DataType::StringArray, "{\"open}").is_err());
        assert!(decode(DataType::Int64Array, "{1,x}").is_err());
        assert_eq!(
            decode(DataType::Int64Array, "{ 1 , 2 }"),
            Ok(Value::Int64Array(vec![1, 2]))
        );
    }
}
