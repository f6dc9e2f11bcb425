//! Conversions between JSON values and DynamoDB `AttributeValue`s.
//!
//! Items are represented as `serde_json` maps throughout the crate. On the
//! way out of the store, numbers are normalized: a wire number with no
//! fractional part decodes to an integer, anything else to a float. Binary
//! attributes decode to base64 strings since JSON has no byte type.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Map, Number, Value};

use crate::errors::{Error, Result};

/// A decoded item: attribute name to JSON value.
pub type Item = Map<String, Value>;

/// Encode a JSON value as a DynamoDB `AttributeValue`.
pub fn to_attribute_value(value: &Value) -> Result<AttributeValue> {
    match value {
        Value::Null => Ok(AttributeValue::Null(true)),
        Value::Bool(b) => Ok(AttributeValue::Bool(*b)),
        Value::String(s) => Ok(AttributeValue::S(s.clone())),
        Value::Number(n) => Ok(AttributeValue::N(n.to_string())),
        Value::Array(values) => {
            let items = values
                .iter()
                .map(to_attribute_value)
                .collect::<Result<Vec<_>>>()?;
            Ok(AttributeValue::L(items))
        }
        Value::Object(map) => {
            let mut out = HashMap::with_capacity(map.len());
            for (key, nested) in map {
                out.insert(key.clone(), to_attribute_value(nested)?);
            }
            Ok(AttributeValue::M(out))
        }
    }
}

/// Encode a full item map.
pub fn item_to_attribute_values(item: &Item) -> Result<HashMap<String, AttributeValue>> {
    let mut out = HashMap::with_capacity(item.len());
    for (key, value) in item {
        out.insert(key.clone(), to_attribute_value(value)?);
    }
    Ok(out)
}

/// Parse a wire number, normalizing to i64 when there is no fractional part.
fn parse_number(n: &str) -> Result<Value> {
    if n.contains('.') || n.contains('e') || n.contains('E') {
        let f: f64 = n
            .parse()
            .map_err(|_| Error::Serialization(format!("invalid number: {n}")))?;
        Number::from_f64(f)
            .map(Value::Number)
            .ok_or_else(|| Error::Serialization(format!("non-finite number: {n}")))
    } else {
        let i: i64 = n
            .parse()
            .map_err(|_| Error::Serialization(format!("invalid number: {n}")))?;
        Ok(Value::Number(i.into()))
    }
}

/// Decode a DynamoDB `AttributeValue` to a JSON value.
///
/// Nested maps recurse, lists decode element-wise, and the set types
/// (`SS`/`NS`/`BS`) decode to plain lists.
pub fn from_attribute_value(value: AttributeValue) -> Result<Value> {
    match value {
        AttributeValue::S(s) => Ok(Value::String(s)),
        AttributeValue::N(n) => parse_number(&n),
        AttributeValue::Bool(b) => Ok(Value::Bool(b)),
        AttributeValue::Null(_) => Ok(Value::Null),
        AttributeValue::B(blob) => Ok(Value::String(BASE64.encode(blob.as_ref()))),
        AttributeValue::L(list) => {
            let values = list
                .into_iter()
                .map(from_attribute_value)
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::Array(values))
        }
        AttributeValue::M(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, nested) in map {
                out.insert(key, from_attribute_value(nested)?);
            }
            Ok(Value::Object(out))
        }
        AttributeValue::Ss(strings) => {
            Ok(Value::Array(strings.into_iter().map(Value::String).collect()))
        }
        AttributeValue::Ns(numbers) => {
            let values = numbers
                .iter()
                .map(|n| parse_number(n))
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::Array(values))
        }
        AttributeValue::Bs(blobs) => Ok(Value::Array(
            blobs
                .into_iter()
                .map(|blob| Value::String(BASE64.encode(blob.as_ref())))
                .collect(),
        )),
        other => Err(Error::Serialization(format!(
            "unsupported attribute value: {other:?}"
        ))),
    }
}

/// Decode a full wire item.
pub fn attribute_values_to_item(raw: HashMap<String, AttributeValue>) -> Result<Item> {
    let mut item = Map::with_capacity(raw.len());
    for (key, value) in raw {
        item.insert(key, from_attribute_value(value)?);
    }
    Ok(item)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn numbers_without_fraction_decode_to_integers() {
        assert_eq!(parse_number("42").unwrap(), json!(42));
        assert_eq!(parse_number("-7").unwrap(), json!(-7));
        assert_eq!(parse_number("2.5").unwrap(), json!(2.5));
        assert_eq!(parse_number("1e3").unwrap(), json!(1000.0));
    }

    #[test]
    fn invalid_numbers_fail_decoding() {
        assert!(parse_number("abc").is_err());
        assert!(matches!(parse_number(""), Err(Error::Serialization(_))));
    }

    #[test]
    fn nested_maps_decode_recursively() {
        let mut scores = HashMap::new();
        scores.insert("health".to_string(), AttributeValue::N("10".to_string()));
        let mut raw = HashMap::new();
        raw.insert("score".to_string(), AttributeValue::M(scores));
        raw.insert("nickname".to_string(), AttributeValue::S("ana".to_string()));

        let item = attribute_values_to_item(raw).unwrap();
        assert_eq!(item["score"]["health"], json!(10));
        assert_eq!(item["nickname"], json!("ana"));
    }

    #[test]
    fn sets_decode_to_lists() {
        let decoded = from_attribute_value(AttributeValue::Ns(vec![
            "1".to_string(),
            "2.5".to_string(),
        ]))
        .unwrap();
        assert_eq!(decoded, json!([1, 2.5]));
    }

    #[test]
    fn items_encode_to_wire_types() {
        let item = json!({
            "unit": "scouts",
            "score": {"health": 3},
            "tags": ["earned::badge", null],
            "active": true,
        });
        let Value::Object(item) = item else {
            unreachable!()
        };

        let encoded = item_to_attribute_values(&item).unwrap();
        assert_eq!(
            encoded["unit"],
            AttributeValue::S("scouts".to_string())
        );
        assert!(matches!(&encoded["score"], AttributeValue::M(m)
            if m["health"] == AttributeValue::N("3".to_string())));
        assert!(matches!(&encoded["tags"], AttributeValue::L(l) if l.len() == 2));
        assert_eq!(encoded["active"], AttributeValue::Bool(true));
    }
}
