//! AMQP header table -> string map conversion.

use std::collections::HashMap;

use lapin::types::{AMQPValue, FieldTable};

/// Flattens AMQP headers into the string map the classifier works on.
///
/// Strings are taken as-is (long strings decoded lossily as UTF-8), booleans
/// and numbers through their text form. Nested tables, arrays, byte arrays,
/// decimals and void values are dropped.
#[must_use]
pub fn headers_to_map(table: Option<&FieldTable>) -> HashMap<String, String> {
    let Some(table) = table else {
        return HashMap::new();
    };
    table
        .inner()
        .iter()
        .filter_map(|(key, value)| {
            value_to_string(value).map(|text| (key.as_str().to_string(), text))
        })
        .collect()
}

fn value_to_string(value: &AMQPValue) -> Option<String> {
    let text = match value {
        AMQPValue::LongString(s) => String::from_utf8_lossy(s.as_bytes()).into_owned(),
        AMQPValue::ShortString(s) => s.as_str().to_string(),
        AMQPValue::Boolean(b) => b.to_string(),
        AMQPValue::ShortShortInt(n) => n.to_string(),
        AMQPValue::ShortShortUInt(n) => n.to_string(),
        AMQPValue::ShortInt(n) => n.to_string(),
        AMQPValue::ShortUInt(n) => n.to_string(),
        AMQPValue::LongInt(n) => n.to_string(),
        AMQPValue::LongUInt(n) => n.to_string(),
        AMQPValue::LongLongInt(n) => n.to_string(),
        AMQPValue::Float(n) => n.to_string(),
        AMQPValue::Double(n) => n.to_string(),
        AMQPValue::Timestamp(n) => n.to_string(),
        _ => return None,
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use lapin::types::{FieldArray, LongString, ShortString};

    use super::*;

    fn table(entries: Vec<(&str, AMQPValue)>) -> FieldTable {
        let mut table = FieldTable::default();
        for (key, value) in entries {
            table.insert(ShortString::from(key), value);
        }
        table
    }

    #[test]
    fn missing_table_gives_empty_map() {
        assert!(headers_to_map(None).is_empty());
    }

    #[test]
    fn string_headers_are_kept() {
        let headers = table(vec![
            ("PID", AMQPValue::LongString(LongString::from("alvin-place:1"))),
            ("messageSentFrom", AMQPValue::ShortString(ShortString::from("Cora"))),
            ("__TypeId__", AMQPValue::LongString(LongString::from("epc.messaging.amqp.EPCFedoraMessage"))),
        ]);

        let map = headers_to_map(Some(&headers));

        assert_eq!(map.len(), 3);
        assert_eq!(map["PID"], "alvin-place:1");
        assert_eq!(map["messageSentFrom"], "Cora");
    }

    #[test]
    fn scalar_headers_use_text_form() {
        let headers = table(vec![
            ("redelivered", AMQPValue::Boolean(true)),
            ("attempt", AMQPValue::LongInt(3)),
            ("sequence", AMQPValue::LongLongInt(-42)),
        ]);

        let map = headers_to_map(Some(&headers));

        assert_eq!(map["redelivered"], "true");
        assert_eq!(map["attempt"], "3");
        assert_eq!(map["sequence"], "-42");
    }

    #[test]
    fn nested_values_are_dropped() {
        let headers = table(vec![
            ("PID", AMQPValue::LongString(LongString::from("alvin-place:1"))),
            ("nested", AMQPValue::FieldTable(FieldTable::default())),
            ("list", AMQPValue::FieldArray(FieldArray::default())),
            ("nothing", AMQPValue::Void),
        ]);

        let map = headers_to_map(Some(&headers));

        assert_eq!(map.len(), 1);
        assert!(map.contains_key("PID"));
    }
}
