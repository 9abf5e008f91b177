use dynamo_codec::{AttributeValue, Item, from_attribute, from_item, to_attribute, to_item};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct TestRecord {
    byte_val: i8,
    short_val: i16,
    int_val: i32,
    long_val: i64,
    float_val: f32,
    double_val: f64,
    string_val: String,
    #[serde(default)]
    list_ints: Vec<i32>,
    #[serde(default)]
    list_strings: Vec<String>,
    #[serde(default)]
    nested: Option<Box<TestRecord>>,
    #[serde(default)]
    map_vals: HashMap<String, i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SimpleRecord {
    #[serde(default)]
    value: i32,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum TestEnum {
    Unit,
    Newtype(i32),
    Tuple(i32, String),
    Struct { x: i32, y: i32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct WithEnum {
    #[serde(default)]
    mode: Option<TestEnum>,
    #[serde(default)]
    value: i32,
}

/// Anything that decodes must encode again and decode to the same value.
fn round_trip<T>(item: &Item)
where
    T: for<'de> Deserialize<'de> + Serialize + PartialEq + std::fmt::Debug,
{
    if let Ok(value) = from_item::<T>(item) {
        let encoded = to_item(&value).expect("decoded value must encode");
        let again = from_item::<T>(&encoded).expect("encoded value must decode");
        assert_eq!(value, again);
    }
}

pub fn test_serde(item: &Item) {
    round_trip::<SimpleRecord>(item);
    round_trip::<WithEnum>(item);
    round_trip::<HashMap<String, i32>>(item);

    // floats do not compare reliably, so only check that these terminate
    if let Ok(value) = from_item::<TestRecord>(item) {
        let _ = to_item(&value);
    }
}

pub fn test_value(value: &AttributeValue) {
    let _ = from_attribute::<Vec<i32>>(value);
    let _ = from_attribute::<Option<String>>(value);
    let _ = from_attribute::<TestEnum>(value);
    if let Ok(json) = from_attribute::<serde_json::Value>(value) {
        let _ = to_attribute(&json);
    }

    let wire = serde_json::to_vec(value).expect("attribute values always serialize");
    let parsed: AttributeValue = serde_json::from_slice(&wire).expect("wire shape must parse back");
    assert_eq!(&parsed, value);
}

pub fn test(data: &[u8]) {
    if let Ok(value) = serde_json::from_slice::<AttributeValue>(data) {
        test_value(&value);
        if let AttributeValue::Map(item) = &value {
            test_serde(item);
        }
    }
    if let Ok(item) = serde_json::from_slice::<Item>(data) {
        test_serde(&item);
    }
}
