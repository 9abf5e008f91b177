use bytes::Bytes;
use dynamo_codec::{
    AttributeValue, CodingKey, Error, Item, Shape, from_attribute, from_item, from_items,
};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};

fn n(text: &str) -> AttributeValue {
    AttributeValue::number(text)
}

fn s(text: &str) -> AttributeValue {
    AttributeValue::from(text)
}

fn item<const N: usize>(entries: [(&str, AttributeValue); N]) -> Item {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_owned(), value))
        .collect()
}

#[derive(Deserialize, Debug, PartialEq)]
struct Simple {
    name: String,
    count: u32,
    ratio: f64,
    enabled: bool,
}

#[derive(Deserialize, Debug, PartialEq)]
struct Foo {
    name: String,
}

#[derive(Deserialize, Debug, PartialEq)]
struct Bar {
    foo: Foo,
    number: i64,
}

#[test]
fn test_deserialize_bool() {
    assert!(from_attribute::<bool>(&AttributeValue::Bool(true)).unwrap());
    assert!(!from_attribute::<bool>(&AttributeValue::Bool(false)).unwrap());
}

#[test]
fn test_deserialize_integer_widths() {
    let one = n("1");
    assert_eq!(from_attribute::<i8>(&one).unwrap(), 1);
    assert_eq!(from_attribute::<i16>(&one).unwrap(), 1);
    assert_eq!(from_attribute::<i32>(&one).unwrap(), 1);
    assert_eq!(from_attribute::<i64>(&one).unwrap(), 1);
    assert_eq!(from_attribute::<u8>(&one).unwrap(), 1);
    assert_eq!(from_attribute::<u16>(&one).unwrap(), 1);
    assert_eq!(from_attribute::<u32>(&one).unwrap(), 1);
    assert_eq!(from_attribute::<u64>(&one).unwrap(), 1);
}

#[cfg(feature = "i128")]
#[test]
fn test_deserialize_i128() {
    let value = n("-170141183460469231731687303715884105728");
    assert_eq!(from_attribute::<i128>(&value).unwrap(), i128::MIN);
    let value = n("340282366920938463463374607431768211455");
    assert_eq!(from_attribute::<u128>(&value).unwrap(), u128::MAX);
}

#[test]
fn test_deserialize_floats() {
    let value = n("20.05");
    assert_eq!(from_attribute::<f64>(&value).unwrap(), 20.05);
    assert_eq!(from_attribute::<f32>(&value).unwrap(), 20.05f32);
    assert_eq!(from_attribute::<f64>(&n("1")).unwrap(), 1.0);
}

#[test]
fn test_deserialize_invalid_number() {
    match from_attribute::<i32>(&n("20.05")) {
        Err(Error::NumberFormat { path, raw, target }) => {
            assert!(path.is_empty());
            assert_eq!(raw, "20.05");
            assert_eq!(target, "i32");
        }
        other => panic!("expected NumberFormat, got {other:?}"),
    }

    assert!(matches!(
        from_attribute::<u8>(&n("-1")),
        Err(Error::NumberFormat { target: "u8", .. })
    ));
    assert!(matches!(
        from_attribute::<u8>(&n("256")),
        Err(Error::NumberFormat { .. })
    ));
    assert!(matches!(
        from_attribute::<f64>(&n("twenty")),
        Err(Error::NumberFormat { target: "f64", .. })
    ));
}

#[test]
fn test_deserialize_number_from_string_is_mismatch() {
    match from_attribute::<i32>(&s("1")) {
        Err(Error::TypeMismatch {
            expected, actual, ..
        }) => {
            assert_eq!(expected, Shape::Number);
            assert_eq!(actual, s("1"));
        }
        other => panic!("expected TypeMismatch, got {other:?}"),
    }
}

#[test]
fn test_deserialize_strings() {
    assert_eq!(from_attribute::<String>(&s("foo")).unwrap(), "foo");
    assert_eq!(from_attribute::<char>(&s("x")).unwrap(), 'x');
    assert!(from_attribute::<char>(&s("xy")).is_err());
}

#[test]
fn test_deserialize_borrowed_str() {
    #[derive(Deserialize)]
    struct Borrowed<'a> {
        name: &'a str,
    }

    let input = item([("name", s("foo"))]);
    let borrowed: Borrowed = from_item(&input).unwrap();
    assert_eq!(borrowed.name, "foo");
    assert!(std::ptr::eq(
        borrowed.name.as_ptr(),
        input["name"].as_string().unwrap().as_ptr()
    ));
}

#[test]
fn test_deserialize_borrowed_set_members() {
    #[derive(Deserialize)]
    struct Tags<'a> {
        #[serde(borrow)]
        tags: Vec<&'a str>,
    }

    let input = item([(
        "tags",
        AttributeValue::StringSet(vec!["foo".into(), "bar".into()]),
    )]);
    let tags: Tags = from_item(&input).unwrap();
    assert_eq!(tags.tags, ["foo", "bar"]);

    let members = input["tags"].as_string_set().unwrap();
    assert!(std::ptr::eq(tags.tags[0].as_ptr(), members[0].as_ptr()));

    let numbers = AttributeValue::NumberSet(vec!["1".into()]);
    match from_attribute::<Vec<&str>>(&numbers) {
        Err(Error::TypeMismatch {
            path,
            expected,
            actual,
        }) => {
            assert_eq!(path.as_slice(), &[CodingKey::Index(0)]);
            assert_eq!(expected, Shape::String);
            assert_eq!(actual, n("1"));
        }
        other => panic!("expected TypeMismatch, got {other:?}"),
    }
}

#[test]
fn test_deserialize_bytes() {
    #[derive(Deserialize)]
    struct Blob {
        #[serde(with = "byte_buf")]
        data: Vec<u8>,
    }

    mod byte_buf {
        use serde::{Deserializer, de};
        use std::fmt;

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
            struct BytesVisitor;

            impl de::Visitor<'_> for BytesVisitor {
                type Value = Vec<u8>;

                fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                    formatter.write_str("bytes")
                }

                fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Vec<u8>, E> {
                    Ok(v.to_vec())
                }
            }

            deserializer.deserialize_bytes(BytesVisitor)
        }
    }

    let input = item([("data", AttributeValue::Binary(Bytes::from_static(&[1, 2, 3])))]);
    let blob: Blob = from_item(&input).unwrap();
    assert_eq!(blob.data, [1, 2, 3]);
}

#[test]
fn test_deserialize_null_discipline() {
    #[derive(Deserialize, Debug, PartialEq)]
    struct Sparse {
        present: Option<i32>,
        null: Option<i32>,
        absent: Option<i32>,
    }

    let input = item([("present", n("1")), ("null", AttributeValue::Null)]);
    assert_eq!(
        from_item::<Sparse>(&input).unwrap(),
        Sparse {
            present: Some(1),
            null: None,
            absent: None,
        }
    );

    from_attribute::<()>(&AttributeValue::Null).unwrap();
    assert!(matches!(
        from_attribute::<()>(&n("0")),
        Err(Error::TypeMismatch {
            expected: Shape::Null,
            ..
        })
    ));
}

#[test]
fn test_deserialize_simple_struct() {
    let input = item([
        ("name", s("foo")),
        ("count", n("3")),
        ("ratio", n("20.05")),
        ("enabled", AttributeValue::Bool(true)),
        ("ignored", s("extra")),
    ]);
    assert_eq!(
        from_item::<Simple>(&input).unwrap(),
        Simple {
            name: "foo".into(),
            count: 3,
            ratio: 20.05,
            enabled: true,
        }
    );
}

#[test]
fn test_deserialize_type_mismatch_path() {
    #[derive(Deserialize, Debug)]
    struct Flags {
        #[allow(dead_code)]
        bool: bool,
    }

    let input = item([("bool", s("foo"))]);
    match from_item::<Flags>(&input) {
        Err(Error::TypeMismatch {
            path,
            expected,
            actual,
        }) => {
            assert_eq!(path.as_slice(), &[CodingKey::from("bool")]);
            assert_eq!(expected, Shape::Bool);
            assert_eq!(actual, s("foo"));
        }
        other => panic!("expected TypeMismatch, got {other:?}"),
    }
}

#[test]
fn test_deserialize_scalar_from_composite() {
    #[derive(Deserialize, Debug)]
    struct Flags {
        #[allow(dead_code)]
        bool: bool,
    }

    let input = item([("bool", AttributeValue::Map(Item::new()))]);
    match from_item::<Flags>(&input) {
        Err(Error::TypeMismatch { path, expected, .. }) => {
            assert_eq!(path.as_slice(), &[CodingKey::from("bool")]);
            assert_eq!(expected, Shape::Bool);
        }
        other => panic!("expected TypeMismatch, got {other:?}"),
    }

    let list = AttributeValue::List(vec![n("1")]);
    assert!(matches!(
        from_attribute::<u8>(&list),
        Err(Error::TypeMismatch {
            expected: Shape::Number,
            ..
        })
    ));
    assert!(matches!(
        from_attribute::<String>(&list),
        Err(Error::TypeMismatch {
            expected: Shape::String,
            ..
        })
    ));
}

#[test]
fn test_deserialize_nested_struct() {
    let input = item([
        ("foo", AttributeValue::Map(item([("name", s("Foo"))]))),
        ("number", n("42")),
    ]);
    assert_eq!(
        from_item::<Bar>(&input).unwrap(),
        Bar {
            foo: Foo { name: "Foo".into() },
            number: 42,
        }
    );
}

#[test]
fn test_deserialize_missing_field() {
    let input = item([("foo", AttributeValue::Map(Item::new())), ("number", n("1"))]);
    match from_item::<Bar>(&input) {
        Err(Error::Custom { path, message }) => {
            assert_eq!(path.unwrap().as_slice(), &[CodingKey::from("foo")]);
            assert!(message.contains("name"), "{message}");
        }
        other => panic!("expected Custom, got {other:?}"),
    }
}

#[test]
fn test_deserialize_struct_from_non_map() {
    match from_attribute::<Foo>(&s("Foo")) {
        Err(Error::TypeMismatch { expected, .. }) => assert_eq!(expected, Shape::Map),
        other => panic!("expected TypeMismatch, got {other:?}"),
    }
}

#[test]
fn test_deserialize_sets() {
    let strings = AttributeValue::StringSet(vec!["b".into(), "a".into(), "b".into()]);
    assert_eq!(from_attribute::<Vec<String>>(&strings).unwrap(), ["b", "a", "b"]);
    assert_eq!(
        from_attribute::<BTreeSet<String>>(&strings).unwrap(),
        BTreeSet::from(["a".to_string(), "b".to_string()])
    );

    let numbers = AttributeValue::NumberSet(vec!["3".into(), "1".into(), "2".into()]);
    assert_eq!(from_attribute::<Vec<u8>>(&numbers).unwrap(), [3, 1, 2]);
    assert_eq!(from_attribute::<(i32, i32, i32)>(&numbers).unwrap(), (3, 1, 2));
}

#[test]
fn test_deserialize_set_member_error_path() {
    let numbers = AttributeValue::NumberSet(vec!["1".into(), "x".into()]);
    match from_attribute::<Vec<i32>>(&numbers) {
        Err(Error::NumberFormat { path, raw, .. }) => {
            assert_eq!(path.as_slice(), &[CodingKey::Index(1)]);
            assert_eq!(raw, "x");
        }
        other => panic!("expected NumberFormat, got {other:?}"),
    }
}

#[test]
fn test_deserialize_lists() {
    let list = AttributeValue::List(vec![n("1"), AttributeValue::Null, n("3")]);
    assert_eq!(
        from_attribute::<Vec<Option<i32>>>(&list).unwrap(),
        [Some(1), None, Some(3)]
    );

    let nested = AttributeValue::List(vec![
        AttributeValue::NumberSet(vec!["1".into()]),
        AttributeValue::List(vec![]),
    ]);
    assert_eq!(
        from_attribute::<Vec<Vec<i32>>>(&nested).unwrap(),
        vec![vec![1], vec![]]
    );

    assert!(matches!(
        from_attribute::<Vec<i32>>(&n("1")),
        Err(Error::TypeMismatch {
            expected: Shape::Sequence,
            ..
        })
    ));
}

#[test]
fn test_deserialize_maps() {
    let input = item([("a", n("1")), ("b", n("2"))]);
    let map: HashMap<String, i32> = from_item(&input).unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map["a"], 1);
    assert_eq!(map["b"], 2);

    let input = item([("7", s("seven"))]);
    let map: HashMap<u32, String> = from_item(&input).unwrap();
    assert_eq!(map[&7], "seven");

    let input = item([("seven", s("7"))]);
    match from_item::<HashMap<u32, String>>(&input) {
        Err(Error::NumberFormat { raw, target, .. }) => {
            assert_eq!(raw, "seven");
            assert_eq!(target, "u32");
        }
        other => panic!("expected NumberFormat, got {other:?}"),
    }
}

#[derive(Deserialize, Debug, PartialEq)]
enum Figure {
    Empty,
    Circle(f64),
    Point(i32, i32),
    Rect { w: u32, h: u32 },
}

#[test]
fn test_deserialize_enums() {
    assert_eq!(from_attribute::<Figure>(&s("Empty")).unwrap(), Figure::Empty);

    let circle = AttributeValue::Map(item([("Circle", n("1.5"))]));
    assert_eq!(from_attribute::<Figure>(&circle).unwrap(), Figure::Circle(1.5));

    let point = AttributeValue::Map(item([("Point", AttributeValue::List(vec![n("1"), n("2")]))]));
    assert_eq!(from_attribute::<Figure>(&point).unwrap(), Figure::Point(1, 2));

    let rect = AttributeValue::Map(item([(
        "Rect",
        AttributeValue::Map(item([("w", n("3")), ("h", n("4"))])),
    )]));
    assert_eq!(
        from_attribute::<Figure>(&rect).unwrap(),
        Figure::Rect { w: 3, h: 4 }
    );

    let unit_as_map = AttributeValue::Map(item([("Empty", AttributeValue::Null)]));
    assert_eq!(from_attribute::<Figure>(&unit_as_map).unwrap(), Figure::Empty);
}

#[test]
fn test_deserialize_enum_errors() {
    let unknown = s("Hexagon");
    assert!(matches!(
        from_attribute::<Figure>(&unknown),
        Err(Error::Custom { .. })
    ));

    let two_entries = AttributeValue::Map(item([("Circle", n("1")), ("Empty", AttributeValue::Null)]));
    assert!(matches!(
        from_attribute::<Figure>(&two_entries),
        Err(Error::TypeMismatch {
            expected: Shape::Enum,
            ..
        })
    ));

    let bad_payload = AttributeValue::Map(item([("Circle", s("round"))]));
    match from_attribute::<Figure>(&bad_payload) {
        Err(Error::TypeMismatch { path, expected, .. }) => {
            assert_eq!(path.as_slice(), &[CodingKey::from("Circle")]);
            assert_eq!(expected, Shape::Number);
        }
        other => panic!("expected TypeMismatch, got {other:?}"),
    }
}

#[test]
fn test_deserialize_unit_enums_from_string_set() {
    let set = AttributeValue::StringSet(vec!["Empty".into(), "Empty".into()]);
    assert_eq!(
        from_attribute::<Vec<Figure>>(&set).unwrap(),
        [Figure::Empty, Figure::Empty]
    );
}

#[test]
fn test_from_items() {
    let items = vec![
        item([("name", s("a"))]),
        item([("name", s("b"))]),
        item([("name", s("c"))]),
    ];
    let foos: Vec<Foo> = from_items(&items).unwrap();
    assert_eq!(
        foos,
        [
            Foo { name: "a".into() },
            Foo { name: "b".into() },
            Foo { name: "c".into() },
        ]
    );
    assert!(from_items::<Foo>(&[]).unwrap().is_empty());
}

#[test]
fn test_from_items_reports_index() {
    let items = vec![item([("name", s("a"))]), item([("name", n("1"))])];
    match from_items::<Foo>(&items) {
        Err(Error::TypeMismatch { path, .. }) => {
            assert_eq!(path.as_slice(), &[CodingKey::Index(1), CodingKey::from("name")]);
        }
        other => panic!("expected TypeMismatch, got {other:?}"),
    }
}
