//! Tests for driving the encoder and decoder by hand

use dynamo_codec::de::DecodingContainer;
use dynamo_codec::{AttributeValue, CodingKey, Decoder, Encoder, Error, Item, Shape};

fn n(text: &str) -> AttributeValue {
    AttributeValue::number(text)
}

fn s(text: &str) -> AttributeValue {
    AttributeValue::from(text)
}

#[test]
fn test_finish_empty_encoder_is_null() {
    assert_eq!(Encoder::new().finish(), AttributeValue::Null);
}

#[test]
fn test_can_write_new_value() {
    let mut encoder = Encoder::new();
    assert!(encoder.can_write_new_value());
    encoder.begin_single().write_bool(true);
    assert!(!encoder.can_write_new_value());
    assert_eq!(encoder.finish(), AttributeValue::Bool(true));
}

#[test]
#[should_panic(expected = "already written")]
fn test_second_value_at_same_path_panics() {
    let mut encoder = Encoder::new();
    encoder.begin_single().write_bool(true);
    encoder.begin_keyed();
}

#[test]
fn test_keyed_sink() {
    let mut encoder = Encoder::new();
    let mut sink = encoder.begin_keyed();
    sink.write("name", "foo").unwrap();
    sink.write("count", &3u8).unwrap();
    sink.write_nil("gone");
    sink.write("name", "bar").unwrap();

    let value = encoder.finish();
    let item = value.as_map().unwrap();
    assert_eq!(item.len(), 3);
    assert_eq!(item["name"], s("bar"));
    assert_eq!(item["count"], n("3"));
    assert!(item["gone"].is_null());
}

#[test]
fn test_unkeyed_sink() {
    let mut encoder = Encoder::new();
    let mut sink = encoder.begin_unkeyed();
    assert_eq!(sink.count(), 0);
    sink.write(&1).unwrap();
    sink.write_nil();
    sink.write("x").unwrap();
    assert_eq!(sink.count(), 3);

    assert_eq!(
        encoder.finish(),
        AttributeValue::List(vec![n("1"), AttributeValue::Null, s("x")])
    );
}

#[test]
fn test_nested_sinks() {
    let mut encoder = Encoder::new();
    let mut sink = encoder.begin_keyed();
    sink.nested_keyed("foo", |foo| foo.write("name", "Foo"))
        .unwrap();
    sink.nested_unkeyed("rows", |rows| {
        rows.write(&1)?;
        rows.nested_keyed(|row| row.write("id", &2))?;
        rows.nested_unkeyed(|pair| {
            pair.write("a")?;
            pair.write(&3)
        })
    })
    .unwrap();

    let error = sink
        .nested_keyed("bad", |bad| bad.write("x", &f64::NAN))
        .unwrap_err();
    assert_eq!(error.path().unwrap().to_string(), "bad.x");

    let value = encoder.finish();
    let item = value.as_map().unwrap();
    assert_eq!(item["foo"].as_map().unwrap()["name"], s("Foo"));

    let mut row = Item::new();
    row.insert("id".into(), n("2"));
    assert_eq!(
        item["rows"],
        AttributeValue::List(vec![
            n("1"),
            AttributeValue::Map(row),
            AttributeValue::List(vec![s("a"), n("3")]),
        ])
    );
    assert_eq!(item["bad"], AttributeValue::Map(Item::new()));
}

#[test]
fn test_failed_write_leaves_encoder_usable() {
    let mut encoder = Encoder::new();
    let mut sink = encoder.begin_keyed();
    assert!(sink.write("bad", &vec![1.0, f64::NAN]).is_err());
    sink.write("good", &1).unwrap();
    assert!(encoder.coding_path().is_empty());
    assert_eq!(encoder.storage().len(), 1);

    let value = encoder.finish();
    let item = value.as_map().unwrap();
    assert_eq!(item.len(), 1);
    assert_eq!(item["good"], n("1"));
}

#[test]
fn test_encode_value_restores_stack() {
    let mut encoder = Encoder::new();
    let value = encoder.encode_value(&vec!["a", "b"]).unwrap();
    assert_eq!(value, AttributeValue::StringSet(vec!["a".into(), "b".into()]));
    assert!(encoder.storage().is_empty());

    assert!(encoder.encode_value(&f32::INFINITY).is_err());
    assert!(encoder.storage().is_empty());
    assert!(encoder.can_write_new_value());
}

#[test]
fn test_super_encoder_commits_on_drop() {
    let mut encoder = Encoder::new();
    let mut sink = encoder.begin_keyed();
    sink.write("own", &1).unwrap();
    {
        let mut parent = sink.super_encoder();
        assert_eq!(parent.coding_path().as_slice(), &[CodingKey::from("super")]);
        let mut base = parent.begin_keyed();
        base.write("inherited", &true).unwrap();
    }

    let value = encoder.finish();
    let item = value.as_map().unwrap();
    assert_eq!(item["own"], n("1"));
    let base = item["super"].as_map().unwrap();
    assert_eq!(base["inherited"], AttributeValue::Bool(true));
}

#[test]
fn test_super_encoder_for_custom_key() {
    let mut encoder = Encoder::new();
    let mut sink = encoder.begin_keyed();
    {
        let mut parent = sink.super_encoder_for("base");
        parent.begin_single().write_string("value");
    }

    let value = encoder.finish();
    assert_eq!(value.as_map().unwrap()["base"], s("value"));
}

#[test]
fn test_unused_super_encoder_commits_empty_map() {
    let mut encoder = Encoder::new();
    let mut sink = encoder.begin_keyed();
    drop(sink.super_encoder());

    let value = encoder.finish();
    assert_eq!(value.as_map().unwrap()["super"], AttributeValue::Map(Item::new()));
}

#[test]
fn test_unkeyed_super_encoder_inserts_at_count() {
    let mut encoder = Encoder::new();
    let mut sink = encoder.begin_unkeyed();
    sink.write(&1).unwrap();
    {
        let mut deferred = sink.super_encoder();
        assert_eq!(deferred.coding_path().as_slice(), &[CodingKey::Index(1)]);
        deferred.begin_single().write_string("x");
    }
    sink.write(&2).unwrap();

    assert_eq!(
        encoder.finish(),
        AttributeValue::List(vec![n("1"), s("x"), n("2")])
    );
}

#[test]
fn test_super_encoder_accepts_serialize() {
    #[derive(serde::Serialize)]
    struct Base {
        id: u32,
    }

    let mut encoder = Encoder::new();
    let mut sink = encoder.begin_keyed();
    {
        let mut parent = sink.super_encoder();
        serde::Serialize::serialize(&Base { id: 7 }, &mut *parent).unwrap();
    }

    let value = encoder.finish();
    let base = value.as_map().unwrap()["super"].as_map().unwrap();
    assert_eq!(base["id"], n("7"));
}

fn single(value: &AttributeValue) -> Decoder<'_> {
    Decoder::new(DecodingContainer::Single(value))
}

#[test]
fn test_single_source() {
    let value = n("300");
    let decoder = single(&value);
    let source = decoder.open_single().unwrap();
    assert_eq!(source.read_number::<u16>().unwrap(), 300);
    assert!(matches!(
        source.read_number::<u8>(),
        Err(Error::NumberFormat { .. })
    ));
    assert!(matches!(
        source.read_bool(),
        Err(Error::TypeMismatch {
            expected: Shape::Bool,
            ..
        })
    ));
    assert!(!source.read_nil());

    let list = AttributeValue::List(vec![]);
    assert!(matches!(
        single(&list).open_single(),
        Err(Error::TypeMismatch {
            expected: Shape::Scalar,
            ..
        })
    ));
}

#[test]
fn test_unkeyed_source_cursor() {
    let value = AttributeValue::List(vec![n("1"), AttributeValue::Null]);
    let mut decoder = single(&value);
    let mut source = decoder.open_unkeyed().unwrap();
    assert_eq!(source.count(), 2);

    assert!(!source.decode_next_nil().unwrap());
    assert_eq!(source.current_index(), 0);
    assert_eq!(source.decode_next::<i32>().unwrap(), 1);
    assert_eq!(source.current_index(), 1);

    // a failed decode does not move the cursor
    assert!(source.decode_next::<i32>().is_err());
    assert_eq!(source.current_index(), 1);

    assert!(source.decode_next_nil().unwrap());
    assert!(source.is_at_end());

    match source.decode_next::<i32>() {
        Err(Error::ExhaustedSequence { path }) => assert!(path.is_empty()),
        other => panic!("expected ExhaustedSequence, got {other:?}"),
    }
    assert!(matches!(
        source.decode_next_nil(),
        Err(Error::ExhaustedSequence { .. })
    ));
    assert_eq!(source.current_index(), 2);
    assert!(source.coding_path().is_empty());
}

#[test]
fn test_unkeyed_source_over_set() {
    let value = AttributeValue::NumberSet(vec!["5".into(), "6".into()]);
    let mut decoder = single(&value);
    let mut source = decoder.open_unkeyed().unwrap();
    assert_eq!(source.decode_next::<u8>().unwrap(), 5);
    assert!(source.decode_next::<String>().is_err());
    assert_eq!(source.decode_next::<u8>().unwrap(), 6);
}

#[test]
fn test_keyed_source() {
    let mut foo = Item::new();
    foo.insert("name".into(), s("Foo"));
    let mut root = Item::new();
    root.insert("foo".into(), AttributeValue::Map(foo));
    root.insert("number".into(), n("42"));
    root.insert("none".into(), AttributeValue::Null);
    root.insert("list".into(), AttributeValue::List(vec![n("1"), n("2")]));

    let mut decoder = Decoder::new(DecodingContainer::Keyed(&root));
    let mut source = decoder.open_keyed().unwrap();
    assert_eq!(source.len(), 4);
    assert!(source.contains("foo"));
    assert!(!source.contains("bar"));
    let mut keys: Vec<_> = source.keys().collect();
    keys.sort_unstable();
    assert_eq!(keys, ["foo", "list", "none", "number"]);

    assert!(source.decode_nil("none").unwrap());
    assert!(!source.decode_nil("number").unwrap());
    assert_eq!(source.decode::<i64>("number").unwrap(), 42);

    {
        let mut nested = source.open_nested_keyed("foo").unwrap();
        assert_eq!(nested.coding_path().as_slice(), &[CodingKey::from("foo")]);
        assert_eq!(nested.decode::<String>("name").unwrap(), "Foo");
    }
    assert!(source.coding_path().is_empty());

    {
        let mut nested = source.open_nested_unkeyed("list").unwrap();
        assert_eq!(nested.coding_path().as_slice(), &[CodingKey::from("list")]);
        assert_eq!(nested.decode_next::<u8>().unwrap(), 1);
        assert_eq!(nested.decode_next::<u8>().unwrap(), 2);
    }
    assert!(source.coding_path().is_empty());

    match source.open_nested_keyed("number") {
        Err(Error::TypeMismatch { path, expected, .. }) => {
            assert_eq!(path.as_slice(), &[CodingKey::from("number")]);
            assert_eq!(expected, Shape::Map);
        }
        _ => panic!("expected TypeMismatch"),
    }
    assert!(source.coding_path().is_empty());

    match source.decode::<i64>("missing") {
        Err(Error::KeyNotFound { path, key }) => {
            assert!(path.is_empty());
            assert_eq!(key, "missing");
        }
        other => panic!("expected KeyNotFound, got {other:?}"),
    }
    assert!(matches!(
        source.decode_nil("missing"),
        Err(Error::KeyNotFound { .. })
    ));

    drop(source);
    assert_eq!(decoder.storage().len(), 1);
}

#[test]
fn test_unkeyed_source_nested() {
    let mut row = Item::new();
    row.insert("id".into(), n("1"));
    let value = AttributeValue::List(vec![AttributeValue::Map(row), n("2")]);

    let mut decoder = single(&value);
    let mut source = decoder.open_unkeyed().unwrap();
    {
        let mut nested = source.open_nested_keyed().unwrap();
        assert_eq!(nested.coding_path().as_slice(), &[CodingKey::Index(0)]);
        assert_eq!(nested.decode::<u32>("id").unwrap(), 1);
    }
    assert_eq!(source.current_index(), 1);
    assert!(matches!(
        source.open_nested_unkeyed(),
        Err(Error::TypeMismatch {
            expected: Shape::Sequence,
            ..
        })
    ));
    assert_eq!(source.current_index(), 1);
    assert!(source.coding_path().is_empty());
    assert_eq!(source.decode_next::<u32>().unwrap(), 2);
    assert!(source.is_at_end());
}

#[test]
fn test_unkeyed_source_failed_open_keeps_element() {
    let value = AttributeValue::List(vec![s("x"), AttributeValue::Map(Item::new())]);
    let mut decoder = single(&value);
    let mut source = decoder.open_unkeyed().unwrap();

    assert!(matches!(
        source.open_nested_keyed(),
        Err(Error::TypeMismatch {
            expected: Shape::Map,
            ..
        })
    ));
    assert_eq!(source.current_index(), 0);
    assert_eq!(source.decode_next::<String>().unwrap(), "x");

    assert!(source.open_nested_unkeyed().is_err());
    assert_eq!(source.current_index(), 1);
    assert!(source.open_nested_keyed().unwrap().is_empty());
    assert!(source.is_at_end());
}

#[test]
fn test_open_keyed_mismatch() {
    let value = s("foo");
    let mut decoder = single(&value);
    match decoder.open_keyed() {
        Err(Error::TypeMismatch {
            path,
            expected,
            actual,
        }) => {
            assert!(path.is_empty());
            assert_eq!(expected, Shape::Map);
            assert_eq!(actual, s("foo"));
        }
        _ => panic!("expected TypeMismatch"),
    }
}
