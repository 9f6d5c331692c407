//! Tests across the public API that the module tests do not reach.

use std::sync::Arc;

use std::cmp::Ordering;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use quarry::{
    compare_values, get_attribute, record, AttributeSource, Clause, Collection, Dir, EngineConfig, Filter, Item,
    KeySource, Number, Op, OperatorTable, Pagination, QuarryError, QueryEngine, QuerySpec,
    SortColumn, SortCriterion, SortMode, Value,
};

// ============================================================================
// Helpers
// ============================================================================

struct Photo {
    name: String,
    width: u32,
}

impl AttributeSource for Photo {
    fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            "name" => Some(Value::from(&self.name)),
            "width" => Some(Value::from(self.width)),
            _ => None,
        }
    }

    fn attribute_names(&self) -> &'static [&'static str] {
        &["name", "width"]
    }
}

fn photos() -> Collection {
    [("img10", 800), ("img2", 1200), ("IMG1", 640)]
        .into_iter()
        .map(|(name, width)| {
            (
                name,
                Item::object(Photo {
                    name: name.to_string(),
                    width,
                }),
            )
        })
        .collect()
}

fn keys<T>(collection: &Collection<T>) -> Vec<&str> {
    collection.keys().collect()
}

// ============================================================================
// Values
// ============================================================================

#[test]
fn value_conversions() {
    assert_eq!(Value::from(3u8), Value::Number(Number::U64(3)));
    assert_eq!(Value::from(2.5), Value::Number(Number::F64(2.5)));
    assert_eq!(Value::from(None::<i32>), Value::Null);
    assert_eq!(Value::from(Some("x")), Value::from("x"));
    assert_eq!(Value::from(vec![1, 2]).as_array().map(<[Value]>::len), Some(2));
}

#[test]
fn value_display() {
    assert_eq!(Value::Null.to_string(), "");
    assert_eq!(Value::from(true).to_string(), "true");
    assert_eq!(Value::from("text").to_string(), "text");
    assert_eq!(Value::from(vec![1, 2]).to_string(), "[1,2]");
}

#[test]
fn loose_equality() {
    assert!(Value::from(10).loose_eq(&Value::from(10.0)));
    assert!(Value::from("10").loose_eq(&Value::from(10)));
    assert!(Value::from(true).loose_eq(&Value::from("yes")));
    assert!(Value::Null.loose_eq(&Value::from("")));
    assert!(!Value::from("a").loose_eq(&Value::from("A")));
}

#[test]
fn values_deserialize_from_json() {
    let value: Value = serde_json::from_str(r#"{"a": [1, "two", null, true]}"#).unwrap();
    let map = value.as_map().unwrap();
    assert_eq!(
        map["a"],
        Value::from(vec![
            Value::from(1),
            Value::from("two"),
            Value::Null,
            Value::from(true)
        ])
    );
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn every_operator_resolves_by_token() {
    let table = OperatorTable::standard();
    assert_eq!(table.len(), Op::ALL.len());
    for op in Op::ALL {
        assert_eq!(table.resolve(op.token()).unwrap(), op);
    }
}

#[test]
fn operator_lookup_is_exact() {
    let table = OperatorTable::standard();
    assert!(table.resolve("BETWEEN").is_err());
    assert!(table.resolve(" ==").is_err());
    assert!(table.contains("not in"));
}

#[test]
fn aliases_through_config() {
    let engine = QueryEngine::new(EngineConfig::default().with_alias("like", "*=")).unwrap();
    let result = engine.filter_by(&photos(), "name", "like", ["img1"]).unwrap();
    assert_eq!(keys(&result), ["img10"]);
}

// ============================================================================
// Objects
// ============================================================================

#[test]
fn objects_filter_and_sort() {
    let wide = photos().filter_by("width", ">=", [800]).unwrap();
    assert_eq!(keys(&wide), ["img10", "img2"]);

    let natural = photos()
        .sort_by([
            SortCriterion::from("name"),
            SortCriterion::Mode(SortMode::Natural),
        ])
        .unwrap();
    assert_eq!(keys(&natural), ["img1", "img2", "img10"]);

    let plain = photos().sort_by(["name"]).unwrap();
    assert_eq!(keys(&plain), ["img1", "img10", "img2"]);
}

#[test]
#[should_panic(expected = "undefined attribute accessor")]
fn objects_panic_on_unknown_accessor() {
    let _ = photos().filter_by("height", ">", [0]);
}

#[test]
fn objects_serialize_their_attributes() {
    let json = photos().limit(1).to_json().unwrap();
    assert_eq!(json, r#"{"img10":{"name":"img10","width":800}}"#);
}

#[test]
fn records_serialize_as_maps() {
    let collection: Collection = [("a", Item::record(record([("n", 1)])))]
        .into_iter()
        .collect();
    assert_eq!(collection.to_json().unwrap(), r#"{"a":{"n":1}}"#);
}

#[test]
fn mixed_items() {
    let collection = Collection::builder()
        .set("photo", Item::object(Photo { name: "p".into(), width: 10 }))
        .set("row", Item::record(record([("width", 20)])))
        .build();
    let sorted = collection.sort_by(["width", "desc"]).unwrap();
    assert_eq!(keys(&sorted), ["row", "photo"]);
}

#[test]
fn shared_objects() {
    let photo: Arc<dyn AttributeSource + Send + Sync> = Arc::new(Photo {
        name: "shared".into(),
        width: 1,
    });
    let collection = Collection::from_items([Item::Object(photo.clone()), Item::Object(photo)]);
    let first = collection.first().unwrap();
    assert!(first.ptr_eq(collection.last().unwrap()));
    assert_eq!(get_attribute(first, "name"), Value::from("shared"));
}

// ============================================================================
// Sorting
// ============================================================================

#[test]
fn sort_with_precomputed_keys() {
    let collection = photos();
    let weights = vec![Value::from(3), Value::from(1), Value::from(2)];
    let sorted = collection
        .sort_by([SortCriterion::Keys(weights)])
        .unwrap();
    assert_eq!(keys(&sorted), ["img2", "img1", "img10"]);
}

#[test]
fn precomputed_keys_must_match_count() {
    let err = photos()
        .sort_by([SortCriterion::Keys(vec![Value::from(1)])])
        .unwrap_err();
    assert!(matches!(err, QuarryError::InvalidSortSpec(_)));
}

#[test]
fn sort_columns_directly() {
    let columns = [
        SortColumn {
            source: KeySource::Field("width".into()),
            dir: Dir::Desc,
            mode: SortMode::Numeric,
        },
        SortColumn::asc("name"),
    ];
    let sorted = photos().sort_by_columns(&columns).unwrap();
    assert_eq!(keys(&sorted), ["img2", "img10", "img1"]);
}

#[test]
fn sort_is_stable_on_ties() {
    let collection: Collection = [("x", 1), ("y", 0), ("z", 1), ("w", 0)]
        .into_iter()
        .map(|(key, group)| (key, Item::record(record([("group", group)]))))
        .collect();
    let sorted = collection.sort_by(["group"]).unwrap();
    assert_eq!(keys(&sorted), ["y", "w", "x", "z"]);
}

#[test]
fn empty_collection_sorts_to_itself_after_validation() {
    let empty = Collection::<Item>::new();
    assert!(empty.sort_by(["title"]).unwrap().is_empty());
    assert!(empty.sort_by(["desc"]).is_err());
}

#[test]
fn missing_sort_field_goes_last() {
    let collection: Collection = [
        ("a", record([("rank", Value::Null)])),
        ("b", record([("rank", Value::from(2))])),
        ("c", record([("rank", Value::from(1))])),
    ]
    .into_iter()
    .map(|(key, row)| (key, Item::record(row)))
    .collect();
    let sorted = collection.sort_by(["rank"]).unwrap();
    assert_eq!(keys(&sorted), ["c", "b", "a"]);
}

fn mixed_value(rng: &mut StdRng) -> Value {
    let n: u32 = rng.random_range(0..100);
    match rng.random_range(0..5) {
        0 => Value::from(n.to_string()),
        1 => Value::from(format!("{}a", n % 10)),
        2 => Value::from(format!("v{n}")),
        3 => Value::from(n),
        _ => Value::from(f64::from(n) / 4.0),
    }
}

#[test]
fn regular_sort_handles_mixed_numeric_and_text_values() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let collection: Collection = (0..200)
            .map(|i| {
                let row = record([("v", mixed_value(&mut rng))]);
                (format!("k{i}"), Item::record(row))
            })
            .collect();

        for dir in ["asc", "desc"] {
            let sorted = collection.sort_by(["v", dir]).unwrap();
            assert_eq!(sorted.count(), 200);
            let values: Vec<Value> = sorted.values().map(|item| get_attribute(item, "v")).collect();
            let expected = if dir == "asc" { Ordering::Greater } else { Ordering::Less };
            assert!(values
                .windows(2)
                .all(|w| compare_values(&w[0], &w[1]) != expected));
        }
    }
}

#[test]
fn numeric_strings_sort_before_text() {
    let collection: Collection = [("a", "1a"), ("b", "10"), ("c", "2"), ("d", "B")]
        .into_iter()
        .map(|(key, v)| (key, Item::record(record([("v", v)]))))
        .collect();
    let sorted = collection.sort_by(["v"]).unwrap();
    assert_eq!(keys(&sorted), ["c", "b", "a", "d"]);
}

// ============================================================================
// Filters
// ============================================================================

#[test]
fn filter_accepts_clause_lists() {
    let filter: Filter = Filter::from(vec![
        Clause::new("width", "<", [1000]),
        Clause::new("name", "$=", ["0"]),
    ]);
    assert_eq!(keys(&photos().filter(filter).unwrap()), ["img10"]);
}

#[test]
fn word_and_length_operators() {
    let notes: Collection = [
        ("short", "hi"),
        ("medium", "a few words here"),
        ("long", "this note has quite a lot more words in it"),
    ]
    .into_iter()
    .map(|(key, text)| (key, Item::record(record([("text", text)]))))
    .collect();

    assert_eq!(keys(&notes.filter_by("text", "maxWords", [4]).unwrap()), ["short", "medium"]);
    assert_eq!(keys(&notes.filter_by("text", "minLength", [10]).unwrap()), ["medium", "long"]);
    assert_eq!(keys(&notes.filter_by("text", "maxLength", [2]).unwrap()), ["short"]);
    assert_eq!(keys(&notes.filter_by("text", "minWords", [5]).unwrap()), ["long"]);
}

// ============================================================================
// Structure
// ============================================================================

#[test]
fn deterministic_shuffle() {
    let a = photos().shuffle_with(&mut StdRng::seed_from_u64(42));
    let b = photos().shuffle_with(&mut StdRng::seed_from_u64(42));
    assert_eq!(keys(&a), keys(&b));
    assert_eq!(a.count(), 3);
}

#[test]
fn pagination_navigation() {
    let p = Pagination::new(45, 10, 2).unwrap();
    assert_eq!(p.pages(), 5);
    assert_eq!(p.first_page(), 1);
    assert_eq!(p.last_page(), 5);
    assert_eq!((p.prev_page(), p.next_page()), (Some(1), Some(3)));
    assert!(!p.is_first_page() && !p.is_last_page());
    assert!(p.has_pages());
}

#[test]
fn paginate_zero_limit() {
    assert!(matches!(
        photos().paginate(0, 1),
        Err(QuarryError::InvalidArgument(_))
    ));
}

#[test]
fn query_spec_round_trips_through_yaml() {
    let spec = QuerySpec::new()
        .not(["a"])
        .filter_by("score", ">", 1)
        .sort_by("score desc")
        .paginate(5, 2);
    let yaml = serde_yaml::to_string(&spec).unwrap();
    assert_eq!(QuerySpec::from_yaml(&yaml).unwrap(), spec);
}
