use std::sync::Arc;

use fieldtree::{AccessError, DescriptorCache, FieldDescriptor, KeyMapper};

use crate::fixtures::{Outer, P1, P3, g_of};

fn by_tag(field: &FieldDescriptor) -> Option<String> {
    field.tag().lookup("mapper").map(str::to_owned)
}

#[test]
fn keys_come_from_the_key_function() {
    fieldtree_testhelpers::setup();

    let mapper = KeyMapper::new(by_tag);
    let keyed = mapper.keyed_type::<P1>();

    let mut keys: Vec<_> = keyed.keys().collect();
    keys.sort_unstable();
    assert_eq!(keys, ["alpha", "beta", "gamma", "p3"]);
    assert_eq!(keyed.field_id("alpha").map(|id| id.index()), Some(0));
    assert_eq!(keyed.field_id("p3").map(|id| id.index()), Some(5));
    assert_eq!(keyed.field_id("delta"), None);
}

#[test]
fn later_fields_win_key_collisions() {
    fieldtree_testhelpers::setup();

    // `b` and `p2.p3.f` both claim "beta".
    let mapper = KeyMapper::new(by_tag);
    assert_eq!(
        mapper.keyed_type::<P1>().field_id("beta").map(|id| id.index()),
        Some(7)
    );

    let by_depth = KeyMapper::new(|field| Some(field.depth().to_string()));
    let keyed = by_depth.keyed_type::<P1>();
    let winners: Vec<_> = ["0", "1", "2"]
        .into_iter()
        .map(|key| keyed.field_id(key).map(|id| id.index()))
        .collect();
    assert_eq!(winners, [Some(2), Some(5), Some(8)]);
}

#[test]
fn make_resolves_every_key() {
    fieldtree_testhelpers::setup();

    let mapper = KeyMapper::new(by_tag);
    let mut p1 = P1 {
        a: 1,
        ..P1::default()
    };
    let values = mapper.make(&mut p1);
    assert_eq!(values.len(), 4);
    assert_eq!(values.get("alpha").unwrap().get::<i64>(), Ok(&1));
    assert_eq!(values.get("gamma").unwrap().get::<i64>(), Ok(&0));
    assert_eq!(values.get("p3").unwrap().get::<P3>().map(|p3| p3.e), Ok(0));
    assert!(values.get("delta").is_none());

    let mut selectors: Vec<_> = values
        .iter()
        .map(|(key, value)| format!("{key}={}", value.descriptor().selector()))
        .collect();
    selectors.sort_unstable();
    insta::assert_debug_snapshot!(selectors, @r#"
    [
        "alpha=a",
        "beta=p2.p3.f",
        "gamma=p2.p3.g",
        "p3=p2.p3",
    ]
    "#);
    drop(values);

    // Resolving "gamma" filled in the whole path.
    assert_eq!(g_of(&p1), Some(0));
}

#[test]
fn keyed_binding_resolves_on_demand() {
    fieldtree_testhelpers::setup();

    let mapper = KeyMapper::new(by_tag);
    let keyed = mapper.keyed_type::<P1>();
    let mut p1 = P1::default();
    let mut binding = keyed.bind(&mut p1);
    binding.get("beta").unwrap().set(8_i64).unwrap();
    assert_eq!(binding.peek("beta").unwrap().get::<i64>(), Ok(&8));
    assert!(binding.get("delta").is_none());
    binding.binding().value(0).unwrap().set(1_i64).unwrap();
    drop(binding);

    assert_eq!(p1.a, 1);
    assert_eq!(p1.b, 0);
    let p3 = p1.p2.as_ref().unwrap().p3.as_ref().unwrap();
    assert_eq!(p3.f, 8);
    assert!(p3.g.is_none());
}

#[test]
fn keyed_types_are_cached() {
    fieldtree_testhelpers::setup();

    let cache = Arc::new(DescriptorCache::new());
    let mapper = KeyMapper::with_cache(Arc::clone(&cache), by_tag);
    let first = mapper.keyed_type::<P1>();
    let second = mapper.keyed_type::<Box<P1>>();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(first.descriptor(), &cache.analyze::<P1>()));
    assert_eq!(cache.len(), 1);
    assert!(Arc::ptr_eq(mapper.cache(), &cache));
}

#[test]
fn mismatched_instances_are_rejected() {
    fieldtree_testhelpers::setup();

    let mapper = KeyMapper::new(by_tag);
    let keyed = mapper.keyed_type::<P1>();
    let mut outer = Outer::default();
    assert!(matches!(
        keyed.try_bind(&mut outer),
        Err(AccessError::TypeMismatch { .. })
    ));
    assert!(matches!(
        keyed.try_make(&mut outer),
        Err(AccessError::TypeMismatch { .. })
    ));
    assert!(matches!(
        mapper.try_make(&mut 0_i64),
        Err(AccessError::NotARecord { .. })
    ));
}

#[test]
fn mapper_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<KeyMapper>();
    assert_send_sync::<DescriptorCache>();
}
