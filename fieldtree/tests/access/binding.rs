use std::ops::ControlFlow;
use std::sync::Arc;

use fieldtree::{AccessError, BuildOptions, DescriptorCache, Shaped, TypeDescriptor};

use crate::fixtures::{Inner, Outer, P1, P2, g_of};

#[test]
fn touching_a_field_allocates_its_path() {
    fieldtree_testhelpers::setup();

    let cache = DescriptorCache::new();
    let mut outer = Outer::default();
    let mut binding = cache.access(&mut outer);

    assert_eq!(binding.peek(2).unwrap().get::<i64>(), Ok(&0));
    binding.value(2).unwrap().set(5_i64).unwrap();
    drop(binding);

    assert_eq!(outer.inner.unwrap().b, 5);
}

#[test]
fn every_field_is_writable() {
    fieldtree_testhelpers::setup();

    let cache = DescriptorCache::new();
    let mut p1 = P1::default();
    let mut binding = cache.access(&mut p1);
    binding.for_each(|field, mut value| {
        if field.underlying_kind().is_integer() {
            value.set(field.id().index() as i64 + 1).unwrap();
        }
        ControlFlow::Continue(())
    });
    drop(binding);

    assert_eq!((p1.a, p1.b), (1, 2));
    let p2 = p1.p2.as_deref().unwrap();
    assert_eq!((p2.c, p2.d), (4, 5));
    let p3 = p2.p3.as_ref().unwrap();
    assert_eq!((p3.e, p3.f), (7, 8));
    assert_eq!(g_of(&p1), Some(9));
}

#[test]
fn deep_optional_leaf_is_written_in_place() {
    fieldtree_testhelpers::setup();

    let cache = DescriptorCache::new();
    let mut p1 = P1::default();
    let mut binding = cache.access(&mut p1);
    let (field, mut value) = binding.field(8).unwrap();
    assert_eq!(field.tag().get("fe"), "target");
    assert_eq!(value.shape(), i64::SHAPE);
    *value.get_mut::<i64>().unwrap() = 999;
    drop(binding);

    assert_eq!(g_of(&p1), Some(999));
    assert_eq!(p1.a, 0);
}

#[test]
fn existing_values_are_kept() {
    fieldtree_testhelpers::setup();

    let cache = DescriptorCache::new();
    let mut outer = Outer {
        a: 1,
        inner: Some(Box::new(Inner { b: 2 })),
    };
    let mut binding = cache.access(&mut outer);
    assert_eq!(binding.peek(2).unwrap().get::<i64>(), Ok(&2));
    let inner = binding.value(1).unwrap().into_mut::<Inner>().unwrap();
    inner.b += 40;
    drop(binding);

    assert_eq!(outer.inner.map(|inner| inner.b), Some(42));
}

#[test]
fn addresses_are_stable() {
    fieldtree_testhelpers::setup();

    let cache = DescriptorCache::new();
    let mut p1 = P1::default();
    let mut binding = cache.access(&mut p1);
    let first = binding.address_of(8).unwrap();
    assert_eq!(binding.address_of(8), Some(first));
    assert_eq!(binding.peek(8).unwrap().address(), first);
    assert_eq!(binding.address_of(99), None);
    drop(binding);

    let p3 = p1.p2.as_ref().unwrap().p3.as_ref().unwrap();
    let g: &i64 = p3.g.as_deref().unwrap().as_deref().unwrap();
    assert_eq!(std::ptr::from_ref(g) as usize, first);
}

#[test]
fn replacing_a_parent_reresolves_children() {
    fieldtree_testhelpers::setup();

    let cache = DescriptorCache::new();
    let mut p1 = P1::default();
    let mut binding = cache.access(&mut p1);
    binding.value(8).unwrap().set(1_i64).unwrap();

    // Drops the boxes `g` was resolved through.
    binding
        .value(2)
        .unwrap()
        .set(P2 {
            c: 3,
            ..P2::default()
        })
        .unwrap();
    assert_eq!(binding.peek(3).unwrap().get::<i64>(), Ok(&3));

    binding.value(8).unwrap().set(2_i64).unwrap();
    drop(binding);

    assert_eq!(p1.p2.as_ref().map(|p2| p2.c), Some(3));
    assert_eq!(g_of(&p1), Some(2));
}

#[test]
fn views_check_the_type() {
    fieldtree_testhelpers::setup();

    let cache = DescriptorCache::new();
    let mut outer = Outer::default();
    let mut binding = cache.access(&mut outer);

    let mut a = binding.value(0).unwrap();
    assert_eq!(
        a.get::<String>(),
        Err(AccessError::WrongShape {
            expected: i64::SHAPE,
            actual: String::SHAPE,
        })
    );
    assert!(a.set(1_u32).is_err());
    assert_eq!(a.as_ref().get::<i64>(), Ok(&0));

    let inner = binding.peek(1).unwrap();
    assert_eq!(inner.shape(), Inner::SHAPE);
    insta::assert_snapshot!(
        inner.get::<i64>().unwrap_err().to_string(),
        @"wrong shape: field is main::fixtures::Inner, but i64 was requested"
    );
}

#[test]
fn unknown_ids_are_none() {
    fieldtree_testhelpers::setup();

    let cache = DescriptorCache::new();
    let mut outer = Outer::default();
    let mut binding = cache.access(&mut outer);
    assert!(binding.value(3).is_none());
    assert!(binding.peek(usize::MAX).is_none());
    assert!(binding.field(3).is_none());
}

#[test]
fn binding_checks_the_instance_type() {
    fieldtree_testhelpers::setup();

    let cache = DescriptorCache::new();
    let descriptor = cache.analyze::<P1>();
    let mut outer = Outer::default();
    let err = descriptor.try_bind(&mut outer).unwrap_err();
    assert_eq!(
        err,
        AccessError::TypeMismatch {
            expected: P1::SHAPE,
            actual: Outer::SHAPE,
        }
    );
    assert!(outer.inner.is_none());
}

#[test]
#[should_panic(expected = "type mismatch")]
fn bind_panics_on_mismatch() {
    let cache = DescriptorCache::new();
    let descriptor = cache.analyze::<P1>();
    let mut outer = Outer::default();
    descriptor.bind(&mut outer);
}

#[test]
fn wrapped_instances_bind() {
    fieldtree_testhelpers::setup();

    let cache = DescriptorCache::new();

    let mut boxed = Box::new(Outer::default());
    cache.access(&mut boxed).value(0).unwrap().set(3_i64).unwrap();
    assert_eq!(boxed.a, 3);

    let mut missing: Option<Outer> = None;
    cache.access(&mut missing).value(2).unwrap().set(4_i64).unwrap();
    let outer = missing.unwrap();
    assert_eq!(outer.inner.map(|inner| inner.b), Some(4));
}

#[test]
fn for_each_stops_on_break() {
    fieldtree_testhelpers::setup();

    let cache = DescriptorCache::new();
    let mut p1 = P1::default();
    let mut binding = cache.access(&mut p1);
    let mut visited = Vec::new();
    binding.for_each(|field, _| {
        visited.push(field.selector().to_owned());
        if field.name() == "p2" {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });
    drop(binding);

    assert_eq!(visited, ["a", "b", "p2"]);
    // `p2` was handed out, so it was materialized; nothing below it was.
    assert!(p1.p2.as_ref().unwrap().p3.is_none());
}

fn grouped() -> Arc<TypeDescriptor> {
    let options =
        BuildOptions::new().group_by(|field| field.tag().lookup("fe").map(str::to_owned));
    Arc::new(TypeDescriptor::build(P1::SHAPE, &options).unwrap())
}

#[test]
fn group_values_resolve_members() {
    fieldtree_testhelpers::setup();

    let descriptor = grouped();
    let mut p1 = P1 {
        a: 10,
        ..P1::default()
    };
    let mut binding = descriptor.bind(&mut p1);
    let heads: Vec<_> = binding
        .group_values("head")
        .iter()
        .map(|value| (value.descriptor().selector(), *value.get::<i64>().unwrap()))
        .collect();
    assert_eq!(heads, [("a", 10), ("p2.c", 0)]);
    assert!(binding.group_values("missing").is_empty());
}

#[test]
fn group_for_each_writes_members() {
    fieldtree_testhelpers::setup();

    let descriptor = grouped();
    let mut p1 = P1::default();
    let mut binding = descriptor.bind(&mut p1);
    binding.group_for_each("head", |_, mut value| {
        *value.get_mut::<i64>().unwrap() += 7;
        ControlFlow::Continue(())
    });
    binding.group_for_each("target", |field, mut value| {
        assert_eq!(field.selector(), "p2.p3.g");
        value.set(-1_i64).unwrap();
        ControlFlow::Break(())
    });
    drop(binding);

    assert_eq!(p1.a, 7);
    assert_eq!(p1.p2.as_ref().map(|p2| p2.c), Some(7));
    assert_eq!(g_of(&p1), Some(-1));
}

#[test]
fn one_descriptor_many_instances() {
    fieldtree_testhelpers::setup();

    let cache = DescriptorCache::new();
    let descriptor = cache.analyze::<Outer>();
    let ids = descriptor.filter(|field| field.underlying_kind().is_integer());

    let mut outers: Vec<Outer> = (0..3).map(|_| Outer::default()).collect();
    for (n, outer) in outers.iter_mut().enumerate() {
        let mut binding = descriptor.bind(outer);
        for id in &ids {
            binding.value(*id).unwrap().set(n as i64).unwrap();
        }
    }
    for (n, outer) in outers.iter().enumerate() {
        assert_eq!(outer.a, n as i64);
        assert_eq!(outer.inner.as_ref().map(|inner| inner.b), Some(n as i64));
    }
}
