//! Types shared by the integration tests.

#![allow(dead_code)]

use fieldtree::record;

#[derive(Debug, Default, PartialEq)]
pub struct Inner {
    pub b: i64,
}

#[derive(Debug, Default, PartialEq)]
pub struct Outer {
    pub a: i64,
    pub inner: Option<Box<Inner>>,
}

record!(Inner { b });
record!(Outer { a, inner });

/// Three levels deep; ids are
/// `a=0 b=1 p2=2 p2.c=3 p2.d=4 p2.p3=5 p2.p3.e=6 p2.p3.f=7 p2.p3.g=8`.
#[derive(Debug, Default, PartialEq)]
pub struct P1 {
    pub a: i64,
    pub b: i64,
    pub p2: Option<Box<P2>>,
}

#[derive(Debug, Default, PartialEq)]
pub struct P2 {
    pub c: i64,
    pub d: i64,
    pub p3: Option<P3>,
}

#[derive(Debug, Default, PartialEq)]
pub struct P3 {
    pub e: i64,
    pub f: i64,
    pub g: Option<Box<Option<Box<i64>>>>,
}

record!(P1 {
    a = r#"fe:"head" mapper:"alpha""#,
    b = r#"mapper:"beta""#,
    p2,
});
record!(P2 {
    c = r#"fe:"head""#,
    d,
    p3 = r#"mapper:"p3""#,
});
record!(P3 {
    e,
    f = r#"mapper:"beta""#,
    g = r#"fe:"target" mapper:"gamma""#,
});

/// Singly linked, so the field tree only ends at the depth bound.
#[derive(Debug, Default)]
pub struct Node {
    pub value: i64,
    pub next: Option<Box<Node>>,
}

record!(Node { value, next });

/// A record field followed by a sibling.
#[derive(Debug, Default)]
pub struct Pair {
    pub first: Inner,
    pub second: i64,
}

record!(Pair { first, second });

/// Reads `p2.p3.g`, if every layer on the way is present.
pub fn g_of(p1: &P1) -> Option<i64> {
    let p3 = p1.p2.as_ref()?.p3.as_ref()?;
    p3.g.as_deref()?.as_deref().copied()
}
