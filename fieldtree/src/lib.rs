#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

mod error;
pub use error::*;

mod options;
pub use options::*;

mod descriptor;
pub use descriptor::*;

mod cache;
pub use cache::*;

mod view;
pub use view::*;

mod binding;
pub use binding::*;

mod mapper;
pub use mapper::*;

pub use fieldtree_core::{Kind, ScalarKind, Shape, Shaped, Tag, opaque, record};

#[cfg(feature = "tracing")]
#[allow(unused_imports)]
pub(crate) use tracing::{debug, trace};

#[cfg(not(feature = "tracing"))]
mod log {
    macro_rules! trace {
        ($($tt:tt)*) => {};
    }
    macro_rules! debug {
        ($($tt:tt)*) => {};
    }
    pub(crate) use {debug, trace};
}
#[cfg(not(feature = "tracing"))]
pub(crate) use log::{debug, trace};
