#![doc = include_str!("../README.md")]
#![no_std]
#![deny(
    unsafe_code,
    unused_imports,
    unused_variables,
    unused_must_use,
    missing_docs,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented
)]

#[cfg_attr(test, macro_use)]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod utils;
pub(crate) use utils::helper;

mod error;
pub use error::{Error, InvariantViolation, Result};

mod node;
pub use node::{Key, NodeHandle};

mod tree;
pub use tree::{Iter, RbTree};
