//! Common types, protocol definitions, and errors shared across `ctr-envelope` crates.

pub mod error;
pub mod protocol;

pub use error::{CodecError, CodecResult};
