//! # Request Module
//!
//! The inbound side of a dispatch: an already-parsed HTTP interaction built
//! by the host from its transport layer.
//!
//! Method and path are fixed at construction. Parameters are mutable and kept
//! in separate layers so their origin stays observable:
//!
//! | layer      | filled by                                  |
//! |------------|--------------------------------------------|
//! | `Url`      | `{placeholder}` captures from the route    |
//! | `Body`     | form fields or a JSON object body          |
//! | `Query`    | the query string                           |
//! | `Defaults` | the matched route's default values         |
//!
//! Lookups walk the layers in that order, so explicit input always wins over
//! route defaults.

mod core;

pub use core::{HeaderVec, ParamMap, ParamSource, Request, MAX_INLINE_HEADERS};
