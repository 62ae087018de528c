//! Information-flow control primitives.
//!
//! Labels name the provenance of a value and the identity of a sink. A flow
//! policy decides whether a value carrying one label may be written to a sink
//! carrying another.

pub mod label;
pub mod policy;
