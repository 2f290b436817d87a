//! Layout of the binary model format produced by the ONNX converter.
//!
//! The format is a FlatBuffers buffer rooted at a [`Model`] table, described
//! in `model.fbs` at the root of this crate. This crate exposes the pieces
//! both sides of the format need without generated code:
//!
//! - the enum and union discriminants ([`OperatorType`], [`OperatorAttrs`],
//!   [`NodeKind`], ...),
//! - the vtable slot offset of every field ([`vt`]), used by writers with
//!   `FlatBufferBuilder::push_slot`,
//! - read-only table accessors over a finished buffer ([`Model`], [`Graph`],
//!   [`Node`], ...).

mod enums;
mod tables;
pub mod vt;

pub use enums::*;
pub use tables::*;

/// Version written into [`Model::schema_version`].
pub const SCHEMA_VERSION: i32 = 1;
