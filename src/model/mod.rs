//! Model system
//!
//! - `descriptor`: per-type field registry, built once at registration
//! - `instance`: the record type with accessors, hydration and
//!   save/delete delegation

pub mod descriptor;
pub mod instance;

pub use descriptor::{
    FieldDescriptor, FieldKind, ModelDescriptor, ModelDescriptorBuilder, DEFAULT_PRIMARY_KEY,
    RESERVED_FIELDS,
};
pub use instance::Model;
