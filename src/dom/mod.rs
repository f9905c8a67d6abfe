//! Tree layer: arena document, node model, builder, namespaces.

pub mod builder;
pub mod document;
pub mod namespace;
pub mod node;
