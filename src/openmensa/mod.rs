//! OpenMensa feed v2.1 documents.

mod render;
mod tree;

pub use render::to_xml;
