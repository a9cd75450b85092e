//! Import core: reference resolution, formula translation, graph building
//! and validation

pub mod builder;
pub mod resolver;
pub mod translator;
pub mod validator;

pub use builder::{import, Importer};
pub use resolver::{Coordinate, KnownIds, ReferenceResolver};
pub use translator::FormulaTranslator;
pub use validator::validate;
