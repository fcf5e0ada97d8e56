mod diagnostic;
mod field;
pub mod parser;
mod relation;

pub use diagnostic::*;
pub use field::*;
pub use parser::{ParsedSchema, SchemaParser};
pub use relation::*;
