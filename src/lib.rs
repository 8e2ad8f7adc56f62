//! docblock — read `@` annotations from doc comments.
//!
//! ```text
//! /**
//!  * @route /users/{id}
//!  * @auth
//!  * @timeout 30
//!  * @param int $id
//!  */
//! ```
//!
//! reads as `{"route": "/users/{id}", "auth": true, "timeout": 30, "param": "int $id"}`.
//! Values are JSON when they parse as JSON and plain strings otherwise; a tag
//! repeated several times becomes a list.
//!
//! The comment text comes from a [`DeclarationResolver`]; [`SourceIndex`]
//! resolves class and method comments from PHP-style source.

pub mod declaration;
pub mod error;
pub mod parser;
pub mod resolver;
pub mod scan;
pub mod value;

pub use declaration::{parse_variable_declaration, VariableDeclaration};
pub use error::{Error, Result};
pub use parser::AnnotationParser;
pub use resolver::{DeclarationResolver, Reference, SourceIndex};
pub use value::{parse_value, AnnotationValue};
