//! Node template rendering
//!
//! Every node carries a text template with placeholders written as
//! `{{.Field}}`. Object-path nodes expose `ID` and `ParentID`, action nodes
//! expose `ID` and `ObjectID`:
//!
//! ```text
//! <Property Id="{{.ID}}" ParentId="{{.ParentID}}" Name="Web" />
//! ```
//!
//! Rendered fragments are whitespace-normalized with [`trim_multiline`] so
//! indented multi-line templates collapse to a single line.

mod lexer;
mod render;

pub use lexer::{lex, Token};
pub use render::{render, trim_multiline, Field};
