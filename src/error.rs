//! Error types for template rendering and request compilation

use thiserror::Error;

use crate::node::Id;

/// A node's template could not be rendered against its fields
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// Placeholder outside the node's fixed field set
    #[error("{kind} template references unknown field '{field}'")]
    UnknownField { kind: &'static str, field: String },

    /// `{{` without a closing `}}`
    #[error("{kind} template has an unclosed action at byte {offset}")]
    UnclosedAction { kind: &'static str, offset: usize },

    /// An action that is not a single `.Field` reference
    #[error("{kind} template has a malformed action '{action}'")]
    MalformedAction { kind: &'static str, action: String },
}

/// Every render failure collected during one compile, in encounter order
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", format_render_errors(.errors))]
pub struct CompileError {
    pub errors: Vec<RenderError>,
}

impl CompileError {
    /// Aggregate collected errors, `None` when nothing failed
    pub fn aggregate(errors: Vec<RenderError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

fn format_render_errors(errors: &[RenderError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors surfaced by builder lookups
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    /// Handle does not belong to this builder
    #[error("object #{index} is not part of this builder")]
    UnknownObject { index: usize },

    /// Compiling the pending graph failed while resolving an ID
    #[error("compile failed while resolving object ID {id}: {source}")]
    Compile {
        id: Id,
        #[source]
        source: CompileError,
    },
}
