//! The root context node

use crate::error::RenderError;

use super::{Id, Node, NO_PARENT};

/// Fixed fragment of the root context
pub const CURRENT_TEMPLATE: &str =
    r#"<StaticProperty Id="0" TypeId="{3747adcd-a3c3-41b9-bfab-4a64dd2f1e0a}" Name="Current" />"#;

/// The "current context" every object path starts from
///
/// Always reports ID `0` and parent [`NO_PARENT`]; setters are no-ops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Current;

impl Node for Current {
    fn render(&mut self) -> String {
        CURRENT_TEMPLATE.to_string()
    }

    fn id(&self) -> Id {
        0
    }

    fn set_id(&mut self, _id: Id) {}

    fn link_id(&self) -> Id {
        NO_PARENT
    }

    fn set_link_id(&mut self, _id: Id) {}

    fn last_error(&self) -> Option<&RenderError> {
        None
    }
}
