//! Object-path and action nodes
//!
//! A request is made of two node families. Object paths describe how to reach
//! a remote object starting from the root context; actions operate on those
//! objects. Both share the [`Node`] capability set: render to text, get/set
//! their own ID, get/set the ID they link to, and report the last render
//! error.

mod action;
mod current;
mod object;

pub use action::Action;
pub use current::{Current, CURRENT_TEMPLATE};
pub use object::ObjectPath;

use crate::error::RenderError;

/// Node identifier. `0` belongs to the root node, `-1` means "no parent"
pub type Id = i64;

/// Linked ID reported by the root node
pub const NO_PARENT: Id = -1;

/// Common capability set of every node kind
pub trait Node {
    /// Render the node's template against its current fields
    ///
    /// Clears and repopulates the last error. Never fails: on error the raw
    /// template is returned.
    fn render(&mut self) -> String;

    fn id(&self) -> Id;

    fn set_id(&mut self, id: Id);

    /// Parent ID for object paths, target object ID for actions
    fn link_id(&self) -> Id;

    fn set_link_id(&mut self, id: Id);

    /// Outcome of the most recent [`Node::render`] call
    fn last_error(&self) -> Option<&RenderError>;
}

/// An object-path node: either the fixed root context or a regular path step
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectNode {
    Root(Current),
    Path(ObjectPath),
}

impl ObjectNode {
    pub fn is_root(&self) -> bool {
        matches!(self, ObjectNode::Root(_))
    }

    /// True when the builder still has to allocate an ID for this node
    pub fn needs_id(&self) -> bool {
        !self.is_root() && self.id() == 0
    }

    pub fn parent_id(&self) -> Id {
        self.link_id()
    }

    pub fn set_parent_id(&mut self, parent_id: Id) {
        self.set_link_id(parent_id)
    }

    pub fn template(&self) -> &str {
        match self {
            ObjectNode::Root(_) => CURRENT_TEMPLATE,
            ObjectNode::Path(path) => path.template(),
        }
    }
}

impl Node for ObjectNode {
    fn render(&mut self) -> String {
        match self {
            ObjectNode::Root(root) => root.render(),
            ObjectNode::Path(path) => path.render(),
        }
    }

    fn id(&self) -> Id {
        match self {
            ObjectNode::Root(root) => root.id(),
            ObjectNode::Path(path) => path.id(),
        }
    }

    fn set_id(&mut self, id: Id) {
        match self {
            ObjectNode::Root(root) => root.set_id(id),
            ObjectNode::Path(path) => path.set_id(id),
        }
    }

    fn link_id(&self) -> Id {
        match self {
            ObjectNode::Root(root) => root.link_id(),
            ObjectNode::Path(path) => path.link_id(),
        }
    }

    fn set_link_id(&mut self, id: Id) {
        match self {
            ObjectNode::Root(root) => root.set_link_id(id),
            ObjectNode::Path(path) => path.set_link_id(id),
        }
    }

    fn last_error(&self) -> Option<&RenderError> {
        match self {
            ObjectNode::Root(root) => root.last_error(),
            ObjectNode::Path(path) => path.last_error(),
        }
    }
}

impl From<ObjectPath> for ObjectNode {
    fn from(path: ObjectPath) -> Self {
        ObjectNode::Path(path)
    }
}

impl From<Current> for ObjectNode {
    fn from(root: Current) -> Self {
        ObjectNode::Root(root)
    }
}

/// Concatenate parameter fragments into one normalized block
pub(crate) fn join_fragments<S: AsRef<str>>(fragments: &[S]) -> String {
    let joined: String = fragments.iter().map(|f| f.as_ref()).collect();
    crate::template::trim_multiline(&joined)
}
