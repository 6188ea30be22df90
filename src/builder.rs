//! Request graph builder
//!
//! The builder records object paths and actions in insertion order, wiring
//! each new node to the most recently added object unless told otherwise.
//! IDs are not allocated when nodes are added; [`Builder::compile`] resolves
//! them in one pass, renders every node and assembles the request document.
//!
//! # Example
//!
//! ```rust
//! use csom_builder::{Action, Builder, ObjectPath};
//!
//! let mut b = Builder::new();
//! b.add_object(ObjectPath::property("Web"), None).unwrap();
//! let (folder, _) = b
//!     .add_object(
//!         ObjectPath::method(
//!             "GetFolderByServerRelativeUrl",
//!             &[r#"<Parameter Type="String">/sites/site/Shared Documents</Parameter>"#],
//!         ),
//!         None,
//!     )
//!     .unwrap();
//! b.add_action(Action::query_with_props::<&str>(&[]), None).unwrap();
//!
//! assert_eq!(b.get_object_id(folder).unwrap(), 2);
//! let compiled = b.compile();
//! assert!(compiled.is_ok());
//! assert!(compiled.document.contains(r#"<Query Id="3" ObjectPathId="2">"#));
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace, warn};

use crate::envelope::EnvelopeConfig;
use crate::error::{BuilderError, CompileError};
use crate::node::{Action, Current, Id, Node, ObjectNode, ObjectPath};

static NEXT_LINEAGE: AtomicU64 = AtomicU64::new(1);

fn next_lineage() -> u64 {
    NEXT_LINEAGE.fetch_add(1, Ordering::Relaxed)
}

/// Handle to an object path added to a [`Builder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    lineage: u64,
    index: usize,
}

impl ObjectRef {
    /// Position in the builder's object sequence (the root is 0)
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Handle to an action added to a [`Builder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionRef {
    lineage: u64,
    index: usize,
}

impl ActionRef {
    /// Position in the builder's action sequence
    pub fn index(&self) -> usize {
        self.index
    }
}

#[derive(Debug, Clone)]
struct ObjectEdge {
    current: ObjectNode,
    parent: Option<usize>,
}

#[derive(Debug, Clone)]
struct ActionEdge {
    action: Action,
    object: usize,
}

/// Where a clone forked off: handles of `lineage` below these lengths stay valid
#[derive(Debug, Clone, Copy)]
struct Fork {
    lineage: u64,
    objects: usize,
    actions: usize,
}

/// Outcome of [`Builder::compile`]
///
/// The document is always produced; `error` aggregates every template that
/// failed to render (those nodes appear with their raw template text).
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    pub document: String,
    pub error: Option<CompileError>,
}

impl Compiled {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// The document, or the aggregate error if any node failed
    pub fn into_result(self) -> Result<String, CompileError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.document),
        }
    }

    pub fn into_parts(self) -> (String, Option<CompileError>) {
        (self.document, self.error)
    }
}

/// Builds a client object model request from object paths and actions
///
/// Not internally synchronized. Use [`Clone`] to fork a partially built
/// request; handles obtained before the fork are valid on both copies.
#[derive(Debug)]
pub struct Builder {
    config: EnvelopeConfig,
    lineage: u64,
    ancestry: Vec<Fork>,
    objects: Vec<ObjectEdge>,
    actions: Vec<ActionEdge>,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Builder {
    fn clone(&self) -> Self {
        let mut ancestry = self.ancestry.clone();
        ancestry.push(Fork {
            lineage: self.lineage,
            objects: self.objects.len(),
            actions: self.actions.len(),
        });
        Self {
            config: self.config.clone(),
            lineage: next_lineage(),
            ancestry,
            objects: self.objects.clone(),
            actions: self.actions.clone(),
        }
    }
}

impl Builder {
    /// Create a builder holding only the root context, with the default envelope
    pub fn new() -> Self {
        Self::with_config(EnvelopeConfig::default())
    }

    /// Create a builder with a custom envelope
    pub fn with_config(config: EnvelopeConfig) -> Self {
        Self {
            config,
            lineage: next_lineage(),
            ancestry: Vec::new(),
            objects: vec![ObjectEdge {
                current: ObjectNode::Root(Current),
                parent: None,
            }],
            actions: Vec::new(),
        }
    }

    pub fn config(&self) -> &EnvelopeConfig {
        &self.config
    }

    /// Handle of the root context
    pub fn root(&self) -> ObjectRef {
        self.object_ref(0)
    }

    /// Add an object path
    ///
    /// Without an explicit parent the most recently added object becomes the
    /// parent. Returns the new object's handle and its resolved parent.
    pub fn add_object(
        &mut self,
        object: ObjectPath,
        parent: Option<ObjectRef>,
    ) -> Result<(ObjectRef, Option<ObjectRef>), BuilderError> {
        let parent = match parent {
            Some(handle) => Some(self.check_object(handle)?),
            None => self.objects.len().checked_sub(1),
        };
        self.objects.push(ObjectEdge {
            current: ObjectNode::Path(object),
            parent,
        });
        let added = self.object_ref(self.objects.len() - 1);
        Ok((added, parent.map(|p| self.object_ref(p))))
    }

    /// Add an action
    ///
    /// Without an explicit target the most recently added object is used.
    /// Returns the new action's handle and its resolved target.
    pub fn add_action(
        &mut self,
        action: Action,
        object: Option<ObjectRef>,
    ) -> Result<(ActionRef, ObjectRef), BuilderError> {
        let object = match object {
            Some(handle) => self.check_object(handle)?,
            None => self.objects.len() - 1,
        };
        self.actions.push(ActionEdge { action, object });
        let added = ActionRef {
            lineage: self.lineage,
            index: self.actions.len() - 1,
        };
        Ok((added, self.object_ref(object)))
    }

    /// All object handles in insertion order, root first
    pub fn objects(&self) -> Vec<ObjectRef> {
        (0..self.objects.len()).map(|i| self.object_ref(i)).collect()
    }

    /// All action handles in insertion order
    pub fn actions(&self) -> Vec<ActionRef> {
        (0..self.actions.len())
            .map(|index| ActionRef {
                lineage: self.lineage,
                index,
            })
            .collect()
    }

    pub fn object(&self, handle: ObjectRef) -> Option<&ObjectNode> {
        let index = self.check_object(handle).ok()?;
        Some(&self.objects[index].current)
    }

    /// Mutable access to a regular object path; `None` for the root
    pub fn object_mut(&mut self, handle: ObjectRef) -> Option<&mut ObjectPath> {
        let index = self.check_object(handle).ok()?;
        match &mut self.objects[index].current {
            ObjectNode::Root(_) => None,
            ObjectNode::Path(path) => Some(path),
        }
    }

    pub fn action(&self, handle: ActionRef) -> Option<&Action> {
        let index = self.check_action(handle)?;
        Some(&self.actions[index].action)
    }

    pub fn action_mut(&mut self, handle: ActionRef) -> Option<&mut Action> {
        let index = self.check_action(handle)?;
        Some(&mut self.actions[index].action)
    }

    /// Parent recorded for an object; `None` for the root
    pub fn parent_of(&self, handle: ObjectRef) -> Option<ObjectRef> {
        let index = self.check_object(handle).ok()?;
        self.objects[index].parent.map(|p| self.object_ref(p))
    }

    /// Target object recorded for an action
    pub fn target_of(&self, handle: ActionRef) -> Option<ObjectRef> {
        let index = self.check_action(handle)?;
        Some(self.object_ref(self.actions[index].object))
    }

    /// Resolve an object's ID, compiling the pending graph if it has none yet
    ///
    /// A compile failure is reported together with the ID the object ended
    /// up with.
    pub fn get_object_id(&mut self, handle: ObjectRef) -> Result<Id, BuilderError> {
        let index = self.check_object(handle)?;
        if !self.objects[index].current.needs_id() {
            return Ok(self.objects[index].current.id());
        }

        let compiled = self.compile();
        let id = self.objects[index].current.id();
        match compiled.error {
            Some(source) => Err(BuilderError::Compile { id, source }),
            None => Ok(id),
        }
    }

    /// Allocate missing IDs, render every node and assemble the document
    ///
    /// IDs already set are kept, so compiling again after further additions
    /// only allocates IDs for the new nodes.
    pub fn compile(&mut self) -> Compiled {
        let mut errors = Vec::new();

        let mut objects = String::new();
        for i in 0..self.objects.len() {
            if let Some(parent) = self.objects[i].parent {
                self.ensure_object_id(parent);
            }
            if self.objects[i].current.needs_id() {
                let id = self.next_object_id();
                let parent_id = self.objects[i]
                    .parent
                    .map(|p| self.objects[p].current.id())
                    .unwrap_or_default();
                let current = &mut self.objects[i].current;
                current.set_id(id);
                current.set_parent_id(parent_id);
                trace!(index = i, id, parent_id, "allocated object id");
            }

            let current = &mut self.objects[i].current;
            objects.push_str(&current.render());
            if let Some(err) = current.last_error() {
                warn!(index = i, error = %err, "object path failed to render");
                errors.push(err.clone());
            }
        }

        let mut actions = String::new();
        for i in 0..self.actions.len() {
            if self.actions[i].action.id() == 0 {
                let id = self.next_action_id();
                let object_id = self.objects[self.actions[i].object].current.id();
                let action = &mut self.actions[i].action;
                action.set_id(id);
                action.set_object_id(object_id);
                trace!(index = i, id, object_id, "allocated action id");
            }

            let action = &mut self.actions[i].action;
            actions.push_str(&action.render());
            if let Some(err) = action.last_error() {
                warn!(index = i, error = %err, "action failed to render");
                errors.push(err.clone());
            }
        }

        let document = self.config.assemble(&actions, &objects);
        debug!(
            objects = self.objects.len(),
            actions = self.actions.len(),
            errors = errors.len(),
            "compiled request"
        );

        Compiled {
            document,
            error: CompileError::aggregate(errors),
        }
    }

    fn ensure_object_id(&mut self, index: usize) {
        if self.objects[index].current.needs_id() {
            let id = self.next_object_id();
            self.objects[index].current.set_id(id);
        }
    }

    /// One past the highest ID among all objects, skipping IDs actions hold
    fn next_object_id(&self) -> Id {
        let mut next = self
            .objects
            .iter()
            .map(|edge| edge.current.id() + 1)
            .max()
            .unwrap_or(1);
        while self.actions.iter().any(|edge| edge.action.id() == next) {
            next += 1;
        }
        next
    }

    /// One past the highest ID among all objects and actions
    fn next_action_id(&self) -> Id {
        self.actions
            .iter()
            .map(|edge| edge.action.id() + 1)
            .fold(self.next_object_id(), Id::max)
    }

    fn object_ref(&self, index: usize) -> ObjectRef {
        ObjectRef {
            lineage: self.lineage,
            index,
        }
    }

    fn check_object(&self, handle: ObjectRef) -> Result<usize, BuilderError> {
        let owned = if handle.lineage == self.lineage {
            handle.index < self.objects.len()
        } else {
            self.ancestry
                .iter()
                .any(|fork| fork.lineage == handle.lineage && handle.index < fork.objects)
        };
        if owned {
            Ok(handle.index)
        } else {
            Err(BuilderError::UnknownObject {
                index: handle.index,
            })
        }
    }

    fn check_action(&self, handle: ActionRef) -> Option<usize> {
        let owned = if handle.lineage == self.lineage {
            handle.index < self.actions.len()
        } else {
            self.ancestry
                .iter()
                .any(|fork| fork.lineage == handle.lineage && handle.index < fork.actions)
        };
        owned.then_some(handle.index)
    }
}
