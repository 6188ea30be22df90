//! CSOM Builder - encoder for client object model XML requests
//!
//! This library assembles a request out of object paths (how to reach a
//! remote object) and actions (queries, method calls, property sets on those
//! objects). Nodes are added without knowing their final IDs; compiling the
//! builder allocates IDs, wires parents and targets, renders every node's
//! template and wraps the fragments in the request envelope.
//!
//! # Example
//!
//! ```rust
//! use csom_builder::{Action, Builder, ObjectPath};
//!
//! let mut b = Builder::new();
//! b.add_object(ObjectPath::property("Web"), None).unwrap();
//! b.add_action(Action::identity_query(), None).unwrap();
//!
//! let xml = b.compile().into_result().unwrap();
//! assert!(xml.contains(r#"<ObjectIdentityQuery Id="2" ObjectPathId="1" />"#));
//! ```

pub mod builder;
pub mod envelope;
pub mod error;
pub mod node;
pub mod request;
pub mod template;

pub use builder::{ActionRef, Builder, Compiled, ObjectRef};
pub use envelope::{ConfigError, EnvelopeConfig};
pub use error::{BuilderError, CompileError, RenderError};
pub use node::{Action, Current, Id, Node, ObjectNode, ObjectPath, NO_PARENT};
pub use request::{RequestDescription, RequestError};
