//! Object-path nodes

use crate::error::RenderError;
use crate::template::{render, Field};

use super::{join_fragments, Id, Node};

/// One navigation or construction step towards a remote object
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectPath {
    template: String,
    id: Id,
    parent_id: Id,
    err: Option<RenderError>,
}

impl ObjectPath {
    /// Create an object path from a raw template using `{{.ID}}` and `{{.ParentID}}`
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            id: 0,
            parent_id: 0,
            err: None,
        }
    }

    /// Pre-assign an ID the builder must keep
    pub fn with_id(mut self, id: Id) -> Self {
        self.id = id;
        self
    }

    /// A named property of the parent object
    pub fn property(name: &str) -> Self {
        Self::new(format!(
            r#"<Property Id="{{{{.ID}}}}" ParentId="{{{{.ParentID}}}}" Name="{}" />"#,
            name
        ))
    }

    /// The result of invoking a method on the parent object
    ///
    /// Parameter text spanning several lines loses the leading spaces and
    /// tabs of each continuation line when rendered.
    pub fn method<S: AsRef<str>>(name: &str, parameters: &[S]) -> Self {
        Self::new(format!(
            r#"
            <Method Id="{{{{.ID}}}}" ParentId="{{{{.ParentID}}}}" Name="{}">
                <Parameters>{}</Parameters>
            </Method>
            "#,
            name,
            join_fragments(parameters)
        ))
    }

    /// An object addressed by its server-side identity path
    pub fn identity(path: &str) -> Self {
        Self::new(format!(r#"<Identity Id="{{{{.ID}}}}" Name="{}" />"#, path))
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn parent_id(&self) -> Id {
        self.parent_id
    }

    pub fn set_parent_id(&mut self, parent_id: Id) {
        self.parent_id = parent_id;
    }
}

impl Node for ObjectPath {
    fn render(&mut self) -> String {
        self.err = None;
        let fields = [Field::new("ID", self.id), Field::new("ParentID", self.parent_id)];
        match render(&self.template, "object", &fields) {
            Ok(text) => text,
            Err(err) => {
                self.err = Some(err);
                self.template.clone()
            }
        }
    }

    fn id(&self) -> Id {
        self.id
    }

    fn set_id(&mut self, id: Id) {
        self.id = id;
    }

    fn link_id(&self) -> Id {
        self.parent_id
    }

    fn set_link_id(&mut self, id: Id) {
        self.parent_id = id;
    }

    fn last_error(&self) -> Option<&RenderError> {
        self.err.as_ref()
    }
}
