//! Action nodes

use crate::error::RenderError;
use crate::template::{render, Field};

use super::{join_fragments, Id, Node};

/// An operation (query, method call, property set) on an object path
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    template: String,
    id: Id,
    object_id: Id,
    err: Option<RenderError>,
}

impl Action {
    /// Create an action from a raw template using `{{.ID}}` and `{{.ObjectID}}`
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            id: 0,
            object_id: 0,
            err: None,
        }
    }

    /// Pre-assign an ID the builder must keep
    pub fn with_id(mut self, id: Id) -> Self {
        self.id = id;
        self
    }

    /// Query the target's identity
    pub fn identity_query() -> Self {
        Self::new(r#"<ObjectIdentityQuery Id="{{.ID}}" ObjectPathId="{{.ObjectID}}" />"#)
    }

    /// Query all scalar properties plus the listed property fragments
    pub fn query_with_props<S: AsRef<str>>(properties: &[S]) -> Self {
        Self::new(format!(
            r#"
            <Query Id="{{{{.ID}}}}" ObjectPathId="{{{{.ObjectID}}}}">
                <Query SelectAllProperties="true">
                    <Properties>{}</Properties>
                </Query>
            </Query>
            "#,
            join_fragments(properties)
        ))
    }

    /// Query a collection, selecting the listed properties on each child
    pub fn query_with_child_props<S: AsRef<str>>(properties: &[S]) -> Self {
        Self::new(format!(
            r#"
            <Query Id="{{{{.ID}}}}" ObjectPathId="{{{{.ObjectID}}}}">
                <Query SelectAllProperties="true">
                    <Properties />
                </Query>
                <ChildItemQuery SelectAllProperties="true">
                    <Properties>{}</Properties>
                </ChildItemQuery>
            </Query>
            "#,
            join_fragments(properties)
        ))
    }

    /// Invoke a method on the target
    pub fn method<S: AsRef<str>>(name: &str, parameters: &[S]) -> Self {
        Self::new(format!(
            r#"
            <Method Id="{{{{.ID}}}}" ObjectPathId="{{{{.ObjectID}}}}" Name="{}">
                <Parameters>{}</Parameters>
            </Method>
            "#,
            name,
            join_fragments(parameters)
        ))
    }

    /// Set a property on the target; `parameter` is a `<Parameter>` fragment
    ///
    /// As with [`Action::method`], multi-line values lose the indentation of
    /// continuation lines.
    pub fn set_property(name: &str, parameter: &str) -> Self {
        Self::new(format!(
            r#"<SetProperty Id="{{{{.ID}}}}" ObjectPathId="{{{{.ObjectID}}}}" Name="{}">{}</SetProperty>"#,
            name, parameter
        ))
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn object_id(&self) -> Id {
        self.object_id
    }

    pub fn set_object_id(&mut self, object_id: Id) {
        self.object_id = object_id;
    }
}

impl Node for Action {
    fn render(&mut self) -> String {
        self.err = None;
        let fields = [Field::new("ID", self.id), Field::new("ObjectID", self.object_id)];
        match render(&self.template, "action", &fields) {
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
        self.object_id
    }

    fn set_link_id(&mut self, id: Id) {
        self.object_id = id;
    }

    fn last_error(&self) -> Option<&RenderError> {
        self.err.as_ref()
    }
}
