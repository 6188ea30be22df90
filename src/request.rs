//! TOML request descriptions
//!
//! A description lists named object paths and actions; it loads into a
//! [`Builder`] in document order. The name `root` always refers to the root
//! context.
//!
//! ```toml
//! [envelope]
//! application_name = "Reports"
//!
//! [[objects]]
//! name = "web"
//! property = "Web"
//!
//! [[objects]]
//! name = "folder"
//! method = "GetFolderByServerRelativeUrl"
//! parameters = ['<Parameter Type="String">/sites/site/Shared Documents</Parameter>']
//!
//! [[actions]]
//! object = "folder"
//! query = []
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::builder::{Builder, ObjectRef};
use crate::envelope::EnvelopeConfig;
use crate::error::BuilderError;
use crate::node::{Action, Id, ObjectPath};

/// Name under which the root context can be referenced
pub const ROOT_NAME: &str = "root";

/// Errors that can occur when loading a request description
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Failed to read request file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse request TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// A `parent` or `object` names something not declared earlier
    #[error("unknown object reference '{name}'")]
    UnknownReference { name: String },

    /// Two objects share a name
    #[error("duplicate object name '{name}'")]
    DuplicateName { name: String },

    /// An entry sets no kind, several kinds, or inconsistent keys
    #[error("invalid {entry}: {reason}")]
    InvalidEntry { entry: String, reason: String },

    #[error(transparent)]
    Builder(#[from] BuilderError),
}

/// A whole request: optional envelope plus ordered objects and actions
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestDescription {
    #[serde(default)]
    pub envelope: Option<EnvelopeConfig>,
    #[serde(default)]
    pub objects: Vec<ObjectSpec>,
    #[serde(default)]
    pub actions: Vec<ActionSpec>,
}

/// One object path entry
///
/// Exactly one of `template`, `property`, `method` or `identity` must be set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectSpec {
    /// Name later entries use to refer to this object
    #[serde(default)]
    pub name: Option<String>,
    /// Parent object name; defaults to the previous object
    #[serde(default)]
    pub parent: Option<String>,
    /// Pre-assigned ID
    #[serde(default)]
    pub id: Option<Id>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub property: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub parameters: Option<Vec<String>>,
    #[serde(default)]
    pub identity: Option<String>,
}

/// How an object path's template is produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectKind<'a> {
    Template(&'a str),
    Property(&'a str),
    Method(&'a str, &'a [String]),
    Identity(&'a str),
}

/// One action entry
///
/// Exactly one of `template`, `query`, `child_query`, `method`,
/// `set_property` or `identity_query` must be set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionSpec {
    /// Target object name; defaults to the most recent object
    #[serde(default)]
    pub object: Option<String>,
    /// Pre-assigned ID
    #[serde(default)]
    pub id: Option<Id>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub query: Option<Vec<String>>,
    #[serde(default)]
    pub child_query: Option<Vec<String>>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub parameters: Option<Vec<String>>,
    #[serde(default)]
    pub set_property: Option<String>,
    /// `<Parameter>` fragment for `set_property`
    #[serde(default)]
    pub value: Option<String>,
    /// Must be `true` when present
    #[serde(default)]
    pub identity_query: Option<bool>,
}

/// How an action's template is produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionKind<'a> {
    Template(&'a str),
    Query(&'a [String]),
    ChildQuery(&'a [String]),
    Method(&'a str, &'a [String]),
    SetProperty(&'a str, &'a str),
    IdentityQuery,
}

/// Pick the single kind set on an entry
fn single<K>(entry: &str, kinds: Vec<Option<K>>) -> Result<K, RequestError> {
    let mut set = kinds.into_iter().flatten();
    match (set.next(), set.next()) {
        (Some(kind), None) => Ok(kind),
        (None, _) => Err(RequestError::InvalidEntry {
            entry: entry.to_string(),
            reason: "no kind given".to_string(),
        }),
        (Some(_), Some(_)) => Err(RequestError::InvalidEntry {
            entry: entry.to_string(),
            reason: "more than one kind given".to_string(),
        }),
    }
}

fn invalid(entry: &str, reason: &str) -> RequestError {
    RequestError::InvalidEntry {
        entry: entry.to_string(),
        reason: reason.to_string(),
    }
}

impl ObjectSpec {
    fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("object '{name}'"),
            None => "object".to_string(),
        }
    }

    /// The kind this entry describes
    pub fn kind(&self) -> Result<ObjectKind<'_>, RequestError> {
        let entry = self.label();
        if self.parameters.is_some() && self.method.is_none() {
            return Err(invalid(&entry, "'parameters' requires 'method'"));
        }
        let parameters = self.parameters.as_deref().unwrap_or(&[]);
        single(
            &entry,
            vec![
                self.template.as_deref().map(ObjectKind::Template),
                self.property.as_deref().map(ObjectKind::Property),
                self.method.as_deref().map(|m| ObjectKind::Method(m, parameters)),
                self.identity.as_deref().map(ObjectKind::Identity),
            ],
        )
    }

    fn to_node(&self) -> Result<ObjectPath, RequestError> {
        let node = match self.kind()? {
            ObjectKind::Template(template) => ObjectPath::new(template),
            ObjectKind::Property(property) => ObjectPath::property(property),
            ObjectKind::Method(method, parameters) => ObjectPath::method(method, parameters),
            ObjectKind::Identity(identity) => ObjectPath::identity(identity),
        };
        Ok(match self.id {
            Some(id) => node.with_id(id),
            None => node,
        })
    }
}

impl ActionSpec {
    fn label(&self) -> String {
        match &self.object {
            Some(object) => format!("action on '{object}'"),
            None => "action".to_string(),
        }
    }

    /// The kind this entry describes
    pub fn kind(&self) -> Result<ActionKind<'_>, RequestError> {
        let entry = self.label();
        if self.parameters.is_some() && self.method.is_none() {
            return Err(invalid(&entry, "'parameters' requires 'method'"));
        }
        if self.value.is_some() != self.set_property.is_some() {
            return Err(invalid(&entry, "'set_property' and 'value' go together"));
        }
        if self.identity_query == Some(false) {
            return Err(invalid(&entry, "'identity_query' must be true"));
        }
        let parameters = self.parameters.as_deref().unwrap_or(&[]);
        single(
            &entry,
            vec![
                self.template.as_deref().map(ActionKind::Template),
                self.query.as_deref().map(ActionKind::Query),
                self.child_query.as_deref().map(ActionKind::ChildQuery),
                self.method.as_deref().map(|m| ActionKind::Method(m, parameters)),
                self.set_property
                    .as_deref()
                    .zip(self.value.as_deref())
                    .map(|(name, value)| ActionKind::SetProperty(name, value)),
                self.identity_query.map(|_| ActionKind::IdentityQuery),
            ],
        )
    }

    fn to_node(&self) -> Result<Action, RequestError> {
        let node = match self.kind()? {
            ActionKind::Template(template) => Action::new(template),
            ActionKind::Query(query) => Action::query_with_props(query),
            ActionKind::ChildQuery(child_query) => Action::query_with_child_props(child_query),
            ActionKind::Method(method, parameters) => Action::method(method, parameters),
            ActionKind::SetProperty(name, value) => Action::set_property(name, value),
            ActionKind::IdentityQuery => Action::identity_query(),
        };
        Ok(match self.id {
            Some(id) => node.with_id(id),
            None => node,
        })
    }
}

impl RequestDescription {
    /// Load a description from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, RequestError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a description from a TOML string
    pub fn from_str(content: &str) -> Result<Self, RequestError> {
        Ok(toml::from_str(content)?)
    }

    /// Build a request using the description's own envelope (or the default)
    pub fn build(&self) -> Result<Builder, RequestError> {
        self.build_with_config(self.envelope.clone().unwrap_or_default())
    }

    /// Build a request with an explicit envelope
    pub fn build_with_config(&self, config: EnvelopeConfig) -> Result<Builder, RequestError> {
        let mut builder = Builder::with_config(config);
        let mut names: HashMap<String, ObjectRef> = HashMap::new();
        names.insert(ROOT_NAME.to_string(), builder.root());

        for spec in &self.objects {
            let parent = lookup(&names, spec.parent.as_deref())?;
            let (added, _) = builder.add_object(spec.to_node()?, parent)?;
            if let Some(name) = &spec.name {
                if names.insert(name.clone(), added).is_some() {
                    return Err(RequestError::DuplicateName { name: name.clone() });
                }
            }
        }

        for spec in &self.actions {
            let object = lookup(&names, spec.object.as_deref())?;
            builder.add_action(spec.to_node()?, object)?;
        }

        Ok(builder)
    }
}

fn lookup(
    names: &HashMap<String, ObjectRef>,
    name: Option<&str>,
) -> Result<Option<ObjectRef>, RequestError> {
    match name {
        None => Ok(None),
        Some(name) => names
            .get(name)
            .copied()
            .map(Some)
            .ok_or_else(|| RequestError::UnknownReference {
                name: name.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    #[test]
    fn test_parse_presets() {
        let desc = RequestDescription::from_str(
            r#"
[[objects]]
name = "web"
property = "Web"

[[objects]]
method = "GetFolderByServerRelativeUrl"
parameters = ['<Parameter Type="String">/docs</Parameter>']

[[actions]]
query = []

[[actions]]
object = "web"
identity_query = true
"#,
        )
        .expect("Should parse");

        assert_eq!(desc.objects.len(), 2);
        assert_eq!(desc.objects[0].kind().unwrap(), ObjectKind::Property("Web"));
        assert!(matches!(
            desc.objects[1].kind().unwrap(),
            ObjectKind::Method("GetFolderByServerRelativeUrl", [p]) if p.contains("/docs")
        ));
        assert_eq!(desc.actions[0].kind().unwrap(), ActionKind::Query(&[]));
        assert_eq!(desc.actions[1].kind().unwrap(), ActionKind::IdentityQuery);
    }

    #[test]
    fn test_build_wires_names() {
        let desc = RequestDescription::from_str(
            r#"
[[objects]]
name = "web"
property = "Web"

[[objects]]
name = "lists"
property = "Lists"

[[objects]]
property = "Title"
parent = "web"

[[actions]]
object = "lists"
template = '<Query Id="{{.ID}}" ObjectPathId="{{.ObjectID}}" />'
"#,
        )
        .expect("Should parse");

        let mut builder = desc.build().expect("Should build");
        let objects = builder.objects();
        assert_eq!(builder.parent_of(objects[3]), Some(objects[1]));

        let compiled = builder.compile();
        assert!(compiled.is_ok());
        assert!(compiled
            .document
            .contains(r#"<Property Id="3" ParentId="1" Name="Title" />"#));
        assert!(compiled
            .document
            .contains(r#"<Query Id="4" ObjectPathId="2" />"#));
    }

    #[test]
    fn test_root_reference_and_preassigned_id() {
        let desc = RequestDescription::from_str(
            r#"
[[objects]]
property = "Site"
parent = "root"
id = 9
"#,
        )
        .expect("Should parse");
        let builder = desc.build().expect("Should build");
        let site = builder.objects()[1];
        assert_eq!(builder.object(site).unwrap().id(), 9);
        assert_eq!(builder.parent_of(site), Some(builder.root()));
    }

    #[test]
    fn test_envelope_section() {
        let desc = RequestDescription::from_str(
            r#"
[envelope]
application_name = "Reports"
"#,
        )
        .expect("Should parse");
        let builder = desc.build().expect("Should build");
        assert_eq!(builder.config().application_name, "Reports");
    }

    #[test]
    fn test_unknown_reference() {
        let desc = RequestDescription::from_str(
            r#"
[[actions]]
object = "missing"
query = []
"#,
        )
        .expect("Should parse");
        assert!(matches!(
            desc.build(),
            Err(RequestError::UnknownReference { name }) if name == "missing"
        ));
    }

    #[test]
    fn test_duplicate_name() {
        let desc = RequestDescription::from_str(
            r#"
[[objects]]
name = "web"
property = "Web"

[[objects]]
name = "web"
property = "Web"
"#,
        )
        .expect("Should parse");
        assert!(matches!(
            desc.build(),
            Err(RequestError::DuplicateName { name }) if name == "web"
        ));
    }

    #[test]
    fn test_root_name_is_reserved() {
        let desc = RequestDescription::from_str(
            r#"
[[objects]]
name = "root"
property = "Web"
"#,
        )
        .expect("Should parse");
        assert!(matches!(desc.build(), Err(RequestError::DuplicateName { .. })));
    }

    #[test]
    fn test_invalid_toml_error() {
        assert!(RequestDescription::from_str("[[objects]\nnope").is_err());
    }

    #[test]
    fn test_identity_query_false_is_rejected() {
        let desc = RequestDescription::from_str("[[actions]]\nidentity_query = false\n")
            .expect("Should parse");
        assert!(matches!(
            desc.build(),
            Err(RequestError::InvalidEntry { reason, .. }) if reason.contains("must be true")
        ));
    }

    #[test]
    fn test_several_kinds_are_rejected() {
        let desc = RequestDescription::from_str(
            r#"
[[objects]]
name = "web"
property = "Web"
method = "GetWeb"
"#,
        )
        .expect("Should parse");
        assert!(matches!(
            desc.build(),
            Err(RequestError::InvalidEntry { entry, reason })
                if entry == "object 'web'" && reason == "more than one kind given"
        ));
    }

    #[test]
    fn test_entry_without_kind_is_rejected() {
        let desc = RequestDescription::from_str("[[actions]]\nobject = \"root\"\n")
            .expect("Should parse");
        assert!(matches!(
            desc.build(),
            Err(RequestError::InvalidEntry { reason, .. }) if reason == "no kind given"
        ));
    }

    #[test]
    fn test_value_without_set_property_is_rejected() {
        let desc = RequestDescription::from_str(
            r#"
[[actions]]
query = []
value = '<Parameter Type="String">x</Parameter>'
"#,
        )
        .expect("Should parse");
        assert!(matches!(desc.build(), Err(RequestError::InvalidEntry { .. })));
    }

    #[test]
    fn test_unknown_key_fails_to_parse() {
        let result = RequestDescription::from_str("[[objects]]\nproperty = \"Web\"\nparam = 1\n");
        assert!(matches!(result, Err(RequestError::ParseError(_))));
    }
}
