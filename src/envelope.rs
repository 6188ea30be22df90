//! Request envelope: configuration and document assembly
//!
//! The envelope wraps the rendered action and object-path fragments:
//!
//! ```text
//! <Request xmlns="..." SchemaVersion="15.0.0.0" LibraryVersion="16.0.0.0" ApplicationName="...">
//!   <Actions>...</Actions>
//!   <ObjectPaths>...</ObjectPaths>
//! </Request>
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::template::trim_multiline;

/// Client query protocol namespace
pub const PROTOCOL_NAMESPACE: &str = "http://schemas.microsoft.com/sharepoint/clientquery/2009";
pub const SCHEMA_VERSION: &str = "15.0.0.0";
pub const LIBRARY_VERSION: &str = "16.0.0.0";
pub const APPLICATION_NAME: &str = "CsomBuilder";

/// Errors that can occur when loading an envelope configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read envelope config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse envelope config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Attributes of the `<Request>` element
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvelopeConfig {
    /// XML namespace of the request
    pub namespace: String,
    pub schema_version: String,
    pub library_version: String,
    /// Client application name reported to the server
    pub application_name: String,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            namespace: PROTOCOL_NAMESPACE.to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            library_version: LIBRARY_VERSION.to_string(),
            application_name: APPLICATION_NAME.to_string(),
        }
    }
}

impl EnvelopeConfig {
    /// Create a configuration with the protocol defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string; missing keys keep their defaults
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Set the application name
    pub fn with_application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = name.into();
        self
    }

    /// Set the schema version
    pub fn with_schema_version(mut self, version: impl Into<String>) -> Self {
        self.schema_version = version.into();
        self
    }

    /// Set the library version
    pub fn with_library_version(mut self, version: impl Into<String>) -> Self {
        self.library_version = version.into();
        self
    }

    /// Set the XML namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Wrap rendered fragments in the request envelope
    ///
    /// Actions precede object paths. The result is whitespace-normalized.
    pub fn assemble(&self, actions: &str, objects: &str) -> String {
        trim_multiline(&format!(
            r#"
            <Request xmlns="{}" SchemaVersion="{}" LibraryVersion="{}" ApplicationName="{}">
                <Actions>{}</Actions>
                <ObjectPaths>{}</ObjectPaths>
            </Request>
            "#,
            self.namespace,
            self.schema_version,
            self.library_version,
            self.application_name,
            actions,
            objects
        ))
    }
}
