//! Declarative generator settings.
//!
//! Settings cover the data part of [`GeneratorOptions`]: documents, servers and
//! the boolean switches. Selectors and filters stay programmatic. Values are
//! read from `SWAGGEN_*` environment variables first, then from a TOML file.

use std::path::Path;

use confique::Config;
use serde::Deserialize;
use swaggen_core::openapi::{Info, Server};

use crate::error::Result;
use crate::options::GeneratorOptions;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocumentSettings {
    pub name: String,
    pub title: String,
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Config)]
pub struct GeneratorSettings {
    #[config(default = [])]
    pub documents: Vec<DocumentSettings>,

    #[config(default = [])]
    pub servers: Vec<ServerSettings>,

    #[config(env = "SWAGGEN_IGNORE_OBSOLETE_ACTIONS", default = false)]
    pub ignore_obsolete_actions: bool,

    #[config(env = "SWAGGEN_DESCRIBE_ALL_PARAMETERS_IN_CAMEL_CASE", default = false)]
    pub describe_all_parameters_in_camel_case: bool,

    #[config(env = "SWAGGEN_INFER_SECURITY_SCHEMES", default = false)]
    pub infer_security_schemes: bool,

    #[config(nested)]
    pub schema: SchemaSettings,
}

/// `[schema]` table
#[derive(Debug, Clone, Config)]
pub struct SchemaSettings {
    #[config(env = "SWAGGEN_USE_INLINE_DEFINITIONS_FOR_ENUMS", default = false)]
    pub use_inline_definitions_for_enums: bool,

    #[config(env = "SWAGGEN_IGNORE_OBSOLETE_PROPERTIES", default = false)]
    pub ignore_obsolete_properties: bool,

    #[config(env = "SWAGGEN_USE_ALL_OF_FOR_INHERITANCE", default = false)]
    pub use_all_of_for_inheritance: bool,

    #[config(env = "SWAGGEN_USE_ONE_OF_FOR_POLYMORPHISM", default = false)]
    pub use_one_of_for_polymorphism: bool,

    #[config(env = "SWAGGEN_USE_ALL_OF_TO_EXTEND_REFERENCE_SCHEMAS", default = false)]
    pub use_all_of_to_extend_reference_schemas: bool,

    #[config(env = "SWAGGEN_SUPPORT_NON_NULLABLE_REFERENCE_TYPES", default = false)]
    pub support_non_nullable_reference_types: bool,

    #[config(env = "SWAGGEN_NON_NULLABLE_REFERENCE_TYPES_AS_REQUIRED", default = false)]
    pub non_nullable_reference_types_as_required: bool,
}

impl GeneratorSettings {
    /// Load settings from the environment and an optional TOML file.
    ///
    /// A missing file is not an error; every value has a default.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be parsed or a value has the wrong type.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::builder().env().file(path.as_ref()).load()?)
    }
}

impl From<&DocumentSettings> for Info {
    fn from(document: &DocumentSettings) -> Self {
        let mut info = Self::new(document.title.clone(), document.version.clone());
        info.description.clone_from(&document.description);
        info
    }
}

impl From<&ServerSettings> for Server {
    fn from(server: &ServerSettings) -> Self {
        let mut result = Self::new(server.url.clone());
        result.description.clone_from(&server.description);
        result
    }
}

impl GeneratorOptions {
    #[must_use]
    pub fn from_settings(settings: &GeneratorSettings) -> Self {
        Self::default().with_settings(settings)
    }

    /// Register the configured documents and servers and turn on the enabled
    /// switches. Switches already on stay on.
    #[must_use]
    pub fn with_settings(mut self, settings: &GeneratorSettings) -> Self {
        for document in &settings.documents {
            self = self.swagger_doc(document.name.clone(), Info::from(document));
        }
        self.servers
            .extend(settings.servers.iter().map(Server::from));

        self.ignore_obsolete_actions |= settings.ignore_obsolete_actions;
        self.describe_all_parameters_in_camel_case |=
            settings.describe_all_parameters_in_camel_case;
        self.infer_security_schemes |= settings.infer_security_schemes;

        let schema = &settings.schema;
        let generator = &mut self.schema_generator;
        generator.use_inline_definitions_for_enums |= schema.use_inline_definitions_for_enums;
        generator.ignore_obsolete_properties |= schema.ignore_obsolete_properties;
        generator.use_all_of_for_inheritance |= schema.use_all_of_for_inheritance;
        generator.use_one_of_for_polymorphism |= schema.use_one_of_for_polymorphism;
        generator.use_all_of_to_extend_reference_schemas |=
            schema.use_all_of_to_extend_reference_schemas;
        generator.support_non_nullable_reference_types |=
            schema.support_non_nullable_reference_types;
        generator.non_nullable_reference_types_as_required |=
            schema.non_nullable_reference_types_as_required;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn settings_file(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_documents_servers_and_flags() {
        let file = settings_file(
            r#"
describe_all_parameters_in_camel_case = true

[[documents]]
name = "v1"
title = "Test API"
version = "V1"
description = "Public surface"

[[documents]]
name = "admin"
title = "Admin API"
version = "2"

[[servers]]
url = "https://api.example.com"

[schema]
use_all_of_for_inheritance = true
non_nullable_reference_types_as_required = true
"#,
        );

        let settings = GeneratorSettings::load(file.path()).unwrap();
        let options = GeneratorOptions::from_settings(&settings);

        assert_eq!(options.documents.keys().collect::<Vec<_>>(), vec!["v1", "admin"]);
        assert_eq!(options.documents["v1"].title, "Test API");
        assert_eq!(options.documents["v1"].description.as_deref(), Some("Public surface"));
        assert_eq!(options.servers, vec![Server::new("https://api.example.com")]);
        assert!(options.describe_all_parameters_in_camel_case);
        assert!(!options.ignore_obsolete_actions);
        assert!(options.schema_generator.use_all_of_for_inheritance);
        assert!(options.schema_generator.non_nullable_reference_types_as_required);
        assert!(!options.schema_generator.use_one_of_for_polymorphism);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();

        let settings = GeneratorSettings::load(dir.path().join("swaggen.toml")).unwrap();

        assert!(settings.documents.is_empty());
        assert!(!settings.schema.use_inline_definitions_for_enums);
    }

    #[test]
    fn settings_keep_programmatic_switches() {
        let file = settings_file("[[documents]]\nname = \"v1\"\ntitle = \"T\"\nversion = \"1\"\n");
        let settings = GeneratorSettings::load(file.path()).unwrap();

        let options = GeneratorOptions::default()
            .ignore_obsolete_actions()
            .with_settings(&settings);

        assert!(options.ignore_obsolete_actions);
        assert!(options.documents.contains_key("v1"));
    }

    #[test]
    fn malformed_file_is_a_settings_error() {
        let file = settings_file("documents = 3\n");

        let err = GeneratorSettings::load(file.path()).unwrap_err();

        assert!(err.to_string().starts_with("failed to load generator settings"));
    }
}
