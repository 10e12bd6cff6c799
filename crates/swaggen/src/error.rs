use std::fmt;

use thiserror::Error;

/// Error raised by a user-supplied filter
pub type FilterError = Box<dyn std::error::Error + Send + Sync>;

/// Filter category, reported when a filter fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Schema,
    Parameter,
    RequestBody,
    Operation,
    Document,
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Schema => "schema",
            Self::Parameter => "parameter",
            Self::RequestBody => "request body",
            Self::Operation => "operation",
            Self::Document => "document",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Unknown Swagger document - \"{name}\". Known Swagger documents: {}", quoted_list(.known))]
    UnknownDocument { name: String, known: Vec<String> },

    #[error("{0}")]
    Generation(String),

    #[error(
        "Conflicting schemaIds: Identical schemaIds \"{schema_id}\" detected for types {existing} and {conflicting}. Use a custom schema id selector to disambiguate them"
    )]
    SchemaIdConflict {
        schema_id: String,
        existing: String,
        conflicting: String,
    },

    #[error("{kind} filter failed: {source}")]
    Filter {
        kind: FilterKind,
        #[source]
        source: FilterError,
    },

    #[error("failed to load generator settings: {0}")]
    Settings(#[from] confique::Error),
}

impl GeneratorError {
    pub(crate) fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    pub(crate) fn filter(kind: FilterKind) -> impl FnOnce(FilterError) -> Self {
        move |source| Self::Filter { kind, source }
    }
}

fn quoted_list(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("\"{name}\""))
        .collect::<Vec<_>>()
        .join(",")
}

pub type Result<T, E = GeneratorError> = std::result::Result<T, E>;
