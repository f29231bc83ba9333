//! Error types for loading the dataset and answering queries.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The dataset could not be loaded. Always fatal: there is no partial load.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read dataset '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed dataset: {0}")]
    Csv(#[from] csv::Error),
    #[error("dataset is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// A query could not produce a value for the requested selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("no {entity} named '{name}' in the dataset")]
    EntityNotFound { entity: &'static str, name: String },
    #[error("{what} is undefined over zero rows")]
    DivisionUndefined { what: &'static str },
}
