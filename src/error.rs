use thiserror::Error;
use crate::body::GroupId;

/// Errors raised while configuring or starting an asteroid field
///
/// Nothing in here is produced while the workers are cycling, a running field has no error path
#[derive(Error, Debug)]
pub enum FieldError {
    #[error("body {index} references lod group {group} but the catalog holds {available} groups")]
    UnknownLodGroup { index: usize, group: GroupId, available: usize },

    #[error("cannot generate bodies from an empty lod catalog")]
    EmptyCatalog,

    #[error("invalid simulation parameters: {0}")]
    InvalidParams(String),

    #[error("failed to spawn worker thread {index}: {source}")]
    Spawn {
        index: usize,
        #[source]
        source: std::io::Error,
    },
}
