pub mod normalizer;
pub mod processor;

pub use normalizer::*;
pub use processor::*;

use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}
