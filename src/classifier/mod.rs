pub mod client;
pub mod fallback;
pub mod parser;
pub mod prompt;
pub mod types;

pub use client::*;
pub use fallback::*;
pub use parser::*;
pub use prompt::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Classification service is not reachable at {0}")]
    Connection(String),

    #[error("Classification service returned error (status {status}): {body}")]
    Service { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Malformed classification response: {0}")]
    MalformedResponse(String),

    #[error("JSON parsing error: {0}")]
    JsonParsing(String),
}
