use std::error::Error;
use std::fmt;

/// Custom Error and Result types to unify errors from all sources.
pub type CardResult<T> = Result<T, CardError>;

#[derive(Debug)]
pub enum CardError {
    // Request is missing its `handle` query parameter.
    MissingHandle,
    // Transport-level failure (connection, timeout, body read).
    Http(String),
    // The user/show endpoint answered with a non-2xx status.
    Api(u16),
    // A background or badge detail page answered with a non-2xx status.
    Page { page: &'static str, status: u16 },
    Asset { status: u16, url: String },
    NotFound(String),
    Parse(String),
    Render(String),
    Config(String),
}

impl fmt::Display for CardError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CardError::MissingHandle => write!(f, "missing ?handle=..."),
            CardError::Http(s) => write!(f, "HTTP Error: {}", s),
            CardError::Api(status) => write!(f, "solved.ac API error {}", status),
            CardError::Page { page, status } => write!(f, "{} page fetch error {}", page, status),
            CardError::Asset { status, url } => {
                write!(f, "asset fetch failed ({}): {}", status, url)
            }
            CardError::NotFound(s) => write!(f, "{}", s),
            CardError::Parse(s) => write!(f, "Parse Error: {}", s),
            CardError::Render(s) => write!(f, "Render Error: {}", s),
            CardError::Config(s) => write!(f, "Config Error: {}", s),
        }
    }
}

impl Error for CardError {}

impl From<reqwest::Error> for CardError {
    fn from(error: reqwest::Error) -> Self {
        CardError::Http(error.to_string())
    }
}

impl From<serde_json::Error> for CardError {
    fn from(error: serde_json::Error) -> Self {
        CardError::Parse(error.to_string())
    }
}

impl From<minijinja::Error> for CardError {
    fn from(error: minijinja::Error) -> Self {
        CardError::Render(error.to_string())
    }
}

impl From<figment::Error> for CardError {
    fn from(error: figment::Error) -> Self {
        CardError::Config(error.to_string())
    }
}
