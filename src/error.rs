use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A prefixed global-module reference could not be located.
    #[error("cannot resolve: '{0}'")]
    Resolution(String),

    /// A metadata file was found but could not be parsed.
    #[error("invalid metadata in {}: {source}", path.display())]
    MetadataParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The export behind an env could not be loaded.
    #[error("cannot load '{path}': {reason}")]
    Load { path: String, reason: String },

    /// The export ran and reported a failure.
    #[error("invocation of '{name}' failed: {reason}")]
    Invocation { name: String, reason: String },

    #[error("Module already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

impl Error {
    pub fn load(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Load {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True for errors that abort env creation rather than degrade it.
    pub fn is_resolution(&self) -> bool {
        matches!(self, Error::Resolution(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
