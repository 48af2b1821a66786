use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum TrendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Archive error: failed to unpack {}: {source}", .path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl TrendError {
    pub(crate) fn archive(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TrendError::Archive {
            path: path.into(),
            source,
        }
    }
}
