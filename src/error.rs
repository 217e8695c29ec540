use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum VeoError {
    ConfigError(String),
    HistoryWrite {
        path: PathBuf,
        source: std::io::Error,
    },
    IoError(std::io::Error),
    JsonError(serde_json::Error),
}

impl fmt::Display for VeoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VeoError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            VeoError::HistoryWrite { path, source } => {
                write!(f, "Failed to write history to {}: {}", path.display(), source)
            }
            VeoError::IoError(e) => write!(f, "IO error: {}", e),
            VeoError::JsonError(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for VeoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VeoError::HistoryWrite { source, .. } => Some(source),
            VeoError::IoError(e) => Some(e),
            VeoError::JsonError(e) => Some(e),
            VeoError::ConfigError(_) => None,
        }
    }
}

impl From<std::io::Error> for VeoError {
    fn from(err: std::io::Error) -> Self {
        VeoError::IoError(err)
    }
}

impl From<serde_json::Error> for VeoError {
    fn from(err: serde_json::Error) -> Self {
        VeoError::JsonError(err)
    }
}

pub type Result<T> = std::result::Result<T, VeoError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io;

    #[test]
    fn test_history_write_names_the_file() {
        let err = VeoError::HistoryWrite {
            path: PathBuf::from("/data/veo_memory.json"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to write history to /data/veo_memory.json: denied"
        );
        assert!(err.source().is_some());
    }
}
