use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum ChunkviewError {
    IoError(std::io::Error),
    /// The legacy id mapping resource is unusable as a whole.
    MappingError(String),
    ConfigError(String),
    NbtError(String),
}

impl fmt::Display for ChunkviewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkviewError::IoError(err) => write!(f, "IO error: {}", err),
            ChunkviewError::MappingError(msg) => write!(f, "Mapping error: {}", msg),
            ChunkviewError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            ChunkviewError::NbtError(msg) => write!(f, "NBT error: {}", msg),
        }
    }
}

impl Error for ChunkviewError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ChunkviewError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ChunkviewError {
    fn from(err: std::io::Error) -> Self {
        ChunkviewError::IoError(err)
    }
}

impl From<serde_json::Error> for ChunkviewError {
    fn from(err: serde_json::Error) -> Self {
        ChunkviewError::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_io_error_keeps_source() {
        let err: ChunkviewError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "block_name_to_id.txt").into();
        assert_matches!(err, ChunkviewError::IoError(_));
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("IO error"));
    }

    #[test]
    fn test_json_error_is_config_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ChunkviewError = json_err.into();
        assert_matches!(err, ChunkviewError::ConfigError(_));
        assert!(err.source().is_none());
    }
}
