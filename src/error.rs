use std::path::PathBuf;

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the application
#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),
    ManifestError { file: PathBuf, message: String },
    RuleLookup { action: String, message: String },
    SerializationError(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::ManifestError { file, message } => {
                write!(f, "invalid route manifest {}: {}", file.display(), message)
            }
            Error::RuleLookup { action, message } => {
                write!(f, "cannot read validation rules of {}: {}", action, message)
            }
            Error::SerializationError(msg) => write!(f, "serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(format!("JSON: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::SerializationError(format!("YAML: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = Error::ManifestError {
            file: PathBuf::from("routes.json"),
            message: "expected a list".to_string(),
        };
        assert_eq!(err.to_string(), "invalid route manifest routes.json: expected a list");

        let err = Error::RuleLookup {
            action: "UserController@store".to_string(),
            message: "rules must be a mapping".to_string(),
        };
        assert!(err.to_string().contains("UserController@store"));
    }

    #[test]
    fn test_io_error_has_source() {
        use std::error::Error as _;
        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(err.source().is_some());
        assert!(Error::SerializationError("x".into()).source().is_none());
    }
}
