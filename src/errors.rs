#[non_exhaustive]
#[derive(Debug)]
pub enum Error {
    /// Got an invalid parameter value in a function
    InvalidParameter(String),
    /// A shared pairwise category was requested with a cutoff smaller than
    /// the one it was created with
    IncompatibleCutoff {
        /// cutoff the shared category was created with
        current: f64,
        /// cutoff in the incompatible request
        requested: f64,
    },
    /// Neighbor data was accessed before the category was set up
    NotReady(String),
    /// An analysis requiring a cutoff was built on a category without one
    MissingCutoff(String),
    /// Error in a type selection pattern
    Selection(String),
    /// Error while serializing/deserializing data
    Json(serde_json::Error),
    /// Error while writing analysis output
    Io(std::io::Error),
    /// Error used for failed internal consistency checks
    Internal(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidParameter(e) => write!(f, "invalid parameter: {}", e),
            Error::IncompatibleCutoff { current, requested } => write!(
                f, "incompatible cutoffs: already set to {}, not {}", current, requested
            ),
            Error::NotReady(e) => write!(f, "neighbor list not built yet: {}", e),
            Error::MissingCutoff(e) => write!(f, "missing cutoff: {}", e),
            Error::Selection(e) => write!(f, "selection error: {}", e),
            Error::Json(e) => write!(f, "json error: {}", e),
            Error::Io(e) => write!(f, "i/o error: {}", e),
            Error::Internal(e) => write!(f, "internal error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidParameter(_) |
            Error::IncompatibleCutoff { .. } |
            Error::NotReady(_) |
            Error::MissingCutoff(_) |
            Error::Selection(_) |
            Error::Internal(_) => None,
            Error::Json(e) => Some(e),
            Error::Io(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Error {
        Error::Json(error)
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Error {
        Error::Io(error)
    }
}

impl From<regex::Error> for Error {
    fn from(error: regex::Error) -> Error {
        Error::Selection(error.to_string())
    }
}
