use serde::{Deserialize, Serialize};

/// Outcome of a data operation as observed by a screen.
///
/// `Loading` carries an explicit flag so producers can signal both the start and the end of
/// a loading phase; `Success` and `Error` are the terminal payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Resource<T> {
    Loading { is_loading: bool },
    Success(T),
    Error { message: String },
}

impl<T> Resource<T> {
    pub fn loading(is_loading: bool) -> Self {
        Self::Loading { is_loading }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { is_loading: true })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Error { message } => Some(message),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resource<U> {
        match self {
            Self::Loading { is_loading } => Resource::Loading { is_loading },
            Self::Success(data) => Resource::Success(f(data)),
            Self::Error { message } => Resource::Error { message },
        }
    }
}
