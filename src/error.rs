//! Unified client error model.
//! Every fallible operation in the crate reports one of these variants. The transport
//! itself never returns them directly: it produces an `ApiResponse`, which converts into
//! a `ClientError` only when a caller asks for `Result` semantics.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientError {
    /// Connection refused, DNS failure, aborted stream.
    #[error("{message}")]
    Transport { message: String },
    /// Non-2xx response; `status` is absent when the failure came from a result
    /// value that no longer carries one.
    #[error("{message}")]
    Api { status: Option<u16>, message: String },
    #[error("{message}")]
    Decode { message: String },
    #[error("{message}")]
    Storage { message: String },
    #[error("{message}")]
    Config { message: String },
}

impl ClientError {
    pub fn code_str(&self) -> &'static str {
        match self {
            ClientError::Transport { .. } => "transport",
            ClientError::Api { .. } => "api",
            ClientError::Decode { .. } => "decode",
            ClientError::Storage { .. } => "storage",
            ClientError::Config { .. } => "config",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ClientError::Transport { message }
            | ClientError::Api { message, .. }
            | ClientError::Decode { message }
            | ClientError::Storage { message }
            | ClientError::Config { message } => message.as_str(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => *status,
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool { matches!(self.status(), Some(401) | Some(403)) }

    pub fn transport<S: Into<String>>(msg: S) -> Self { ClientError::Transport { message: msg.into() } }
    pub fn api<S: Into<String>>(status: Option<u16>, msg: S) -> Self { ClientError::Api { status, message: msg.into() } }
    pub fn decode<S: Into<String>>(msg: S) -> Self { ClientError::Decode { message: msg.into() } }
    pub fn storage<S: Into<String>>(msg: S) -> Self { ClientError::Storage { message: msg.into() } }
    pub fn config<S: Into<String>>(msg: S) -> Self { ClientError::Config { message: msg.into() } }
}

pub type ClientResult<T> = Result<T, ClientError>;

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self { ClientError::storage(err.to_string()) }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self { ClientError::decode(err.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_the_bare_message() {
        let e = ClientError::api(Some(401), "Invalid credentials");
        assert_eq!(e.to_string(), "Invalid credentials");
        assert_eq!(e.code_str(), "api");
        assert!(e.is_unauthorized());
    }

    #[test]
    fn status_only_on_api_errors() {
        assert_eq!(ClientError::transport("refused").status(), None);
        assert_eq!(ClientError::api(Some(500), "boom").status(), Some(500));
        assert!(!ClientError::api(None, "x").is_unauthorized());
    }

    #[test]
    fn serializes_with_type_tag() {
        let v = serde_json::to_value(ClientError::storage("disk full")).unwrap();
        assert_eq!(v["type"], "storage");
        assert_eq!(v["message"], "disk full");
    }
}
