use std::fmt;

// === AuthError ===

/// Errors related to identity resolution and sign-in/sign-out.
#[derive(Debug)]
pub enum AuthError {
    /// A network error occurred while talking to the auth endpoint.
    NetworkError(String),
    /// The auth endpoint returned an error response.
    ApiError(String),
    /// The auth response could not be decoded.
    DecodeError(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::NetworkError(msg) => write!(f, "Auth network error: {}", msg),
            AuthError::ApiError(msg) => write!(f, "Auth API error: {}", msg),
            AuthError::DecodeError(msg) => write!(f, "Auth decode error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

// === TableError ===

/// Errors related to remote table access (select/insert/delete).
#[derive(Debug)]
pub enum TableError {
    /// A network error occurred while talking to the table endpoint.
    NetworkError(String),
    /// The table endpoint returned an error response.
    ApiError(String),
    /// The response body could not be decoded into records.
    DecodeError(String),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::NetworkError(msg) => write!(f, "Table network error: {}", msg),
            TableError::ApiError(msg) => write!(f, "Table API error: {}", msg),
            TableError::DecodeError(msg) => write!(f, "Table decode error: {}", msg),
        }
    }
}

impl std::error::Error for TableError {}

// === RealtimeError ===

/// Errors related to the push-notification channel.
#[derive(Debug)]
pub enum RealtimeError {
    /// Establishing the channel connection failed.
    ConnectError(String),
    /// The peer sent a message that does not fit the wire protocol.
    ProtocolError(String),
    /// The channel was closed by the peer.
    ChannelClosed,
}

impl fmt::Display for RealtimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RealtimeError::ConnectError(msg) => write!(f, "Realtime connect error: {}", msg),
            RealtimeError::ProtocolError(msg) => write!(f, "Realtime protocol error: {}", msg),
            RealtimeError::ChannelClosed => write!(f, "Realtime channel closed"),
        }
    }
}

impl std::error::Error for RealtimeError {}

// === CreateError ===

/// Errors surfaced to the user when creating a bookmark.
#[derive(Debug)]
pub enum CreateError {
    /// No identity is signed in.
    NotSignedIn,
    /// The title field is empty.
    EmptyTitle,
    /// The url field is empty.
    EmptyUrl,
    /// The store rejected the insert.
    Rejected(String),
}

impl fmt::Display for CreateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreateError::NotSignedIn => write!(f, "Cannot add bookmark: not signed in"),
            CreateError::EmptyTitle => write!(f, "Cannot add bookmark: title is empty"),
            CreateError::EmptyUrl => write!(f, "Cannot add bookmark: url is empty"),
            CreateError::Rejected(msg) => write!(f, "Error adding bookmark: {}", msg),
        }
    }
}

impl std::error::Error for CreateError {}

// === ConfigError ===

/// Errors related to loading client configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// An I/O error occurred while reading the config file.
    IoError(String),
    /// The config file could not be parsed.
    SerializationError(String),
    /// An environment override holds an unusable value.
    InvalidOverride(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "Config I/O error: {}", msg),
            ConfigError::SerializationError(msg) => {
                write!(f, "Config serialization error: {}", msg)
            }
            ConfigError::InvalidOverride(msg) => {
                write!(f, "Invalid config override: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
