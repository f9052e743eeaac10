use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Errors raised while fetching container details from the engine.
///
/// Cloneable because a single fetch result is shared by every reader of
/// [`ContainerEvent::container`](crate::domain::event::ContainerEvent::container).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InspectError {
    #[error("no container inspector is available")]
    Unavailable,

    #[error("container not found: {id}")]
    NotFound { id: String },

    #[error("event has no subject id: {0}")]
    MissingSubject(String),

    #[error("inspect request failed: {0}")]
    Request(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A raw record is missing a field every event must carry.
    #[error("malformed event: missing or invalid field `{field}`")]
    MalformedEvent { field: &'static str },

    /// Fixture resolution reached a fixed point with demand still unmet.
    #[error("cannot resolve fixture dependencies: {}", pending.join(", "))]
    UnresolvableDependency { pending: Vec<String> },

    #[error("fixture `{name}` failed to start: {source:#}")]
    FixtureStartup {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("argument `{name}`: {reason}")]
    Argument { name: String, reason: String },

    #[error(transparent)]
    Inspect(#[from] InspectError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("connection error: {0}")]
    Connection(String),
}

pub type Result<T> = std::result::Result<T, Error>;
