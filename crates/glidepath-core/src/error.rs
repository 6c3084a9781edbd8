use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Listener failed: {0}")]
    Listener(String),

    #[error("'{0}' is a built-in event and cannot be used as a custom event name")]
    ReservedEvent(String),
}

pub type Result<T> = std::result::Result<T, Error>;
