use thiserror::Error;

#[derive(Error, Debug)]
pub enum DrrError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid volume: {0}")]
    Volume(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DrrError>;
