use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{key} not found in environment or .env file")]
    MissingSetting { key: String },
}

pub type Result<T> = std::result::Result<T, Error>;
