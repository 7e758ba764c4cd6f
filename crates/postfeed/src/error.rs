use postfeed_core::post::ValidationErrors;

#[derive(thiserror::Error, Debug, serde::Deserialize, serde::Serialize)]
pub enum Error {
    #[error("Generic {0}")]
    Generic(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid post: {0}")]
    Validation(#[from] ValidationErrors),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}
