use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Serenity(#[from] serenity::Error),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    Channel(#[from] mirror_channels::Error),

    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }

    /// HTTP status of a failed REST or download call, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Serenity(serenity::Error::Http(e)) => e.status_code().map(|s| s.as_u16()),
            Self::Reqwest(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Convert into the platform-neutral error, naming the failed operation.
    /// A 404 from Discord becomes `NotFound`.
    pub fn into_channel_error(self, context: &str) -> mirror_channels::Error {
        if self.status() == Some(404) {
            return mirror_channels::Error::not_found(context);
        }
        match self {
            Self::Channel(e) => e,
            other => mirror_channels::Error::external(context, other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
