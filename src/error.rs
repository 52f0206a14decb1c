use crate::failure::RemoteFailure;

pub type WanderResult<T> = Result<T, WanderError>;

#[derive(thiserror::Error, Debug)]
pub enum WanderError {
    #[error("decode error: {0}")]
    Decode(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("remote call error: {0}")]
    Remote(RemoteFailure),

    #[error("missing result: {0}")]
    MissingResult(String),

    #[error("timed out after {polls} polls ({elapsed_secs}s of waiting)")]
    Timeout { polls: u32, elapsed_secs: u64 },

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WanderError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote(RemoteFailure::message(msg))
    }

    pub fn missing_result(msg: impl Into<String>) -> Self {
        Self::MissingResult(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for WanderError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

impl From<reqwest::Error> for WanderError {
    fn from(err: reqwest::Error) -> Self {
        Self::Remote(RemoteFailure::transport(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            WanderError::decode("x").to_string().contains("decode error:")
        );
        assert!(
            WanderError::render("x").to_string().contains("render error:")
        );
        assert!(
            WanderError::remote("x")
                .to_string()
                .contains("remote call error:")
        );
        assert!(
            WanderError::missing_result("x")
                .to_string()
                .contains("missing result:")
        );
    }

    #[test]
    fn timeout_reports_poll_count() {
        let err = WanderError::Timeout {
            polls: 120,
            elapsed_secs: 600,
        };
        assert!(err.to_string().contains("120 polls"));
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = WanderError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
