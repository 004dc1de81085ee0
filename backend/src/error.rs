use thiserror::Error;

#[derive(Error, Debug)]
pub enum OracleError {
    #[error("{provider}: unsupported symbol {symbol}")]
    UnsupportedSymbol {
        provider: &'static str,
        symbol: String,
    },

    #[error("{provider}: request failed: {message}")]
    Transport {
        provider: &'static str,
        message: String,
    },

    #[error("{provider}: upstream returned HTTP {status}")]
    HttpStatus {
        provider: &'static str,
        status: u16,
    },

    #[error("{provider}: unexpected response: {message}")]
    Decode {
        provider: &'static str,
        message: String,
    },

    #[error("both sources failed: {first} | {second}")]
    BothSourcesFailed {
        first: Box<OracleError>,
        second: Box<OracleError>,
    },

    #[error("failed to write quote: {0}")]
    Output(#[from] serde_json::Error),
}

impl OracleError {
    /// Classify a reqwest failure: status errors keep their code, everything
    /// else (connect, timeout, body read) is a transport failure.
    pub fn from_reqwest(provider: &'static str, err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => OracleError::HttpStatus {
                provider,
                status: status.as_u16(),
            },
            None => OracleError::Transport {
                provider,
                message: err.to_string(),
            },
        }
    }

    pub fn decode(provider: &'static str, message: impl Into<String>) -> Self {
        OracleError::Decode {
            provider,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OracleError>;
