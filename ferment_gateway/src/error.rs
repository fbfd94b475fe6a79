use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway transport: {0}")]
    Transport(String),
    #[error("gateway request timeout")]
    Timeout,
    #[error("gateway returned HTTP {0}")]
    Status(u16),
    #[error("gateway response decode: {0}")]
    Decode(String),
    #[error("simulated outage on circuit {0}")]
    Simulated(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(feature = "http")]
impl From<ureq::Error> for GatewayError {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::Status(code, _) => GatewayError::Status(code),
            ureq::Error::Transport(t) => {
                let msg = t.to_string();
                if msg.to_ascii_lowercase().contains("timed out") {
                    GatewayError::Timeout
                } else {
                    GatewayError::Transport(msg)
                }
            }
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        GatewayError::Decode(e.to_string())
    }
}
