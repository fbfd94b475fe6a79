//! Classifies `Box<dyn Error>` values from the gateway trait boundary.
//!
//! The classification only feeds logging; every gateway failure still
//! degrades to a sentinel in `client`. With the `gateway-errors` feature the
//! typed `ferment_gateway::error::GatewayError` is downcast for a precise
//! answer, otherwise string heuristics are used.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayFault {
    Timeout,
    Unreachable,
    Rejected,
    Malformed,
    Other,
}

impl fmt::Display for GatewayFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GatewayFault::Timeout => "timeout",
            GatewayFault::Unreachable => "unreachable",
            GatewayFault::Rejected => "rejected",
            GatewayFault::Malformed => "malformed",
            GatewayFault::Other => "other",
        })
    }
}

pub fn classify(e: &(dyn std::error::Error + 'static)) -> GatewayFault {
    #[cfg(feature = "gateway-errors")]
    {
        use ferment_gateway::error::GatewayError;
        if let Some(gw) = e.downcast_ref::<GatewayError>() {
            return match gw {
                GatewayError::Timeout => GatewayFault::Timeout,
                GatewayError::Transport(_) | GatewayError::Io(_) | GatewayError::Simulated(_) => {
                    GatewayFault::Unreachable
                }
                GatewayError::Status(_) => GatewayFault::Rejected,
                GatewayError::Decode(_) => GatewayFault::Malformed,
            };
        }
    }

    // Fallback: string-based detection
    let s = e.to_string().to_lowercase();
    if s.contains("timeout") || s.contains("timed out") {
        GatewayFault::Timeout
    } else if s.contains("refused") || s.contains("unreachable") || s.contains("dns") {
        GatewayFault::Unreachable
    } else if s.contains("decode") || s.contains("json") {
        GatewayFault::Malformed
    } else {
        GatewayFault::Other
    }
}
