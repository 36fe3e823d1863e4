//! Error handling for the moros engine
//!
//! Fatal errors (bad configuration, unusable discovery transport) abort the
//! scan. Connection-level outcomes during scanning and banner grabbing are
//! never represented here; they fold into "closed" or "no banner" results.

use thiserror::Error;

/// Main error type for scan operations
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Port range error: {0}")]
    PortRange(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Discovery transport error: {0}")]
    Transport(String),

    #[error("Vulnerability lookup failed: {0}")]
    Correlation(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Timeout error")]
    Timeout,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<std::net::AddrParseError> for ScanError {
    fn from(e: std::net::AddrParseError) -> Self {
        ScanError::InvalidTarget(e.to_string())
    }
}

impl From<tokio::time::error::Elapsed> for ScanError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        ScanError::Timeout
    }
}

impl ScanError {
    /// Fatal errors abort the whole scan before or during discovery;
    /// everything else is isolated to the operation that produced it.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ScanError::InvalidTarget(_)
                | ScanError::PortRange(_)
                | ScanError::Config(_)
                | ScanError::Transport(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_are_fatal() {
        assert!(ScanError::InvalidTarget("bad".into()).is_fatal());
        assert!(ScanError::Transport("no interface".into()).is_fatal());
        assert!(!ScanError::Correlation("rate limited".into()).is_fatal());
        assert!(!ScanError::Timeout.is_fatal());
    }

    #[test]
    fn addr_parse_maps_to_invalid_target() {
        let err: ScanError = "not-an-ip".parse::<std::net::Ipv4Addr>().unwrap_err().into();
        assert!(matches!(err, ScanError::InvalidTarget(_)));
    }
}
