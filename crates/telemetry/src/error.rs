//! Error type for the telemetry crate.

/// Errors raised while exporting spans or loading telemetry configuration.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TelemetryError {
    /// A trace store rejected a span record.
    #[error("trace store error: {0}")]
    Store(String),

    /// Configuration could not be interpreted.
    #[error("invalid telemetry configuration: {0}")]
    Config(String),

    /// A span payload could not be serialized.
    #[error("failed to serialize span payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result alias for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_detail() {
        assert_eq!(
            TelemetryError::Store("disk full".into()).to_string(),
            "trace store error: disk full"
        );
        assert_eq!(
            TelemetryError::Config("capacity must be positive".into()).to_string(),
            "invalid telemetry configuration: capacity must be positive"
        );
    }
}
