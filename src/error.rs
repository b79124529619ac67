use serde::Serialize;
use thiserror::Error;

/// Gateway error type, surfaced to the shell with a machine-readable code
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Usage stats permission not granted")]
    PermissionDenied,

    #[error("{service} not available")]
    ServiceUnavailable { service: &'static str },

    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("{0}")]
    Operation(String),
}

impl GatewayError {
    /// Short code the shell switches on.
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::PermissionDenied => "PERMISSION_DENIED",
            GatewayError::ServiceUnavailable { .. }
            | GatewayError::InvalidInput { .. }
            | GatewayError::Operation(_) => "ERROR",
        }
    }
}

impl From<PlatformError> for GatewayError {
    fn from(e: PlatformError) -> Self {
        if let PlatformError::ServiceUnavailable(service) = e {
            return GatewayError::ServiceUnavailable { service };
        }
        GatewayError::Operation(e.to_string())
    }
}

/// Failures reported by an OS backend
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),

    #[error("Package not found: {0}")]
    PackageNotFound(String),

    #[error("{0} not available")]
    ServiceUnavailable(&'static str),

    #[error("{0}")]
    Call(String),
}

/// Failures while turning an app icon into a thumbnail
#[derive(Debug, Error)]
pub enum IconError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error("Icon buffer is {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Failed to encode icon: {0}")]
    Encode(#[from] image::ImageError),
}

/// Error payload handed back over IPC: `{ "code": ..., "message": ... }`
#[derive(Debug, Serialize)]
pub struct CommandError {
    pub code: &'static str,
    pub message: String,
}

impl From<GatewayError> for CommandError {
    fn from(e: GatewayError) -> Self {
        Self {
            code: e.code(),
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(GatewayError::PermissionDenied.code(), "PERMISSION_DENIED");
        assert_eq!(
            GatewayError::ServiceUnavailable { service: "UsageStatsManager" }.code(),
            "ERROR"
        );
        assert_eq!(GatewayError::Operation("boom".into()).code(), "ERROR");
        assert_eq!(
            GatewayError::InvalidInput { field: "startTime", reason: "x".into() }.code(),
            "ERROR"
        );
    }

    #[test]
    fn test_platform_service_error_keeps_its_kind() {
        let err = GatewayError::from(PlatformError::ServiceUnavailable("UsageStatsManager"));
        assert!(matches!(err, GatewayError::ServiceUnavailable { service: "UsageStatsManager" }));
        assert_eq!(err.to_string(), "UsageStatsManager not available");
    }

    #[test]
    fn test_other_platform_errors_pass_message_through() {
        let err = GatewayError::from(PlatformError::Call("startActivity threw".into()));
        assert_eq!(err.code(), "ERROR");
        assert_eq!(err.to_string(), "startActivity threw");
    }

    #[test]
    fn test_service_unavailable_wire_shape() {
        let payload = CommandError::from(GatewayError::ServiceUnavailable {
            service: "UsageStatsManager",
        });
        let json = serde_json::to_value(&payload).expect("serialize command error");
        assert_eq!(
            json,
            serde_json::json!({
                "code": "ERROR",
                "message": "UsageStatsManager not available",
            })
        );
    }

    #[test]
    fn test_command_error_wire_shape() {
        let payload = CommandError::from(GatewayError::PermissionDenied);
        let json = serde_json::to_value(&payload).expect("serialize command error");
        assert_eq!(
            json,
            serde_json::json!({
                "code": "PERMISSION_DENIED",
                "message": "Usage stats permission not granted",
            })
        );
    }
}
