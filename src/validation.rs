use crate::config::GatewayConfig;
use crate::constants::{MAX_ICON_SIZE_PX, MAX_SAFE_EPOCH_MS, MAX_SAFE_EPOCH_MS_F64};
use crate::error::GatewayError;

/// Validate an epoch-millisecond value received as a JS number.
/// Returns the value truncated to whole milliseconds.
pub fn validate_epoch_millis(field: &'static str, value: f64) -> Result<i64, GatewayError> {
    if !value.is_finite() {
        return Err(GatewayError::InvalidInput {
            field,
            reason: "must be a finite number".into(),
        });
    }
    if value < 0.0 {
        return Err(GatewayError::InvalidInput {
            field,
            reason: "cannot be negative".into(),
        });
    }
    if value > MAX_SAFE_EPOCH_MS_F64 {
        return Err(GatewayError::InvalidInput {
            field,
            reason: format!("cannot exceed {MAX_SAFE_EPOCH_MS}"),
        });
    }

    #[allow(
        clippy::as_conversions,
        clippy::cast_possible_truncation,
        reason = "finite, non-negative and below 2^53, so the integer part is exact"
    )]
    let millis = value.trunc() as i64;
    Ok(millis)
}

/// Validate a `[start, end)` window in epoch milliseconds.
pub fn validate_time_range(start_ms: i64, end_ms: i64) -> Result<(), GatewayError> {
    for (field, value) in [("startTime", start_ms), ("endTime", end_ms)] {
        if !(0..=MAX_SAFE_EPOCH_MS).contains(&value) {
            return Err(GatewayError::InvalidInput {
                field,
                reason: format!("must be within 0-{MAX_SAFE_EPOCH_MS}"),
            });
        }
    }
    if start_ms > end_ms {
        return Err(GatewayError::InvalidInput {
            field: "startTime",
            reason: format!("{start_ms} is after endTime {end_ms}"),
        });
    }
    Ok(())
}

/// Validate gateway configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), GatewayError> {
    if !(1..=MAX_ICON_SIZE_PX).contains(&config.icon_size_px) {
        return Err(GatewayError::InvalidInput {
            field: "iconSizePx",
            reason: format!("must be 1-{MAX_ICON_SIZE_PX}"),
        });
    }
    if config.icon_quality > 100 {
        return Err(GatewayError::InvalidInput {
            field: "iconQuality",
            reason: "must be 0-100".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_epoch_millis_valid() {
        assert_eq!(validate_epoch_millis("startTime", 0.0).expect("zero"), 0);
        assert_eq!(
            validate_epoch_millis("startTime", 1_700_000_000_123.9).expect("fractional"),
            1_700_000_000_123
        );
        assert_eq!(
            validate_epoch_millis("endTime", MAX_SAFE_EPOCH_MS_F64).expect("upper bound"),
            MAX_SAFE_EPOCH_MS
        );
    }

    #[test]
    fn test_validate_epoch_millis_invalid() {
        assert!(validate_epoch_millis("startTime", f64::NAN).is_err());
        assert!(validate_epoch_millis("startTime", f64::INFINITY).is_err());
        assert!(validate_epoch_millis("startTime", -1.0).is_err());
        assert!(validate_epoch_millis("endTime", 1.0e17).is_err());
    }

    #[test]
    fn test_validate_time_range() {
        assert!(validate_time_range(10, 20).is_ok());
        assert!(validate_time_range(20, 20).is_ok());
        assert!(validate_time_range(21, 20).is_err());
        assert!(validate_time_range(-1, 20).is_err());
        assert!(validate_time_range(0, MAX_SAFE_EPOCH_MS + 1).is_err());
    }

    #[test]
    fn test_validate_time_range_names_start_field() {
        let err = validate_time_range(5, 1).expect_err("inverted window");
        assert!(matches!(err, GatewayError::InvalidInput { field: "startTime", .. }));
    }

    #[test]
    fn test_validate_config() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());

        let zero_size = GatewayConfig { icon_size_px: 0, ..GatewayConfig::default() };
        assert!(validate_config(&zero_size).is_err());

        let huge = GatewayConfig { icon_size_px: MAX_ICON_SIZE_PX + 1, ..GatewayConfig::default() };
        assert!(validate_config(&huge).is_err());

        let quality = GatewayConfig { icon_quality: 101, ..GatewayConfig::default() };
        assert!(validate_config(&quality).is_err());
    }
}
