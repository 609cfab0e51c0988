use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building or loading configuration.
///
/// Queries never fail; bad tunables are rejected once, at construction.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value that cannot be used (e.g. non-positive cell size).
    #[error("invalid configuration: `{field}` {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: &'static str) -> Self {
        Self::Invalid { field, reason }
    }
}

/// Reject NaN, infinities and negatives.
pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::invalid(field, "must be finite"));
    }
    if value < 0.0 {
        return Err(ConfigError::invalid(field, "must not be negative"));
    }
    Ok(())
}

/// Reject anything that is not a finite, strictly positive number.
pub(crate) fn ensure_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    ensure_non_negative(field, value)?;
    if value == 0.0 {
        return Err(ConfigError::invalid(field, "must be greater than zero"));
    }
    Ok(())
}

/// Reject probabilities outside [0, 1].
pub(crate) fn ensure_unit(field: &'static str, value: f64) -> Result<(), ConfigError> {
    ensure_non_negative(field, value)?;
    if value > 1.0 {
        return Err(ConfigError::invalid(field, "must be within [0, 1]"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_rejects_zero_and_nan() {
        assert!(ensure_positive("x", 0.0).is_err());
        assert!(ensure_positive("x", f64::NAN).is_err());
        assert!(ensure_positive("x", 0.5).is_ok());
    }

    #[test]
    fn message_names_the_field() {
        let err = ensure_non_negative("cell_size", -1.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid configuration: `cell_size` must not be negative"
        );
    }

    #[test]
    fn unit_interval() {
        assert!(ensure_unit("p", 1.0).is_ok());
        assert!(ensure_unit("p", 1.01).is_err());
    }
}
