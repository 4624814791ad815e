//! Errors raised by the policy resolver

use thiserror::Error;

/// Which input value was out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    Score,
    Confidence,
    Probability,
}

impl InputField {
    pub fn name(&self) -> &'static str {
        match self {
            InputField::Score => "score",
            InputField::Confidence => "confidence",
            InputField::Probability => "probability",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    /// A value fell outside its valid range (or was NaN). Never clamped.
    #[error("{} {value} is outside the valid range [{min}, {max}]", .field.name())]
    InvalidInputRange {
        field: InputField,
        value: f64,
        min: f64,
        max: f64,
    },
}

pub type Result<T> = std::result::Result<T, PolicyError>;

/// Rejects NaN and anything outside `[min, max]`.
pub(crate) fn check_range(field: InputField, value: f64, min: f64, max: f64) -> Result<f64> {
    if value.is_nan() || value < min || value > max {
        return Err(PolicyError::InvalidInputRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_field_and_bounds() {
        let err = check_range(InputField::Score, -5.0, 0.0, 100.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "score -5 is outside the valid range [0, 100]"
        );
    }

    #[test]
    fn nan_is_out_of_range() {
        assert!(check_range(InputField::Confidence, f64::NAN, 0.0, 100.0).is_err());
    }

    #[test]
    fn bounds_are_inclusive() {
        assert_eq!(check_range(InputField::Score, 0.0, 0.0, 100.0), Ok(0.0));
        assert_eq!(check_range(InputField::Score, 100.0, 0.0, 100.0), Ok(100.0));
    }
}
