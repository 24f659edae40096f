//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic failures of the configuration engine
/// (user-input validation, missing records, broken setup). Storage concerns
/// belong to the infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Caller-supplied input failed validation.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A requested record does not exist.
    #[error("not found: {0}")]
    NotFound(#[from] NotFound),

    /// Catalog setup is inconsistent (a setup bug, not a user-input problem).
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A write conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Coarse error classification for outer layers (HTTP status mapping, metrics).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Configuration,
    InvalidId,
    Conflict,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(ValidationError::Other(msg.into()))
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Validation(_) => ErrorKind::Validation,
            DomainError::NotFound(_) => ErrorKind::NotFound,
            DomainError::Configuration(_) => ErrorKind::Configuration,
            DomainError::InvalidId(_) => ErrorKind::InvalidId,
            DomainError::Conflict(_) => ErrorKind::Conflict,
        }
    }
}

/// User-input validation failures.
///
/// Variants carry the offending attribute/parameter code so callers can point
/// at the exact field.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("unknown axis: {attribute_code}")]
    UnknownAxis { attribute_code: String },

    #[error("missing axis value: {attribute_code}")]
    MissingAxisValue { attribute_code: String },

    #[error("axis {attribute_code} has more than one value")]
    DuplicateAxisValue { attribute_code: String },

    #[error("missing selection: {attribute_code}")]
    MissingSelection { attribute_code: String },

    #[error("missing parameter: {attribute_code}")]
    MissingParameter { attribute_code: String },

    #[error("parameter out of range: {attribute_code}={value} (min {min:?}, max {max:?})")]
    ParameterOutOfRange {
        attribute_code: String,
        value: f64,
        min: Option<f64>,
        max: Option<f64>,
    },

    #[error("invalid step: {attribute_code}={value} is not reachable in steps of {step}")]
    InvalidStep {
        attribute_code: String,
        value: f64,
        step: f64,
    },

    #[error("unknown option {option_code} for axis {attribute_code}")]
    UnknownOption {
        attribute_code: String,
        option_code: String,
    },

    #[error("a variant parent must declare at least one axis")]
    NoAxes,

    #[error("too many axes: {count} (max {max})")]
    TooManyAxes { count: usize, max: usize },

    #[error("duplicate axis: {attribute_code}")]
    DuplicateAxis { attribute_code: String },

    #[error("invalid bounds for axis {attribute_code}: {reason}")]
    InvalidAxisBounds {
        attribute_code: String,
        reason: String,
    },

    #[error("duplicate variant combination: {combination}")]
    DuplicateCombination { combination: String },

    #[error("product {product_id} of kind {kind} cannot be a bundle component")]
    InvalidComponentType { product_id: String, kind: String },

    #[error("quantity {quantity} outside bounds (min {min:?}, max {max:?})")]
    QuantityOutOfBounds {
        quantity: i64,
        min: Option<i64>,
        max: Option<i64>,
    },

    #[error("invalid quantity bounds: min {min} > max {max}")]
    InvalidQuantityBounds { min: i64, max: i64 },

    #[error("product {product_id} is {actual}, expected {expected}")]
    WrongProductKind {
        product_id: String,
        expected: String,
        actual: String,
    },

    #[error("{0}")]
    Other(String),
}

impl ValidationError {
    /// The attribute or parameter code the failure refers to, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::UnknownAxis { attribute_code }
            | ValidationError::MissingAxisValue { attribute_code }
            | ValidationError::DuplicateAxisValue { attribute_code }
            | ValidationError::MissingSelection { attribute_code }
            | ValidationError::MissingParameter { attribute_code }
            | ValidationError::ParameterOutOfRange { attribute_code, .. }
            | ValidationError::InvalidStep { attribute_code, .. }
            | ValidationError::UnknownOption { attribute_code, .. }
            | ValidationError::DuplicateAxis { attribute_code }
            | ValidationError::InvalidAxisBounds { attribute_code, .. } => Some(attribute_code),
            _ => None,
        }
    }
}

/// Missing records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotFound {
    #[error("product {0}")]
    Product(String),

    #[error("variant matching {0}")]
    Variant(String),

    #[error("pricing record for product {0}")]
    PricingRecord(String),

    #[error("sku mapping for product {0}")]
    SkuMapping(String),

    #[error("bundle {0}")]
    Bundle(String),

    #[error("bundle component {0}")]
    Component(String),
}

/// Broken catalog setup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("bundle {0} has no price mode set")]
    MissingPriceMode(String),

    #[error("fixed-price bundle {0} has no price record")]
    MissingBundlePrice(String),

    #[error("product {0} has no price record")]
    MissingPriceRecord(String),

    #[error("mixed currencies in bundle: {expected} and {found}")]
    MixedCurrency { expected: String, found: String },

    #[error("product {0} has no axes configured")]
    MissingAxes(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_classifies_each_family() {
        let err: DomainError = ValidationError::NoAxes.into();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err: DomainError = NotFound::Variant("color=red".into()).into();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err: DomainError = ConfigurationError::MissingPriceMode("b1".into()).into();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn field_points_at_offending_parameter() {
        let err = ValidationError::InvalidStep {
            attribute_code: "width_mm".into(),
            value: 1.3,
            step: 0.5,
        };
        assert_eq!(err.field(), Some("width_mm"));
        assert_eq!(ValidationError::NoAxes.field(), None);
    }

    #[test]
    fn messages_name_the_field() {
        let err = DomainError::from(ValidationError::MissingSelection {
            attribute_code: "finish".into(),
        });
        assert_eq!(err.to_string(), "validation failed: missing selection: finish");
    }
}
