//! Error types for PRISM diversity analysis.

use thiserror::Error;

/// Unified error type for all PRISM diversity operations.
///
/// Provides structured, actionable error messages with context.
#[derive(Error, Debug)]
pub enum PrismError {
    /// A SMILES string could not be parsed into a molecule
    #[error("Failed to parse structure {index} ('{smiles}')")]
    ParseError { index: usize, smiles: String },

    /// Descriptor computation failed; the whole batch has no result
    #[error("Descriptor computation failed for structure {index} ('{smiles}')")]
    DescriptorError { index: usize, smiles: String },

    /// Feature type and metric do not form a supported calculation
    #[error("Unsupported combination: feature type '{feature}' with metric '{metric}'")]
    UnsupportedCombination { feature: String, metric: String },

    /// Configuration validation errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Input validation errors
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Mathematical/numerical errors (e.g., NaN, shape mismatch)
    #[error("Numerical error: {0}")]
    NumericalError(String),

    /// I/O errors (table reading, CSV export)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Delimited text errors
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

impl PrismError {
    /// Creates a structure parse error.
    pub fn parse(index: usize, smiles: impl Into<String>) -> Self {
        PrismError::ParseError {
            index,
            smiles: smiles.into(),
        }
    }

    /// Creates a descriptor batch failure.
    pub fn descriptor(index: usize, smiles: impl Into<String>) -> Self {
        PrismError::DescriptorError {
            index,
            smiles: smiles.into(),
        }
    }

    /// Creates an unsupported feature/metric combination error.
    pub fn unsupported(feature: impl ToString, metric: impl ToString) -> Self {
        PrismError::UnsupportedCombination {
            feature: feature.to_string(),
            metric: metric.to_string(),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        PrismError::ConfigError(message.into())
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        PrismError::ValidationError(message.into())
    }

    /// Creates a numerical error.
    pub fn numerical(message: impl Into<String>) -> Self {
        PrismError::NumericalError(message.into())
    }

    /// Checks if the error comes from an individual structure in a batch.
    ///
    /// Callers that want per-element tolerance filter such structures
    /// upstream and resubmit the batch.
    pub fn is_structure_error(&self) -> bool {
        matches!(
            self,
            PrismError::ParseError { .. } | PrismError::DescriptorError { .. }
        )
    }

    /// Returns a user-friendly error message with actionable guidance.
    pub fn user_message(&self) -> String {
        match self {
            PrismError::ParseError { index, smiles } => {
                format!(
                    "Failed to parse structure {} ('{}')\n\
                     → Check the SMILES syntax, or filter unparsable rows before comparing.",
                    index, smiles
                )
            }
            PrismError::DescriptorError { index, smiles } => {
                format!(
                    "Descriptor computation failed for structure {} ('{}')\n\
                     → The whole descriptor batch was discarded; remove the structure and retry.",
                    index, smiles
                )
            }
            PrismError::UnsupportedCombination { feature, metric } => {
                format!(
                    "Unsupported combination: feature type '{}' with metric '{}'\n\
                     → Use 'ecfp' with 'tanimoto', any feature type with 'mcs', \
                     or 'descriptors'/'moe' with a vector metric.",
                    feature, metric
                )
            }
            _ => self.to_string(),
        }
    }
}

/// Result type alias for PRISM operations.
pub type Result<T> = std::result::Result<T, PrismError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_constructors() {
        let parse_err = PrismError::parse(3, "C1CC");
        assert!(matches!(parse_err, PrismError::ParseError { index: 3, .. }));

        let config_err = PrismError::config("unknown metric");
        assert!(matches!(config_err, PrismError::ConfigError(_)));

        let combo = PrismError::unsupported("ecfp", "euclidean");
        assert_eq!(
            combo.to_string(),
            "Unsupported combination: feature type 'ecfp' with metric 'euclidean'"
        );
    }

    #[test]
    fn test_structure_errors() {
        assert!(PrismError::parse(0, "X").is_structure_error());
        assert!(PrismError::descriptor(1, "CC").is_structure_error());
        assert!(!PrismError::validation("k must be positive").is_structure_error());
    }

    #[test]
    fn test_user_message_guidance() {
        let msg = PrismError::descriptor(2, "CCO").user_message();
        assert!(msg.contains("whole descriptor batch"));
    }
}
