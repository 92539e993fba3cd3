//! Validation error types.

use std::fmt;

/// One segment of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// An object property.
    Key(String),
    /// An array element.
    Index(usize),
}

/// Location of a value inside a JSON document.
///
/// Rendered as `forecast[0].high`; the document root renders as `/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// The document root.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Path to a property of the value at this path.
    #[must_use]
    pub fn key(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.to_owned()));
        Self(segments)
    }

    /// Path to an element of the array at this path.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    /// Whether this is the document root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The segments of this path, outermost first.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => f.write_str(key)?,
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// What went wrong at a particular field.
#[derive(Debug, Clone, PartialEq)]
pub enum IssueKind {
    /// A required property was absent.
    Missing,
    /// The value has the wrong JSON type.
    TypeMismatch {
        /// Type(s) the schema allows, e.g. `string` or `string|null`.
        expected: String,
        /// Type of the value that was supplied.
        actual: String,
    },
    /// The value is not one of the allowed enum members.
    NotInEnum {
        /// The allowed values, rendered as JSON.
        allowed: Vec<String>,
    },
    /// A number fell outside its declared bounds.
    OutOfRange {
        /// Human-readable bound that was violated (e.g. `>= 1`).
        bound: String,
        /// The offending number.
        actual: f64,
    },
    /// A string or array length fell outside its declared bounds.
    Length {
        /// Human-readable bound that was violated (e.g. `at least 1`).
        bound: String,
        /// Length of the supplied value.
        actual: usize,
    },
    /// A string did not match the declared pattern.
    Pattern {
        /// The regular expression.
        pattern: String,
    },
    /// A property not declared by a closed object schema.
    UnknownField,
    /// None of the `anyOf`/`oneOf` alternatives accepted the value.
    NoVariantMatched,
    /// More than one `oneOf` alternative accepted the value.
    AmbiguousVariant {
        /// How many alternatives accepted it.
        matched: usize,
    },
    /// The schema forbids any value here.
    Rejected,
    /// An array item repeats an earlier one where items must be unique.
    Duplicate,
    /// The validated value could not be converted into its Rust type.
    Deserialize {
        /// Message from the deserializer.
        message: String,
    },
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("required field is missing"),
            Self::TypeMismatch { expected, actual } => {
                write!(f, "expected {expected}, got {actual}")
            },
            Self::NotInEnum { allowed } => {
                write!(f, "value must be one of [{}]", allowed.join(", "))
            },
            Self::OutOfRange { bound, actual } => write!(f, "{actual} is not {bound}"),
            Self::Length { bound, actual } => {
                write!(f, "length {actual} does not satisfy {bound}")
            },
            Self::Pattern { pattern } => write!(f, "does not match pattern {pattern}"),
            Self::UnknownField => f.write_str("unknown field"),
            Self::NoVariantMatched => f.write_str("value matches none of the allowed shapes"),
            Self::AmbiguousVariant { matched } => {
                write!(f, "matches {matched} alternatives where exactly one is allowed")
            },
            Self::Rejected => f.write_str("no value is allowed here"),
            Self::Duplicate => f.write_str("duplicate value"),
            Self::Deserialize { message } => write!(f, "{message}"),
        }
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    /// Where the failure occurred.
    pub path: FieldPath,
    /// What the failure was.
    pub kind: IssueKind,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.kind)
    }
}

/// A value failed to validate against its schema.
///
/// Carries every issue found, not just the first one.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub struct ValidationError {
    /// Title of the schema that rejected the value, when it has one.
    pub schema: Option<String>,
    /// The individual failures, in document order.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    /// Build an error from collected issues.
    #[must_use]
    pub fn new(schema: Option<String>, issues: Vec<ValidationIssue>) -> Self {
        Self { schema, issues }
    }

    /// Whether any issue is reported for the field rendered as `field`.
    ///
    /// `field` uses [`FieldPath`] notation, e.g. `forecast` or `options[1].id`.
    #[must_use]
    pub fn mentions(&self, field: &str) -> bool {
        self.issues.iter().any(|i| i.path.to_string() == field)
    }

    /// Rendered paths of every offending field.
    #[must_use]
    pub fn fields(&self) -> Vec<String> {
        self.issues.iter().map(|i| i.path.to_string()).collect()
    }

    /// The issue reported for `field`, if any.
    #[must_use]
    pub fn issue_for(&self, field: &str) -> Option<&ValidationIssue> {
        self.issues.iter().find(|i| i.path.to_string() == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(schema) = &self.schema {
            write!(f, "invalid {schema}")?;
        } else {
            f.write_str("invalid value")?;
        }
        match self.issues.split_first() {
            None => Ok(()),
            Some((first, [])) => write!(f, ": {first}"),
            Some((first, rest)) => write!(f, ": {first} (and {} more)", rest.len()),
        }
    }
}

/// Result type for validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_rendering() {
        assert_eq!(FieldPath::root().to_string(), "/");
        assert_eq!(FieldPath::root().key("forecast").to_string(), "forecast");
        let nested = FieldPath::root().key("forecast").index(0).key("high");
        assert_eq!(nested.to_string(), "forecast[0].high");
        assert_eq!(FieldPath::root().index(2).to_string(), "[2]");
    }

    #[test]
    fn test_error_display_counts_extra_issues() {
        let err = ValidationError::new(
            Some("WeatherOutput".into()),
            vec![
                ValidationIssue {
                    path: FieldPath::root().key("forecast"),
                    kind: IssueKind::Missing,
                },
                ValidationIssue {
                    path: FieldPath::root().key("humidity"),
                    kind: IssueKind::Missing,
                },
            ],
        );
        assert_eq!(
            err.to_string(),
            "invalid WeatherOutput: forecast: required field is missing (and 1 more)"
        );
        assert!(err.mentions("forecast"));
        assert!(!err.mentions("location"));
    }
}
