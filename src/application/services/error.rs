//! Errors returned by the use-case services

/// Failure of a use case
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Input rejected before anything was written
    #[error("{0}")]
    Validation(String),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("Failed to queue scene generation: {0}")]
    Queue(String),
    #[error(transparent)]
    Repository(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Reject `value` unless its trimmed form is non-empty and it has at most `max` characters
pub(crate) fn validate_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), ServiceError> {
    let length = value.chars().count();
    if (min > 0 && value.trim().is_empty()) || length < min || length > max {
        return Err(ServiceError::validation(format!(
            "{} must be between {} and {} characters",
            field, min, max
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_is_counted_in_characters() {
        assert!(validate_length("Title", &"é".repeat(200), 1, 200).is_ok());
        assert!(validate_length("Title", &"é".repeat(201), 1, 200).is_err());
    }

    #[test]
    fn test_blank_fails_when_required() {
        let error = validate_length("Scene outline", "   ", 1, 2000).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Scene outline must be between 1 and 2000 characters"
        );
        assert!(validate_length("Backstory", "", 0, 5000).is_ok());
    }
}
