use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError, ValidationErrors};

/// Request payload for submitting a game result
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SubmitScoreRequest {
    #[validate(
        length(max = 255, message = "user_name must be at most 255 characters"),
        custom(function = "validate_user_name")
    )]
    pub user_name: String,

    /// Signed result; must fit in a 32-bit integer.
    pub result: i64,
}

impl SubmitScoreRequest {
    pub fn new(user_name: impl Into<String>, result: i64) -> Self {
        Self {
            user_name: user_name.into(),
            result,
        }
    }

    /// Validate and normalize into what gets stored.
    pub fn into_new_score(self) -> Result<NewScore, ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        let result = i32::try_from(self.result);
        if result.is_err() {
            let mut error = ValidationError::new("out_of_range");
            error.message = Some("result must fit in a 32-bit signed integer".into());
            errors.add("result", error);
        }

        match result {
            Ok(result) if errors.errors().is_empty() => Ok(NewScore {
                user_name: self.user_name.trim().to_string(),
                result,
            }),
            _ => Err(errors),
        }
    }
}

/// A submission that passed validation. `user_name` is already trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScore {
    pub user_name: String,
    pub result: i32,
}

fn validate_user_name(user_name: &str) -> Result<(), ValidationError> {
    if user_name.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("user_name must not be empty".into());
        return Err(error);
    }
    if user_name.contains('\0') {
        let mut error = ValidationError::new("invalid_character");
        error.message = Some("user_name must not contain NUL characters".into());
        return Err(error);
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecentScoresParams {
    /// Number of scores to return; clamped to the configured range.
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_name_is_trimmed() {
        let score = SubmitScoreRequest::new("  mario \t", 120)
            .into_new_score()
            .unwrap();
        assert_eq!(score.user_name, "mario");
        assert_eq!(score.result, 120);
    }

    #[test]
    fn test_blank_user_name_is_rejected() {
        for name in ["", "   ", "\n\t"] {
            let errors = SubmitScoreRequest::new(name, 10)
                .into_new_score()
                .unwrap_err();
            assert!(errors.field_errors().contains_key("user_name"), "{name:?}");
        }
    }

    #[test]
    fn test_nul_in_user_name_is_rejected() {
        let errors = SubmitScoreRequest::new("ma\0rio", 10)
            .into_new_score()
            .unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields["user_name"][0].code, "invalid_character");
    }

    #[test]
    fn test_overlong_user_name_is_rejected() {
        let errors = SubmitScoreRequest::new("m".repeat(256), 10)
            .into_new_score()
            .unwrap_err();
        assert!(errors.field_errors().contains_key("user_name"));

        let score = SubmitScoreRequest::new("m".repeat(255), 10)
            .into_new_score()
            .unwrap();
        assert_eq!(score.user_name.len(), 255);
    }

    #[test]
    fn test_result_outside_i32_is_rejected() {
        let errors = SubmitScoreRequest::new("luigi", i64::from(i32::MAX) + 1)
            .into_new_score()
            .unwrap_err();
        assert!(errors.field_errors().contains_key("result"));

        let ok = SubmitScoreRequest::new("luigi", i64::from(i32::MIN))
            .into_new_score()
            .unwrap();
        assert_eq!(ok.result, i32::MIN);
    }

    #[test]
    fn test_both_fields_reported_together() {
        let errors = SubmitScoreRequest::new(" ", i64::MAX)
            .into_new_score()
            .unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("user_name"));
        assert!(fields.contains_key("result"));
    }
}
