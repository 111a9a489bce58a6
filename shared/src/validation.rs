use std::collections::HashSet;
use crate::models::CreatePollRequest;

pub const MAX_QUESTION_LENGTH: usize = 300;
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;
pub const MAX_OPTION_LENGTH: usize = 80;
pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Question must not be empty")]
    EmptyQuestion,
    #[error("Question exceeds maximum length of {MAX_QUESTION_LENGTH}")]
    QuestionTooLong,
    #[error("Description exceeds maximum length of {MAX_DESCRIPTION_LENGTH}")]
    DescriptionTooLong,
    #[error("Option text exceeds maximum length of {MAX_OPTION_LENGTH}")]
    OptionTooLong,
    #[error("Too many options (maximum {MAX_OPTIONS})")]
    TooManyOptions,
    #[error("Too few options (minimum {MIN_OPTIONS})")]
    TooFewOptions,
    #[error("Empty option text")]
    EmptyOption,
    #[error("Duplicate option: {0}")]
    DuplicateOption(String),
}

pub fn validate_poll_request(request: &CreatePollRequest) -> Result<(), ValidationError> {
    let question = request.question.trim();
    if question.is_empty() { return Err(ValidationError::EmptyQuestion); }
    if question.chars().count() > MAX_QUESTION_LENGTH { return Err(ValidationError::QuestionTooLong); }

    if let Some(description) = &request.description {
        if description.trim().chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(ValidationError::DescriptionTooLong);
        }
    }

    if request.options.len() > MAX_OPTIONS { return Err(ValidationError::TooManyOptions); }
    if request.options.len() < MIN_OPTIONS { return Err(ValidationError::TooFewOptions); }

    let options: Vec<&str> = request.options.iter().map(|opt| opt.trim()).collect();
    if options.iter().any(|opt| opt.is_empty()) { return Err(ValidationError::EmptyOption); }
    if options.iter().any(|opt| opt.chars().count() > MAX_OPTION_LENGTH) { return Err(ValidationError::OptionTooLong); }

    let mut seen = HashSet::new();
    if let Some(duplicate) = options.iter().find(|opt| !seen.insert(opt.to_lowercase())) {
        return Err(ValidationError::DuplicateOption(duplicate.to_string()));
    }

    Ok(())
}
