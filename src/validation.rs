use crate::errors::AppError;
use crate::models::{LoginRequest, RegisterRequest, StatItemRequest, StatRequest};

const MIN_USERNAME: usize = 3;
const MIN_PASSWORD: usize = 4;
const MAX_NAME: usize = 64;
const MAX_LABEL: usize = 32;
const MAX_TEXT: usize = 256;

/// Largest magnitude accepted for a stat item value.
pub const MAX_ABS_VALUE: f64 = 1.0e12;

/// Registration fields after trimming and email normalisation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

pub fn validate_register(req: RegisterRequest) -> Result<NewUser, AppError> {
    let username = validate_username(&req.username)?;
    let email = normalize_email(&req.email)?;
    if req.password.chars().count() < MIN_PASSWORD {
        return Err(AppError::unprocessable("password: minimum 4 characters required"));
    }

    Ok(NewUser {
        username,
        email,
        password: req.password,
    })
}

pub fn validate_login(req: &LoginRequest) -> Result<String, AppError> {
    let email = normalize_email(&req.email)?;
    if req.password.is_empty() {
        return Err(AppError::unprocessable("password: required"));
    }
    Ok(email)
}

pub fn validate_username(raw: &str) -> Result<String, AppError> {
    let username = raw.trim();
    if username.chars().count() < MIN_USERNAME {
        return Err(AppError::unprocessable("username: minimum 3 characters required"));
    }
    if username.chars().count() > MAX_NAME {
        return Err(AppError::unprocessable("username: at most 64 characters allowed"));
    }
    Ok(username.to_string())
}

pub fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    let invalid = || AppError::unprocessable("email: a valid address is required");

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() && !host.ends_with('.') => {}
        _ => return Err(invalid()),
    }
    Ok(email)
}

pub fn validate_stat(req: StatRequest) -> Result<StatRequest, AppError> {
    let name = req.name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME {
        return Err(AppError::unprocessable("name: 1 to 64 characters required"));
    }
    let label = req.measurement_label.trim();
    if label.is_empty() || label.chars().count() > MAX_LABEL {
        return Err(AppError::unprocessable(
            "measurement_label: 1 to 32 characters required",
        ));
    }
    let description = optional_text("description", req.description)?;

    Ok(StatRequest {
        name: name.to_string(),
        description,
        measurement_label: label.to_string(),
    })
}

pub fn validate_item(req: StatItemRequest) -> Result<StatItemRequest, AppError> {
    if !req.numeric_value.is_finite() || req.numeric_value.abs() > MAX_ABS_VALUE {
        return Err(AppError::unprocessable(
            "numeric_value: must be a number between -1e12 and 1e12",
        ));
    }
    let note = optional_text("note", req.note)?;
    Ok(StatItemRequest { note, ..req })
}

fn optional_text(field: &str, value: Option<String>) -> Result<Option<String>, AppError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_TEXT {
        return Err(AppError::unprocessable(format!(
            "{field}: at most {MAX_TEXT} characters allowed"
        )));
    }
    Ok(Some(trimmed.to_string()))
}
