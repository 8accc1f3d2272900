use lazy_static::lazy_static;
use regex::Regex;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ServiceError;
use crate::password::hash_password;
use crate::users::dto::UserPayload;
use crate::users::repo::{SaveError, User};

pub(crate) const EMAIL_TAKEN: &str = "Email already exists.";
pub(crate) const EMAIL_MISSING: &str = "Email must be provided.";
pub(crate) const EMAIL_INVALID: &str = "Email must be valid.";
pub(crate) const PASSWORD_MISSING: &str = "Password must be provided.";
pub(crate) const NAME_MISSING: &str = "Name must be provided.";
pub(crate) const USER_NOT_FOUND: &str = "User not found.";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Registration rules, in evaluation order. Every applicable failure is
/// collected; nothing short-circuits.
pub(crate) fn registration_errors(
    email_taken: bool,
    email: &str,
    name: &str,
    password: Option<&str>,
) -> Vec<String> {
    let mut errors = Vec::new();
    if email_taken {
        errors.push(EMAIL_TAKEN.to_string());
    }
    if email.is_empty() {
        errors.push(EMAIL_MISSING.to_string());
    } else if !is_valid_email(email) {
        errors.push(EMAIL_INVALID.to_string());
    }
    if password.map_or(true, |p| p.is_empty()) {
        errors.push(PASSWORD_MISSING.to_string());
    }
    if name.trim().is_empty() {
        errors.push(NAME_MISSING.to_string());
    }
    errors
}

/// Update rules. The password is not validated here: absence means "keep
/// the stored hash".
pub(crate) fn update_errors(email_conflict: bool, email: &str, name: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if email_conflict {
        errors.push(EMAIL_TAKEN.to_string());
    }
    if email.is_empty() {
        errors.push(EMAIL_MISSING.to_string());
    } else if !is_valid_email(email) {
        errors.push(EMAIL_INVALID.to_string());
    }
    if name.trim().is_empty() {
        errors.push(NAME_MISSING.to_string());
    }
    errors
}

pub async fn register(db: &PgPool, payload: UserPayload) -> Result<User, ServiceError> {
    let email = normalize_email(&payload.email);
    let name = payload.name.trim().to_string();

    let email_taken = User::find_by_email(db, &email)
        .await
        .map_err(ServiceError::Database)?
        .is_some();

    let errors = registration_errors(email_taken, &email, &name, payload.password.as_deref());
    if !errors.is_empty() {
        warn!(email = %email, ?errors, "registration rejected");
        return Err(ServiceError::Validation(errors));
    }

    // Presence was validated above; hashing only ever sees fresh plaintext.
    let plain = payload.password.as_deref().unwrap_or("");
    let password_hash = hash_password(plain).map_err(ServiceError::Hashing)?;

    match User::save(db, None, &name, &email, &password_hash).await {
        Ok(user) => {
            info!(user_id = %user.id, email = %user.email, "user registered");
            Ok(user)
        }
        // A concurrent registration won the race between the pre-check and
        // the insert; report it the same way the pre-check would have.
        Err(SaveError::EmailTaken) => {
            warn!(email = %email, "registration lost uniqueness race");
            Err(ServiceError::Validation(vec![EMAIL_TAKEN.to_string()]))
        }
        Err(SaveError::Database(e)) => Err(ServiceError::Database(e)),
    }
}

pub async fn update_by_id(
    db: &PgPool,
    id: Uuid,
    payload: UserPayload,
) -> Result<User, ServiceError> {
    let Some(current) = User::find_by_id(db, id)
        .await
        .map_err(ServiceError::Database)?
    else {
        warn!(%id, "update target not found");
        return Err(ServiceError::Validation(vec![USER_NOT_FOUND.to_string()]));
    };

    let email = normalize_email(&payload.email);
    let name = payload.name.trim().to_string();

    // An unchanged email is a no-op; only a different address is checked
    // for conflicts.
    let email_conflict = if email != current.email {
        User::find_by_email(db, &email)
            .await
            .map_err(ServiceError::Database)?
            .is_some()
    } else {
        false
    };

    let errors = update_errors(email_conflict, &email, &name);
    if !errors.is_empty() {
        warn!(user_id = %id, ?errors, "update rejected");
        return Err(ServiceError::Validation(errors));
    }

    let password_hash = match payload.password.as_deref() {
        Some(plain) => hash_password(plain).map_err(ServiceError::Hashing)?,
        None => current.password_hash.clone(),
    };

    match User::save(db, Some(current.id), &name, &email, &password_hash).await {
        Ok(user) => {
            info!(user_id = %user.id, "user updated");
            Ok(user)
        }
        Err(SaveError::EmailTaken) => {
            warn!(user_id = %id, email = %email, "update lost uniqueness race");
            Err(ServiceError::Validation(vec![EMAIL_TAKEN.to_string()]))
        }
        Err(SaveError::Database(e)) => Err(ServiceError::Database(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_registration_has_no_errors() {
        let errors = registration_errors(false, "test@test.com", "Test", Some("123"));
        assert!(errors.is_empty());
    }

    #[test]
    fn taken_email_is_reported_first() {
        let errors = registration_errors(true, "test@test.com", "", Some("123"));
        assert_eq!(errors, vec![EMAIL_TAKEN, NAME_MISSING]);
    }

    #[test]
    fn missing_password_and_name_accumulate() {
        let errors = registration_errors(false, "x@x.com", "", None);
        assert_eq!(errors, vec![PASSWORD_MISSING, NAME_MISSING]);
    }

    #[test]
    fn empty_password_counts_as_missing() {
        let errors = registration_errors(false, "x@x.com", "Test3", Some(""));
        assert_eq!(errors, vec![PASSWORD_MISSING]);
    }

    #[test]
    fn missing_email_is_not_reported_as_invalid() {
        let errors = registration_errors(false, "", "Test", Some("123"));
        assert_eq!(errors, vec![EMAIL_MISSING]);
    }

    #[test]
    fn malformed_email_is_rejected() {
        let errors = registration_errors(false, "asd123@", "Test", Some("123"));
        assert_eq!(errors, vec![EMAIL_INVALID]);
    }

    #[test]
    fn update_with_conflicting_email_is_rejected() {
        let errors = update_errors(true, "other@test.com", "Test");
        assert_eq!(errors, vec![EMAIL_TAKEN]);
    }

    #[test]
    fn update_with_clean_fields_passes() {
        let errors = update_errors(false, "test@test.com", "Test");
        assert!(errors.is_empty());
    }

    #[test]
    fn update_accumulates_field_errors() {
        let errors = update_errors(true, "not-an-email", " ");
        assert_eq!(errors, vec![EMAIL_TAKEN, EMAIL_INVALID, NAME_MISSING]);
    }

    #[test]
    fn email_is_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Test@Test.COM "), "test@test.com");
    }

    #[test]
    fn email_regex_accepts_and_rejects() {
        assert!(is_valid_email("test@test.com"));
        assert!(is_valid_email("a.b+c@sub.domain.org"));
        assert!(!is_valid_email("asd123@"));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("spaces in@mail.com"));
    }
}
