//! Sign-up field rules.
//!
//! Every rule is checked and every violation is reported, so a client can fix
//! the whole form in one round trip.

use store_ratings_core::Email;

pub const NAME_MIN_CHARS: usize = 20;
pub const NAME_MAX_CHARS: usize = 60;
pub const ADDRESS_MAX_CHARS: usize = 400;
pub const PASSWORD_MIN_CHARS: usize = 8;
pub const PASSWORD_MAX_CHARS: usize = 16;

const SPECIAL_CHARACTERS: &str = r#"!@#$%^&*()_+-=[]{};':"\|,.<>/?"#;

/// Raw sign-up fields as received from the client.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignupFields<'a> {
    pub name: Option<&'a str>,
    pub address: Option<&'a str>,
    pub email: Option<&'a str>,
    pub password: Option<&'a str>,
}

/// Sign-up fields that passed every rule.
#[derive(Debug, Clone)]
pub struct ValidSignup {
    pub name: String,
    pub address: String,
    pub email: Email,
    pub password: String,
}

/// Check every sign-up rule.
///
/// # Errors
///
/// Returns all violated rules, in field order.
pub fn validate_signup(fields: SignupFields<'_>) -> Result<ValidSignup, Vec<String>> {
    let mut errors = Vec::new();

    let name = fields.name.unwrap_or_default();
    let name_len = name.chars().count();
    if name_len < NAME_MIN_CHARS {
        errors.push(format!("Name must be at least {NAME_MIN_CHARS} characters long."));
    }
    if name_len > NAME_MAX_CHARS {
        errors.push(format!("Name must not exceed {NAME_MAX_CHARS} characters."));
    }

    let address = fields.address.unwrap_or_default();
    if address.is_empty() {
        errors.push("Address is required.".to_string());
    }
    if address.chars().count() > ADDRESS_MAX_CHARS {
        errors.push(format!(
            "Address must not exceed {ADDRESS_MAX_CHARS} characters."
        ));
    }

    let email = validate_email(fields.email);
    if email.is_none() {
        errors.push(INVALID_EMAIL.to_string());
    }

    let password = fields.password.unwrap_or_default();
    errors.extend(password_violations(password));

    match email {
        Some(email) if errors.is_empty() => Ok(ValidSignup {
            name: name.to_owned(),
            address: address.to_owned(),
            email,
            password: password.to_owned(),
        }),
        _ => Err(errors),
    }
}

pub const INVALID_EMAIL: &str = "Email must be a valid email address.";

/// Parse an optional email field.
#[must_use]
pub fn validate_email(email: Option<&str>) -> Option<Email> {
    email.and_then(|e| Email::parse(e).ok())
}

/// Password rules that `password` breaks, in a fixed order.
#[must_use]
pub fn password_violations(password: &str) -> Vec<String> {
    let mut errors = Vec::new();
    let len = password.chars().count();

    if !(PASSWORD_MIN_CHARS..=PASSWORD_MAX_CHARS).contains(&len) {
        errors.push(format!(
            "Password must be between {PASSWORD_MIN_CHARS} and {PASSWORD_MAX_CHARS} characters long."
        ));
    }
    if !password.is_empty() && !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("Password must include at least one uppercase letter.".to_string());
    }
    if !password.is_empty() && !password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)) {
        errors.push("Password must include at least one special character.".to_string());
    }

    errors
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const NAME: &str = "Brightwater Coffee Roasters";
    const ADDRESS: &str = "12 Harbour Road, Port Elliot";

    fn fields<'a>(email: &'a str, password: &'a str) -> SignupFields<'a> {
        SignupFields {
            name: Some(NAME),
            address: Some(ADDRESS),
            email: Some(email),
            password: Some(password),
        }
    }

    #[test]
    fn test_valid_signup() {
        let valid = validate_signup(fields("Owner@Example.com", "Secret#123")).unwrap();
        assert_eq!(valid.name, NAME);
        assert_eq!(valid.email.as_str(), "owner@example.com");
    }

    #[test]
    fn test_collects_every_violation() {
        let errors = validate_signup(SignupFields {
            name: Some("short"),
            address: None,
            email: Some("not-an-email"),
            password: Some("lower"),
        })
        .unwrap_err();

        assert_eq!(
            errors,
            vec![
                "Name must be at least 20 characters long.",
                "Address is required.",
                "Email must be a valid email address.",
                "Password must be between 8 and 16 characters long.",
                "Password must include at least one uppercase letter.",
                "Password must include at least one special character.",
            ]
        );
    }

    #[test]
    fn test_missing_fields() {
        let errors = validate_signup(SignupFields::default()).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&"Password must be between 8 and 16 characters long.".to_string()));
    }

    #[test]
    fn test_name_and_address_limits() {
        let long_name = "n".repeat(NAME_MAX_CHARS + 1);
        let long_address = "a".repeat(ADDRESS_MAX_CHARS + 1);
        let errors = validate_signup(SignupFields {
            name: Some(&long_name),
            address: Some(&long_address),
            email: Some("a@b.co"),
            password: Some("Secret#123"),
        })
        .unwrap_err();

        assert_eq!(
            errors,
            vec![
                "Name must not exceed 60 characters.",
                "Address must not exceed 400 characters.",
            ]
        );

        let exact_name = "n".repeat(NAME_MAX_CHARS);
        let ok = validate_signup(SignupFields {
            name: Some(&exact_name),
            address: Some(ADDRESS),
            email: Some("a@b.co"),
            password: Some("Secret#123"),
        });
        assert!(ok.is_ok());
    }

    #[test]
    fn test_password_rules() {
        assert!(password_violations("Secret#1").is_empty());
        assert!(password_violations("Abcdefghijklmn!p").is_empty());
        assert_eq!(password_violations("Abcdefghijklmn!pq").len(), 1);
        assert_eq!(password_violations("secret#123").len(), 1);
        assert_eq!(password_violations("Secret1234").len(), 1);
        assert!(password_violations("Back\\slash").is_empty());
    }

    #[test]
    fn test_email_shapes() {
        assert!(validate_email(Some("user@example.com")).is_some());
        assert!(validate_email(Some("user@example")).is_none());
        assert!(validate_email(Some("us er@example.com")).is_none());
        assert!(validate_email(None).is_none());
    }
}
