use std::sync::LazyLock;

use regex::Regex;

use crate::model::ContactFormData;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

// Nigerian mobile numbers, local or international form.
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+?234|0)?[789][01]\d{8}$").expect("phone pattern"));

pub const MIN_MESSAGE_CHARS: usize = 10;

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// Whitespace anywhere in the number is ignored.
pub fn is_valid_phone(phone: &str) -> bool {
    let compact: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    PHONE.is_match(&compact)
}

/// Checks the contact form and returns every problem, in form order.
pub fn validate_contact_form(form: &ContactFormData) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if form.name.trim().is_empty() {
        errors.push("Name is required".to_string());
    }

    if form.email.trim().is_empty() {
        errors.push("Email is required".to_string());
    } else if !is_valid_email(&form.email) {
        errors.push("Please enter a valid email address".to_string());
    }

    if let Some(phone) = form.phone.as_deref().filter(|p| !p.is_empty()) {
        if !is_valid_phone(phone) {
            errors.push(
                "Please enter a valid phone number (e.g., 09012345678 or +2349012345678)"
                    .to_string(),
            );
        }
    }

    if form.subject.trim().is_empty() {
        errors.push("Subject is required".to_string());
    }

    let message = form.message.trim();
    if message.is_empty() {
        errors.push("Message is required".to_string());
    } else if message.chars().count() < MIN_MESSAGE_CHARS {
        errors.push("Message must be at least 10 characters long".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub fn validate_newsletter_email(email: &str) -> Result<(), String> {
    if email.trim().is_empty() {
        return Err("Email is required".to_string());
    }
    if !is_valid_email(email) {
        return Err("Please enter a valid email address".to_string());
    }
    Ok(())
}
