//! Field-level input checks collected into one error map.

use crate::error::{AppError, FieldErrors};
use regex::Regex;
use std::sync::OnceLock;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$")
            .expect("email pattern should be valid")
    })
}

/// Collects the first failure per field.
#[derive(Debug, Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` for `field` unless `ok`. Earlier messages win.
    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.errors
                .entry(field.to_string())
                .or_insert_with(|| message.to_string());
        }
    }

    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// `InvalidData` with every recorded failure, or `Ok`.
    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::InvalidData(self.errors))
        }
    }
}

pub fn is_email(value: &str) -> bool {
    email_regex().is_match(value)
}

/// Length in characters, not bytes.
pub fn char_len(value: &str) -> usize {
    value.chars().count()
}

pub fn permitted<T: PartialEq>(value: &T, allowed: &[T]) -> bool {
    allowed.contains(value)
}

/// True when no value appears twice, ignoring ASCII case.
pub fn unique_ignore_case(values: &[String]) -> bool {
    let mut seen: Vec<String> = Vec::with_capacity(values.len());
    for v in values {
        let key = v.to_lowercase();
        if seen.contains(&key) {
            return false;
        }
        seen.push(key);
    }
    true
}
