use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Phone numbers such as `601-4411`, `(501) 601-4411` or `+501 601 4411`.
pub const PHONE_PATTERN: &str =
    r"^\+?(?:[0-9]{1,3}[\s.-]?)?(?:\(?[0-9]{3}\)?[\s.-]?)?[0-9]{3}[\s.-]?[0-9]{4}$";

pub const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$";

// Constant patterns, checked by `test_patterns_compile`
static PHONE_RX: OnceLock<Regex> = OnceLock::new();
static EMAIL_RX: OnceLock<Regex> = OnceLock::new();

pub fn phone_rx() -> &'static Regex {
    PHONE_RX.get_or_init(|| Regex::new(PHONE_PATTERN).expect("phone pattern compiles"))
}

pub fn email_rx() -> &'static Regex {
    EMAIL_RX.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"))
}

/// Collects field-keyed validation failures.
///
/// Checks never short-circuit: every rule runs so a single pass reports
/// all violated fields. Only the first failure recorded for a field is
/// kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validator {
    errors: HashMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no field has a recorded error
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record `message` under `field` unless that field already failed
    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add_error(field, message);
        }
    }

    pub fn errors(&self) -> &HashMap<String, String> {
        &self.errors
    }

    pub fn into_errors(self) -> HashMap<String, String> {
        self.errors
    }
}

pub fn matches(value: &str, rx: &Regex) -> bool {
    rx.is_match(value)
}

/// Absolute URL with a non-empty host
pub fn valid_website(value: &str) -> bool {
    match url::Url::parse(value) {
        Ok(parsed) => parsed.host_str().map_or(false, |host| !host.is_empty()),
        Err(_) => false,
    }
}

pub fn unique(values: &[String]) -> bool {
    let mut seen = HashSet::with_capacity(values.len());
    values.iter().all(|value| seen.insert(value.as_str()))
}
