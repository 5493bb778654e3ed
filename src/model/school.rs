use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::validator::{email_rx, matches, phone_rx, unique, valid_website, Validator};

pub type SchoolId = i64;

pub const MAX_TEXT_LEN: usize = 200;
pub const MAX_ADDRESS_LEN: usize = 500;
pub const MIN_MODES: usize = 1;
pub const MAX_MODES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct School {
    pub id: SchoolId,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub level: String,
    pub contact: String,
    pub phone: String,
    // Omitted from output when empty, but still required by the rules
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub website: String,
    pub address: String,
    pub mode: Vec<String>,
    /// Optimistic-lock token, owned by storage
    pub version: i32,
}

/// Request body for creating a school
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NewSchool {
    pub name: String,
    pub level: String,
    pub contact: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub address: String,
    pub mode: Option<Vec<String>>,
}

/// Request body for a partial update. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpdateSchool {
    pub name: Option<String>,
    pub level: Option<String>,
    pub contact: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub mode: Option<Vec<String>>,
}

impl School {
    /// Merge the fields present in `update`, leaving the rest untouched
    pub fn apply(&mut self, update: UpdateSchool) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(level) = update.level {
            self.level = level;
        }
        if let Some(contact) = update.contact {
            self.contact = contact;
        }
        if let Some(phone) = update.phone {
            self.phone = phone;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(website) = update.website {
            self.website = website;
        }
        if let Some(address) = update.address {
            self.address = address;
        }
        if let Some(mode) = update.mode {
            self.mode = mode;
        }
    }

    pub fn location(&self) -> String {
        format!("/v1/schools/{}", self.id)
    }
}

/// Borrowed view of the client-editable fields, shared by both input shapes
struct Fields<'a> {
    name: &'a str,
    level: &'a str,
    contact: &'a str,
    phone: &'a str,
    email: &'a str,
    website: &'a str,
    address: &'a str,
    mode: Option<&'a [String]>,
}

impl<'a> From<&'a School> for Fields<'a> {
    fn from(school: &'a School) -> Self {
        Self {
            name: &school.name,
            level: &school.level,
            contact: &school.contact,
            phone: &school.phone,
            email: &school.email,
            website: &school.website,
            address: &school.address,
            mode: Some(school.mode.as_slice()),
        }
    }
}

impl<'a> From<&'a NewSchool> for Fields<'a> {
    fn from(school: &'a NewSchool) -> Self {
        Self {
            name: &school.name,
            level: &school.level,
            contact: &school.contact,
            phone: &school.phone,
            email: &school.email,
            website: &school.website,
            address: &school.address,
            mode: school.mode.as_deref(),
        }
    }
}

/// Run every school rule against `school`, recording failures in `v`
pub fn validate_school(v: &mut Validator, school: &School) {
    check_fields(v, school.into());
}

pub fn validate_new_school(v: &mut Validator, school: &NewSchool) {
    check_fields(v, school.into());
}

fn check_fields(v: &mut Validator, school: Fields<'_>) {
    check_text(v, "name", school.name, MAX_TEXT_LEN);
    check_text(v, "level", school.level, MAX_TEXT_LEN);
    check_text(v, "contact", school.contact, MAX_TEXT_LEN);

    v.check(!school.phone.is_empty(), "phone", "must be provided");
    v.check(matches(school.phone, phone_rx()), "phone", "must be a valid phone number");

    v.check(!school.email.is_empty(), "email", "must be provided");
    v.check(matches(school.email, email_rx()), "email", "must be a valid email address");

    v.check(!school.website.is_empty(), "website", "must be provided");
    v.check(valid_website(school.website), "website", "must be a valid URL");

    check_text(v, "address", school.address, MAX_ADDRESS_LEN);

    v.check(school.mode.is_some(), "mode", "must be provided");
    let mode = school.mode.unwrap_or_default();
    v.check(mode.len() >= MIN_MODES, "mode", "must contain at least 1 entry");
    v.check(mode.len() <= MAX_MODES, "mode", "must contain at most 5 entries");
    v.check(unique(mode), "mode", "must not contain duplicate entries");
}

// Lengths are measured in bytes
fn check_text(v: &mut Validator, field: &str, value: &str, max: usize) {
    v.check(!value.is_empty(), field, "must be provided");
    v.check(
        value.len() <= max,
        field,
        &format!("must not be more than {} bytes long", max),
    );
}
