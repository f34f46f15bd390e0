//! Form validation with per-field error messages.
//!
//! Each form type holds the raw strings a browser posts. `validate` either
//! produces the typed request payload or a [`FieldErrors`] listing every
//! problem, in the order the fields appear on the form. Nothing here touches
//! the network, so a failed validation can never reach the backend.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    Email, LeadAssignment, NewPantry, NewShift, NewShiftRole, NewUser, PantryId, RoleAssignment,
    RoleId, UserId,
};

/// Ordered field to message map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<(String, String)>);

impl FieldErrors {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Record an error for `field`, replacing any earlier one.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        let message = message.into();
        if let Some(entry) = self.0.iter_mut().find(|(name, _)| name == field) {
            entry.1 = message;
        } else {
            self.0.push((field.to_owned(), message));
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Message for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, message)| message.as_str())
    }

    /// Message for `field`, or `""` so templates can render it unconditionally.
    #[must_use]
    pub fn message(&self, field: &str) -> &str {
        self.get(field).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(field, message)| (field.as_str(), message.as_str()))
    }

    /// First message, used as the panel status line.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(|(_, message)| message.as_str())
    }

    /// `Ok(value)` when no errors were recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` if any error was recorded.
    pub fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (_, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            f.write_str(message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

// =============================================================================
// Field parsers
// =============================================================================

/// Parse a strictly positive integer, trimming whitespace.
#[must_use]
pub fn parse_positive(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok().filter(|count| *count >= 1)
}

/// Parse an optional id from a `<select>`; blank means none.
fn parse_optional_id<T: std::str::FromStr>(value: &str) -> Option<T> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        value.parse().ok()
    }
}

/// Parse an HTML `datetime-local` value (`2026-10-19T09:00`, seconds optional)
/// as wall-clock time at `offset`.
#[must_use]
pub fn parse_datetime_local(value: &str, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let value = value.trim();
    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|local| local.with_timezone(&Utc))
}

/// Derive a URL slug: lowercase ASCII alphanumerics separated by single `-`.
///
/// ```
/// use pantry_shifts_core::validation::slugify;
///
/// assert_eq!(slugify("Eastside Food Pantry"), "eastside-food-pantry");
/// assert_eq!(slugify("  St. Mary's  #2 "), "st-mary-s-2");
/// ```
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

// =============================================================================
// Forms
// =============================================================================

/// Shift creation form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShiftForm {
    pub pantry_id: String,
    pub role_name: String,
    pub start_time: String,
    pub end_time: String,
    pub required_count: String,
}

impl ShiftForm {
    /// Validate the form, interpreting times at `offset`.
    ///
    /// # Errors
    ///
    /// Returns every failing field with its message.
    pub fn validate(&self, offset: FixedOffset) -> Result<(PantryId, NewShift), FieldErrors> {
        let mut errors = FieldErrors::new();

        let pantry_id = parse_optional_id::<PantryId>(&self.pantry_id);
        if pantry_id.is_none() {
            errors.add("pantry_id", "Select a pantry first.");
        }

        let role_name = self.role_name.trim();
        if role_name.is_empty() {
            errors.add("role_name", "Role / Title is required");
        }

        let start = if self.start_time.trim().is_empty() {
            errors.add("start_time", "Start time is required");
            None
        } else {
            let parsed = parse_datetime_local(&self.start_time, offset);
            if parsed.is_none() {
                errors.add("start_time", "Start time is not a valid date and time");
            }
            parsed
        };

        let end = if self.end_time.trim().is_empty() {
            errors.add("end_time", "End time is required");
            None
        } else {
            let parsed = parse_datetime_local(&self.end_time, offset);
            if parsed.is_none() {
                errors.add("end_time", "End time is not a valid date and time");
            }
            parsed
        };

        if let (Some(start), Some(end)) = (start, end) {
            if end <= start {
                errors.add("end_time", "End time must be after start time");
            }
        }

        let required_count = parse_positive(&self.required_count);
        if required_count.is_none() {
            errors.add("required_count", "Required count must be a positive integer");
        }

        match (pantry_id, start, end, required_count) {
            (Some(pantry_id), Some(start_time), Some(end_time), Some(required_count))
                if errors.is_empty() =>
            {
                Ok((
                    pantry_id,
                    NewShift {
                        role_name: role_name.to_owned(),
                        start_time,
                        end_time,
                        required_count,
                    },
                ))
            }
            _ => Err(errors),
        }
    }
}

/// Form adding a role to an existing shift.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShiftRoleForm {
    pub role_title: String,
    pub required_count: String,
}

impl ShiftRoleForm {
    /// # Errors
    ///
    /// Returns every failing field with its message.
    pub fn validate(&self) -> Result<NewShiftRole, FieldErrors> {
        let mut errors = FieldErrors::new();

        let role_title = self.role_title.trim();
        if role_title.is_empty() {
            errors.add("role_title", "Role / Title is required");
        }
        let required_count = parse_positive(&self.required_count);
        if required_count.is_none() {
            errors.add("required_count", "Required count must be a positive integer");
        }

        match required_count {
            Some(required_count) if errors.is_empty() => Ok(NewShiftRole {
                role_title: role_title.to_owned(),
                required_count,
            }),
            _ => Err(errors),
        }
    }
}

/// Pantry create or rename form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PantryForm {
    pub name: String,
    pub slug: String,
    pub location_address: String,
}

impl PantryForm {
    /// Validate the form; a blank slug is derived from the name.
    ///
    /// # Errors
    ///
    /// Returns every failing field with its message.
    pub fn validate(&self) -> Result<NewPantry, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", "Pantry name is required");
        }

        let slug = if self.slug.trim().is_empty() {
            slugify(name)
        } else {
            slugify(&self.slug)
        };
        if !name.is_empty() && slug.is_empty() {
            errors.add("slug", "Slug must contain letters or numbers");
        }

        let location_address = Some(self.location_address.trim())
            .filter(|address| !address.is_empty())
            .map(str::to_owned);

        errors.into_result(|| NewPantry {
            name: name.to_owned(),
            slug,
            location_address,
        })
    }
}

/// Lead assignment form on the admin panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadForm {
    pub pantry_id: String,
    pub user_id: String,
}

impl LeadForm {
    /// # Errors
    ///
    /// Returns an error unless both a pantry and a lead are selected.
    pub fn validate(&self) -> Result<(PantryId, LeadAssignment), FieldErrors> {
        let pantry_id = parse_optional_id::<PantryId>(&self.pantry_id);
        let user_id = parse_optional_id::<UserId>(&self.user_id);
        match (pantry_id, user_id) {
            (Some(pantry_id), Some(user_id)) => Ok((pantry_id, LeadAssignment { user_id })),
            (pantry_id, _) => {
                let mut errors = FieldErrors::new();
                let field = if pantry_id.is_none() {
                    "pantry_id"
                } else {
                    "user_id"
                };
                errors.add(field, "Please select both pantry and lead");
                Err(errors)
            }
        }
    }
}

/// Form setting or clearing a pantry's `lead_id`. A blank lead clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PantryLeadForm {
    pub lead_id: String,
}

impl PantryLeadForm {
    /// # Errors
    ///
    /// Returns an error if a non-blank lead is not a valid id.
    pub fn validate(&self) -> Result<Option<UserId>, FieldErrors> {
        if self.lead_id.trim().is_empty() {
            return Ok(None);
        }
        parse_optional_id::<UserId>(&self.lead_id)
            .map(Some)
            .ok_or_else(|| {
                let mut errors = FieldErrors::new();
                errors.add("lead_id", "Select a lead from the list");
                errors
            })
    }
}

/// User creation form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserForm {
    pub email: String,
    pub full_name: String,
}

impl UserForm {
    /// # Errors
    ///
    /// Returns every failing field with its message.
    pub fn validate(&self) -> Result<NewUser, FieldErrors> {
        let mut errors = FieldErrors::new();

        let email = match Email::parse(&self.email) {
            Ok(email) => Some(email),
            Err(e) => {
                errors.add("email", e.to_string());
                None
            }
        };
        let full_name = self.full_name.trim();
        if full_name.is_empty() {
            errors.add("full_name", "Full name is required");
        }

        match email {
            Some(email) if errors.is_empty() => Ok(NewUser {
                email,
                full_name: full_name.to_owned(),
            }),
            _ => Err(errors),
        }
    }
}

/// Form granting a role to a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleAssignForm {
    pub role_id: String,
}

impl RoleAssignForm {
    /// # Errors
    ///
    /// Returns an error unless a role is selected.
    pub fn validate(&self) -> Result<RoleAssignment, FieldErrors> {
        parse_optional_id::<RoleId>(&self.role_id)
            .map(|role_id| RoleAssignment { role_id })
            .ok_or_else(|| {
                let mut errors = FieldErrors::new();
                errors.add("role_id", "Please select both user and role");
                errors
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn shift_form() -> ShiftForm {
        ShiftForm {
            pantry_id: "1".to_string(),
            role_name: " Sorting ".to_string(),
            start_time: "2026-10-19T09:00".to_string(),
            end_time: "2026-10-19T12:00".to_string(),
            required_count: "4".to_string(),
        }
    }

    #[test]
    fn test_valid_shift_form() {
        let (pantry_id, shift) = shift_form().validate(utc()).unwrap();
        assert_eq!(pantry_id, PantryId::new(1));
        assert_eq!(shift.role_name, "Sorting");
        assert_eq!(shift.required_count, 4);
        assert_eq!(shift.start_time.to_rfc3339(), "2026-10-19T09:00:00+00:00");
    }

    #[test]
    fn test_shift_times_are_read_in_offset() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let (_, shift) = shift_form().validate(offset).unwrap();
        assert_eq!(shift.start_time.to_rfc3339(), "2026-10-19T07:00:00+00:00");
    }

    #[test]
    fn test_end_before_or_equal_start_is_rejected() {
        let mut form = shift_form();
        form.end_time = form.start_time.clone();
        let errors = form.validate(utc()).unwrap_err();
        assert_eq!(errors.get("end_time"), Some("End time must be after start time"));

        form.end_time = "2026-10-19T08:59".to_string();
        let errors = form.validate(utc()).unwrap_err();
        assert_eq!(errors.get("end_time"), Some("End time must be after start time"));
    }

    #[test]
    fn test_missing_role_name_is_rejected() {
        let mut form = shift_form();
        form.role_name = "   ".to_string();
        let errors = form.validate(utc()).unwrap_err();
        assert_eq!(errors.get("role_name"), Some("Role / Title is required"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_empty_shift_form_reports_every_field() {
        let errors = ShiftForm::default().validate(utc()).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|(field, _)| field).collect();
        assert_eq!(
            fields,
            vec!["pantry_id", "role_name", "start_time", "end_time", "required_count"]
        );
        assert_eq!(errors.first(), Some("Select a pantry first."));
        assert_eq!(errors.message("start_time"), "Start time is required");
        assert_eq!(errors.message("end_time"), "End time is required");
    }

    #[test]
    fn test_required_count_must_be_positive_integer() {
        for bad in ["0", "-1", "two", "1.5", ""] {
            let mut form = shift_form();
            form.required_count = bad.to_string();
            let errors = form.validate(utc()).unwrap_err();
            assert_eq!(
                errors.get("required_count"),
                Some("Required count must be a positive integer"),
                "input {bad:?}"
            );
        }
    }

    #[test]
    fn test_datetime_local_accepts_seconds() {
        let parsed = parse_datetime_local("2026-10-19T09:00:30", utc()).unwrap();
        assert_eq!(parsed.to_rfc3339(), "2026-10-19T09:00:30+00:00");
        assert!(parse_datetime_local("tomorrow", utc()).is_none());
    }

    #[test]
    fn test_shift_role_form() {
        let form = ShiftRoleForm {
            role_title: "Driver".to_string(),
            required_count: "2".to_string(),
        };
        assert_eq!(form.validate().unwrap().required_count, 2);

        let errors = ShiftRoleForm::default().validate().unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_pantry_form_derives_slug() {
        let form = PantryForm {
            name: "Eastside Food Pantry".to_string(),
            ..PantryForm::default()
        };
        let pantry = form.validate().unwrap();
        assert_eq!(pantry.slug, "eastside-food-pantry");
        assert!(pantry.location_address.is_none());
    }

    #[test]
    fn test_pantry_form_normalizes_given_slug() {
        let form = PantryForm {
            name: "Eastside".to_string(),
            slug: "East Side!".to_string(),
            location_address: " 1 Main St ".to_string(),
        };
        let pantry = form.validate().unwrap();
        assert_eq!(pantry.slug, "east-side");
        assert_eq!(pantry.location_address.as_deref(), Some("1 Main St"));
    }

    #[test]
    fn test_pantry_form_requires_name() {
        let errors = PantryForm::default().validate().unwrap_err();
        assert_eq!(errors.get("name"), Some("Pantry name is required"));
    }

    #[test]
    fn test_lead_form_requires_both() {
        let form = LeadForm {
            pantry_id: "3".to_string(),
            user_id: String::new(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.first(), Some("Please select both pantry and lead"));

        let form = LeadForm {
            pantry_id: "3".to_string(),
            user_id: "8".to_string(),
        };
        let (pantry_id, assignment) = form.validate().unwrap();
        assert_eq!(pantry_id, PantryId::new(3));
        assert_eq!(assignment.user_id, UserId::new(8));
    }

    #[test]
    fn test_pantry_lead_form_blank_clears() {
        assert_eq!(PantryLeadForm::default().validate().unwrap(), None);
        let form = PantryLeadForm {
            lead_id: "4".to_string(),
        };
        assert_eq!(form.validate().unwrap(), Some(UserId::new(4)));
    }

    #[test]
    fn test_user_form() {
        let form = UserForm {
            email: "new@example.org".to_string(),
            full_name: "New Volunteer".to_string(),
        };
        assert_eq!(form.validate().unwrap().email.as_str(), "new@example.org");

        let errors = UserForm::default().validate().unwrap_err();
        assert_eq!(errors.get("email"), Some("Email is required"));
        assert_eq!(errors.get("full_name"), Some("Full name is required"));
    }

    #[test]
    fn test_role_assign_form() {
        assert!(RoleAssignForm::default().validate().is_err());
        let form = RoleAssignForm {
            role_id: "2".to_string(),
        };
        assert_eq!(form.validate().unwrap().role_id, RoleId::new(2));
    }

    #[test]
    fn test_field_errors_replace_and_display() {
        let mut errors = FieldErrors::new();
        errors.add("end_time", "End time is required");
        errors.add("name", "Pantry name is required");
        errors.add("end_time", "End time must be after start time");
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.to_string(),
            "End time must be after start time; Pantry name is required"
        );
    }
}
