//! Role names and the capability tiers derived from them.
//!
//! The backend reports a user's roles as plain strings. [`RoleName`] gives the
//! known ones a type, and [`Capability`] collapses a role set into the single
//! tier that decides which dashboard tabs a user can see.

use serde::{Deserialize, Serialize};

/// A role name as reported by the backend.
///
/// Unknown names are kept verbatim in [`RoleName::Other`] so that displaying a
/// user's roles never loses information.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RoleName {
    /// Full administration of pantries, leads and users.
    Admin,
    /// Older spelling of [`RoleName::Admin`] still issued by some backends.
    SuperAdmin,
    /// Manages shifts for the pantries they lead.
    PantryLead,
    /// Browses the calendar and signs up for shifts.
    Volunteer,
    /// Any other role string.
    Other(String),
}

/// Error returned when parsing an empty role name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("role name cannot be empty")]
pub struct InvalidRoleName;

impl RoleName {
    /// The wire spelling of this role.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "ADMIN",
            Self::SuperAdmin => "SUPER_ADMIN",
            Self::PantryLead => "PANTRY_LEAD",
            Self::Volunteer => "VOLUNTEER",
            Self::Other(name) => name,
        }
    }

    /// Whether this role grants administration.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }
}

impl From<String> for RoleName {
    fn from(value: String) -> Self {
        match value.as_str() {
            "ADMIN" => Self::Admin,
            "SUPER_ADMIN" => Self::SuperAdmin,
            "PANTRY_LEAD" => Self::PantryLead,
            "VOLUNTEER" => Self::Volunteer,
            _ => Self::Other(value),
        }
    }
}

impl From<RoleName> for String {
    fn from(role: RoleName) -> Self {
        match role {
            RoleName::Other(name) => name,
            known => known.as_str().to_owned(),
        }
    }
}

impl std::fmt::Display for RoleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RoleName {
    type Err = InvalidRoleName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(InvalidRoleName);
        }
        Ok(Self::from(s.to_ascii_uppercase()))
    }
}

/// Capability tier of a dashboard user.
///
/// Tiers are ordered: every capability of a lower tier is also granted by the
/// higher ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Calendar browsing and own signups only.
    CalendarOnly,
    /// Shift and shift-role management.
    ShiftManagement,
    /// Pantry, lead and user administration.
    Administration,
}

impl Capability {
    /// Derive the tier from a role set.
    ///
    /// An admin role wins over everything; otherwise a pantry lead role grants
    /// shift management; anything else is calendar-only.
    #[must_use]
    pub fn from_roles<'a, I>(roles: I) -> Self
    where
        I: IntoIterator<Item = &'a RoleName>,
    {
        let mut tier = Self::CalendarOnly;
        for role in roles {
            if role.is_admin() {
                return Self::Administration;
            }
            if *role == RoleName::PantryLead {
                tier = Self::ShiftManagement;
            }
        }
        tier
    }

    /// Whether this tier grants at least `required`.
    #[must_use]
    pub fn includes(self, required: Self) -> bool {
        self >= required
    }

    /// Whether a tab is visible at this tier.
    #[must_use]
    pub fn allows(self, tab: Tab) -> bool {
        self.includes(tab.required_capability())
    }

    /// Tabs visible at this tier, in display order.
    #[must_use]
    pub fn visible_tabs(self) -> Vec<Tab> {
        Tab::ALL.into_iter().filter(|tab| self.allows(*tab)).collect()
    }

    /// Human label for the tier.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CalendarOnly => "Volunteer",
            Self::ShiftManagement => "Pantry lead",
            Self::Administration => "Administrator",
        }
    }
}

/// A top-level dashboard tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    /// Weekly shift calendar.
    Calendar,
    /// Shift management for leads.
    Shifts,
    /// Pantry, lead and user administration.
    Admin,
}

impl Tab {
    /// All tabs in display order.
    pub const ALL: [Self; 3] = [Self::Calendar, Self::Shifts, Self::Admin];

    /// Minimum tier that can see this tab.
    #[must_use]
    pub const fn required_capability(self) -> Capability {
        match self {
            Self::Calendar => Capability::CalendarOnly,
            Self::Shifts => Capability::ShiftManagement,
            Self::Admin => Capability::Administration,
        }
    }

    /// Tab label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Calendar => "Calendar",
            Self::Shifts => "Manage Shifts",
            Self::Admin => "Admin",
        }
    }

    /// Dashboard path the tab links to.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Calendar => "/calendar",
            Self::Shifts => "/shifts",
            Self::Admin => "/admin/pantries",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_name_round_trips_known_and_unknown() {
        let roles: Vec<RoleName> =
            serde_json::from_str(r#"["ADMIN","PANTRY_LEAD","DRIVER"]"#).unwrap();
        assert_eq!(
            roles,
            vec![
                RoleName::Admin,
                RoleName::PantryLead,
                RoleName::Other("DRIVER".to_string())
            ]
        );
        assert_eq!(
            serde_json::to_string(&roles).unwrap(),
            r#"["ADMIN","PANTRY_LEAD","DRIVER"]"#
        );
    }

    #[test]
    fn test_role_name_from_str_normalizes_case() {
        assert_eq!("pantry_lead".parse::<RoleName>().unwrap(), RoleName::PantryLead);
        assert_eq!(" ".parse::<RoleName>(), Err(InvalidRoleName));
    }

    #[test]
    fn test_admin_overrides_everything() {
        let roles = [RoleName::Volunteer, RoleName::PantryLead, RoleName::Admin];
        assert_eq!(Capability::from_roles(&roles), Capability::Administration);
        assert_eq!(
            Capability::from_roles(&[RoleName::SuperAdmin]),
            Capability::Administration
        );
    }

    #[test]
    fn test_lead_without_admin_gets_management() {
        let roles = [RoleName::Volunteer, RoleName::PantryLead];
        assert_eq!(Capability::from_roles(&roles), Capability::ShiftManagement);
    }

    #[test]
    fn test_everything_else_is_calendar_only() {
        assert_eq!(Capability::from_roles(&[]), Capability::CalendarOnly);
        let roles = [RoleName::Volunteer, RoleName::Other("DRIVER".to_string())];
        assert_eq!(Capability::from_roles(&roles), Capability::CalendarOnly);
    }

    #[test]
    fn test_visible_tabs_are_supersets() {
        assert_eq!(Capability::CalendarOnly.visible_tabs(), vec![Tab::Calendar]);
        assert_eq!(
            Capability::ShiftManagement.visible_tabs(),
            vec![Tab::Calendar, Tab::Shifts]
        );
        assert_eq!(Capability::Administration.visible_tabs(), Tab::ALL.to_vec());
    }

    #[test]
    fn test_includes() {
        assert!(Capability::Administration.includes(Capability::ShiftManagement));
        assert!(!Capability::ShiftManagement.includes(Capability::Administration));
        assert!(Capability::CalendarOnly.includes(Capability::CalendarOnly));
    }
}
