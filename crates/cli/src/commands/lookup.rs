//! `me` and `pantries` commands.

use pantry_shifts_core::{Pantry, Tab, User};

use super::{CliError, Session, print};

/// Identity, roles, tier and visible tabs of `user`.
#[must_use]
pub fn describe_user(user: &User) -> String {
    let capability = user.capability();
    let roles = if user.roles.is_empty() {
        "No roles".to_string()
    } else {
        user.role_list()
    };
    let tabs = capability
        .visible_tabs()
        .into_iter()
        .map(Tab::label)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "User #{}: {} <{}>\nRoles: {}\nAccess: {}\nTabs: {}",
        user.id,
        user.display_name(),
        user.email,
        roles,
        capability.label(),
        tabs
    )
}

/// One tab-separated line per pantry: id, name, slug, address.
#[must_use]
pub fn pantry_table(pantries: &[Pantry]) -> String {
    if pantries.is_empty() {
        return "No pantries available".to_string();
    }
    pantries
        .iter()
        .map(|pantry| {
            format!(
                "{}\t{}\t{}\t{}",
                pantry.id,
                pantry.name,
                pantry.slug,
                pantry.location_address.as_deref().unwrap_or("-")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Print the current user.
///
/// # Errors
///
/// Returns `CliError::Api` if no identity was given or the backend rejects it.
pub async fn me(session: &Session) -> Result<(), CliError> {
    let user = session.client.me().await?;
    print(&describe_user(&user))
}

/// Print every pantry.
///
/// # Errors
///
/// Returns `CliError::Api` if the pantry list cannot be fetched.
pub async fn pantries(session: &Session) -> Result<(), CliError> {
    let pantries = session.client.all_pantries().await?;
    print(&pantry_table(&pantries))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use pantry_shifts_core::{PantryId, RoleName, UserId};

    use super::*;

    fn user(roles: &[RoleName]) -> User {
        User {
            id: UserId::new(7),
            email: "lead@example.org".to_string(),
            full_name: Some("Rosa Diaz".to_string()),
            roles: roles.iter().cloned().collect::<BTreeSet<_>>(),
        }
    }

    #[test]
    fn test_describe_pantry_lead() {
        let text = describe_user(&user(&[RoleName::PantryLead]));
        assert_eq!(
            text,
            "User #7: Rosa Diaz <lead@example.org>\nRoles: PANTRY_LEAD\nAccess: Pantry lead\nTabs: Calendar, Manage Shifts"
        );
    }

    #[test]
    fn test_describe_admin_and_roleless() {
        let admin = describe_user(&user(&[RoleName::Admin, RoleName::PantryLead]));
        assert!(admin.contains("Roles: ADMIN, PANTRY_LEAD"));
        assert!(admin.ends_with("Tabs: Calendar, Manage Shifts, Admin"));

        let volunteer = describe_user(&user(&[]));
        assert!(volunteer.contains("Roles: No roles"));
        assert!(volunteer.ends_with("Tabs: Calendar"));
    }

    #[test]
    fn test_pantry_table() {
        assert_eq!(pantry_table(&[]), "No pantries available");

        let pantries = vec![Pantry {
            id: PantryId::new(2),
            name: "Eastside".to_string(),
            slug: "eastside".to_string(),
            location_address: None,
            lead_id: None,
            leads: Vec::new(),
        }];
        assert_eq!(pantry_table(&pantries), "2\tEastside\teastside\t-");
    }
}
