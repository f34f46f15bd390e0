//! The role-gated page shell: who is signed in and which tabs they see.

use pantry_shifts_client::with_identity;
use pantry_shifts_core::{Tab, User, UserId};

/// One navigation tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavTab {
    pub label: &'static str,
    pub href: String,
    pub active: bool,
}

/// Header data rendered on every identified page.
#[derive(Debug, Clone)]
pub struct Shell {
    pub user_id: UserId,
    pub email: String,
    pub name: String,
    pub roles: String,
    pub tier: &'static str,
    pub tabs: Vec<NavTab>,
    pub signups_href: String,
}

impl Shell {
    /// Shell for `user` with `current` highlighted.
    ///
    /// Only tabs the user's capability allows are listed.
    #[must_use]
    pub fn new(user: &User, current: Tab) -> Self {
        let capability = user.capability();
        let tabs = capability
            .visible_tabs()
            .into_iter()
            .map(|tab| NavTab {
                label: tab.label(),
                href: with_identity(tab.path(), Some(user.id)),
                active: tab == current,
            })
            .collect();

        let roles = user.role_list();
        Self {
            user_id: user.id,
            email: user.email.clone(),
            name: user.display_name().to_owned(),
            roles: if roles.is_empty() {
                "No roles".to_string()
            } else {
                roles
            },
            tier: capability.label(),
            tabs,
            signups_href: with_identity("/signups", Some(user.id)),
        }
    }

    /// Labels of the visible tabs, in display order.
    #[must_use]
    pub fn tab_labels(&self) -> Vec<&'static str> {
        self.tabs.iter().map(|tab| tab.label).collect()
    }
}
