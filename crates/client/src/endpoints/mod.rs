//! Endpoint methods on [`crate::ApiClient`], grouped by resource.

mod pantries;
mod public;
mod shifts;
mod signups;
mod users;

use pantry_shifts_core::{Signup, User};
use serde::Deserialize;

/// `POST /api/users` answers either `{"user": {..}}` or the bare user.
#[derive(Deserialize)]
#[serde(untagged)]
enum UserEnvelope {
    Wrapped { user: User },
    Bare(User),
}

impl From<UserEnvelope> for User {
    fn from(envelope: UserEnvelope) -> Self {
        match envelope {
            UserEnvelope::Wrapped { user } | UserEnvelope::Bare(user) => user,
        }
    }
}

/// `POST /api/shift-roles/{id}/signup` answers either `{"signup": {..}}` or
/// the bare signup.
#[derive(Deserialize)]
#[serde(untagged)]
enum SignupEnvelope {
    Wrapped { signup: Signup },
    Bare(Signup),
}

impl From<SignupEnvelope> for Signup {
    fn from(envelope: SignupEnvelope) -> Self {
        match envelope {
            SignupEnvelope::Wrapped { signup } | SignupEnvelope::Bare(signup) => signup,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pantry_shifts_core::{SignupId, UserId};

    #[test]
    fn test_user_envelope_accepts_both_shapes() {
        let wrapped: UserEnvelope =
            serde_json::from_str(r#"{"user":{"id":4,"email":"a@b.org","role":"VOLUNTEER"}}"#)
                .unwrap();
        let bare: UserEnvelope =
            serde_json::from_str(r#"{"id":4,"email":"a@b.org","role":"VOLUNTEER"}"#).unwrap();
        assert_eq!(User::from(wrapped), User::from(bare));
    }

    #[test]
    fn test_signup_envelope_accepts_both_shapes() {
        let wrapped: UserEnvelope = serde_json::from_str(r#"{"user":{"user_id":9,"email":"x@y.z"}}"#)
            .unwrap();
        assert_eq!(User::from(wrapped).id, UserId::new(9));

        let signup: SignupEnvelope = serde_json::from_str(
            r#"{"signup":{"signup_id":1,"shift_role_id":2,"user_id":3}}"#,
        )
        .unwrap();
        assert_eq!(Signup::from(signup).id, SignupId::new(1));

        let signup: SignupEnvelope =
            serde_json::from_str(r#"{"id":5,"shift_role_id":2,"user_id":3}"#).unwrap();
        assert_eq!(Signup::from(signup).id, SignupId::new(5));
    }
}
