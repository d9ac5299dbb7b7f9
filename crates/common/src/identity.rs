//! Caller identity, resolved once per request at the boundary.

use serde::{Deserialize, Serialize};

use crate::ids::{SessionToken, UserId};

/// Role attached to an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    Customer,
    Admin,
}

/// Who is making a request.
///
/// The auth collaborator resolves credentials into this sum type exactly
/// once at the HTTP boundary; core services receive it explicitly and never
/// re-derive it mid-flow. Exactly one of user or session token exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Identity {
    /// Anonymous visitor identified by an opaque session token.
    Anonymous(SessionToken),
    /// Authenticated user.
    User { id: UserId, role: Role },
}

impl Identity {
    /// Convenience constructor for an authenticated customer.
    pub fn user(id: UserId) -> Self {
        Identity::User {
            id,
            role: Role::Customer,
        }
    }

    /// Convenience constructor for an authenticated admin.
    pub fn admin(id: UserId) -> Self {
        Identity::User {
            id,
            role: Role::Admin,
        }
    }

    /// Returns the user id when authenticated.
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Identity::User { id, .. } => Some(*id),
            Identity::Anonymous(_) => None,
        }
    }

    /// Returns true when the caller holds the admin role.
    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            Identity::User {
                role: Role::Admin,
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_only_for_authenticated() {
        let id = UserId::new();
        assert_eq!(Identity::user(id).user_id(), Some(id));
        assert_eq!(Identity::Anonymous("tok".into()).user_id(), None);
    }

    #[test]
    fn admin_detection() {
        let id = UserId::new();
        assert!(Identity::admin(id).is_admin());
        assert!(!Identity::user(id).is_admin());
        assert!(!Identity::Anonymous("tok".into()).is_admin());
    }
}
