use serde::{Deserialize, Serialize};

/// The signed-in user. `role` is carried through but never interpreted here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub role: String,
}

pub trait IdentityProvider {
    fn current_user(&self) -> Option<Identity>;
}

/// Identity fixed at construction, e.g. from the config file.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(Option<Identity>);

impl StaticIdentity {
    pub fn signed_in(id: impl Into<String>, role: impl Into<String>) -> Self {
        Self(Some(Identity {
            id: id.into(),
            role: role.into(),
        }))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<Identity> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_identity() {
        let user = StaticIdentity::signed_in("u1", "admin").current_user().unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.role, "admin");
        assert!(StaticIdentity::anonymous().current_user().is_none());
    }
}
