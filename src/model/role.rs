use strum::{Display, EnumString};

/// Closed role set. Raw role strings coming from the identity provider
/// ("user", "supervisor", "administrator", "sysAdmin") are mapped into this
/// enum at the auth boundary; unknown strings are dropped there.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Display, EnumString)]
pub enum Role {
    #[strum(serialize = "user")]
    User,
    #[strum(serialize = "supervisor")]
    Supervisor,
    #[strum(serialize = "administrator")]
    Administrator,
    #[strum(serialize = "sysAdmin")]
    SysAdmin,
}

impl Role {
    /// Roles allowed to take the second-stage (admin) decision.
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Administrator | Role::SysAdmin)
    }
}

/// Identity context for one call: who is acting and with which roles.
/// Always passed explicitly into the workflow, never read from ambient state.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: String,
    pub roles: Vec<Role>,
}

impl Actor {
    pub fn new(id: impl Into<String>, roles: Vec<Role>) -> Self {
        Self {
            id: id.into(),
            roles,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r.is_admin())
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn raw_role_strings_map_into_closed_set() {
        assert_eq!(Role::from_str("sysAdmin").unwrap(), Role::SysAdmin);
        assert_eq!(Role::from_str("administrator").unwrap(), Role::Administrator);
        assert_eq!(Role::from_str("supervisor").unwrap(), Role::Supervisor);
        assert_eq!(Role::from_str("user").unwrap(), Role::User);
        assert!(Role::from_str("superuser").is_err());
    }

    #[test]
    fn only_admin_roles_count_as_admin() {
        assert!(Role::SysAdmin.is_admin());
        assert!(Role::Administrator.is_admin());
        assert!(!Role::Supervisor.is_admin());
        assert!(!Role::User.is_admin());
    }
}
