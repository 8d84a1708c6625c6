use crate::models::permission::Permission;
use crate::models::user::Role;

/// The static role → permission table.
///
/// `admin` receives the universal wildcard; every other role gets an
/// explicit grant list. Table entries are parsed (and thereby validated)
/// at lookup time from compile-time literals.
pub fn role_permissions(role: Role) -> Vec<Permission> {
    let grants: &[&str] = match role {
        Role::Admin => &["*:*"],
        Role::Signer => &[
            "certificate:read",
            "certificate:sign",
            "document:read",
            "document:sign",
            "signature:create",
            "signature:read",
            "template:read",
        ],
        Role::Staff => &[
            "certificate:create",
            "certificate:read",
            "certificate:update",
            "certificate:send",
            "template:*",
            "recipient:*",
        ],
        Role::Viewer => &["certificate:read", "template:read"],
    };

    grants
        .iter()
        .map(|g| {
            g.parse()
                .unwrap_or_else(|e| panic!("invalid permission table entry '{}': {}", g, e))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_entries_all_parse() {
        for role in [Role::Admin, Role::Signer, Role::Staff, Role::Viewer] {
            assert!(!role_permissions(role).is_empty());
        }
    }

    #[test]
    fn test_admin_gets_wildcard() {
        assert_eq!(role_permissions(Role::Admin), vec![Permission::wildcard()]);
    }

    #[test]
    fn test_viewer_cannot_sign() {
        let required: Permission = "certificate:sign".parse().unwrap();
        assert!(!role_permissions(Role::Viewer).iter().any(|p| p.grants(&required)));
        assert!(role_permissions(Role::Signer).iter().any(|p| p.grants(&required)));
    }
}
