//! Built-in shop roles, users and the standard probe list.

use super::model::{ResourcePermissions as P, Role, User};
use super::probe::AccessProbe;
use super::tables::{RoleTable, UserDirectory};

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_SALES: &str = "sales";
pub const ROLE_INVENTORY: &str = "inventory";
pub const ROLE_READONLY: &str = "readonly";

pub const PARTS: &str = "parts";
pub const CUSTOMERS: &str = "customers";
pub const ORDERS: &str = "orders";

/// Collections seeded by `setup` and covered by the default roles.
pub const SHOP_COLLECTIONS: [&str; 3] = [PARTS, CUSTOMERS, ORDERS];

pub fn default_roles() -> Vec<Role> {
    vec![
        Role::new(ROLE_ADMIN, "Administrator with full access")
            .grant(PARTS, P::FULL)
            .grant(CUSTOMERS, P::FULL)
            .grant(ORDERS, P::FULL),
        Role::new(ROLE_MANAGER, "Store manager")
            .grant(PARTS, P::new(true, true, false))
            .grant(CUSTOMERS, P::new(true, false, false))
            .grant(ORDERS, P::new(true, true, false)),
        Role::new(ROLE_SALES, "Sales clerk")
            .grant(PARTS, P::new(true, false, false))
            .grant(CUSTOMERS, P::new(true, true, false))
            .grant(ORDERS, P::new(true, true, false)),
        Role::new(ROLE_INVENTORY, "Warehouse keeper")
            .grant(PARTS, P::new(true, true, false))
            .grant(CUSTOMERS, P::NONE)
            .grant(ORDERS, P::new(true, false, false)),
        Role::new(ROLE_READONLY, "Reporting only")
            .grant(PARTS, P::new(true, false, false))
            .grant(CUSTOMERS, P::new(true, false, false))
            .grant(ORDERS, P::new(true, false, false)),
    ]
}

pub fn default_users() -> Vec<User> {
    vec![
        User::new("admin_user", ROLE_ADMIN, "Administrator with full access"),
        User::new("manager_user", ROLE_MANAGER, "Manager handling parts and orders"),
        User::new("sales_user", ROLE_SALES, "Sales clerk processing orders"),
        User::new("inventory_user", ROLE_INVENTORY, "Warehouse keeper"),
        User::new("reports_user", ROLE_READONLY, "Reporting only user"),
    ]
}

pub fn default_role_table() -> RoleTable {
    RoleTable::new(default_roles()).expect("built-in role names are unique and non-empty")
}

pub fn default_user_directory() -> UserDirectory {
    UserDirectory::new(default_users()).expect("built-in user names are unique and non-empty")
}

pub fn standard_probes() -> Vec<AccessProbe> {
    vec![
        AccessProbe::new("admin_user", PARTS, "delete", "Administrator deletes a part"),
        AccessProbe::new("manager_user", PARTS, "write", "Manager edits a part"),
        AccessProbe::new("manager_user", PARTS, "delete", "Manager tries to delete a part"),
        AccessProbe::new("sales_user", CUSTOMERS, "write", "Sales clerk edits a customer"),
        AccessProbe::new("sales_user", PARTS, "write", "Sales clerk tries to edit a part"),
        AccessProbe::new("inventory_user", PARTS, "write", "Warehouse keeper updates stock"),
        AccessProbe::new("inventory_user", CUSTOMERS, "read", "Warehouse keeper tries to read a customer"),
        AccessProbe::new("reports_user", ORDERS, "read", "Reporting user views an order"),
        AccessProbe::new("reports_user", ORDERS, "write", "Reporting user tries to edit an order"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build_without_loss() {
        assert_eq!(default_role_table().len(), 5);
        assert_eq!(default_role_table().len(), default_roles().len());
        assert_eq!(default_user_directory().len(), default_users().len());
        assert_eq!(default_user_directory().warn_dangling_roles(&default_role_table()), 0);
    }

    #[test]
    fn default_roles_cover_every_shop_collection() {
        let table = default_role_table();
        let resources: Vec<String> = SHOP_COLLECTIONS.iter().map(|s| s.to_string()).collect();
        assert!(table.coverage_gaps(&resources).is_empty());
    }
}
