//! Role defaults and effective permissions
//!
//! A user's stored `PermissionSet` is seeded from their role and may then be
//! edited per user. Admins always hold every permission.

use shared::models::{Permission, PermissionSet, User, UserRole};

/// Manager: everything except user management and deleting products
pub const MANAGER_PERMISSIONS: &[Permission] = &[
    Permission::CreateProducts,
    Permission::EditProducts,
    Permission::ManageCategories,
    Permission::ExportData,
    Permission::ImportData,
    Permission::ViewStats,
];

pub const VIEWER_PERMISSIONS: &[Permission] = &[Permission::ViewStats];

pub fn role_defaults(role: UserRole) -> PermissionSet {
    match role {
        UserRole::Admin => PermissionSet::all(),
        UserRole::Manager => PermissionSet::from_permissions(MANAGER_PERMISSIONS),
        UserRole::Viewer => PermissionSet::from_permissions(VIEWER_PERMISSIONS),
    }
}

/// Permissions actually enforced for `user`
pub fn effective_permissions(user: &User) -> PermissionSet {
    match user.role {
        UserRole::Admin => PermissionSet::all(),
        _ => user.permissions,
    }
}
