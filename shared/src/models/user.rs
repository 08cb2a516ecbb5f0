//! Operator (back-office user) Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Manager,
    Viewer,
}

impl UserRole {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Viewer => "viewer",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "viewer" => Ok(Self::Viewer),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
}

impl ApprovalStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
        }
    }
}

impl FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            other => Err(format!("unknown approval status '{other}'")),
        }
    }
}

/// Back-office capability, serialized with its permission-string name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "canCreateProducts")]
    CreateProducts,
    #[serde(rename = "canEditProducts")]
    EditProducts,
    #[serde(rename = "canDeleteProducts")]
    DeleteProducts,
    #[serde(rename = "canManageCategories")]
    ManageCategories,
    #[serde(rename = "canManageUsers")]
    ManageUsers,
    #[serde(rename = "canExportData")]
    ExportData,
    #[serde(rename = "canImportData")]
    ImportData,
    #[serde(rename = "canViewStats")]
    ViewStats,
}

impl Permission {
    pub const ALL: [Permission; 8] = [
        Permission::CreateProducts,
        Permission::EditProducts,
        Permission::DeleteProducts,
        Permission::ManageCategories,
        Permission::ManageUsers,
        Permission::ExportData,
        Permission::ImportData,
        Permission::ViewStats,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CreateProducts => "canCreateProducts",
            Self::EditProducts => "canEditProducts",
            Self::DeleteProducts => "canDeleteProducts",
            Self::ManageCategories => "canManageCategories",
            Self::ManageUsers => "canManageUsers",
            Self::ExportData => "canExportData",
            Self::ImportData => "canImportData",
            Self::ViewStats => "canViewStats",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-user permission flags
///
/// Wire shape is the flag map, e.g. `{"canCreateProducts": true, ...}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionSet {
    #[serde(default)]
    pub can_create_products: bool,
    #[serde(default)]
    pub can_edit_products: bool,
    #[serde(default)]
    pub can_delete_products: bool,
    #[serde(default)]
    pub can_manage_categories: bool,
    #[serde(default)]
    pub can_manage_users: bool,
    #[serde(default)]
    pub can_export_data: bool,
    #[serde(default)]
    pub can_import_data: bool,
    #[serde(default)]
    pub can_view_stats: bool,
}

impl PermissionSet {
    pub fn all() -> Self {
        Self::from_permissions(&Permission::ALL)
    }

    pub fn from_permissions(permissions: &[Permission]) -> Self {
        let mut set = Self::default();
        for p in permissions {
            set.set(*p, true);
        }
        set
    }

    pub fn has(&self, permission: Permission) -> bool {
        match permission {
            Permission::CreateProducts => self.can_create_products,
            Permission::EditProducts => self.can_edit_products,
            Permission::DeleteProducts => self.can_delete_products,
            Permission::ManageCategories => self.can_manage_categories,
            Permission::ManageUsers => self.can_manage_users,
            Permission::ExportData => self.can_export_data,
            Permission::ImportData => self.can_import_data,
            Permission::ViewStats => self.can_view_stats,
        }
    }

    pub fn set(&mut self, permission: Permission, value: bool) {
        let flag = match permission {
            Permission::CreateProducts => &mut self.can_create_products,
            Permission::EditProducts => &mut self.can_edit_products,
            Permission::DeleteProducts => &mut self.can_delete_products,
            Permission::ManageCategories => &mut self.can_manage_categories,
            Permission::ManageUsers => &mut self.can_manage_users,
            Permission::ExportData => &mut self.can_export_data,
            Permission::ImportData => &mut self.can_import_data,
            Permission::ViewStats => &mut self.can_view_stats,
        };
        *flag = value;
    }

    /// Granted permissions in declaration order
    pub fn granted(&self) -> Vec<Permission> {
        Permission::ALL
            .into_iter()
            .filter(|p| self.has(*p))
            .collect()
    }
}

/// Operator account, keyed by the identity provider's subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub role: UserRole,
    pub permissions: PermissionSet,
    pub is_active: bool,
    pub approval_status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin-side user update payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub display_name: Option<String>,
    pub role: Option<UserRole>,
    pub permissions: Option<PermissionSet>,
    pub is_active: Option<bool>,
    pub approval_status: Option<ApprovalStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_names_match_wire_strings() {
        for p in Permission::ALL {
            let json = serde_json::to_string(&p).unwrap();
            assert_eq!(json, format!("\"{}\"", p.as_str()));
        }
    }

    #[test]
    fn permission_set_uses_flag_names() {
        let set = PermissionSet::from_permissions(&[Permission::ImportData]);
        let json = serde_json::to_value(set).unwrap();
        assert_eq!(json["canImportData"], true);
        assert_eq!(json["canDeleteProducts"], false);
        assert_eq!(set.granted(), vec![Permission::ImportData]);
    }

    #[test]
    fn partial_permission_map_defaults_to_false() {
        let set: PermissionSet =
            serde_json::from_str(r#"{"canViewStats": true}"#).unwrap();
        assert!(set.has(Permission::ViewStats));
        assert!(!set.has(Permission::ManageUsers));
        assert_eq!(PermissionSet::all().granted().len(), 8);
    }
}
