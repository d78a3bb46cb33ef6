use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Actor role. `Superadmin > Admin > Manager` in privilege; `Customer`
/// is the non-staff actor. The legacy spelling "Super Admin" still
/// exists in old tokens and rows, so every parse goes through
/// [`Role::try_from`], which collapses it to the canonical value. No
/// raw role string survives past this boundary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    Superadmin,
    Admin,
    Manager,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Superadmin => "Superadmin",
            Role::Admin => "Admin",
            Role::Manager => "Manager",
            Role::Customer => "Customer",
        }
    }

    /// Privilege rank used for ordering checks.
    fn rank(&self) -> u8 {
        match self {
            Role::Superadmin => 3,
            Role::Admin => 2,
            Role::Manager => 1,
            Role::Customer => 0,
        }
    }

    pub fn is_staff(&self) -> bool {
        self.rank() >= Role::Manager.rank()
    }

    pub fn outranks(&self, other: Role) -> bool {
        self.rank() > other.rank()
    }
}

impl TryFrom<&str> for Role {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // Case-insensitive, separator-insensitive: "Super Admin",
        // "super_admin" and "SUPERADMIN" all normalize to Superadmin.
        let folded: String = value
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_ascii_lowercase();
        match folded.as_str() {
            "superadmin" => Ok(Role::Superadmin),
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "customer" => Ok(Role::Customer),
            _ => Err(format!("unknown role: {}", value)),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Role::try_from(value.as_str())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Allow-list of entities a Manager may act on. Admins and Superadmins
/// ignore it entirely; an empty list for a Manager means no access.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AssignedData {
    #[serde(default)]
    pub bookings: Vec<Uuid>,
    #[serde(default)]
    pub inquiries: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    #[serde(default)]
    pub assigned_data: AssignedData,
}

impl AdminUser {
    /// Whether this admin may act on a specific booking. Managers are
    /// restricted to their allow-list; higher roles are not.
    pub fn can_act_on_booking(&self, booking_id: Uuid) -> bool {
        match self.role {
            Role::Superadmin | Role::Admin => true,
            Role::Manager => self.assigned_data.bookings.contains(&booking_id),
            Role::Customer => false,
        }
    }
}

/// Payload for creating an admin through the approval processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminDraft {
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub assigned_data: AssignedData,
}

/// Partial update; `None` preserves the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub assigned_data: Option<AssignedData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// The verified actor attached to a request after token validation.
/// The core trusts the role claim from a verified token; only the
/// admin active-status check re-reads storage.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }
}
