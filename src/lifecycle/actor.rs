use std::fmt;

use serde::{Deserialize, Serialize};

use super::status::Status;
use super::vuln::Vulnerability;

/// The four roles the backend knows. Closed enum so a new role is a
/// compile-time-checked change, replacing the legacy numeric codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    SecurityEngineer,
    DevEngineer,
    NormalUser,
}

impl Role {
    /// Map the backend's legacy numeric role ids (1..=4). Unknown codes are
    /// rejected rather than defaulted.
    pub fn from_code(code: u8) -> Option<Role> {
        match code {
            1 => Some(Role::SuperAdmin),
            2 => Some(Role::SecurityEngineer),
            3 => Some(Role::DevEngineer),
            4 => Some(Role::NormalUser),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::SecurityEngineer => "security_engineer",
            Role::DevEngineer => "dev_engineer",
            Role::NormalUser => "normal_user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated user performing an action. Threaded explicitly into
/// every engine call; there is no ambient "current user" anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: u64,
    pub role: Role,
}

impl Actor {
    pub fn new(id: u64, role: Role) -> Self {
        Self { id, role }
    }

    /// Super admins bypass all ownership checks.
    pub fn is_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }

    /// The security engineer who reported this vulnerability.
    pub fn is_reporter(&self, vuln: &Vulnerability) -> bool {
        self.role == Role::SecurityEngineer && self.id == vuln.reporter_id
    }

    /// The dev engineer this vulnerability is assigned to.
    pub fn is_assignee(&self, vuln: &Vulnerability) -> bool {
        self.role == Role::DevEngineer && Some(self.id) == vuln.assignee_id
    }

    /// The designated owner of the vulnerability's project, whatever their
    /// role.
    pub fn is_project_owner(&self, vuln: &Vulnerability) -> bool {
        self.id == vuln.project_owner_id
    }
}

/// Whether `actor` may edit `vuln` in its current status.
///
/// Admin always; `completed` records are otherwise locked; `rejected`
/// records may only be reworked by their reporter; else the reporter while
/// still `unfixed`, or the assignee in any status assigned to them.
pub fn can_edit(actor: &Actor, vuln: &Vulnerability) -> bool {
    if actor.is_admin() {
        return true;
    }
    match vuln.status {
        Status::Completed => false,
        Status::Rejected => actor.is_reporter(vuln),
        Status::Unfixed => actor.is_reporter(vuln) || actor.is_assignee(vuln),
        _ => actor.is_assignee(vuln),
    }
}

/// Whether `actor` may delete `vuln`. Admin always; never on `completed`;
/// otherwise the reporter only.
pub fn can_delete(actor: &Actor, vuln: &Vulnerability) -> bool {
    if actor.is_admin() {
        return true;
    }
    if vuln.status == Status::Completed {
        return false;
    }
    actor.is_reporter(vuln)
}
