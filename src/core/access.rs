use crate::core::store::types::UserRecord;

/// Whether a request only reads (GET, HEAD, OPTIONS) or may change data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    Write,
}

impl AccessMode {
    pub fn from_method(method: &str) -> Self {
        match method.to_ascii_uppercase().as_str() {
            "GET" | "HEAD" | "OPTIONS" => AccessMode::Read,
            _ => AccessMode::Write,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Staff only.
    StaffOnly,
    /// Non-staff members may do anything; staff may only read.
    MemberWriteStaffRead,
    /// Any signed-in user.
    Authenticated,
}

impl AccessPolicy {
    pub fn allows(self, user: &UserRecord, mode: AccessMode) -> bool {
        match self {
            AccessPolicy::StaffOnly => user.is_staff,
            AccessPolicy::MemberWriteStaffRead => !user.is_staff || mode == AccessMode::Read,
            AccessPolicy::Authenticated => true,
        }
    }
}
