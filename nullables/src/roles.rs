//! Nullable role binding — in-memory membership and grant tracking.

use async_trait::async_trait;
use holdgate_roles::{RoleBinding, RoleError};
use holdgate_types::IdentityId;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

/// An in-memory role API for testing.
///
/// Every identity is a member of the space unless explicitly denied. Grant
/// and revoke calls are counted (including idempotent no-ops, mirroring that
/// the real client still performs the membership lookup).
pub struct NullRoles {
    granted: Mutex<HashSet<String>>,
    non_members: Mutex<HashSet<String>>,
    grant_calls: AtomicU32,
    revoke_calls: AtomicU32,
    fail_all: AtomicBool,
}

impl NullRoles {
    pub fn new() -> Self {
        Self {
            granted: Mutex::new(HashSet::new()),
            non_members: Mutex::new(HashSet::new()),
            grant_calls: AtomicU32::new(0),
            revoke_calls: AtomicU32::new(0),
            fail_all: AtomicBool::new(false),
        }
    }

    /// Mark `identity` as not being a member of the space.
    pub fn deny_membership(&self, identity: &IdentityId) {
        self.non_members
            .lock()
            .unwrap()
            .insert(identity.as_str().to_string());
    }

    /// Make every grant/revoke fail with a transport error.
    pub fn fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::Relaxed);
    }

    /// Whether `identity` currently holds the role.
    pub fn has_role(&self, identity: &IdentityId) -> bool {
        self.granted.lock().unwrap().contains(identity.as_str())
    }

    pub fn grant_calls(&self) -> u32 {
        self.grant_calls.load(Ordering::Relaxed)
    }

    pub fn revoke_calls(&self) -> u32 {
        self.revoke_calls.load(Ordering::Relaxed)
    }

    fn check_common(&self, identity: &IdentityId) -> Result<(), RoleError> {
        if self.fail_all.load(Ordering::Relaxed) {
            return Err(RoleError::Unreachable("scripted failure".into()));
        }
        if self.non_members.lock().unwrap().contains(identity.as_str()) {
            return Err(RoleError::NotMember(identity.to_string()));
        }
        Ok(())
    }
}

impl Default for NullRoles {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoleBinding for NullRoles {
    async fn grant(&self, identity: &IdentityId) -> Result<(), RoleError> {
        self.grant_calls.fetch_add(1, Ordering::Relaxed);
        self.check_common(identity)?;
        self.granted
            .lock()
            .unwrap()
            .insert(identity.as_str().to_string());
        Ok(())
    }

    async fn revoke(&self, identity: &IdentityId) -> Result<(), RoleError> {
        self.revoke_calls.fetch_add(1, Ordering::Relaxed);
        self.check_common(identity)?;
        self.granted.lock().unwrap().remove(identity.as_str());
        Ok(())
    }
}
