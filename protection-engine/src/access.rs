//! Access control over a record's embedded grant list.
//!
//! Pure functions; the engine wraps them in atomic record updates. Every
//! path fails closed: no owner match and no live grant means no access.

use crate::error::{ProtectionError, ProtectionResult};
use crate::record::{AccessGrant, Permission, ProtectedRecord};
use chrono::{DateTime, Utc};

/// Whether the actor may perform the action on the record
///
/// The owner is always authorized. Otherwise any single non-expired grant
/// whose grantee matches and whose permission set contains the action
/// authorizes; anything else is a denial.
pub fn authorize(
    record: &ProtectedRecord,
    actor_id: &str,
    permission: Permission,
    now: DateTime<Utc>,
) -> bool {
    if record.owner_id == actor_id {
        return true;
    }
    record
        .grants
        .iter()
        .any(|grant| grant.grantee_id == actor_id && grant.allows(permission, now))
}

/// Append a new grant; owner-only
///
/// Grants are never merged: a second grant for the same grantee coexists
/// with the first and is evaluated independently.
pub fn grant(
    record: &mut ProtectedRecord,
    grantee_id: &str,
    permissions: &[Permission],
    granted_by: &str,
    expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> ProtectionResult<()> {
    if record.owner_id != granted_by {
        return Err(ProtectionError::Authorization(format!(
            "{granted_by} is not the owner of record {}",
            record.id
        )));
    }
    if permissions.is_empty() {
        return Err(ProtectionError::Validation(
            "a grant needs at least one permission".to_string(),
        ));
    }
    if grantee_id == record.owner_id {
        return Err(ProtectionError::Validation(
            "the owner is implicitly authorized and cannot be a grantee".to_string(),
        ));
    }

    record.grants.push(AccessGrant {
        grantee_id: grantee_id.to_string(),
        permissions: permissions.to_vec(),
        granted_by: granted_by.to_string(),
        granted_at: now,
        expires_at,
    });
    Ok(())
}

/// Remove every grant for the grantee; owner-only, idempotent
pub fn revoke(
    record: &mut ProtectedRecord,
    requested_by: &str,
    grantee_id: &str,
) -> ProtectionResult<usize> {
    if record.owner_id != requested_by {
        return Err(ProtectionError::Authorization(format!(
            "{requested_by} is not the owner of record {}",
            record.id
        )));
    }
    let before = record.grants.len();
    record.grants.retain(|g| g.grantee_id != grantee_id);
    Ok(before - record.grants.len())
}
