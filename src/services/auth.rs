//! Authentication service implementation
//!
//! Two-tier access control for the admin panel. Admins come from the
//! database roster or from configuration; the super-admin additionally
//! manages the roster. The configured super-admin identity is bootstrapped
//! into the roster and can never be removed through the bot.

use tracing::{info, warn};
use crate::config::settings::Settings;
use crate::database::AdminRepository;
use crate::models::AdminRecord;
use crate::utils::errors::Result;

/// Result of an attempt to add an admin
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddAdminOutcome {
    Added(AdminRecord),
    AlreadySuperAdmin,
    Denied,
}

/// Result of an attempt to remove an admin
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveAdminOutcome {
    Removed,
    NotFound,
    ProtectedSuperAdmin,
    Denied,
}

/// Authentication service for managing permissions and access control
#[derive(Clone, Debug)]
pub struct AuthService {
    admins: AdminRepository,
    settings: Settings,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(admins: AdminRepository, settings: Settings) -> Self {
        Self { admins, settings }
    }

    pub fn is_configured_super_admin(&self, user_id: i64) -> bool {
        self.settings.is_configured_super_admin(user_id)
    }

    /// Any admin, from the roster or from configuration
    pub async fn is_admin(&self, user_id: i64) -> Result<bool> {
        if self.settings.is_configured_super_admin(user_id) || self.settings.bot.admin_ids.contains(&user_id) {
            return Ok(true);
        }
        Ok(self.admins.find(user_id).await?.is_some())
    }

    /// The configured super-admin or a roster entry flagged super
    pub async fn is_super_admin(&self, user_id: i64) -> Result<bool> {
        if self.settings.is_configured_super_admin(user_id) {
            return Ok(true);
        }
        Ok(self.admins.count_super(user_id).await? > 0)
    }

    /// Make sure the configured super-admin holds the super flag.
    ///
    /// Idempotent: an existing super record is left alone and nobody else's
    /// flag is touched. Returns the record when one had to be written.
    pub async fn bootstrap_super_admin(&self, name: Option<&str>) -> Result<Option<AdminRecord>> {
        let Some(super_id) = self.settings.bot.super_admin_id else {
            return Ok(None);
        };

        if let Some(existing) = self.admins.find(super_id).await? {
            if existing.is_super {
                return Ok(None);
            }
        }

        let record = self.admins.upsert(super_id, name, true).await?;
        info!(user_id = super_id, "Super admin bootstrapped");
        Ok(Some(record))
    }

    /// Roster for display, super-admins first. The configured super-admin is
    /// listed even before it has been bootstrapped.
    pub async fn list_admins(&self) -> Result<Vec<AdminRecord>> {
        let mut admins = self.admins.list().await?;

        if let Some(super_id) = self.settings.bot.super_admin_id {
            if !admins.iter().any(|a| a.user_id == super_id) {
                admins.insert(0, AdminRecord { user_id: super_id, name: None, is_super: true });
            }
        }

        Ok(admins)
    }

    /// Add a regular admin (super-admin only)
    pub async fn add_admin(&self, requester_id: i64, new_admin_id: i64, name: Option<&str>) -> Result<AddAdminOutcome> {
        if !self.is_super_admin(requester_id).await? {
            self.log_auth_event(requester_id, "add_admin", false, None);
            return Ok(AddAdminOutcome::Denied);
        }

        if self.settings.is_configured_super_admin(new_admin_id) {
            return Ok(AddAdminOutcome::AlreadySuperAdmin);
        }

        let record = self.admins.upsert(new_admin_id, name, false).await?;
        info!(requester_id = requester_id, new_admin_id = new_admin_id, "New admin added");
        Ok(AddAdminOutcome::Added(record))
    }

    /// Remove an admin (super-admin only); the configured super-admin is protected
    pub async fn remove_admin(&self, requester_id: i64, admin_id: i64) -> Result<RemoveAdminOutcome> {
        if !self.is_super_admin(requester_id).await? {
            self.log_auth_event(requester_id, "remove_admin", false, None);
            return Ok(RemoveAdminOutcome::Denied);
        }

        if self.settings.is_configured_super_admin(admin_id) {
            warn!(requester_id = requester_id, admin_id = admin_id, "Attempt to remove the configured super admin");
            return Ok(RemoveAdminOutcome::ProtectedSuperAdmin);
        }

        if self.admins.remove(admin_id).await? {
            info!(requester_id = requester_id, removed_admin_id = admin_id, "Admin removed");
            Ok(RemoveAdminOutcome::Removed)
        } else {
            Ok(RemoveAdminOutcome::NotFound)
        }
    }

    /// Log authentication event
    pub fn log_auth_event(&self, user_id: i64, action: &str, success: bool, details: Option<&str>) {
        if success {
            info!(user_id = user_id, action = action, details = details, "Authentication event: success");
        } else {
            warn!(user_id = user_id, action = action, details = details, "Authentication event: failure");
        }
    }
}
