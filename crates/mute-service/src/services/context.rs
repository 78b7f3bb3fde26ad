//! Service context - dependency container for the sanction engine
//!
//! Holds the stores, the member/role directory, guild configuration and the clock.

use std::sync::Arc;

use mute_core::traits::{
    Clock, MuteConfigProvider, PrivilegeDirectory, SanctionRepository, SnapshotRepository,
    SystemClock,
};
use mute_core::Snowflake;

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    // Stores
    sanction_repo: Arc<dyn SanctionRepository>,
    snapshot_repo: Arc<dyn SnapshotRepository>,

    // External collaborators
    directory: Arc<dyn PrivilegeDirectory>,
    mute_config: Arc<dyn MuteConfigProvider>,
    clock: Arc<dyn Clock>,

    /// The system's own identity, never a valid sanction target
    system_user_id: Snowflake,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        sanction_repo: Arc<dyn SanctionRepository>,
        snapshot_repo: Arc<dyn SnapshotRepository>,
        directory: Arc<dyn PrivilegeDirectory>,
        mute_config: Arc<dyn MuteConfigProvider>,
        clock: Arc<dyn Clock>,
        system_user_id: Snowflake,
    ) -> Self {
        Self {
            sanction_repo,
            snapshot_repo,
            directory,
            mute_config,
            clock,
            system_user_id,
        }
    }

    // === Stores ===

    /// Get the active sanction store
    pub fn sanction_repo(&self) -> &dyn SanctionRepository {
        self.sanction_repo.as_ref()
    }

    /// Get the privilege snapshot store
    pub fn snapshot_repo(&self) -> &dyn SnapshotRepository {
        self.snapshot_repo.as_ref()
    }

    // === Collaborators ===

    /// Get the member/role directory
    pub fn directory(&self) -> &dyn PrivilegeDirectory {
        self.directory.as_ref()
    }

    /// Get the guild mute configuration provider
    pub fn mute_config(&self) -> &dyn MuteConfigProvider {
        self.mute_config.as_ref()
    }

    /// Get the wall clock
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn system_user_id(&self) -> Snowflake {
        self.system_user_id
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("directory", &"...")
            .field("system_user_id", &self.system_user_id)
            .finish()
    }
}

/// Builder for creating ServiceContext
///
/// The clock defaults to the system clock; everything else is required.
pub struct ServiceContextBuilder {
    sanction_repo: Option<Arc<dyn SanctionRepository>>,
    snapshot_repo: Option<Arc<dyn SnapshotRepository>>,
    directory: Option<Arc<dyn PrivilegeDirectory>>,
    mute_config: Option<Arc<dyn MuteConfigProvider>>,
    clock: Option<Arc<dyn Clock>>,
    system_user_id: Option<Snowflake>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            sanction_repo: None,
            snapshot_repo: None,
            directory: None,
            mute_config: None,
            clock: None,
            system_user_id: None,
        }
    }

    pub fn sanction_repo(mut self, repo: Arc<dyn SanctionRepository>) -> Self {
        self.sanction_repo = Some(repo);
        self
    }

    pub fn snapshot_repo(mut self, repo: Arc<dyn SnapshotRepository>) -> Self {
        self.snapshot_repo = Some(repo);
        self
    }

    pub fn directory(mut self, directory: Arc<dyn PrivilegeDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn mute_config(mut self, provider: Arc<dyn MuteConfigProvider>) -> Self {
        self.mute_config = Some(provider);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn system_user_id(mut self, id: Snowflake) -> Self {
        self.system_user_id = Some(id);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.sanction_repo
                .ok_or_else(|| ServiceError::validation("sanction_repo is required"))?,
            self.snapshot_repo
                .ok_or_else(|| ServiceError::validation("snapshot_repo is required"))?,
            self.directory
                .ok_or_else(|| ServiceError::validation("directory is required"))?,
            self.mute_config
                .ok_or_else(|| ServiceError::validation("mute_config is required"))?,
            self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            self.system_user_id
                .ok_or_else(|| ServiceError::validation("system_user_id is required"))?,
        ))
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
