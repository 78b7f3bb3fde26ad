//! In-memory adapters
//!
//! Same semantics as the PostgreSQL adapters, backed by `DashMap`.
//! Used by tests and by hosts that run without a database.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};

use mute_core::entities::{GuildMuteConfig, PrivilegeSnapshot, SanctionKey, SanctionRecord};
use mute_core::error::{DirectoryError, DomainError};
use mute_core::traits::{
    DirectoryResult, HeldRole, MuteConfigProvider, PrivilegeDirectory, RepoResult,
    SanctionRepository, SnapshotRepository,
};
use mute_core::value_objects::Snowflake;

// ============================================================================
// Sanctions
// ============================================================================

/// In-memory SanctionRepository
#[derive(Debug, Default)]
pub struct InMemorySanctionRepository {
    records: DashMap<SanctionKey, SanctionRecord>,
    offline: AtomicBool,
}

impl InMemorySanctionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of active records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Creates and deletes fail with `DatabaseError` while set
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_writable(&self) -> RepoResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(DomainError::DatabaseError("sanction store offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SanctionRepository for InMemorySanctionRepository {
    async fn find(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<Option<SanctionRecord>> {
        let key = SanctionKey::new(guild_id, user_id);
        Ok(self.records.get(&key).map(|r| r.value().clone()))
    }

    async fn create(&self, record: &SanctionRecord) -> RepoResult<()> {
        self.check_writable()?;
        match self.records.entry(record.key()) {
            Entry::Occupied(_) => Err(DomainError::AlreadySanctioned),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(())
            }
        }
    }

    async fn delete(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        self.check_writable()?;
        let key = SanctionKey::new(guild_id, user_id);
        Ok(self.records.remove(&key).is_some())
    }

    async fn list_all(&self) -> RepoResult<Vec<SanctionRecord>> {
        Ok(self.records.iter().map(|r| r.value().clone()).collect())
    }

    async fn list_by_guild(&self, guild_id: Snowflake) -> RepoResult<Vec<SanctionRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.key().guild_id == guild_id)
            .map(|r| r.value().clone())
            .collect())
    }
}

// ============================================================================
// Snapshots
// ============================================================================

/// In-memory SnapshotRepository
#[derive(Debug, Default)]
pub struct InMemorySnapshotRepository {
    snapshots: DashMap<SanctionKey, PrivilegeSnapshot>,
}

impl InMemorySnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[async_trait]
impl SnapshotRepository for InMemorySnapshotRepository {
    async fn find(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<Option<PrivilegeSnapshot>> {
        let key = SanctionKey::new(guild_id, user_id);
        Ok(self.snapshots.get(&key).map(|s| s.value().clone()))
    }

    async fn put(&self, snapshot: &PrivilegeSnapshot) -> RepoResult<()> {
        self.snapshots.insert(snapshot.key(), snapshot.clone());
        Ok(())
    }

    async fn delete(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        let key = SanctionKey::new(guild_id, user_id);
        Ok(self.snapshots.remove(&key).is_some())
    }
}

// ============================================================================
// Guild configuration
// ============================================================================

/// Mutable in-memory MuteConfigProvider
#[derive(Debug, Default)]
pub struct StaticMuteConfigProvider {
    configs: DashMap<Snowflake, GuildMuteConfig>,
}

impl StaticMuteConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a fixed set of guild configs
    pub fn with_configs(configs: impl IntoIterator<Item = GuildMuteConfig>) -> Self {
        let provider = Self::new();
        for config in configs {
            provider.set(config);
        }
        provider
    }

    pub fn set(&self, config: GuildMuteConfig) {
        self.configs.insert(config.guild_id, config);
    }

    /// Forget a guild's mute role
    pub fn remove(&self, guild_id: Snowflake) {
        self.configs.remove(&guild_id);
    }
}

#[async_trait]
impl MuteConfigProvider for StaticMuteConfigProvider {
    async fn mute_config(&self, guild_id: Snowflake) -> RepoResult<Option<GuildMuteConfig>> {
        Ok(self.configs.get(&guild_id).map(|c| *c.value()))
    }
}

// ============================================================================
// Privilege directory
// ============================================================================

#[derive(Debug, Clone, Default)]
struct MemberRoles {
    default_role: Option<Snowflake>,
    roles: Vec<Snowflake>,
}

/// In-memory PrivilegeDirectory
///
/// Members must be registered before their roles can change. Roles can be
/// marked forbidden and the whole directory can be taken offline to
/// exercise failure handling.
#[derive(Debug, Default)]
pub struct InMemoryPrivilegeDirectory {
    members: DashMap<SanctionKey, MemberRoles>,
    forbidden: DashSet<Snowflake>,
    lookups_forbidden: AtomicBool,
    unavailable: AtomicBool,
    mutations: AtomicUsize,
}

impl InMemoryPrivilegeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a member holding `roles` plus an optional default role
    pub fn add_member(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        default_role: Option<Snowflake>,
        roles: impl IntoIterator<Item = Snowflake>,
    ) {
        let mut held = Vec::new();
        for role_id in roles {
            if !held.contains(&role_id) {
                held.push(role_id);
            }
        }
        self.members.insert(
            SanctionKey::new(guild_id, user_id),
            MemberRoles {
                default_role,
                roles: held,
            },
        );
    }

    /// Member leaves the guild
    pub fn remove_member(&self, guild_id: Snowflake, user_id: Snowflake) {
        self.members.remove(&SanctionKey::new(guild_id, user_id));
    }

    /// Non-default roles currently held, `None` if not a member
    pub fn roles(&self, guild_id: Snowflake, user_id: Snowflake) -> Option<Vec<Snowflake>> {
        self.members
            .get(&SanctionKey::new(guild_id, user_id))
            .map(|m| m.roles.clone())
    }

    /// Grants and revokes of this role fail with `Forbidden`
    pub fn forbid_role(&self, role_id: Snowflake) {
        self.forbidden.insert(role_id);
    }

    pub fn allow_role(&self, role_id: Snowflake) {
        self.forbidden.remove(&role_id);
    }

    /// Role lookups fail with `Forbidden` while set
    pub fn forbid_lookups(&self, forbidden: bool) {
        self.lookups_forbidden.store(forbidden, Ordering::SeqCst);
    }

    /// Every call fails with `Unavailable` while set
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of grant/revoke calls that changed a member's roles
    pub fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> DirectoryResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(DirectoryError::Unavailable("directory offline".to_string()))
        } else {
            Ok(())
        }
    }

    fn check_allowed(&self, role_id: Snowflake) -> DirectoryResult<()> {
        if self.forbidden.contains(&role_id) {
            Err(DirectoryError::Forbidden)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PrivilegeDirectory for InMemoryPrivilegeDirectory {
    async fn grant_role(&self, guild_id: Snowflake, user_id: Snowflake, role_id: Snowflake) -> DirectoryResult<()> {
        self.check_available()?;
        let mut member = self
            .members
            .get_mut(&SanctionKey::new(guild_id, user_id))
            .ok_or(DirectoryError::NotFound)?;
        self.check_allowed(role_id)?;

        if member.default_role != Some(role_id) && !member.roles.contains(&role_id) {
            member.roles.push(role_id);
            self.mutations.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn revoke_role(&self, guild_id: Snowflake, user_id: Snowflake, role_id: Snowflake) -> DirectoryResult<()> {
        self.check_available()?;
        let mut member = self
            .members
            .get_mut(&SanctionKey::new(guild_id, user_id))
            .ok_or(DirectoryError::NotFound)?;
        self.check_allowed(role_id)?;

        let before = member.roles.len();
        member.roles.retain(|held| *held != role_id);
        if member.roles.len() != before {
            self.mutations.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn current_roles(&self, guild_id: Snowflake, user_id: Snowflake) -> DirectoryResult<Vec<HeldRole>> {
        self.check_available()?;
        let member = self
            .members
            .get(&SanctionKey::new(guild_id, user_id))
            .ok_or(DirectoryError::NotFound)?;
        if self.lookups_forbidden.load(Ordering::SeqCst) {
            return Err(DirectoryError::Forbidden);
        }

        Ok(member
            .default_role
            .map(HeldRole::default_role)
            .into_iter()
            .chain(member.roles.iter().copied().map(HeldRole::new))
            .collect())
    }
}
