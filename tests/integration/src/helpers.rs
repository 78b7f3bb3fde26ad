//! Test helpers for integration tests
//!
//! `TestWorld` owns one engine plus the in-memory state behind it, so a
//! test can drive operations and then inspect stores and member roles.

use std::sync::Arc;

use chrono::TimeDelta;
use mute_common::ReconcilerConfig;
use mute_core::traits::{ManualClock, SnapshotRepository};
use mute_core::{PrivilegeSnapshot, Snowflake};
use mute_db::{
    InMemoryPrivilegeDirectory, InMemorySanctionRepository, InMemorySnapshotRepository,
    StaticMuteConfigProvider,
};
use mute_service::{EngineOptions, ExpiryReconciler, SanctionEngine, ServiceContextBuilder};

use crate::fixtures::{epoch, unique_id, GuildFixture, SYSTEM_USER};

/// Engine, reconciler and the state they share
pub struct TestWorld {
    pub guild: GuildFixture,
    pub engine: SanctionEngine,
    pub reconciler: ExpiryReconciler,
    pub sanctions: Arc<InMemorySanctionRepository>,
    pub snapshots: Arc<InMemorySnapshotRepository>,
    pub directory: Arc<InMemoryPrivilegeDirectory>,
    pub config: Arc<StaticMuteConfigProvider>,
    pub clock: Arc<ManualClock>,
}

impl TestWorld {
    /// Reconciler only, no inline timers
    pub fn new() -> Self {
        Self::build(EngineOptions { inline_timers: false })
    }

    pub fn with_inline_timers() -> Self {
        Self::build(EngineOptions { inline_timers: true })
    }

    fn build(options: EngineOptions) -> Self {
        let guild = GuildFixture::unique();
        let sanctions = Arc::new(InMemorySanctionRepository::new());
        let snapshots = Arc::new(InMemorySnapshotRepository::new());
        let directory = Arc::new(InMemoryPrivilegeDirectory::new());
        let config = Arc::new(StaticMuteConfigProvider::with_configs([guild.mute_config()]));
        let clock = Arc::new(ManualClock::new(epoch()));

        let (engine, reconciler) = Self::wire(&sanctions, &snapshots, &directory, &config, &clock, options);

        Self {
            guild,
            engine,
            reconciler,
            sanctions,
            snapshots,
            directory,
            config,
            clock,
        }
    }

    fn wire(
        sanctions: &Arc<InMemorySanctionRepository>,
        snapshots: &Arc<InMemorySnapshotRepository>,
        directory: &Arc<InMemoryPrivilegeDirectory>,
        config: &Arc<StaticMuteConfigProvider>,
        clock: &Arc<ManualClock>,
        options: EngineOptions,
    ) -> (SanctionEngine, ExpiryReconciler) {
        let ctx = ServiceContextBuilder::new()
            .sanction_repo(sanctions.clone())
            .snapshot_repo(snapshots.clone())
            .directory(directory.clone())
            .mute_config(config.clone())
            .clock(clock.clone())
            .system_user_id(SYSTEM_USER)
            .build()
            .unwrap_or_else(|e| panic!("test context: {e}"));

        let engine = SanctionEngine::with_options(ctx, options);
        let reconciler = ExpiryReconciler::new(engine.clone(), &ReconcilerConfig::default());
        (engine, reconciler)
    }

    /// A fresh engine over the same stores, as after a process restart
    pub fn restart(&self) -> (SanctionEngine, ExpiryReconciler) {
        Self::wire(
            &self.sanctions,
            &self.snapshots,
            &self.directory,
            &self.config,
            &self.clock,
            EngineOptions { inline_timers: false },
        )
    }

    /// Add a member holding `@everyone` plus `roles`
    pub fn member(&self, roles: &[Snowflake]) -> Snowflake {
        let user_id = unique_id();
        self.directory
            .add_member(self.guild.guild_id, user_id, Some(self.guild.everyone), roles.iter().copied());
        user_id
    }

    /// Non-default roles of a member, sorted
    pub fn roles(&self, user_id: Snowflake) -> Vec<Snowflake> {
        let mut roles = self
            .directory
            .roles(self.guild.guild_id, user_id)
            .unwrap_or_default();
        roles.sort();
        roles
    }

    pub async fn snapshot(&self, user_id: Snowflake) -> Option<PrivilegeSnapshot> {
        self.snapshots
            .find(self.guild.guild_id, user_id)
            .await
            .unwrap_or_else(|e| panic!("snapshot lookup: {e}"))
    }

    pub async fn is_sanctioned(&self, user_id: Snowflake) -> bool {
        self.engine
            .get(self.guild.guild_id, user_id)
            .await
            .unwrap_or_else(|e| panic!("sanction lookup: {e}"))
            .is_some()
    }

    /// Move the wall clock forward
    pub fn advance_secs(&self, secs: i64) {
        self.clock.advance(TimeDelta::seconds(secs));
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Sorted copy of a role list
pub fn sorted(mut roles: Vec<Snowflake>) -> Vec<Snowflake> {
    roles.sort();
    roles
}
