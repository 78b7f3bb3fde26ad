//! Sanction engine
//!
//! Applies, reverses and looks up mutes. Every mutation of the sanction and
//! snapshot stores goes through here, serialized per `(guild_id, user_id)`.

use std::sync::{Arc, Weak};

use chrono::{DateTime, SubsecRound, Utc};
use tracing::{debug, info, instrument, warn};

use mute_core::entities::{PrivilegeSnapshot, SanctionKey, SanctionRecord, SanctionVariant};
use mute_core::error::{DirectoryError, DomainError, PrivilegeFailure};
use mute_core::value_objects::{MuteDuration, Snowflake};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::key_lock::KeyLocks;
use super::timer::TimerRegistry;

/// Engine behaviour switches
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    /// Schedule an in-process reversal for every timed sanction
    pub inline_timers: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self { inline_timers: true }
    }
}

/// Outcome of a hard sanction
#[derive(Debug, Clone)]
pub struct AppliedHardSanction {
    pub record: SanctionRecord,
    /// Roles that could not be stripped and are still held
    pub unrevoked: Vec<PrivilegeFailure>,
}

impl AppliedHardSanction {
    pub fn is_complete(&self) -> bool {
        self.unrevoked.is_empty()
    }
}

/// Outcome of a reversal
///
/// The record is gone in every case; `restore_failures` lists the roles
/// that could not be given back (or the mute role, if it could not be taken away).
#[derive(Debug, Clone)]
pub struct ReversalResult {
    pub record: SanctionRecord,
    pub restore_failures: Vec<PrivilegeFailure>,
    /// The member or guild could no longer be resolved; only local state was cleared
    pub orphaned: bool,
}

impl ReversalResult {
    pub fn is_complete(&self) -> bool {
        self.restore_failures.is_empty()
    }

    /// Turn leftover failures into `PartialRestoreFailure`
    pub fn into_result(self) -> Result<SanctionRecord, DomainError> {
        if self.restore_failures.is_empty() {
            Ok(self.record)
        } else {
            Err(DomainError::PartialRestoreFailure {
                failed: self.restore_failures,
            })
        }
    }
}

/// What an expiry trigger found when it ran
#[derive(Debug, Clone)]
pub enum ExpiryOutcome {
    Reversed(ReversalResult),
    /// Another trigger already reversed it
    AlreadyCleared,
    /// The key now holds a newer sanction than the one that expired
    Superseded,
}

struct EngineInner {
    ctx: ServiceContext,
    locks: KeyLocks,
    timers: TimerRegistry,
    options: EngineOptions,
}

impl Drop for EngineInner {
    fn drop(&mut self) {
        self.timers.cancel_all();
    }
}

/// Sanction engine
///
/// Cheap to clone; clones share locks and timers.
#[derive(Clone)]
pub struct SanctionEngine {
    inner: Arc<EngineInner>,
}

impl std::fmt::Debug for SanctionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SanctionEngine")
            .field("options", &self.inner.options)
            .field("pending_timers", &self.inner.timers.len())
            .finish()
    }
}

impl SanctionEngine {
    /// Create an engine with inline timers enabled
    pub fn new(ctx: ServiceContext) -> Self {
        Self::with_options(ctx, EngineOptions::default())
    }

    pub fn with_options(ctx: ServiceContext, options: EngineOptions) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                ctx,
                locks: KeyLocks::new(),
                timers: TimerRegistry::new(),
                options,
            }),
        }
    }

    pub fn context(&self) -> &ServiceContext {
        &self.inner.ctx
    }

    /// Inline timers still waiting to fire
    pub fn pending_timers(&self) -> usize {
        self.inner.timers.len()
    }

    pub fn has_pending_timer(&self, guild_id: Snowflake, user_id: Snowflake) -> bool {
        self.inner.timers.contains(SanctionKey::new(guild_id, user_id))
    }

    fn ctx(&self) -> &ServiceContext {
        &self.inner.ctx
    }

    // ========================================================================
    // Apply
    // ========================================================================

    /// Mute by granting the guild's mute role, leaving other roles alone
    #[instrument(skip(self))]
    pub async fn apply_soft(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        applied_by: Snowflake,
        duration: Option<MuteDuration>,
    ) -> ServiceResult<SanctionRecord> {
        self.check_target(user_id, applied_by)?;
        let key = SanctionKey::new(guild_id, user_id);
        let _guard = self.inner.locks.acquire(key).await;

        self.ensure_not_sanctioned(key).await?;
        let mute_role = self
            .ctx()
            .mute_config()
            .mute_config(guild_id)
            .await?
            .ok_or(DomainError::MuteRoleUnconfigured(guild_id))?
            .mute_role_id;

        let record = SanctionRecord::new(key, applied_by, self.now(), duration, SanctionVariant::Soft);
        self.ctx().sanction_repo().create(&record).await?;

        if let Err(e) = self.ctx().directory().grant_role(guild_id, user_id, mute_role).await {
            warn!(guild_id = %guild_id, user_id = %user_id, role_id = %mute_role, error = %e, "Mute role grant failed, aborting soft sanction");
            self.discard_record(key).await;
            return Err(DomainError::from(e).into());
        }

        self.schedule_expiry(&record);
        info!(
            event = "SanctionApplied",
            guild_id = %guild_id,
            user_id = %user_id,
            variant = record.variant.as_str(),
            duration = ?record.duration.map(MuteDuration::as_secs),
            "Sanction applied"
        );
        Ok(record)
    }

    /// Mute by stripping every role and granting only the mute role
    ///
    /// Roles that cannot be stripped do not fail the sanction; they are
    /// returned in `unrevoked`.
    #[instrument(skip(self))]
    pub async fn apply_hard(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        applied_by: Snowflake,
        duration: Option<MuteDuration>,
    ) -> ServiceResult<AppliedHardSanction> {
        self.check_target(user_id, applied_by)?;
        let key = SanctionKey::new(guild_id, user_id);
        let _guard = self.inner.locks.acquire(key).await;

        self.ensure_not_sanctioned(key).await?;
        let mute_role = self
            .ctx()
            .mute_config()
            .mute_config(guild_id)
            .await?
            .ok_or(DomainError::MissingMuteRole)?
            .mute_role_id;

        let held = self
            .ctx()
            .directory()
            .current_roles(guild_id, user_id)
            .await
            .map_err(DomainError::from)?;
        let prior: Vec<Snowflake> = held
            .into_iter()
            .filter(|role| !role.is_default && role.role_id != mute_role)
            .map(|role| role.role_id)
            .collect();

        let applied_at = self.now();
        let snapshot = PrivilegeSnapshot::new(key, prior, applied_at);
        let record = SanctionRecord::new(key, applied_by, applied_at, duration, SanctionVariant::Hard);

        // Both rows are durable before the member is touched
        self.ctx().snapshot_repo().put(&snapshot).await?;
        if let Err(e) = self.ctx().sanction_repo().create(&record).await {
            if let Err(cleanup) = self.ctx().snapshot_repo().delete(guild_id, user_id).await {
                warn!(guild_id = %guild_id, user_id = %user_id, error = %cleanup, "Failed to drop snapshot after record write failed");
            }
            return Err(e.into());
        }

        let mut stripped = Vec::with_capacity(snapshot.role_ids.len());
        let mut unrevoked = Vec::new();
        for &role_id in &snapshot.role_ids {
            match self.ctx().directory().revoke_role(guild_id, user_id, role_id).await {
                Ok(()) => stripped.push(role_id),
                Err(error) => {
                    warn!(guild_id = %guild_id, user_id = %user_id, role_id = %role_id, error = %error, "Could not strip role");
                    unrevoked.push(PrivilegeFailure::new(role_id, error));
                }
            }
        }

        if let Err(e) = self.ctx().directory().grant_role(guild_id, user_id, mute_role).await {
            warn!(guild_id = %guild_id, user_id = %user_id, role_id = %mute_role, error = %e, "Mute role grant failed, rolling back hard sanction");
            self.rollback_strip(key, &stripped).await;
            self.discard_record(key).await;
            return Err(DomainError::from(e).into());
        }

        self.schedule_expiry(&record);
        info!(
            event = "SanctionApplied",
            guild_id = %guild_id,
            user_id = %user_id,
            variant = record.variant.as_str(),
            duration = ?record.duration.map(MuteDuration::as_secs),
            stripped = stripped.len(),
            unrevoked = unrevoked.len(),
            "Sanction applied"
        );
        Ok(AppliedHardSanction { record, unrevoked })
    }

    // ========================================================================
    // Reverse / Get
    // ========================================================================

    /// Lift the active sanction for a member
    ///
    /// Fails with `NotSanctioned` and touches nothing if there is none.
    #[instrument(skip(self))]
    pub async fn reverse(&self, guild_id: Snowflake, user_id: Snowflake) -> ServiceResult<ReversalResult> {
        let key = SanctionKey::new(guild_id, user_id);
        let _guard = self.inner.locks.acquire(key).await;

        let record = self
            .ctx()
            .sanction_repo()
            .find(guild_id, user_id)
            .await?
            .ok_or(DomainError::NotSanctioned)?;

        self.reverse_locked(record).await
    }

    /// Active sanction for a member, if any
    #[instrument(skip(self))]
    pub async fn get(&self, guild_id: Snowflake, user_id: Snowflake) -> ServiceResult<Option<SanctionRecord>> {
        Ok(self.ctx().sanction_repo().find(guild_id, user_id).await?)
    }

    /// Reverse the sanction applied at `applied_at`, if it is still the active one
    ///
    /// Shared by the reconciler and the inline timers. A missing record is
    /// the benign loser of a race between the two.
    pub async fn expire(&self, key: SanctionKey, applied_at: DateTime<Utc>) -> ServiceResult<ExpiryOutcome> {
        let _guard = self.inner.locks.acquire(key).await;

        let current = match self.ctx().sanction_repo().find(key.guild_id, key.user_id).await? {
            Some(record) => record,
            None => return Ok(ExpiryOutcome::AlreadyCleared),
        };
        if !current.is_application(key, applied_at) {
            return Ok(ExpiryOutcome::Superseded);
        }

        match self.reverse_locked(current).await {
            Ok(result) => Ok(ExpiryOutcome::Reversed(result)),
            Err(e) if e.is_not_sanctioned() => Ok(ExpiryOutcome::AlreadyCleared),
            Err(e) => Err(e),
        }
    }

    /// Undo `record`; the caller holds the key lock
    async fn reverse_locked(&self, record: SanctionRecord) -> ServiceResult<ReversalResult> {
        let (guild_id, user_id) = (record.guild_id, record.user_id);

        let orphaned = match self.ctx().directory().current_roles(guild_id, user_id).await {
            Ok(_) => false,
            Err(DirectoryError::NotFound) => true,
            // Not retried: role changes below report their own failures
            Err(DirectoryError::Forbidden) => {
                warn!(guild_id = %guild_id, user_id = %user_id, "Cannot read member roles, restoring anyway");
                false
            }
            // Transient: keep the record so the next pass retries
            Err(e) => return Err(DomainError::from(e).into()),
        };
        self.inner.timers.cancel(record.key());

        let mut restore_failures = Vec::new();

        if !orphaned {
            if record.is_hard() {
                match self.ctx().snapshot_repo().find(guild_id, user_id).await? {
                    Some(snapshot) => {
                        for &role_id in &snapshot.role_ids {
                            if let Err(error) =
                                self.ctx().directory().grant_role(guild_id, user_id, role_id).await
                            {
                                warn!(guild_id = %guild_id, user_id = %user_id, role_id = %role_id, error = %error, "Could not restore role");
                                restore_failures.push(PrivilegeFailure::new(role_id, error));
                            }
                        }
                    }
                    None => {
                        warn!(guild_id = %guild_id, user_id = %user_id, "Hard sanction has no snapshot, nothing to restore");
                    }
                }
            }

            match self.ctx().mute_config().mute_config(guild_id).await? {
                Some(config) => {
                    let role_id = config.mute_role_id;
                    if let Err(error) = self.ctx().directory().revoke_role(guild_id, user_id, role_id).await {
                        warn!(guild_id = %guild_id, user_id = %user_id, role_id = %role_id, error = %error, "Could not remove mute role");
                        restore_failures.push(PrivilegeFailure::new(role_id, error));
                    }
                }
                None => {
                    warn!(guild_id = %guild_id, "Mute role no longer configured, leaving member roles as they are");
                }
            }
        }

        // The snapshot outlives the record so a retry can still restore from it
        self.ctx().sanction_repo().delete(guild_id, user_id).await?;
        if let Err(e) = self.ctx().snapshot_repo().delete(guild_id, user_id).await {
            warn!(guild_id = %guild_id, user_id = %user_id, error = %e, "Failed to drop snapshot of reversed sanction");
        }

        if orphaned {
            info!(event = "OrphanedSanctionCleared", guild_id = %guild_id, user_id = %user_id, "Member no longer resolvable, sanction cleared locally");
        } else {
            info!(
                event = "SanctionReversed",
                guild_id = %guild_id,
                user_id = %user_id,
                variant = record.variant.as_str(),
                failures = restore_failures.len(),
                "Sanction reversed"
            );
        }

        Ok(ReversalResult {
            record,
            restore_failures,
            orphaned,
        })
    }

    // ========================================================================
    // Inline timers
    // ========================================================================

    fn schedule_expiry(&self, record: &SanctionRecord) {
        if !self.inner.options.inline_timers {
            return;
        }
        let Some(delay) = record.remaining(self.ctx().clock().now()) else {
            return;
        };

        let key = record.key();
        let applied_at = record.applied_at;
        let engine: Weak<EngineInner> = Arc::downgrade(&self.inner);

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = engine.upgrade() {
                SanctionEngine { inner }.fire_timer(key, applied_at).await;
            }
        });
        self.inner.timers.insert(key, applied_at, task.abort_handle());
        debug!(guild_id = %key.guild_id, user_id = %key.user_id, delay_secs = delay.as_secs(), "Inline timer scheduled");
    }

    async fn fire_timer(&self, key: SanctionKey, applied_at: DateTime<Utc>) {
        if !self.inner.timers.claim(key, applied_at) {
            debug!(event = "InlineTimerSuppressed", guild_id = %key.guild_id, user_id = %key.user_id, "Timer no longer current");
            return;
        }
        info!(event = "InlineTimerFired", guild_id = %key.guild_id, user_id = %key.user_id, "Inline timer fired");

        match self.expire(key, applied_at).await {
            Ok(ExpiryOutcome::Reversed(_)) => {}
            Ok(outcome) => {
                debug!(event = "InlineTimerSuppressed", guild_id = %key.guild_id, user_id = %key.user_id, ?outcome, "Nothing left to reverse");
            }
            Err(e) => {
                warn!(guild_id = %key.guild_id, user_id = %key.user_id, error = %e, "Inline reversal failed, leaving it to the reconciler");
            }
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn check_target(&self, user_id: Snowflake, applied_by: Snowflake) -> ServiceResult<()> {
        if user_id == applied_by || user_id == self.ctx().system_user_id() {
            return Err(DomainError::SelfOrSystemTarget.into());
        }
        Ok(())
    }

    async fn ensure_not_sanctioned(&self, key: SanctionKey) -> ServiceResult<()> {
        if self.ctx().sanction_repo().find(key.guild_id, key.user_id).await?.is_some() {
            return Err(DomainError::AlreadySanctioned.into());
        }
        Ok(())
    }

    /// Storage keeps microseconds, so `applied_at` is truncated to stay comparable after a reload
    fn now(&self) -> DateTime<Utc> {
        self.ctx().clock().now().trunc_subsecs(6)
    }

    /// Best-effort removal of both rows for an aborted apply
    async fn discard_record(&self, key: SanctionKey) {
        if let Err(e) = self.ctx().sanction_repo().delete(key.guild_id, key.user_id).await {
            warn!(guild_id = %key.guild_id, user_id = %key.user_id, error = %e, "Failed to drop record of aborted sanction");
        }
        if let Err(e) = self.ctx().snapshot_repo().delete(key.guild_id, key.user_id).await {
            warn!(guild_id = %key.guild_id, user_id = %key.user_id, error = %e, "Failed to drop snapshot of aborted sanction");
        }
    }

    /// Give back roles already stripped by an aborted hard sanction
    async fn rollback_strip(&self, key: SanctionKey, stripped: &[Snowflake]) {
        for &role_id in stripped {
            if let Err(error) = self.ctx().directory().grant_role(key.guild_id, key.user_id, role_id).await {
                warn!(guild_id = %key.guild_id, user_id = %key.user_id, role_id = %role_id, error = %error, "Could not return role during rollback");
            }
        }
    }
}
