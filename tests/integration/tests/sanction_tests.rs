//! Sanction lifecycle integration tests
//!
//! Drive the engine, the inline timers and the reconciler together over
//! in-memory stores and a scripted member/role directory.
//!
//! Run with: cargo test -p integration-tests --test sanction_tests

use std::time::Duration;

use integration_tests::{minutes, seconds, sorted, TestWorld, SYSTEM_USER};
use mute_core::{DirectoryError, DomainError};
use mute_service::{ExpiryOutcome, ReadinessGate, ServiceError};
use tokio::sync::watch;

fn domain(err: ServiceError) -> DomainError {
    match err {
        ServiceError::Domain(e) => e,
        other => panic!("expected a domain error, got {other}"),
    }
}

// ============================================================================
// Uniqueness and validation
// ============================================================================

#[tokio::test]
async fn test_at_most_one_active_sanction_per_member() {
    let world = TestWorld::new();
    let g = world.guild;
    let user = world.member(&[g.role_a]);

    world.engine.apply_soft(g.guild_id, user, g.moderator, None).await.unwrap();

    let err = world
        .engine
        .apply_soft(g.guild_id, user, g.moderator, minutes(5))
        .await
        .unwrap_err();
    assert!(matches!(domain(err), DomainError::AlreadySanctioned));

    let err = world
        .engine
        .apply_hard(g.guild_id, user, g.moderator, None)
        .await
        .unwrap_err();
    assert!(matches!(domain(err), DomainError::AlreadySanctioned));

    assert_eq!(world.sanctions.len(), 1);
    assert!(world.snapshot(user).await.is_none());
}

#[tokio::test]
async fn test_cannot_target_self_or_system() {
    let world = TestWorld::new();
    let g = world.guild;

    let err = world
        .engine
        .apply_soft(g.guild_id, g.moderator, g.moderator, None)
        .await
        .unwrap_err();
    assert!(matches!(domain(err), DomainError::SelfOrSystemTarget));

    let err = world
        .engine
        .apply_hard(g.guild_id, SYSTEM_USER, g.moderator, None)
        .await
        .unwrap_err();
    assert!(matches!(domain(err), DomainError::SelfOrSystemTarget));
    assert!(world.sanctions.is_empty());
}

// ============================================================================
// Hard sanction snapshot / restore
// ============================================================================

#[tokio::test]
async fn test_hard_sanction_snapshot_and_restore() {
    let world = TestWorld::new();
    let g = world.guild;
    let user = world.member(&[g.role_a, g.role_b]);

    let applied = world
        .engine
        .apply_hard(g.guild_id, user, g.moderator, None)
        .await
        .unwrap();
    assert!(applied.is_complete());

    let snapshot = world.snapshot(user).await.unwrap();
    assert_eq!(sorted(snapshot.role_ids), sorted(vec![g.role_a, g.role_b]));
    assert!(!snapshot_contains_default(&world, user).await);
    assert_eq!(world.roles(user), vec![g.mute_role]);

    let result = world.engine.reverse(g.guild_id, user).await.unwrap();
    assert!(result.is_complete());
    assert_eq!(world.roles(user), sorted(vec![g.role_a, g.role_b]));
    assert!(world.snapshot(user).await.is_none());
    assert!(!world.is_sanctioned(user).await);
}

async fn snapshot_contains_default(world: &TestWorld, user: mute_core::Snowflake) -> bool {
    world
        .snapshot(user)
        .await
        .is_some_and(|s| s.contains(world.guild.everyone))
}

#[tokio::test]
async fn test_hard_sanction_keeps_going_when_a_role_cannot_be_stripped() {
    let world = TestWorld::new();
    let g = world.guild;
    let user = world.member(&[g.role_a, g.role_b]);
    world.directory.forbid_role(g.role_b);

    let applied = world
        .engine
        .apply_hard(g.guild_id, user, g.moderator, None)
        .await
        .unwrap();

    assert_eq!(applied.unrevoked.len(), 1);
    assert_eq!(applied.unrevoked[0].role_id, g.role_b);
    assert_eq!(applied.unrevoked[0].error, DirectoryError::Forbidden);
    assert!(world.is_sanctioned(user).await);
    assert!(world.snapshot(user).await.is_some());
    assert_eq!(world.roles(user), sorted(vec![g.role_b, g.mute_role]));
}

#[tokio::test]
async fn test_roles_changed_during_sanction_are_kept() {
    let world = TestWorld::new();
    let g = world.guild;
    let user = world.member(&[g.role_a]);

    world.engine.apply_hard(g.guild_id, user, g.moderator, None).await.unwrap();
    // Granted by someone else while muted
    world.directory.add_member(
        g.guild_id,
        user,
        Some(g.everyone),
        [g.mute_role, g.role_b],
    );

    world.engine.reverse(g.guild_id, user).await.unwrap();
    assert_eq!(world.roles(user), sorted(vec![g.role_a, g.role_b]));
}

// ============================================================================
// Reversal semantics
// ============================================================================

#[tokio::test]
async fn test_reverse_without_sanction_is_not_sanctioned() {
    let world = TestWorld::new();
    let g = world.guild;
    let user = world.member(&[g.role_a]);

    let err = world.engine.reverse(g.guild_id, user).await.unwrap_err();
    assert!(err.is_not_sanctioned());
    assert_eq!(world.directory.mutation_count(), 0);
    assert_eq!(world.roles(user), vec![g.role_a]);
}

#[tokio::test]
async fn test_double_reverse_second_is_clean_no_op() {
    let world = TestWorld::new();
    let g = world.guild;
    let user = world.member(&[g.role_a, g.role_b]);
    world.engine.apply_hard(g.guild_id, user, g.moderator, None).await.unwrap();

    let (first, second) = tokio::join!(
        world.engine.reverse(g.guild_id, user),
        world.engine.reverse(g.guild_id, user)
    );
    let (winner, loser) = if first.is_ok() { (first, second) } else { (second, first) };

    assert!(winner.unwrap().is_complete());
    assert!(loser.unwrap_err().is_not_sanctioned());

    let mutations = world.directory.mutation_count();
    let err = world.engine.reverse(g.guild_id, user).await.unwrap_err();
    assert!(err.is_not_sanctioned());
    assert_eq!(world.directory.mutation_count(), mutations);
    assert_eq!(world.roles(user), sorted(vec![g.role_a, g.role_b]));
}

#[tokio::test]
async fn test_failed_restore_never_leaves_ghost_record() {
    let world = TestWorld::new();
    let g = world.guild;
    let user = world.member(&[g.role_a, g.role_b]);
    world.engine.apply_hard(g.guild_id, user, g.moderator, None).await.unwrap();
    world.directory.forbid_role(g.role_a);

    let result = world.engine.reverse(g.guild_id, user).await.unwrap();
    assert!(!world.is_sanctioned(user).await);
    assert!(world.snapshot(user).await.is_none());

    match result.into_result() {
        Err(DomainError::PartialRestoreFailure { failed }) => {
            assert_eq!(failed.len(), 1);
            assert_eq!(failed[0].role_id, g.role_a);
        }
        other => panic!("expected partial restore failure, got {other:?}"),
    }

    // The member can be sanctioned again straight away
    world.directory.allow_role(g.role_a);
    world.engine.apply_soft(g.guild_id, user, g.moderator, None).await.unwrap();
}

// ============================================================================
// Reconciler
// ============================================================================

#[tokio::test]
async fn test_reconciler_respects_expiry_boundary() {
    let world = TestWorld::new();
    let g = world.guild;
    let user = world.member(&[g.role_a]);
    world.engine.apply_soft(g.guild_id, user, g.moderator, seconds(300)).await.unwrap();
    assert_eq!(world.roles(user), sorted(vec![g.role_a, g.mute_role]));

    world.advance_secs(290);
    let report = world.reconciler.run_pass().await.unwrap();
    assert_eq!(report.reversed, 0);
    assert!(world.is_sanctioned(user).await);

    world.advance_secs(20);
    let report = world.reconciler.run_pass().await.unwrap();
    assert_eq!(report.reversed, 1);
    assert!(!world.is_sanctioned(user).await);
    assert_eq!(world.roles(user), vec![g.role_a]);
}

#[tokio::test]
async fn test_reconciler_never_touches_indefinite_sanctions() {
    let world = TestWorld::new();
    let g = world.guild;
    let soft = world.member(&[g.role_a]);
    let hard = world.member(&[g.role_b]);
    world.engine.apply_soft(g.guild_id, soft, g.moderator, None).await.unwrap();
    world.engine.apply_hard(g.guild_id, hard, g.moderator, None).await.unwrap();

    world.advance_secs(10 * 365 * 24 * 3600);
    let report = world.reconciler.run_pass().await.unwrap();

    assert_eq!(report.scanned, 2);
    assert_eq!(report.expired, 0);
    assert!(world.is_sanctioned(soft).await);
    assert!(world.is_sanctioned(hard).await);
}

#[tokio::test]
async fn test_reconciler_isolates_unresolvable_member() {
    let world = TestWorld::new();
    let g = world.guild;
    let users: Vec<_> = (0..6).map(|_| world.member(&[g.role_a])).collect();
    for &user in &users {
        world.engine.apply_hard(g.guild_id, user, g.moderator, minutes(1)).await.unwrap();
    }
    world.directory.remove_member(g.guild_id, users[2]);

    world.advance_secs(61);
    let report = world.reconciler.run_pass().await.unwrap();

    assert_eq!(report.expired, 6);
    assert_eq!(report.orphaned, 1);
    assert_eq!(report.reversed, 5);
    assert!(world.sanctions.is_empty());
    assert!(world.snapshots.is_empty());
    for (i, &user) in users.iter().enumerate() {
        if i != 2 {
            assert_eq!(world.roles(user), vec![g.role_a]);
        }
    }
}

#[tokio::test]
async fn test_reconciler_completes_reversal_after_restart() {
    let world = TestWorld::with_inline_timers();
    let g = world.guild;
    let user = world.member(&[g.role_a, g.role_b]);
    world.engine.apply_hard(g.guild_id, user, g.moderator, minutes(10)).await.unwrap();

    // The process dies: its inline timers go with it
    let (engine, reconciler) = world.restart();
    world.advance_secs(11 * 60);

    let report = reconciler.run_pass().await.unwrap();
    assert_eq!(report.reversed, 1);
    assert!(engine.get(g.guild_id, user).await.unwrap().is_none());
    assert_eq!(world.roles(user), sorted(vec![g.role_a, g.role_b]));
}

#[tokio::test(start_paused = true)]
async fn test_reconciler_waits_for_readiness() {
    let world = TestWorld::new();
    let g = world.guild;
    let user = world.member(&[]);
    world.engine.apply_soft(g.guild_id, user, g.moderator, minutes(1)).await.unwrap();
    world.advance_secs(120);

    let gate = ReadinessGate::new();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = world.reconciler.clone().spawn(gate.clone(), shutdown_rx);

    tokio::time::sleep(Duration::from_secs(3600)).await;
    assert!(world.is_sanctioned(user).await);

    gate.mark_ready();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(!world.is_sanctioned(user).await);

    shutdown_tx.send(true).unwrap();
    task.await.unwrap();
}

// ============================================================================
// Inline timer vs reconciler
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_inline_timer_and_reconciler_converge() {
    let world = TestWorld::with_inline_timers();
    let g = world.guild;
    let user = world.member(&[g.role_a, g.role_b]);
    let record = world
        .engine
        .apply_hard(g.guild_id, user, g.moderator, seconds(30))
        .await
        .unwrap()
        .record;

    // Reconciler gets there first
    world.advance_secs(31);
    let report = world.reconciler.run_pass().await.unwrap();
    assert_eq!(report.reversed, 1);
    assert_eq!(world.engine.pending_timers(), 0);
    let mutations = world.directory.mutation_count();

    // The timer's deadline passes without a second reversal
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(world.directory.mutation_count(), mutations);

    // A late trigger for the same application is a benign no-op
    let outcome = world.engine.expire(record.key(), record.applied_at).await.unwrap();
    assert!(matches!(outcome, ExpiryOutcome::AlreadyCleared));
    assert_eq!(world.roles(user), sorted(vec![g.role_a, g.role_b]));
}

#[tokio::test(start_paused = true)]
async fn test_inline_timer_fires_before_reconciler() {
    let world = TestWorld::with_inline_timers();
    let g = world.guild;
    let user = world.member(&[g.role_a]);
    world.engine.apply_soft(g.guild_id, user, g.moderator, seconds(45)).await.unwrap();

    tokio::time::sleep(Duration::from_secs(46)).await;
    assert!(!world.is_sanctioned(user).await);
    assert_eq!(world.roles(user), vec![g.role_a]);

    world.advance_secs(46);
    let report = world.reconciler.run_pass().await.unwrap();
    assert_eq!(report.scanned, 0);
}

#[tokio::test(start_paused = true)]
async fn test_stale_timer_does_not_lift_newer_sanction() {
    let world = TestWorld::with_inline_timers();
    let g = world.guild;
    let user = world.member(&[g.role_a]);

    world.engine.apply_soft(g.guild_id, user, g.moderator, seconds(30)).await.unwrap();
    world.engine.reverse(g.guild_id, user).await.unwrap();
    world.advance_secs(1);
    world.engine.apply_soft(g.guild_id, user, g.moderator, None).await.unwrap();

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert!(world.is_sanctioned(user).await);
    assert_eq!(world.roles(user), sorted(vec![g.role_a, g.mute_role]));
}

// ============================================================================
// Guild configuration
// ============================================================================

#[tokio::test]
async fn test_guild_without_mute_role() {
    let world = TestWorld::new();
    let g = world.guild;
    let user = world.member(&[g.role_a]);
    world.config.remove(g.guild_id);

    let err = world
        .engine
        .apply_hard(g.guild_id, user, g.moderator, None)
        .await
        .unwrap_err();
    assert!(matches!(domain(err), DomainError::MissingMuteRole));

    let err = world
        .engine
        .apply_soft(g.guild_id, user, g.moderator, None)
        .await
        .unwrap_err();
    assert!(matches!(domain(err), DomainError::MuteRoleUnconfigured(id) if id == g.guild_id));
    assert_eq!(world.roles(user), vec![g.role_a]);
}

#[tokio::test]
async fn test_forbidden_mute_role_aborts_and_rolls_back() {
    let world = TestWorld::new();
    let g = world.guild;
    let user = world.member(&[g.role_a, g.role_b]);
    world.directory.forbid_role(g.mute_role);

    let err = world
        .engine
        .apply_hard(g.guild_id, user, g.moderator, minutes(5))
        .await
        .unwrap_err();
    assert!(matches!(domain(err), DomainError::DirectoryForbidden));
    assert!(!world.is_sanctioned(user).await);
    assert!(world.snapshot(user).await.is_none());
    assert_eq!(world.roles(user), sorted(vec![g.role_a, g.role_b]));
}
