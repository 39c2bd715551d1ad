//! Ledger-level integration tests against PostgreSQL.
//!
//! Require DATABASE_URL; each test skips itself when it is unset.

mod common;

use std::sync::Arc;

use common::*;
use verdantia::domain::{
    ReportDraft, ReportStatus, Role, UploadStatus, VoucherCatalog, UPLOAD_REWARD_POINTS,
};
use verdantia::infra::{
    CoreError, PgProofLedger, PgReportLedger, PgUserStore, PgVoucherLedger,
};

fn draft(project: &str) -> ReportDraft {
    ReportDraft::new(project, "Neem", 800.0, 10, None, 28.6, 77.2).unwrap()
}

#[tokio::test]
async fn duplicate_pending_report_conflicts_until_resolved() {
    let Some(pool) = connect_db().await else { return };
    let reports = PgReportLedger::new(pool.clone());
    let user = create_user(&pool, "dup", Role::Participant).await;

    let first = reports
        .submit(&user.id, &user.username, draft("Grove"))
        .await
        .unwrap();
    assert_eq!(first.status, ReportStatus::Pending);
    assert_eq!(first.result.required_trees, 10);
    assert!(first.result.compliant);

    // Same project while pending: rejected.
    let second = reports.submit(&user.id, &user.username, draft("Grove")).await;
    assert!(matches!(second, Err(CoreError::Conflict(_))));

    // A different project is fine.
    reports
        .submit(&user.id, &user.username, draft("Other Grove"))
        .await
        .unwrap();

    // Deleting the pending report frees the slot.
    reports.delete(&user.id, first.id).await.unwrap();
    reports
        .submit(&user.id, &user.username, draft("Grove"))
        .await
        .unwrap();
}

#[tokio::test]
async fn approval_frees_the_pending_slot() {
    let Some(pool) = connect_db().await else { return };
    let reports = PgReportLedger::new(pool.clone());
    let user = create_user(&pool, "slot", Role::Participant).await;

    let report = reports
        .submit(&user.id, &user.username, draft("Ridge"))
        .await
        .unwrap();
    let approved = reports.approve(report.id).await.unwrap();
    assert_eq!(approved.status, ReportStatus::Approved);
    assert!(approved.approved_at.is_some());

    // Pending slot is free again after approval.
    reports
        .submit(&user.id, &user.username, draft("Ridge"))
        .await
        .unwrap();
}

#[tokio::test]
async fn report_delete_eligibility() {
    let Some(pool) = connect_db().await else { return };
    let reports = PgReportLedger::new(pool.clone());
    let owner = create_user(&pool, "own", Role::Participant).await;
    let other = create_user(&pool, "oth", Role::Participant).await;

    let report = reports
        .submit(&owner.id, &owner.username, draft("Delta"))
        .await
        .unwrap();

    // Someone else's pending report: uniformly not-found, not forbidden.
    assert!(matches!(
        reports.delete(&other.id, report.id).await,
        Err(CoreError::NotFound(_))
    ));

    // Approved report, even owned: not eligible.
    reports.approve(report.id).await.unwrap();
    assert!(matches!(
        reports.delete(&owner.id, report.id).await,
        Err(CoreError::Forbidden(_))
    ));

    // Unknown id: not-found.
    assert!(matches!(
        reports.delete(&owner.id, uuid::Uuid::new_v4()).await,
        Err(CoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn upload_approval_credits_exactly_once() {
    let Some(pool) = connect_db().await else { return };
    let uploads = PgProofLedger::new(pool.clone());
    let users = PgUserStore::new(pool.clone());
    let user = create_user(&pool, "appr", Role::Participant).await;

    let upload = uploads.submit(&user.id, "proof_1.png").await.unwrap();
    assert_eq!(upload.status, UploadStatus::Pending);
    assert_eq!(upload.points_awarded, 0);

    let approved = uploads.approve(upload.id).await.unwrap();
    assert_eq!(approved.status, UploadStatus::Approved);
    assert_eq!(approved.points_awarded, UPLOAD_REWARD_POINTS);

    // Second approval returns the record unchanged and awards nothing.
    let again = uploads.approve(upload.id).await.unwrap();
    assert_eq!(again.points_awarded, UPLOAD_REWARD_POINTS);

    let balance = users.find_by_id(&user.id).await.unwrap().unwrap().points;
    assert_eq!(balance, UPLOAD_REWARD_POINTS);
}

#[tokio::test]
async fn upload_delete_reverses_the_exact_award() {
    let Some(pool) = connect_db().await else { return };
    let uploads = PgProofLedger::new(pool.clone());
    let users = PgUserStore::new(pool.clone());
    let user = create_user(&pool, "rev", Role::Participant).await;

    // Pending delete: no balance effect.
    let pending = uploads.submit(&user.id, "pending.png").await.unwrap();
    uploads.delete(&user.id, pending.id).await.unwrap();
    assert_eq!(users.find_by_id(&user.id).await.unwrap().unwrap().points, 0);

    // Approved delete: the award comes back off.
    let approved = uploads.submit(&user.id, "approved.png").await.unwrap();
    uploads.approve(approved.id).await.unwrap();
    let filename = uploads.delete(&user.id, approved.id).await.unwrap();
    assert_eq!(filename, "approved.png");
    assert_eq!(users.find_by_id(&user.id).await.unwrap().unwrap().points, 0);

    // Reversal clamps at zero when the balance was already spent down.
    let spent = uploads.submit(&user.id, "spent.png").await.unwrap();
    uploads.approve(spent.id).await.unwrap();
    users.guarded_adjust(&user.id, -30).await.unwrap();
    uploads.delete(&user.id, spent.id).await.unwrap();
    assert_eq!(users.find_by_id(&user.id).await.unwrap().unwrap().points, 0);

    // Someone else's upload: not-found.
    let other = create_user(&pool, "rev2", Role::Participant).await;
    let theirs = uploads.submit(&user.id, "theirs.png").await.unwrap();
    assert!(matches!(
        uploads.delete(&other.id, theirs.id).await,
        Err(CoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn redemption_at_exact_balance_and_below() {
    let Some(pool) = connect_db().await else { return };
    let vouchers = PgVoucherLedger::new(pool.clone());
    let users = PgUserStore::new(pool.clone());
    let catalog = VoucherCatalog::builtin();
    let user = create_user(&pool, "redeem", Role::Participant).await;

    users.guarded_adjust(&user.id, 50).await.unwrap();

    // 50 points cannot buy a 75-point voucher, and nothing is recorded.
    let offer75 = catalog.get("V75").unwrap();
    assert!(matches!(
        vouchers.redeem(&user.id, "V75", offer75).await,
        Err(CoreError::InsufficientBalance)
    ));
    assert!(vouchers.list_mine(&user.id).await.unwrap().is_empty());

    // Exact balance succeeds and lands on zero.
    let offer50 = catalog.get("V50").unwrap();
    let redemption = vouchers.redeem(&user.id, "V50", offer50).await.unwrap();
    assert_eq!(redemption.value, 50);
    assert_eq!(redemption.brand, "Cafe Verde");
    assert!(redemption.code.starts_with("V50-"));
    assert_eq!(users.find_by_id(&user.id).await.unwrap().unwrap().points, 0);
    assert_eq!(vouchers.list_mine(&user.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_redemptions_have_exactly_one_winner() {
    let Some(pool) = connect_db().await else { return };
    let vouchers = Arc::new(PgVoucherLedger::new(pool.clone()));
    let users = PgUserStore::new(pool.clone());
    let catalog = VoucherCatalog::builtin();
    let user = create_user(&pool, "race", Role::Participant).await;

    users.guarded_adjust(&user.id, 50).await.unwrap();
    let offer = catalog.get("V50").unwrap().clone();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let vouchers = vouchers.clone();
        let owner = user.id;
        let offer = offer.clone();
        handles.push(tokio::spawn(async move {
            vouchers.redeem(&owner, "V50", &offer).await
        }));
    }

    let mut wins = 0;
    let mut rejections = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => wins += 1,
            Err(CoreError::InsufficientBalance) => rejections += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(wins, 1);
    assert_eq!(rejections, 7);
    assert_eq!(users.find_by_id(&user.id).await.unwrap().unwrap().points, 0);
    assert_eq!(vouchers.list_mine(&user.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn leaderboard_orders_points_then_seniority_and_hides_authorities() {
    let Some(pool) = connect_db().await else { return };
    let users = PgUserStore::new(pool.clone());

    let a = create_user(&pool, "lead-a", Role::Participant).await;
    let b = create_user(&pool, "lead-b", Role::Participant).await;
    let gov = create_user(&pool, "lead-gov", Role::Authority).await;

    users.guarded_adjust(&a.id, 200).await.unwrap();
    users.guarded_adjust(&b.id, 500).await.unwrap();
    users.guarded_adjust(&gov.id, 900).await.unwrap();

    let board = users.leaderboard(1000).await.unwrap();

    let pos = |name: &str| board.iter().position(|r| r.username == name);
    let (pa, pb) = (pos(&a.username).unwrap(), pos(&b.username).unwrap());
    assert!(pb < pa, "higher points rank first");
    assert_eq!(pos(&gov.username), None, "authorities never appear");
}
