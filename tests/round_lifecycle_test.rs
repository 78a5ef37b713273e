// ==========================================
// 评审轮生命周期测试
// ==========================================
// 测试范围:
// 1. build 的创建守卫与幂等取回
// 2. update_status 的最小写入契约与显式状态路径
// 3. 最新评审轮定位与级联删除
// 4. 状态变更事件与缓存失效
// ==========================================
// 依据: Review_Engine_Specs_v0.5.md - 4. 评审轮生命周期
// ==========================================


use journal_review_engine::domain::types::{RoundStatus, StageId};
use journal_review_engine::engine::{
    OptionalEventPublisher, ReviewEvent, ReviewEventPublisher, ReviewEventType,
    RoundLifecycleService, RoundStatusCache, RoundStatusResolver,
};
use journal_review_engine::repository::{
    DecisionRepository, ReviewAssignmentRepository, ReviewRoundRepository,
    StageAssignmentRepository,
};
use rusqlite::Connection;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

// ==========================================
// 测试辅助函数
// ==========================================

/// 记录型事件发布者(断言事件流)
#[derive(Default)]
struct RecordingPublisher {
    events: Mutex<Vec<ReviewEvent>>,
}

impl ReviewEventPublisher for RecordingPublisher {
    fn publish(&self, event: ReviewEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

struct TestEnv {
    _temp_file: NamedTempFile,
    conn: Arc<Mutex<Connection>>,
    service: RoundLifecycleService,
    round_repo: Arc<ReviewRoundRepository>,
    publisher: Arc<RecordingPublisher>,
    cache: Arc<RoundStatusCache>,
}

fn setup() -> TestEnv {
    let (temp_file, db_path) = test_helpers::create_test_db().expect("创建测试数据库失败");
    let conn = Arc::new(Mutex::new(
        test_helpers::open_test_connection(&db_path).expect("打开数据库失败"),
    ));

    let round_repo = Arc::new(ReviewRoundRepository::from_connection(conn.clone()));
    let resolver = RoundStatusResolver::new(
        Arc::new(ReviewAssignmentRepository::from_connection(conn.clone())),
        Arc::new(DecisionRepository::from_connection(conn.clone())),
        Arc::new(StageAssignmentRepository::from_connection(conn.clone())),
    );
    let publisher = Arc::new(RecordingPublisher::default());
    let cache = Arc::new(RoundStatusCache::new());
    let service = RoundLifecycleService::new(
        round_repo.clone(),
        resolver,
        OptionalEventPublisher::some(publisher.clone()),
        cache.clone(),
    );

    TestEnv {
        _temp_file: temp_file,
        conn,
        service,
        round_repo,
        publisher,
        cache,
    }
}

fn event_types(publisher: &RecordingPublisher) -> Vec<ReviewEventType> {
    publisher
        .events
        .lock()
        .unwrap()
        .iter()
        .map(|e| e.event_type.clone())
        .collect()
}

// ==========================================
// 测试用例
// ==========================================

/// 创建守卫: 内审 round=1 允许,外审 round=0 拒绝
#[test]
fn test_build_guard() {
    let env = setup();

    let internal = env
        .service
        .build("SUB-LC-1", "PUB-1", StageId::InternalReview, 1, None)
        .unwrap();
    assert!(internal.is_some());

    let invalid = env
        .service
        .build("SUB-LC-1", "PUB-1", StageId::ExternalReview, 0, None)
        .unwrap();
    assert!(invalid.is_none());

    let external = env
        .service
        .build("SUB-LC-1", "PUB-1", StageId::ExternalReview, 1, None)
        .unwrap();
    assert!(external.is_some());
}

/// build 幂等: 相同身份三元组返回既有评审轮,不产生重复行
#[test]
fn test_build_returns_existing_round() {
    let env = setup();

    let first = env
        .service
        .build("SUB-LC-2", "PUB-1", StageId::ExternalReview, 1, None)
        .unwrap()
        .unwrap();
    let second = env
        .service
        .build("SUB-LC-2", "PUB-1", StageId::ExternalReview, 1, None)
        .unwrap()
        .unwrap();

    assert_eq!(first.round_id, second.round_id);

    let count: i64 = {
        let c = env.conn.lock().unwrap();
        c.query_row(
            "SELECT COUNT(*) FROM review_rounds WHERE submission_id = 'SUB-LC-2'",
            [],
            |row| row.get(0),
        )
        .unwrap()
    };
    assert_eq!(count, 1);
}

/// 最小写入契约: 值不变时不发出写语句(updated_at 不变)
#[tokio::test]
async fn test_minimal_write_contract() {
    let env = setup();
    let round = env
        .service
        .build("SUB-LC-3", "PUB-1", StageId::ExternalReview, 1, None)
        .unwrap()
        .unwrap();

    let first = env.service.update_status(&round, None).await.unwrap();
    assert_eq!(first.resolved, RoundStatus::PendingReviewers);
    assert!(first.written);

    let updated_at_after_first: String = {
        let c = env.conn.lock().unwrap();
        c.query_row(
            "SELECT updated_at FROM review_rounds WHERE round_id = ?1",
            [&round.round_id],
            |row| row.get(0),
        )
        .unwrap()
    };

    let stored = env.round_repo.find_by_id(&round.round_id).unwrap().unwrap();
    let second = env.service.update_status(&stored, None).await.unwrap();
    assert!(!second.written);

    let updated_at_after_second: String = {
        let c = env.conn.lock().unwrap();
        c.query_row(
            "SELECT updated_at FROM review_rounds WHERE round_id = ?1",
            [&round.round_id],
            |row| row.get(0),
        )
        .unwrap()
    };
    assert_eq!(updated_at_after_first, updated_at_after_second);
}

/// 显式状态路径: 编辑决定写入终态,之后推导保持终态不再写
#[tokio::test]
async fn test_explicit_status_then_terminal_resolution() {
    let env = setup();
    let round = env
        .service
        .build("SUB-LC-4", "PUB-1", StageId::ExternalReview, 1, None)
        .unwrap()
        .unwrap();

    let explicit = env
        .service
        .update_status(&round, Some(RoundStatus::Declined))
        .await
        .unwrap();
    assert!(explicit.written);
    assert_eq!(explicit.resolved, RoundStatus::Declined);

    let stored = env.round_repo.find_by_id(&round.round_id).unwrap().unwrap();
    assert_eq!(stored.status, Some(RoundStatus::Declined));

    let resolved = env.service.update_status(&stored, None).await.unwrap();
    assert_eq!(resolved.resolved, RoundStatus::Declined);
    assert!(!resolved.written);
}

/// 并发竞争: 存量状态被他人改写后,条件更新不命中,本次写入放弃
#[tokio::test]
async fn test_stale_read_write_is_skipped() {
    let env = setup();
    let round = env
        .service
        .build("SUB-LC-5", "PUB-1", StageId::ExternalReview, 1, None)
        .unwrap()
        .unwrap();

    // 另一次重算抢先把状态写成 PENDING_REVIEWERS
    {
        let c = env.conn.lock().unwrap();
        c.execute(
            "UPDATE review_rounds SET status = 'PENDING_REVIEWERS' WHERE round_id = ?1",
            [&round.round_id],
        )
        .unwrap();
    }

    // 本次持有的 round 快照仍认为状态未设置(过期读)
    let outcome = env.service.update_status(&round, None).await.unwrap();
    assert_eq!(outcome.resolved, RoundStatus::PendingReviewers);
    // 推导值与库内一致,但条件 UPDATE 以过期存量为前提 → 未命中
    assert!(!outcome.written);

    let stored = env.round_repo.find_by_id(&round.round_id).unwrap().unwrap();
    assert_eq!(stored.status, Some(RoundStatus::PendingReviewers));
}

/// 最新评审轮定位: (阶段权重, 轮次) 最大者,支持按阶段过滤
#[test]
fn test_get_last_round_ordering() {
    let env = setup();
    env.service
        .build("SUB-LC-6", "PUB-1", StageId::InternalReview, 1, None)
        .unwrap();
    env.service
        .build("SUB-LC-6", "PUB-1", StageId::InternalReview, 2, None)
        .unwrap();
    env.service
        .build("SUB-LC-6", "PUB-1", StageId::ExternalReview, 1, None)
        .unwrap();

    let last = env
        .service
        .get_last_by_submission("SUB-LC-6", None)
        .unwrap()
        .unwrap();
    assert_eq!(last.stage_id, StageId::ExternalReview);
    assert_eq!(last.round, 1);

    let last_internal = env
        .service
        .get_last_by_submission("SUB-LC-6", Some(StageId::InternalReview))
        .unwrap()
        .unwrap();
    assert_eq!(last_internal.stage_id, StageId::InternalReview);
    assert_eq!(last_internal.round, 2);

    let all = env
        .service
        .get_by_submission("SUB-LC-6", None, None)
        .unwrap();
    assert_eq!(all.len(), 3);
    // 内审在前,外审在后
    assert_eq!(all[0].stage_id, StageId::InternalReview);
    assert_eq!(all[0].round, 1);
    assert_eq!(all[2].stage_id, StageId::ExternalReview);
}

/// 级联删除: 评审轮、其设置与关联通知一并删除;无关通知保留
#[test]
fn test_delete_round_cascades_notifications() {
    let env = setup();
    let round = env
        .service
        .build("SUB-LC-7", "PUB-1", StageId::ExternalReview, 1, None)
        .unwrap()
        .unwrap();
    let other = env
        .service
        .build("SUB-LC-7", "PUB-1", StageId::ExternalReview, 2, None)
        .unwrap()
        .unwrap();

    env.round_repo
        .set_setting(&round.round_id, "editor_note", &serde_json::json!("审后存档"))
        .unwrap();
    {
        let c = env.conn.lock().unwrap();
        test_helpers::insert_notification(&c, "N1", "REVIEW_ROUND", &round.round_id).unwrap();
        test_helpers::insert_notification(&c, "N2", "REVIEW_ROUND", &round.round_id).unwrap();
        test_helpers::insert_notification(&c, "N3", "REVIEW_ROUND", &other.round_id).unwrap();
        test_helpers::insert_notification(&c, "N4", "SUBMISSION", &round.round_id).unwrap();
    }

    let deleted = env.service.delete_round(&round.round_id).unwrap();
    assert!(deleted);

    assert!(env.round_repo.find_by_id(&round.round_id).unwrap().is_none());
    {
        let c = env.conn.lock().unwrap();
        let notif_ids: Vec<String> = c
            .prepare("SELECT notification_id FROM notifications ORDER BY notification_id")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(notif_ids, vec!["N3".to_string(), "N4".to_string()]);

        let settings: i64 = c
            .query_row(
                "SELECT COUNT(*) FROM review_round_settings WHERE round_id = ?1",
                [&round.round_id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(settings, 0);
    }

    // 再次删除: 评审轮不存在按 absence 处理
    assert!(!env.service.delete_round(&round.round_id).unwrap());
}

/// 事件流: 创建/状态变更/删除各发布一次;未写入不发事件
#[tokio::test]
async fn test_event_publication() {
    let env = setup();
    let round = env
        .service
        .build("SUB-LC-8", "PUB-1", StageId::ExternalReview, 1, None)
        .unwrap()
        .unwrap();

    let outcome = env.service.update_status(&round, None).await.unwrap();
    assert!(outcome.written);

    // 值未变的第二次更新不发事件
    let stored = env.round_repo.find_by_id(&round.round_id).unwrap().unwrap();
    env.service.update_status(&stored, None).await.unwrap();

    env.service.delete_round(&round.round_id).unwrap();

    assert_eq!(
        event_types(&env.publisher),
        vec![
            ReviewEventType::RoundCreated,
            ReviewEventType::RoundStatusChanged,
            ReviewEventType::RoundDeleted,
        ]
    );
}

/// 缓存: 成功写入后缓存热,删除后失效
#[tokio::test]
async fn test_cache_invalidation() {
    let env = setup();
    let round = env
        .service
        .build("SUB-LC-9", "PUB-1", StageId::ExternalReview, 1, None)
        .unwrap()
        .unwrap();
    assert_eq!(env.cache.get(&round.round_id), None);

    env.service.update_status(&round, None).await.unwrap();
    assert_eq!(
        env.service.cached_status(&round.round_id),
        Some(RoundStatus::PendingReviewers)
    );

    env.service.delete_round(&round.round_id).unwrap();
    assert_eq!(env.service.cached_status(&round.round_id), None);
}
