// Small dev utility: recompute and persist a review round's status
// through the normal minimal-write path (status audit helper).
//
// Usage:
//   cargo run --bin manual_refresh_round_status -- [db_path] <round_id|submission_id>
//
// The second argument is tried as a round id first; if no round matches,
// it is treated as a submission id and every round of that submission is
// refreshed.

use journal_review_engine::config::ConfigManager;
use journal_review_engine::db::{open_traced_connection, warn_on_schema_mismatch};
use journal_review_engine::engine::{
    OptionalEventPublisher, RoundLifecycleService, RoundStatusCache, RoundStatusResolver,
    StatusUpdateOutcome,
};
use journal_review_engine::i18n::{set_locale, t_with_args};
use journal_review_engine::repository::{
    DecisionRepository, ReviewAssignmentRepository, ReviewRoundRepository,
    StageAssignmentRepository,
};
use journal_review_engine::{config, logging};
use std::sync::{Arc, Mutex};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let db_path = args
        .next()
        .unwrap_or_else(|| config::default_db_path().to_string_lossy().into_owned());
    let target = args
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or("usage: manual_refresh_round_status [db_path] <round_id|submission_id>")?;

    let conn = Arc::new(Mutex::new(open_traced_connection(&db_path)?));
    {
        let c = conn.lock().unwrap();
        warn_on_schema_mismatch(&c);
    }

    let config = ConfigManager::from_connection(conn.clone())?;
    set_locale(&config.get_locale()?);

    let resolver = RoundStatusResolver::new(
        Arc::new(ReviewAssignmentRepository::from_connection(conn.clone())),
        Arc::new(DecisionRepository::from_connection(conn.clone())),
        Arc::new(StageAssignmentRepository::from_connection(conn.clone())),
    );
    let service = RoundLifecycleService::new(
        Arc::new(ReviewRoundRepository::from_connection(conn.clone())),
        resolver,
        OptionalEventPublisher::none(),
        Arc::new(RoundStatusCache::new()),
    );

    // 先按评审轮 ID 解释;未命中则按稿件 ID 刷新其全部评审轮
    let rounds = match service.get_by_id(&target)? {
        Some(round) => vec![round],
        None => {
            let rounds = service.get_by_submission(&target, None, None)?;
            if rounds.is_empty() {
                return Err(t_with_args(
                    "audit.submission_no_rounds",
                    &[("submission_id", &target)],
                )
                .into());
            }
            rounds
        }
    };

    for round in &rounds {
        let outcome = service.update_status(round, None).await?;
        println!("{}", describe_outcome(&outcome));
    }

    Ok(())
}

/// 渲染单条刷新结果(本地化)
fn describe_outcome(outcome: &StatusUpdateOutcome) -> String {
    let previous = outcome
        .previous
        .map(|s| s.to_db_str().to_string())
        .unwrap_or_else(|| "-".to_string());

    if outcome.written {
        t_with_args(
            "audit.status_updated",
            &[
                ("round_id", outcome.round_id.as_str()),
                ("previous", previous.as_str()),
                ("new", outcome.resolved.to_db_str()),
            ],
        )
    } else if outcome.previous == Some(outcome.resolved) {
        t_with_args(
            "audit.status_unchanged",
            &[
                ("round_id", outcome.round_id.as_str()),
                ("status", outcome.resolved.to_db_str()),
            ],
        )
    } else {
        t_with_args(
            "audit.status_write_skipped",
            &[("round_id", outcome.round_id.as_str())],
        )
    }
}
