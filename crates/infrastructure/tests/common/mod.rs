//! 两种数据库共用的协调器动作测试数据与场景
#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Duration, TimeZone, Utc};
use coordinator_domain::action_query_builder::ActionQuery;
use coordinator_domain::entities::{CoordinatorAction, CoordinatorActionStatus};
use coordinator_domain::repositories::CoordinatorActionRepository;
use coordinator_domain::services::ActionSubsetQuery;
use coordinator_errors::CoordError;

pub const JOB: &str = "0000001-240101000000000-oozie-C";

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Inserts actions whose action numbers run opposite to nominal time, so
/// nominal-time ordering is observable.
pub async fn seed(repo: &dyn CoordinatorActionRepository) -> Result<()> {
    let statuses = [
        CoordinatorActionStatus::Succeeded,
        CoordinatorActionStatus::Running,
        CoordinatorActionStatus::Failed,
        CoordinatorActionStatus::Running,
        CoordinatorActionStatus::Killed,
        CoordinatorActionStatus::Waiting,
    ];
    let count = statuses.len() as i32;
    for (i, status) in statuses.into_iter().enumerate() {
        let number = count - i as i32;
        let nominal = base_time() + Duration::hours(i as i64);
        let mut action = CoordinatorAction::new(JOB, number, nominal).with_status(status);
        action.external_id = Some(format!("wf-{number}"));
        action.error_message = Some("engine detail".to_string());
        repo.create(&action).await?;
    }

    // 其他作业的动作不应出现在结果中
    repo.create(&CoordinatorAction::new("other-job", 1, base_time() - Duration::days(1)))
        .await?;
    Ok(())
}

pub async fn create_and_get_by_id(repo: &dyn CoordinatorActionRepository) -> Result<()> {
    let mut action = CoordinatorAction::new(JOB, 1, base_time());
    action.console_url = Some("http://localhost:8088/proxy/application_1".to_string());
    action.pending = 1;
    action.rerun_time = Some(base_time() + Duration::minutes(30));
    let created = repo.create(&action).await?;
    assert_eq!(created.id, format!("{JOB}@1"));

    let found = repo.get_by_id(&created.id).await?.expect("action exists");
    assert_eq!(found.job_id, JOB);
    assert_eq!(found.status, CoordinatorActionStatus::Waiting);
    assert_eq!(found.nominal_time, base_time());
    assert_eq!(found.rerun_time, action.rerun_time);
    assert_eq!(found.console_url, action.console_url);
    assert_eq!(found.pending, 1);
    assert_eq!(found.timeout, -1);
    assert_eq!(found.external_id, None);

    assert!(repo.get_by_id("missing@1").await?.is_none());
    Ok(())
}

pub async fn duplicate_id_is_a_database_error(
    repo: &dyn CoordinatorActionRepository,
) -> Result<()> {
    let action = CoordinatorAction::new(JOB, 2, base_time());
    repo.create(&action).await?;
    let err = repo.create(&action).await.unwrap_err();
    assert!(matches!(err, CoordError::Database(_)));
    Ok(())
}

pub async fn update_status(repo: &dyn CoordinatorActionRepository) -> Result<()> {
    let created = repo.create(&CoordinatorAction::new(JOB, 3, base_time())).await?;
    repo.update_status(&created.id, CoordinatorActionStatus::Ready)
        .await?;

    let found = repo.get_by_id(&created.id).await?.expect("action exists");
    assert_eq!(found.status, CoordinatorActionStatus::Ready);
    assert!(found.last_modified_time >= created.last_modified_time);

    let err = repo
        .update_status("missing@1", CoordinatorActionStatus::Killed)
        .await
        .unwrap_err();
    assert!(matches!(err, CoordError::ActionNotFound { .. }));
    Ok(())
}

/// Expects [`seed`] data
pub async fn fetch_orders_by_nominal_time(repo: Arc<dyn CoordinatorActionRepository>) -> Result<()> {
    let service = ActionSubsetQuery::new(repo);
    let views = service.fetch::<&str>(JOB, &[], 1, 50).await?;

    assert_eq!(views.len(), 6);
    assert!(views.iter().all(|v| v.job_id == JOB));
    assert!(views
        .windows(2)
        .all(|pair| pair[0].nominal_time <= pair[1].nominal_time));
    let numbers: Vec<i32> = views.iter().map(|v| v.action_number).collect();
    assert_eq!(numbers, vec![6, 5, 4, 3, 2, 1]);
    assert_eq!(views[0].external_id.as_deref(), Some("wf-6"));
    Ok(())
}

/// Expects [`seed`] data
pub async fn fetch_applies_status_filter(repo: Arc<dyn CoordinatorActionRepository>) -> Result<()> {
    let service = ActionSubsetQuery::new(repo);
    let views = service.fetch(JOB, &["RUNNING", "killed"], 1, 50).await?;

    assert_eq!(views.len(), 3);
    assert!(views.iter().all(|v| matches!(
        v.status,
        CoordinatorActionStatus::Running | CoordinatorActionStatus::Killed
    )));
    let numbers: Vec<i32> = views.iter().map(|v| v.action_number).collect();
    assert_eq!(numbers, vec![5, 3, 2]);

    // 过滤后的分页仍按名义时间排序
    let page = service.fetch(JOB, &["RUNNING", "KILLED"], 2, 1).await?;
    assert_eq!(page, views[1..2].to_vec());
    Ok(())
}

/// Expects [`seed`] data
pub async fn window_is_a_slice_of_the_full_result(
    repo: Arc<dyn CoordinatorActionRepository>,
) -> Result<()> {
    let service = ActionSubsetQuery::new(repo);
    let all = service.fetch::<&str>(JOB, &[], 1, 50).await?;

    for start in 1..=7u32 {
        for len in 0..=3u32 {
            let page = service.fetch::<&str>(JOB, &[], start, len).await?;
            let from = (start as usize - 1).min(all.len());
            let to = (from + len as usize).min(all.len());
            assert_eq!(page, all[from..to].to_vec(), "start={start} len={len}");
        }
    }
    Ok(())
}

/// Expects [`seed`] data
pub async fn start_past_end_returns_empty(repo: Arc<dyn CoordinatorActionRepository>) -> Result<()> {
    let service = ActionSubsetQuery::new(repo);
    assert!(service.fetch::<&str>(JOB, &[], 100, 10).await?.is_empty());
    assert!(service.fetch::<&str>("no-such-job", &[], 1, 10).await?.is_empty());
    Ok(())
}

pub async fn invalid_inputs_are_query_failures(
    repo: Arc<dyn CoordinatorActionRepository>,
) -> Result<()> {
    let service = ActionSubsetQuery::new(repo);
    let err = service
        .fetch(JOB, &["RUNNING') OR ('1'='1"], 1, 10)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), Some("E0603"));

    let err = service.fetch::<&str>(JOB, &[], 0, 10).await.unwrap_err();
    assert_eq!(err.error_code(), Some("E0603"));
    Ok(())
}

/// Expects [`seed`] data
pub async fn count_matches_fetch(repo: Arc<dyn CoordinatorActionRepository>) -> Result<()> {
    assert_eq!(repo.count_actions(&ActionQuery::for_job(JOB)).await?, 6);

    let service = ActionSubsetQuery::new(repo);
    let running = service.count(JOB, &["RUNNING"]).await?;
    let fetched = service.fetch(JOB, &["RUNNING"], 1, 50).await?;
    assert_eq!(running, fetched.len() as i64);
    assert_eq!(running, 2);
    assert_eq!(service.count::<&str>("no-such-job", &[]).await?, 0);
    Ok(())
}
