//! Runs against the database in TEST_DATABASE_URL (or DATABASE_URL) and skips
//! when neither is set or reachable.

#[macro_use]
mod common;

use chrono::{Duration as ChronoDuration, Utc};
use clipstore::clip::{
    AnalyticsUpdate, AnalyticsWhere, AssetWhere, ClipFindMany, ClipInclude, ClipOrderBy,
    ClipUpdate, ClipWhere, NewAnalytics, NewAsset, NewClip,
};
use clipstore::core::shared::utils::new_id;
use clipstore::jobs::{JobUpdate, JobWhere, NewJob};
use clipstore::preferences::{NewAutopilotConfig, NewSettings, SettingsUpdate, SettingsWhere};
use clipstore::project::{
    ClipCandidateUpdate, ClipCandidateWhere, NewClipCandidate, NewProject, NewTranscript,
    ProjectFindMany, ProjectInclude, ProjectUpdate, ProjectWhere, TranscriptWhere,
};
use clipstore::{
    AssetKind, BatchOperation, Client, ClipStatus, ErrorKind, JobStatus, OrderBy, Platform,
    ProjectStatus, RawValue, StoreError, StringFilter, TransactionOptions,
};
use diesel::sql_types::{Integer, Text};
use diesel::QueryableByName;
use serde_json::json;
use std::time::Duration;

#[test]
fn test_project_round_trip_and_not_found() {
    let store = require_db!();
    let project = common::project(&store);
    assert_eq!(project.status, ProjectStatus::Pending);
    assert_eq!(project.duration_ms, Some(60_000));

    let found = assert_ok!(store.with_client(|c| c.project().find_unique(&project.id)));
    assert_eq!(found.as_ref(), Some(&project));

    let missing = assert_ok!(store.with_client(|c| c.project().find_unique("does-not-exist")));
    assert!(missing.is_none());
    let err = assert_err!(store.with_client(|c| c.project().find_unique_or_throw("does-not-exist")));
    assert!(err.is_not_found());
    assert_eq!(err.code(), Some("P2025"));

    let updated = assert_ok!(store.with_client(|c| {
        c.project().update(
            &project.id,
            ProjectUpdate {
                duration_ms: Some(None),
                ..ProjectUpdate::status(ProjectStatus::Ready)
            },
        )
    }));
    assert_eq!(updated.status, ProjectStatus::Ready);
    assert_eq!(updated.duration_ms, None);
    assert!(updated.updated_at >= project.updated_at);

    let unchanged = assert_ok!(store.with_client(|c| c.project().update(&project.id, ProjectUpdate::default())));
    assert_eq!(unchanged, updated);

    common::cleanup(&store, &project.id);
}

#[test]
fn test_validation_rejects_before_sql() {
    let store = require_db!();
    let err = assert_err!(store.with_client(|c| c.project().create(NewProject::new("", "/media/x.mp4"))));
    assert_eq!(err.kind(), ErrorKind::Validation);

    let project = common::project(&store);
    let err = assert_err!(store.with_client(|c| {
        c.clip_candidate()
            .create(NewClipCandidate::new(&project.id, 5_000, 1_000, &json!({})))
    }));
    assert_eq!(err.kind(), ErrorKind::Validation);
    common::cleanup(&store, &project.id);
}

#[test]
fn test_null_constraint_is_reported() {
    let store = require_db!();
    let err = assert_err!(store.with_client(|c| {
        c.execute_raw(
            "INSERT INTO \"Project\" (id, title, \"sourcePath\", \"updatedAt\") VALUES ($1, $2, $3, now())",
            &[new_id().into(), RawValue::Null, "/media/x.mp4".into()],
        )
    }));
    assert!(matches!(err, StoreError::NullConstraint { .. }), "{err:?}");
    assert_eq!(err.code(), Some("P2011"));
}

#[test]
fn test_foreign_key_is_reported() {
    let store = require_db!();
    let err = assert_err!(store.with_client(|c| {
        c.transcript()
            .create(NewTranscript::new("no-such-project", "whisper", &json!([])))
    }));
    assert_eq!(err.code(), Some("P2003"));
}

#[test]
fn test_migrations_are_all_applied() {
    let store = require_db!();
    assert!(assert_ok!(store.pending_migrations()).is_empty());
    assert!(assert_ok!(store.migrate()).is_empty());
}

#[test]
fn test_single_sided_range_update_is_rejected() {
    let store = require_db!();
    let project = common::project(&store);
    let candidate = assert_ok!(store.with_client(|c| {
        c.clip_candidate()
            .create(NewClipCandidate::new(&project.id, 1_000, 2_000, &json!({})))
    }));

    let err = assert_err!(store.with_client(|c| {
        c.clip_candidate().update(
            &candidate.id,
            ClipCandidateUpdate {
                start_ms: Some(5_000),
                ..Default::default()
            },
        )
    }));
    assert_eq!(err.kind(), ErrorKind::Validation, "{err:?}");

    let err = assert_err!(store.with_client(|c| {
        c.clip_candidate().update_many(
            &ClipCandidateWhere::project(&project.id),
            ClipCandidateUpdate {
                end_ms: Some(0),
                ..Default::default()
            },
        )
    }));
    assert_eq!(err.kind(), ErrorKind::Validation, "{err:?}");

    let stored = assert_ok!(store.with_client(|c| c.clip_candidate().find_unique_or_throw(&candidate.id)));
    assert_eq!((stored.start_ms, stored.end_ms), (1_000, 2_000));

    let clip = assert_ok!(store.with_client(|c| c.clip().create(NewClip::new(&project.id, 1_000, 2_000))));
    let err = assert_err!(store.with_client(|c| {
        c.clip().update(
            &clip.id,
            ClipUpdate {
                end_ms: Some(500),
                ..Default::default()
            },
        )
    }));
    assert_eq!(err.kind(), ErrorKind::Validation, "{err:?}");

    common::cleanup(&store, &project.id);
}

#[test]
fn test_status_outside_closed_set_is_rejected() {
    let store = require_db!();
    let project = common::project(&store);

    let err = assert_err!(store.with_client(|c| {
        c.execute_raw(
            "UPDATE \"Project\" SET status = $1 WHERE id = $2",
            &["processing".into(), project.id.as_str().into()],
        )
    }));
    assert_eq!(err.kind(), ErrorKind::Validation, "{err:?}");

    assert_ok!(store.with_client(|c| {
        c.execute_raw(
            "UPDATE \"Project\" SET status = $1 WHERE id = $2",
            &["Error".into(), project.id.as_str().into()],
        )
    }));
    let found = assert_ok!(store.with_client(|c| c.project().find_unique_or_throw(&project.id)));
    assert_eq!(found.status, ProjectStatus::Failed);

    common::cleanup(&store, &project.id);
}

#[test]
fn test_record_overwrites_every_counter() {
    let store = require_db!();
    let project = common::project(&store);
    let clip = assert_ok!(store.with_client(|c| c.clip().create(NewClip::new(&project.id, 0, 5_000))));
    assert_ok!(store.with_client(|c| {
        c.analytics()
            .create(NewAnalytics::new(&clip.id, Platform::Instagram).with_counts(100, 10, 2, 1))
    }));

    let recorded = assert_ok!(store.with_client(|c| {
        c.analytics().record(
            &clip.id,
            Platform::Instagram,
            AnalyticsUpdate {
                views: Some(7),
                ..Default::default()
            },
        )
    }));
    assert_eq!(
        (recorded.views, recorded.likes, recorded.comments, recorded.shares),
        (7, 0, 0, 0)
    );

    common::cleanup(&store, &project.id);
}

#[test]
fn test_analytics_unique_per_clip_and_platform() {
    let store = require_db!();
    let project = common::project(&store);
    let clip = assert_ok!(store.with_client(|c| c.clip().create(NewClip::new(&project.id, 0, 15_000))));

    assert_ok!(store.with_client(|c| {
        c.analytics()
            .create(NewAnalytics::new(&clip.id, Platform::Tiktok).with_counts(100, 10, 2, 1))
    }));
    let err = assert_err!(store.with_client(|c| {
        c.analytics().create(NewAnalytics::new(&clip.id, Platform::Tiktok))
    }));
    assert!(matches!(err, StoreError::UniqueConstraint { model: "Analytics", .. }), "{err:?}");
    assert_eq!(err.code(), Some("P2002"));

    let skipped = assert_ok!(store.with_client(|c| {
        c.analytics().create_many(
            vec![
                NewAnalytics::new(&clip.id, Platform::Tiktok),
                NewAnalytics::new(&clip.id, Platform::Youtube),
            ],
            true,
        )
    }));
    assert_eq!(skipped, 1);

    let recorded = assert_ok!(store.with_client(|c| {
        c.analytics()
            .record(&clip.id, Platform::Tiktok, AnalyticsUpdate::counts(500, 50, 5, 4))
    }));
    assert_eq!(recorded.views, 500);
    let rows = assert_ok!(store.with_client(|c| c.analytics().count(&AnalyticsWhere::clip(&clip.id))));
    assert_eq!(rows, 2);

    let totals = assert_ok!(store.with_client(|c| c.analytics().group_by_platform(&AnalyticsWhere::clip(&clip.id))));
    let tiktok = totals.iter().find(|t| t.platform == Platform::Tiktok).unwrap();
    assert_eq!((tiktok.count, tiktok.views, tiktok.shares), (1, 500, 4));

    common::cleanup(&store, &project.id);
}

#[test]
fn test_settings_key_is_unique_and_upserts() {
    let store = require_db!();
    let key = format!("test.{}", new_id());

    assert_ok!(store.with_client(|c| c.settings().create(NewSettings::new(&key, "1"))));
    let err = assert_err!(store.with_client(|c| c.settings().create(NewSettings::new(&key, "2"))));
    assert_eq!(err.code(), Some("P2002"));

    let row = assert_ok!(store.with_client(|c| c.settings().set_value(&key, "3")));
    assert_eq!(row.value, "3");
    let untouched = assert_ok!(store.with_client(|c| {
        c.settings().upsert(NewSettings::new(&key, "4"), SettingsUpdate::default())
    }));
    assert_eq!(untouched.value, "3");
    assert_eq!(assert_ok!(store.with_client(|c| c.settings().get_value(&key))), Some("3".to_string()));

    let prefixed = assert_ok!(store.with_client(|c| c.settings().count(&SettingsWhere::key_prefix(&key))));
    assert_eq!(prefixed, 1);

    let deleted = assert_ok!(store.with_client(|c| c.settings().delete_by_key(&key)));
    assert_eq!(deleted.map(|s| s.key), Some(key.clone()));
    assert_eq!(assert_ok!(store.with_client(|c| c.settings().get_value(&key))), None);
}

#[test]
fn test_deleting_project_cascades() {
    let store = require_db!();
    let project = common::project(&store);
    let clip = assert_ok!(store.with_client(|c| {
        c.transcript().create(NewTranscript::new(&project.id, "whisper", &json!([{"start": 0, "text": "hi"}])))?;
        c.clip_candidate().create(NewClipCandidate::new(&project.id, 0, 10_000, &json!({"score": 0.8})))?;
        let clip = c.clip().create(NewClip::new(&project.id, 0, 10_000))?;
        c.asset().create(NewAsset::new(&clip.id, AssetKind::Video, "/renders/a.mp4"))?;
        c.analytics().create(NewAnalytics::new(&clip.id, Platform::Youtube))?;
        Ok(clip)
    }));

    let deleted = assert_ok!(store.with_client(|c| c.project().delete(&project.id)));
    assert_eq!(deleted.id, project.id);

    assert_ok!(store.with_client(|c| {
        assert_eq!(c.transcript().count(&TranscriptWhere::project(&project.id))?, 0);
        assert_eq!(c.clip_candidate().count(&ClipCandidateWhere::project(&project.id))?, 0);
        assert_eq!(c.clip().count(&ClipWhere::project(&project.id))?, 0);
        assert_eq!(c.asset().count(&AssetWhere::clip(&clip.id))?, 0);
        assert_eq!(c.analytics().count(&AnalyticsWhere::clip(&clip.id))?, 0);
        Ok(())
    }));

    let err = assert_err!(store.with_client(|c| c.project().delete(&project.id)));
    assert!(err.is_not_found());
}

#[test]
fn test_filters_order_and_pagination() {
    let store = require_db!();
    let project = common::project(&store);
    let created = assert_ok!(store.with_client(|c| {
        c.clip().create_many_and_return(
            vec![
                NewClip::new(&project.id, 30_000, 45_000).with_caption("Third"),
                NewClip::new(&project.id, 0, 15_000).with_caption("first take"),
                NewClip::new(&project.id, 15_000, 30_000).with_status(ClipStatus::Ready),
            ],
            false,
        )
    }));
    assert_eq!(created.len(), 3);

    let ordered = assert_ok!(store.with_client(|c| {
        c.clip().find_many(
            &ClipFindMany::new()
                .filter(ClipWhere::project(&project.id))
                .order_by(OrderBy::asc(ClipOrderBy::StartMs))
                .skip(1)
                .take(1),
        )
    }));
    assert_eq!(ordered.len(), 1);
    assert_eq!(ordered[0].start_ms, 15_000);

    let insensitive = ClipWhere {
        caption: Some(clipstore::Nullable::matching(StringFilter::contains("FIRST").insensitive())),
        ..ClipWhere::project(&project.id)
    };
    let matched = assert_ok!(store.with_client(|c| c.clip().find_many(&ClipFindMany::new().filter(insensitive))));
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].caption.as_deref(), Some("first take"));

    let either = ClipWhere {
        or: vec![ClipWhere::status(ClipStatus::Ready), ClipWhere::status(ClipStatus::Published)],
        ..ClipWhere::project(&project.id)
    };
    assert_eq!(assert_ok!(store.with_client(|c| c.clip().count(&either))), 1);

    let first = assert_ok!(store.with_client(|c| {
        c.clip().find_first(
            &ClipFindMany::new()
                .filter(ClipWhere::project(&project.id))
                .order_by(OrderBy::desc(ClipOrderBy::EndMs)),
        )
    }));
    assert_eq!(first.map(|clip| clip.end_ms), Some(45_000));

    let published = assert_ok!(store.with_client(|c| {
        c.clip().update_many(&ClipWhere::project(&project.id), ClipUpdate::status(ClipStatus::Published))
    }));
    assert_eq!(published, 3);
    let none = assert_ok!(store.with_client(|c| {
        c.clip().update_many(&ClipWhere::project(&project.id), ClipUpdate::default())
    }));
    assert_eq!(none, 0);

    common::cleanup(&store, &project.id);
}

#[test]
fn test_includes_load_relations() {
    let store = require_db!();
    let project = common::project(&store);
    let clip = assert_ok!(store.with_client(|c| {
        c.transcript().create(NewTranscript::new(&project.id, "whisper", &json!([])))?;
        let clip = c.clip().create(NewClip::new(&project.id, 0, 9_000))?;
        c.asset().create(NewAsset::new(&clip.id, AssetKind::Thumbnail, "/renders/t.jpg"))?;
        c.asset().create(NewAsset::new(&clip.id, AssetKind::Video, "/renders/v.mp4"))?;
        Ok(clip)
    }));

    let loaded = assert_ok!(store.with_client(|c| {
        c.project().find_unique_with(
            &project.id,
            ProjectInclude {
                transcripts: true,
                clips: true,
                ..Default::default()
            },
        )
    }))
    .unwrap();
    assert_eq!(loaded.transcripts.as_ref().map(Vec::len), Some(1));
    assert_eq!(loaded.clips.as_ref().map(Vec::len), Some(1));
    assert!(loaded.clip_candidates.is_none());

    let clips = assert_ok!(store.with_client(|c| {
        c.clip().find_many_with(&ClipFindMany::new().filter(ClipWhere::project(&project.id)), ClipInclude::all())
    }));
    assert_eq!(clips.len(), 1);
    assert_eq!(clips[0].clip.id, clip.id);
    assert_eq!(clips[0].assets.as_ref().map(Vec::len), Some(2));
    assert_eq!(clips[0].analytics.as_deref(), Some(&[][..]));

    let kinds = assert_ok!(store.with_client(|c| c.asset().group_by_kind(&AssetWhere::clip(&clip.id))));
    assert_eq!(kinds.len(), 2);
    assert!(kinds.iter().all(|g| g.count == 1));

    common::cleanup(&store, &project.id);
}

#[test]
fn test_aggregate_and_group_by() {
    let store = require_db!();
    let project = common::project(&store);
    assert_ok!(store.with_client(|c| {
        c.clip_candidate().create_many(
            vec![
                NewClipCandidate::new(&project.id, 0, 10_000, &json!({})),
                NewClipCandidate::new(&project.id, 20_000, 40_000, &json!({})),
            ],
            false,
        )
    }));

    let stats = assert_ok!(store.with_client(|c| c.clip_candidate().aggregate(&ClipCandidateWhere::project(&project.id))));
    assert_eq!(stats.count, 2);
    assert_eq!(stats.start_ms.sum, Some(20_000));
    assert_eq!(stats.start_ms.avg, Some(10_000.0));
    assert_eq!(stats.end_ms.min, Some(10_000));
    assert_eq!(stats.end_ms.max, Some(40_000));

    let groups = assert_ok!(store.with_client(|c| c.clip_candidate().group_by_project(&ClipCandidateWhere::project(&project.id))));
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].key, project.id);
    assert_eq!(groups[0].count, 2);

    let empty = ProjectWhere {
        title: Some(StringFilter::equals(format!("missing-{}", new_id()))),
        ..Default::default()
    };
    let nothing = assert_ok!(store.with_client(|c| c.project().aggregate(&empty)));
    assert_eq!(nothing.count, 0);
    assert_eq!(nothing.duration_ms.avg, None);

    common::cleanup(&store, &project.id);
}

#[test]
fn test_transaction_commits_and_rolls_back() {
    let store = require_db!();
    let committed_id = new_id();
    let rolled_back_id = new_id();

    let project = assert_ok!(store.transaction(|c| {
        c.project().create(NewProject::new("tx commit", "/media/tx.mp4").with_id(&committed_id))
    }));
    assert_eq!(project.id, committed_id);

    let err = assert_err!(store.transaction(|c| {
        c.project().create(NewProject::new("tx rollback", "/media/tx.mp4").with_id(&rolled_back_id))?;
        c.project().find_unique_or_throw("does-not-exist")
    }));
    assert!(err.is_not_found());
    assert!(assert_ok!(store.with_client(|c| c.project().find_unique(&rolled_back_id))).is_none());

    common::cleanup(&store, &committed_id);
}

#[test]
fn test_transaction_timeout_rolls_back() {
    let store = require_db!();
    let id = new_id();
    let options = TransactionOptions::default().with_timeout(Duration::from_millis(100));
    let err = assert_err!(store.transaction_with(&options, |c| {
        c.project().create(NewProject::new("slow", "/media/slow.mp4").with_id(&id))?;
        std::thread::sleep(Duration::from_millis(250));
        Ok(())
    }));
    assert!(matches!(err, StoreError::TransactionTimeout { timeout_ms: 100, .. }), "{err:?}");
    assert_eq!(err.code(), Some("P2028"));
    assert!(assert_ok!(store.with_client(|c| c.project().find_unique(&id))).is_none());
}

#[test]
fn test_serializable_transaction() {
    let store = require_db!();
    let options = TransactionOptions::default().serializable();
    let level: Vec<IsolationRow> = assert_ok!(store.transaction_with(&options, |c| {
        c.query_raw("SELECT current_setting('transaction_isolation') AS level", &[])
    }));
    assert_eq!(level[0].level, "serializable");
}

#[derive(QueryableByName)]
struct IsolationRow {
    #[diesel(sql_type = Text)]
    level: String,
}

#[test]
fn test_batch_is_atomic() {
    let store = require_db!();
    let project = common::project(&store);

    let pid = project.id.clone();
    let ops: Vec<BatchOperation<String>> = vec![
        Box::new(move |c: &mut Client<'_>| Ok(c.job().create(NewJob::new("render", &json!({ "projectId": pid })))?.id)),
        Box::new(|c: &mut Client<'_>| Ok(c.job().create(NewJob::new("upload", &json!({})))?.id)),
    ];
    let ids = assert_ok!(store.batch(ops));
    assert_eq!(ids.len(), 2);

    let failing_id = new_id();
    let failing = failing_id.clone();
    let ops: Vec<BatchOperation<()>> = vec![
        Box::new(move |c: &mut Client<'_>| {
            c.project().create(NewProject::new("batch", "/media/b.mp4").with_id(&failing))?;
            Ok(())
        }),
        Box::new(|c: &mut Client<'_>| c.project().find_unique_or_throw("does-not-exist").map(|_| ())),
    ];
    assert_err!(store.batch(ops));
    assert!(assert_ok!(store.with_client(|c| c.project().find_unique(&failing_id))).is_none());

    assert_ok!(store.with_client(|c| {
        for id in &ids {
            c.job().delete(id)?;
        }
        Ok(())
    }));
    common::cleanup(&store, &project.id);
}

#[test]
fn test_job_retry_flow() {
    let store = require_db!();
    let job = assert_ok!(store.with_client(|c| c.job().create(NewJob::new("transcribe", &json!({"n": 1})))));
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.attempts, 0);

    let retry_at = Utc::now() + ChronoDuration::minutes(10);
    let failed = assert_ok!(store.with_client(|c| {
        c.job().update(&job.id, JobUpdate::failed_attempt(1, "timeout", Some(retry_at)))
    }));
    assert_eq!(failed.status, JobStatus::Pending);
    assert_eq!(failed.error.as_deref(), Some("timeout"));

    let due_now = JobWhere {
        id: Some(StringFilter::equals(&job.id)),
        ..JobWhere::due(Utc::now())
    };
    assert_eq!(assert_ok!(store.with_client(|c| c.job().count(&due_now))), 0);
    let due_later = JobWhere {
        id: Some(StringFilter::equals(&job.id)),
        ..JobWhere::due(retry_at + ChronoDuration::seconds(1))
    };
    assert_eq!(assert_ok!(store.with_client(|c| c.job().count(&due_later))), 1);

    assert_ok!(store.with_client(|c| c.job().delete(&job.id)));
}

#[test]
fn test_autopilot_group_by_platform() {
    let store = require_db!();
    let config = assert_ok!(store.with_client(|c| {
        c.autopilot_config()
            .create(NewAutopilotConfig::new("rust, diesel", Platform::Instagram, 3).active())
    }));
    assert_eq!(config.keyword_list(), vec!["rust", "diesel"]);

    let groups = assert_ok!(store.with_client(|c| c.autopilot_config().group_by_target_platform(&Default::default())));
    assert!(groups.iter().any(|g| g.key == Platform::Instagram && g.count >= 1));

    assert_ok!(store.with_client(|c| c.autopilot_config().delete(&config.id)));
}

#[derive(QueryableByName, Debug)]
struct ClipSpan {
    #[diesel(sql_type = Text)]
    id: String,
    #[diesel(sql_type = Integer)]
    start_ms: i32,
}

#[test]
fn test_raw_queries() {
    let store = require_db!();
    let project = common::project(&store);
    assert_ok!(store.with_client(|c| {
        c.clip().create(NewClip::new(&project.id, 2_000, 4_000))?;
        c.clip().create(NewClip::new(&project.id, 500, 1_000))
    }));

    let spans: Vec<ClipSpan> = assert_ok!(store.with_client(|c| {
        c.query_raw(
            "SELECT id, \"startMs\" AS start_ms FROM \"Clip\" WHERE \"projectId\" = $1 AND \"startMs\" >= $2 ORDER BY \"startMs\"",
            &[project.id.as_str().into(), RawValue::Int(0)],
        )
    }));
    assert_eq!(spans.iter().map(|s| s.start_ms).collect::<Vec<_>>(), vec![500, 2_000]);
    assert!(spans.iter().all(|s| !s.id.is_empty()));

    let touched = assert_ok!(store.with_client(|c| {
        c.execute_raw(
            "UPDATE \"Clip\" SET caption = $1 WHERE \"projectId\" = $2",
            &[RawValue::from("raw"), project.id.as_str().into()],
        )
    }));
    assert_eq!(touched, 2);

    common::cleanup(&store, &project.id);
}

#[tokio::test]
async fn test_interact_runs_on_blocking_pool() {
    let store = require_db!();
    let project = common::project(&store);
    let pid = project.id.clone();
    let found = assert_ok!(
        store
            .interact(move |c| c.project().find_many(&ProjectFindMany::new().filter(ProjectWhere {
                id: Some(StringFilter::equals(pid)),
                ..Default::default()
            })))
            .await
    );
    assert_eq!(found.len(), 1);
    common::cleanup(&store, &project.id);
}
