use std::sync::Once;

use monitor_core::{
    update, AppState, Effect, Msg, Notice, ProgressSnapshot, SessionPhase, Severity, TaskStatus,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(monitor_logging::initialize_for_tests);
}

fn request_start(state: AppState, url: &str, types: &[&str]) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::UrlChanged(url.to_string()));
    let (state, _) = update(
        state,
        Msg::FileTypesChanged(types.iter().map(|t| t.to_string()).collect()),
    );
    update(state, Msg::StartClicked)
}

fn active_job(url: &str) -> AppState {
    let (state, _) = request_start(AppState::new(), url, &[]);
    let subscription = state.subscription().expect("subscription opened");
    let (state, _) = update(state, Msg::StreamOpened { subscription });
    let (state, _) = update(
        state,
        Msg::StartAccepted {
            message: Some("下载任务已开始".to_string()),
            total_tasks: Some(3),
        },
    );
    assert_eq!(state.phase(), SessionPhase::Active);
    state
}

fn snapshot(total: u64, completed: u64, failed: u64) -> ProgressSnapshot {
    ProgressSnapshot {
        total,
        completed,
        failed,
        rate: 0.5,
        tasks: Vec::new(),
    }
}

fn receive(state: AppState, snapshot: ProgressSnapshot) -> (AppState, Vec<Effect>) {
    let subscription = state.subscription().unwrap_or(u64::MAX);
    update(
        state,
        Msg::SnapshotReceived {
            subscription,
            snapshot,
        },
    )
}

fn close_count(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|effect| matches!(effect, Effect::CloseStream { .. }))
        .count()
}

#[test]
fn blank_url_is_rejected_without_touching_state() {
    init_logging();
    for input in ["", "   ", "\t\n"] {
        let (state, _) = update(AppState::new(), Msg::UrlChanged(input.to_string()));
        let before = state.clone();

        let (after, effects) = update(state, Msg::StartClicked);

        assert_eq!(after, before);
        assert_eq!(after.phase(), SessionPhase::Idle);
        assert_eq!(effects.len(), 1);
        match &effects[0] {
            Effect::ShowNotice(Notice { severity, .. }) => {
                assert_eq!(*severity, Severity::Warning)
            }
            other => panic!("unexpected effect {other:?}"),
        }
    }
}

#[test]
fn unknown_file_type_is_a_validation_error() {
    let (state, effects) = request_start(AppState::new(), "https://example.com", &["images"]);
    assert_eq!(state.phase(), SessionPhase::Idle);
    assert!(matches!(
        effects.as_slice(),
        [Effect::ShowNotice(Notice {
            severity: Severity::Warning,
            ..
        })]
    ));
}

#[test]
fn start_opens_one_stream_and_submits_trimmed_request() {
    init_logging();
    let (state, effects) = request_start(
        AppState::new(),
        "  https://example.com  ",
        &["Script", "image", "image"],
    );

    assert_eq!(state.phase(), SessionPhase::Starting);
    assert!(state.download_in_progress());
    assert_eq!(
        effects,
        vec![
            Effect::OpenStream {
                subscription: 1,
                job_url: "https://example.com".to_string(),
            },
            Effect::SubmitStart {
                url: "https://example.com".to_string(),
                file_types: vec!["image".to_string(), "script".to_string()],
            },
        ]
    );
    let view = state.view();
    assert!(view.controls.cancel);
    assert!(!view.controls.start);
    assert!(!view.controls.preview);
    assert_eq!(view.progress.as_ref().map(|p| p.percent), Some(0.0));
}

#[test]
fn start_is_ignored_while_a_job_is_in_flight() {
    let state = active_job("https://example.com");
    let before = state.clone();
    let (after, effects) = update(state, Msg::StartClicked);
    assert_eq!(after, before);
    assert!(effects.is_empty());
}

#[test]
fn becomes_active_once_acknowledged_and_open_in_either_order() {
    let (state, _) = request_start(AppState::new(), "https://example.com", &[]);
    let (state, _) = update(
        state,
        Msg::StartAccepted {
            message: None,
            total_tasks: Some(2),
        },
    );
    assert_eq!(state.phase(), SessionPhase::Starting);
    let (state, _) = update(state, Msg::StreamOpened { subscription: 1 });
    assert_eq!(state.phase(), SessionPhase::Active);

    let (state, _) = request_start(AppState::new(), "https://example.com", &[]);
    let (state, _) = update(state, Msg::StreamOpened { subscription: 1 });
    assert_eq!(state.phase(), SessionPhase::Starting);
    let (state, _) = update(
        state,
        Msg::StartAccepted {
            message: None,
            total_tasks: Some(2),
        },
    );
    assert_eq!(state.phase(), SessionPhase::Active);
}

#[test]
fn rejected_start_closes_stream_and_reverts_to_idle() {
    init_logging();
    let (state, _) = request_start(AppState::new(), "https://example.com", &[]);
    let (state, effects) = update(
        state,
        Msg::StartRejected {
            message: Some("无效的URL格式".to_string()),
        },
    );

    assert_eq!(state.phase(), SessionPhase::Idle);
    assert!(!state.download_in_progress());
    assert_eq!(
        effects,
        vec![
            Effect::CloseStream { subscription: 1 },
            Effect::ShowNotice(Notice::new(Severity::Error, "无效的URL格式")),
        ]
    );
}

#[test]
fn rejected_start_without_message_uses_generic_text() {
    let (state, _) = request_start(AppState::new(), "https://example.com", &[]);
    let (_state, effects) = update(state, Msg::StartRejected { message: None });
    assert!(effects.contains(&Effect::ShowNotice(Notice::new(
        Severity::Error,
        monitor_core::GENERIC_REQUEST_FAILURE
    ))));
}

#[test]
fn nothing_to_download_ends_the_session() {
    let (state, _) = request_start(AppState::new(), "https://example.com", &[]);
    let (state, effects) = update(
        state,
        Msg::StartAccepted {
            message: Some("未找到可下载的资源".to_string()),
            total_tasks: None,
        },
    );
    assert_eq!(state.phase(), SessionPhase::Idle);
    assert_eq!(
        effects,
        vec![
            Effect::CloseStream { subscription: 1 },
            Effect::ShowNotice(Notice::info("未找到可下载的资源")),
        ]
    );
}

#[test]
fn three_snapshot_job_completes_on_the_third() {
    init_logging();
    let state = active_job("https://example.com");

    let (state, effects) = receive(state, snapshot(3, 0, 0));
    assert!(effects.is_empty());
    let progress = state.view().progress.expect("progress shown");
    assert_eq!(progress.percent, 0.0);
    assert_eq!(progress.percent_label, "0%");

    let (state, effects) = receive(state, snapshot(3, 2, 0));
    assert!(effects.is_empty());
    let progress = state.view().progress.expect("progress shown");
    assert_eq!(progress.percent_label, "66.7%");
    assert_eq!(state.phase(), SessionPhase::Active);

    let (state, effects) = receive(state, snapshot(3, 2, 1));
    assert_eq!(
        effects,
        vec![
            Effect::CloseStream { subscription: 1 },
            Effect::ShowNotice(Notice::success("下载任务完成!")),
        ]
    );
    assert_eq!(state.phase(), SessionPhase::Completed);
    assert!(!state.download_in_progress());
    assert_eq!(state.subscription(), None);

    let view = state.view();
    let progress = view.progress.expect("final progress stays visible");
    assert_eq!(progress.percent, 100.0);
    assert_eq!(progress.completed, 2);
    assert_eq!(progress.failed, 1);
    assert!(view.controls.start);
    assert!(view.controls.preview);
    assert!(!view.controls.cancel);
}

#[test]
fn terminal_condition_fires_exactly_once() {
    for total in 1..=4u64 {
        for completed in 0..=total {
            for failed in 0..=total {
                if completed + failed < total {
                    continue;
                }
                let state = active_job("https://example.com");
                let (state, effects) = receive(state, snapshot(total, completed, failed));
                assert_eq!(state.phase(), SessionPhase::Completed);
                assert_eq!(close_count(&effects), 1);

                let (state, effects) = update(
                    state,
                    Msg::SnapshotReceived {
                        subscription: 1,
                        snapshot: snapshot(total, completed, failed),
                    },
                );
                assert!(effects.is_empty());
                assert_eq!(state.phase(), SessionPhase::Completed);
            }
        }
    }
}

#[test]
fn zero_total_is_never_terminal() {
    let state = active_job("https://example.com");
    let (state, effects) = receive(state, snapshot(0, 0, 0));
    assert!(effects.is_empty());
    assert_eq!(state.phase(), SessionPhase::Active);
    assert_eq!(state.view().progress.map(|p| p.percent), Some(0.0));
}

#[test]
fn snapshots_before_acknowledgement_render_but_do_not_complete() {
    let (state, _) = request_start(AppState::new(), "https://example.com", &[]);
    let (state, effects) = receive(state, snapshot(5, 5, 0));
    assert!(effects.is_empty());
    assert_eq!(state.phase(), SessionPhase::Starting);
    assert_eq!(state.view().progress.map(|p| p.completed), Some(5));
}

#[test]
fn displayed_total_is_locked_from_first_snapshot() {
    let state = active_job("https://example.com");
    let (state, _) = receive(state, snapshot(0, 0, 0));
    let (state, _) = receive(state, snapshot(4, 1, 0));
    let (state, _) = receive(state, snapshot(6, 2, 0));
    let progress = state.view().progress.expect("progress");
    assert_eq!(progress.total, 4);
    assert_eq!(progress.percent_label, "33.3%");
}

#[test]
fn previous_job_snapshot_before_acknowledgement_does_not_lock_total() {
    let (state, _) = request_start(AppState::new(), "https://example.com", &[]);
    let (state, _) = update(state, Msg::StreamOpened { subscription: 1 });
    let (state, _) = receive(state, snapshot(10, 10, 0));
    assert_eq!(state.view().progress.map(|p| p.total), Some(10));

    let (state, _) = update(
        state,
        Msg::StartAccepted {
            message: None,
            total_tasks: Some(5),
        },
    );
    let (state, effects) = receive(state, snapshot(5, 1, 0));
    assert!(effects.is_empty());

    let progress = state.view().progress.expect("progress");
    assert_eq!(progress.total, 5);
    assert_eq!(progress.completed, 1);
    assert_eq!(progress.percent_label, "20%");
}

#[test]
fn completion_renders_category_summary_from_final_tasks() {
    let state = active_job("https://example.com");
    let final_snapshot = ProgressSnapshot {
        total: 3,
        completed: 3,
        failed: 0,
        rate: 1.0,
        tasks: vec![
            TaskStatus::new("https://example.com/a.png", "completed").with_category("image"),
            TaskStatus::new("https://example.com/b.js", "completed").with_category("script"),
            TaskStatus::new("https://example.com/c.png", "completed").with_category("image"),
            TaskStatus::new("https://example.com/d", "completed"),
        ],
    };
    let (state, _) = receive(state, final_snapshot);
    let summary = state.view().summary.expect("summary rendered");
    let rows: Vec<(String, usize)> = summary
        .rows()
        .iter()
        .map(|row| (row.category.clone(), row.count))
        .collect();
    assert_eq!(
        rows,
        vec![("image".to_string(), 2), ("script".to_string(), 1)]
    );
}

#[test]
fn restart_after_completion_uses_a_fresh_subscription() {
    let state = active_job("https://example.com");
    let (state, _) = receive(state, snapshot(1, 1, 0));
    assert_eq!(state.phase(), SessionPhase::Completed);

    let (state, effects) = update(state, Msg::StartClicked);
    assert_eq!(state.phase(), SessionPhase::Starting);
    assert_eq!(close_count(&effects), 0);
    assert!(effects.contains(&Effect::OpenStream {
        subscription: 2,
        job_url: "https://example.com".to_string(),
    }));
    assert!(state.view().progress.map(|p| p.completed) == Some(0));
}
