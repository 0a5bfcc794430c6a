use monitor_core::{
    render_aggregate, render_category_summary, render_history, render_preview_list,
    render_task_list, update, AppState, CategoryCount, HistoryRecord, Listing, Msg,
    PreviewedResource, ProgressSnapshot, TaskStatus, HISTORY_PLACEHOLDER, PREVIEW_PLACEHOLDER,
    SUMMARY_PLACEHOLDER,
};
use pretty_assertions::assert_eq;

fn resource(filename: &str, category: &str) -> PreviewedResource {
    PreviewedResource {
        filename: filename.to_string(),
        category: category.to_string(),
        url: None,
    }
}

#[test]
fn zero_total_renders_empty_indicator() {
    let view = render_aggregate(&ProgressSnapshot::default(), None);
    assert_eq!(view.percent, 0.0);
    assert_eq!(view.percent_label, "0%");
    assert_eq!(view.total, 0);
    assert_eq!(view.rate, "0.00");
}

#[test]
fn overshooting_counts_cap_the_indicator() {
    let snapshot = ProgressSnapshot {
        total: 4,
        completed: 6,
        failed: 0,
        rate: 2.0,
        tasks: Vec::new(),
    };
    let view = render_aggregate(&snapshot, None);
    assert_eq!(view.percent, 100.0);
    assert_eq!(view.completed, 6);
}

#[test]
fn task_rows_translate_status_and_shorten_urls() {
    let long = format!("https://cdn.example.com/{}", "x".repeat(60));
    let rows = render_task_list(&[
        TaskStatus::new("https://example.com/a.png", "completed"),
        TaskStatus::new(long, "mystery"),
    ]);

    assert_eq!(rows[0].label, "已完成");
    assert_eq!(rows[0].url, "https://example.com/a.png");
    assert_eq!(rows[1].label, "mystery");
    assert_eq!(rows[1].url.chars().count(), 50);
    assert!(rows[1].url.ends_with("..."));
}

#[test]
fn summary_without_categories_shows_placeholder() {
    let tasks = vec![TaskStatus::new("a", "completed"), TaskStatus::new("b", "failed")];
    assert_eq!(
        render_category_summary(&tasks),
        Listing::Placeholder(SUMMARY_PLACEHOLDER)
    );
}

#[test]
fn preview_rows_and_summary_follow_first_seen_order() {
    let resources = vec![
        resource("app.js", "script"),
        resource("logo.png", "image"),
        resource("main.js", "script"),
    ];

    let rows = render_preview_list(&resources);
    assert_eq!(rows.rows().len(), 3);
    assert_eq!(rows.rows()[1].filename, "logo.png");

    assert_eq!(
        render_category_summary(&resources).rows().to_vec(),
        vec![
            CategoryCount {
                category: "script".to_string(),
                count: 2
            },
            CategoryCount {
                category: "image".to_string(),
                count: 1
            },
        ]
    );
    assert_eq!(render_preview_list(&[]), Listing::Placeholder(PREVIEW_PLACEHOLDER));
}

#[test]
fn history_rows_format_every_column() {
    let records = vec![
        HistoryRecord {
            url: "https://example.com".to_string(),
            status: "completed".to_string(),
            start_time: "2024-05-01 10:00:00".to_string(),
            end_time: Some("2024-05-01 10:02:05".to_string()),
            file_types: vec!["image".to_string(), "script".to_string()],
            completed: 9,
            total: 10,
            failed: 1,
        },
        HistoryRecord {
            url: "https://example.org".to_string(),
            status: "exploded".to_string(),
            start_time: "2024-05-02 08:00:00".to_string(),
            end_time: None,
            file_types: Vec::new(),
            completed: 0,
            total: 3,
            failed: 0,
        },
    ];

    let listing = render_history(&records);
    let rows = listing.rows();
    assert_eq!(rows[0].status_label, "已完成");
    assert_eq!(rows[0].started, "2024-05-01 10:00:00");
    assert_eq!(rows[0].file_types, "image, script");
    assert_eq!(rows[0].duration, "2分5秒");
    assert_eq!(rows[0].counts, "完成 9/10 项（失败 1）");
    assert_eq!(rows[1].status_label, "未知状态");
    assert_eq!(rows[1].duration, "进行中");

    assert_eq!(render_history(&[]), Listing::Placeholder(HISTORY_PLACEHOLDER));
}

#[test]
fn loaded_preview_replaces_summary_and_empty_preview_keeps_it() {
    let (state, _) = update(
        AppState::new(),
        Msg::PreviewLoaded(vec![resource("a.css", "style")]),
    );
    let summary = state.view().summary.expect("summary");
    assert_eq!(summary.rows()[0].category, "style");

    let (state, effects) = update(state, Msg::PreviewLoaded(Vec::new()));
    assert_eq!(effects.len(), 1);
    assert_eq!(state.view().preview.map(|p| p.rows().len()), Some(1));
}

#[test]
fn history_request_is_not_duplicated_while_pending() {
    let (state, effects) = update(AppState::new(), Msg::HistoryClicked);
    assert_eq!(effects.len(), 1);
    assert!(state.view().busy);

    let (state, effects) = update(state, Msg::HistoryClicked);
    assert!(effects.is_empty());

    let (state, _) = update(state, Msg::HistoryLoaded(Vec::new()));
    let view = state.view();
    assert!(!view.busy);
    assert_eq!(view.history, Some(Listing::Placeholder(HISTORY_PLACEHOLDER)));
}
