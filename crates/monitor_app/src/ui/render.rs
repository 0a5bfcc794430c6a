use monitor_core::{
    AggregateView, AppViewModel, CategoryCount, HistoryRowView, Listing, Notice, PreviewRowView,
    SessionPhase, Severity,
};

const BAR_WIDTH: usize = 30;

/// Full screen for one view, notices last.
pub fn render<'a>(view: &AppViewModel, notices: impl Iterator<Item = &'a Notice>) -> Vec<String> {
    let mut lines = vec![header(view)];

    if let Some(progress) = &view.progress {
        lines.push(progress_line(progress));
        lines.extend(
            view.tasks
                .iter()
                .map(|task| format!("  {:<4} {}", task.label, task.url)),
        );
    }
    if view.reconnecting {
        lines.push("  (重连中...)".to_string());
    }
    if let Some(summary) = &view.summary {
        lines.push("分类统计:".to_string());
        lines.extend(listing(summary, category_line));
    }
    if let Some(preview) = &view.preview {
        lines.push("资源预览:".to_string());
        lines.extend(listing(preview, preview_line));
    }
    if let Some(history) = &view.history {
        lines.push("下载历史:".to_string());
        lines.extend(listing(history, history_line));
    }
    lines.extend(notices.map(notice_line));
    lines
}

fn header(view: &AppViewModel) -> String {
    let phase = match view.phase {
        SessionPhase::Idle => "空闲",
        SessionPhase::Starting => "启动中",
        SessionPhase::Active => "下载中",
        SessionPhase::Cancelling => "取消中",
        SessionPhase::Completed => "已完成",
    };
    match &view.job_url {
        Some(url) => format!("== {phase} | {url}"),
        None => format!("== {phase}"),
    }
}

pub fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

fn progress_line(progress: &AggregateView) -> String {
    format!(
        "{} {:>6}  完成 {}/{}  失败 {}  速率 {}/s",
        progress_bar(progress.percent, BAR_WIDTH),
        progress.percent_label,
        progress.completed,
        progress.total,
        progress.failed,
        progress.rate
    )
}

fn listing<T>(listing: &Listing<T>, line: fn(&T) -> String) -> Vec<String> {
    match listing {
        Listing::Rows(rows) => rows.iter().map(line).collect(),
        Listing::Placeholder(text) => vec![format!("  {text}")],
    }
}

fn category_line(row: &CategoryCount) -> String {
    format!("  {}: {}", row.category, row.count)
}

fn preview_line(row: &PreviewRowView) -> String {
    format!("  [{}] {}", row.category, row.filename)
}

fn history_line(row: &HistoryRowView) -> String {
    let types = if row.file_types.is_empty() {
        "全部"
    } else {
        row.file_types.as_str()
    };
    format!(
        "  {} {} {} ({}) 耗时 {} {}",
        row.status_label, row.started, row.url, types, row.duration, row.counts
    )
}

pub fn notice_line(notice: &Notice) -> String {
    let tag = match notice.severity {
        Severity::Info => "提示",
        Severity::Success => "成功",
        Severity::Warning => "警告",
        Severity::Error => "错误",
    };
    format!("[{tag}] {}", notice.text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use monitor_core::{update, AppState, Msg, ProgressSnapshot, TaskStatus};
    use pretty_assertions::assert_eq;

    #[test]
    fn bar_is_proportional_and_clamped() {
        assert_eq!(progress_bar(0.0, 10), "[----------]");
        assert_eq!(progress_bar(50.0, 10), "[#####-----]");
        assert_eq!(progress_bar(250.0, 4), "[####]");
    }

    #[test]
    fn idle_view_is_a_single_header() {
        let view = AppState::new().view();
        assert_eq!(render(&view, std::iter::empty()), vec!["== 空闲".to_string()]);
    }

    #[test]
    fn active_job_shows_progress_tasks_and_notices() {
        let (state, _) = update(AppState::new(), Msg::UrlChanged("https://example.com".into()));
        let (state, _) = update(state, Msg::StartClicked);
        let (state, _) = update(state, Msg::StreamOpened { subscription: 1 });
        let (state, _) = update(
            state,
            Msg::StartAccepted {
                message: None,
                total_tasks: Some(2),
            },
        );
        let (state, _) = update(
            state,
            Msg::SnapshotReceived {
                subscription: 1,
                snapshot: ProgressSnapshot {
                    total: 2,
                    completed: 1,
                    failed: 0,
                    rate: 0.5,
                    tasks: vec![
                        TaskStatus::new("https://example.com/a.png", "completed"),
                        TaskStatus::new("https://example.com/b.js", "downloading"),
                    ],
                },
            },
        );
        let notice = Notice::info("hello");

        let lines = render(&state.view(), std::iter::once(&notice));
        assert_eq!(
            lines,
            vec![
                "== 下载中 | https://example.com".to_string(),
                format!(
                    "{}    50%  完成 1/2  失败 0  速率 0.50/s",
                    progress_bar(50.0, BAR_WIDTH)
                ),
                "  已完成  https://example.com/a.png".to_string(),
                "  下载中  https://example.com/b.js".to_string(),
                "[提示] hello".to_string(),
            ]
        );
    }

    #[test]
    fn empty_history_shows_placeholder() {
        let (state, _) = update(AppState::new(), Msg::HistoryClicked);
        let (state, _) = update(state, Msg::HistoryLoaded(Vec::new()));
        let lines = render(&state.view(), std::iter::empty());
        assert_eq!(
            lines[1..].to_vec(),
            vec!["下载历史:".to_string(), "  暂无历史记录".to_string()]
        );
    }
}
