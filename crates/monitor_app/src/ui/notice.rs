use std::time::{Duration, Instant};

use monitor_core::{Notice, Severity};

/// Notices currently on screen, each dropped after a fixed duration.
#[derive(Debug)]
pub struct NoticeBoard {
    duration: Duration,
    shown: Vec<(Notice, Instant)>,
    last: Option<Notice>,
}

impl NoticeBoard {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            shown: Vec::new(),
            last: None,
        }
    }

    pub fn push(&mut self, notice: Notice, now: Instant) {
        self.last = Some(notice.clone());
        self.shown.push((notice, now + self.duration));
    }

    /// The most recent notice if it reported a problem. Survives expiry.
    pub fn failure(&self) -> Option<&Notice> {
        self.last
            .as_ref()
            .filter(|n| matches!(n.severity, Severity::Warning | Severity::Error))
    }

    /// Drops expired notices; returns whether any were dropped.
    pub fn expire(&mut self, now: Instant) -> bool {
        let before = self.shown.len();
        self.shown.retain(|(_, until)| *until > now);
        self.shown.len() != before
    }

    pub fn active(&self) -> impl Iterator<Item = &Notice> {
        self.shown.iter().map(|(notice, _)| notice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notices_expire_after_duration() {
        let start = Instant::now();
        let mut board = NoticeBoard::new(Duration::from_secs(3));
        board.push(Notice::info("one"), start);
        board.push(Notice::info("two"), start + Duration::from_secs(2));

        assert!(!board.expire(start + Duration::from_secs(1)));
        assert_eq!(board.active().count(), 2);

        assert!(board.expire(start + Duration::from_secs(3)));
        let texts: Vec<_> = board.active().map(|n| n.text.as_str()).collect();
        assert_eq!(texts, vec!["two"]);
    }

    #[test]
    fn failure_follows_the_latest_notice_and_outlives_expiry() {
        let start = Instant::now();
        let mut board = NoticeBoard::new(Duration::from_secs(1));
        assert!(board.failure().is_none());

        board.push(Notice::new(Severity::Warning, "reconnecting"), start);
        board.push(Notice::success("done"), start);
        assert!(board.failure().is_none());

        board.push(Notice::new(Severity::Error, "stream lost"), start);
        board.expire(start + Duration::from_secs(5));
        assert_eq!(board.active().count(), 0);
        assert_eq!(board.failure().map(|n| n.text.as_str()), Some("stream lost"));
    }
}
