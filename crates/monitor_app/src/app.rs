use std::io::{self, BufRead, Write};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use monitor_client::{ClientHandle, ReqwestBackend};
use monitor_core::{update, AppState, Msg, SessionPhase};
use monitor_logging::{monitor_debug, monitor_info};

use crate::cli::CliCommand;
use crate::config::MonitorConfig;
use crate::effects::EffectRunner;
use crate::ui::input::{self, ConsoleCommand};
use crate::ui::notice::NoticeBoard;
use crate::ui::render;

const TICK: Duration = Duration::from_millis(200);

pub enum AppEvent {
    Msg(Msg),
    Console(ConsoleCommand),
    InputClosed,
}

/// Runs one command to completion, or the interactive console when `command`
/// is `None`.
pub fn run(config: &MonitorConfig, command: Option<CliCommand>) -> Result<()> {
    let backend = ReqwestBackend::new(&config.client_settings())
        .with_context(|| format!("invalid server url {}", config.server_url))?;
    let client = ClientHandle::spawn(Arc::new(backend)).context("failed to start client thread")?;

    let (event_tx, event_rx) = mpsc::channel();
    let runner = EffectRunner::new(client, event_tx.clone());
    let mut session = Session::new(config, runner);

    let one_shot = command.is_some();
    match command {
        Some(CliCommand::Start { url, file_types }) => {
            session.dispatch_all(input::job_msgs(url, file_types, &config.default_file_types, true));
        }
        Some(CliCommand::Preview { url, file_types }) => {
            session.dispatch_all(input::job_msgs(url, file_types, &config.default_file_types, false));
        }
        Some(CliCommand::History) => session.dispatch(Msg::HistoryClicked),
        None => {
            println!("{}", input::HELP);
            spawn_stdin_reader(event_tx);
            session.redraw();
        }
    }
    monitor_info!("Monitor started against {}", config.server_url);

    loop {
        if one_shot && session.settled() {
            return session.outcome();
        }
        match event_rx.recv_timeout(TICK) {
            Ok(AppEvent::Msg(msg)) => session.dispatch(msg),
            Ok(AppEvent::Console(ConsoleCommand::Quit)) | Ok(AppEvent::InputClosed) => {
                session.shutdown(&event_rx);
                return Ok(());
            }
            Ok(AppEvent::Console(command)) => session.console(command),
            Err(mpsc::RecvTimeoutError::Timeout) => session.tick(),
            Err(mpsc::RecvTimeoutError::Disconnected) => return Ok(()),
        }
    }
}

fn spawn_stdin_reader(event_tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if event_tx
                .send(AppEvent::Console(input::parse_line(&line)))
                .is_err()
            {
                return;
            }
        }
        let _ = event_tx.send(AppEvent::InputClosed);
    });
}

struct Session<'a> {
    config: &'a MonitorConfig,
    state: AppState,
    runner: EffectRunner,
    notices: NoticeBoard,
    started: bool,
}

impl<'a> Session<'a> {
    fn new(config: &'a MonitorConfig, runner: EffectRunner) -> Self {
        Self {
            config,
            state: AppState::with_reconnect_policy(config.reconnect_policy()),
            runner,
            notices: NoticeBoard::new(config.notice_duration()),
            started: false,
        }
    }

    fn dispatch_all(&mut self, msgs: Vec<Msg>) {
        for msg in msgs {
            self.dispatch(msg);
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        if matches!(msg, Msg::StartClicked | Msg::PreviewClicked | Msg::HistoryClicked) {
            self.started = true;
        }
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;

        let now = Instant::now();
        let notices = self.runner.enqueue(effects);
        let noticed = !notices.is_empty();
        for notice in notices {
            self.notices.push(notice, now);
        }
        if self.state.consume_dirty() || noticed {
            self.redraw();
        }
    }

    fn console(&mut self, command: ConsoleCommand) {
        match command {
            ConsoleCommand::Start { url, file_types } => self.dispatch_all(input::job_msgs(
                url,
                file_types,
                &self.config.default_file_types,
                true,
            )),
            ConsoleCommand::Preview { url, file_types } => self.dispatch_all(input::job_msgs(
                url,
                file_types,
                &self.config.default_file_types,
                false,
            )),
            ConsoleCommand::Cancel => self.dispatch(Msg::CancelClicked),
            ConsoleCommand::History => self.dispatch(Msg::HistoryClicked),
            ConsoleCommand::Status => self.redraw(),
            ConsoleCommand::Help => println!("{}", input::HELP),
            ConsoleCommand::Unknown(verb) => println!("unknown command: {verb}\n{}", input::HELP),
            ConsoleCommand::Empty | ConsoleCommand::Quit => {}
        }
    }

    fn tick(&mut self) {
        if self.notices.expire(Instant::now()) {
            monitor_debug!("Notices expired");
        }
    }

    /// A one-shot command is done once something was requested and nothing
    /// is outstanding any more.
    fn settled(&self) -> bool {
        self.started && !self.state.view().busy
    }

    /// Fails when the command ended on a warning or error notice.
    fn outcome(&self) -> Result<()> {
        match self.notices.failure() {
            Some(notice) => bail!("{}", notice.text),
            None => Ok(()),
        }
    }

    /// Cancels a running job before leaving and waits a bounded time for the
    /// backend to confirm.
    fn shutdown(&mut self, event_rx: &mpsc::Receiver<AppEvent>) {
        if self.state.phase().is_in_flight() {
            self.dispatch(Msg::CancelClicked);
            let deadline = Instant::now() + self.config.client_settings().request_timeout;
            while self.state.phase() == SessionPhase::Cancelling {
                let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
                    break;
                };
                match event_rx.recv_timeout(remaining) {
                    Ok(AppEvent::Msg(msg)) => self.dispatch(msg),
                    Ok(_) => {}
                    Err(_) => break,
                }
            }
        }
        monitor_info!("Monitor stopped in phase {:?}", self.state.phase());
    }

    fn redraw(&self) {
        let view = self.state.view();
        let lines = render::render(&view, self.notices.active());
        let mut out = io::stdout().lock();
        for line in lines {
            let _ = writeln!(out, "{line}");
        }
        let _ = out.flush();
    }
}
