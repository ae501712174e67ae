use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::action_executor::ActionDispatcher;
use crate::config::{self, ConfigError};
use crate::contract::{BookmarksResponse, FetchOutcome, HostEvent, OutboundRequest};
use crate::core_service::{PaletteHost, PaletteService, ServiceError};
use crate::keymap::KeyDisposition;
use crate::listeners::NoopListenerRegistrar;
use crate::session::PaletteView;
use crate::transport::{encode_outbound, handle_json};

#[derive(Debug)]
pub enum RuntimeError {
    Config(ConfigError),
    Service(ServiceError),
    Io(std::io::Error),
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(error) => write!(f, "config error: {error}"),
            Self::Service(error) => write!(f, "service error: {error}"),
            Self::Io(error) => write!(f, "io error: {error}"),
        }
    }
}

impl std::error::Error for RuntimeError {}

impl From<ConfigError> for RuntimeError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<ServiceError> for RuntimeError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<std::io::Error> for RuntimeError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeOptions {
    pub config_path: Option<PathBuf>,
    pub bookmarks_path: PathBuf,
    pub fetch_delay: Duration,
}

pub fn parse_cli_args(args: &[String]) -> Result<RuntimeOptions, String> {
    let mut config_path = None;
    let mut bookmarks_path = None;
    let mut fetch_delay = Duration::ZERO;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let value = iter.next().ok_or("--config requires a path")?;
                config_path = Some(PathBuf::from(value));
            }
            "--bookmarks" => {
                let value = iter.next().ok_or("--bookmarks requires a path")?;
                bookmarks_path = Some(PathBuf::from(value));
            }
            "--fetch-delay-ms" => {
                let value = iter.next().ok_or("--fetch-delay-ms requires a value")?;
                let millis = value
                    .parse::<u64>()
                    .map_err(|_| format!("invalid --fetch-delay-ms value '{value}'"))?;
                fetch_delay = Duration::from_millis(millis);
            }
            other => return Err(format!("unknown argument '{other}'")),
        }
    }

    Ok(RuntimeOptions {
        config_path,
        bookmarks_path: bookmarks_path.ok_or("--bookmarks <path> is required")?,
        fetch_delay,
    })
}

enum RuntimeEvent {
    Line(String),
    Fetched(FetchOutcome),
    InputClosed,
}

#[derive(Serialize)]
struct RenderFrame<'a> {
    render: &'a PaletteView,
}

#[derive(Serialize)]
struct KeyFrame {
    key: KeyDisposition,
}

struct StdioHost {
    bookmarks_path: PathBuf,
    fetch_delay: Duration,
    events: Sender<RuntimeEvent>,
}

impl ActionDispatcher for StdioHost {
    fn open_bookmark(&mut self, url: &str) {
        emit_line(&encode_outbound(&OutboundRequest::OpenBookmark {
            url: url.to_string(),
        }));
    }
}

impl PaletteHost for StdioHost {
    fn request_bookmarks(&mut self) {
        emit_line(&encode_outbound(&OutboundRequest::GetBookmarks));
        let path = self.bookmarks_path.clone();
        let delay = self.fetch_delay;
        let events = self.events.clone();
        std::thread::spawn(move || {
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }
            let _ = events.send(RuntimeEvent::Fetched(read_bookmarks_file(&path)));
        });
    }

    fn render(&mut self, view: &PaletteView) {
        if let Ok(encoded) = serde_json::to_string(&RenderFrame { render: view }) {
            emit_line(&encoded);
        }
    }
}

pub fn read_bookmarks_file(path: &Path) -> FetchOutcome {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) => {
            return FetchOutcome::Failed(format!("read failed for '{}': {error}", path.display()))
        }
    };

    match json5::from_str::<BookmarksResponse>(&raw) {
        Ok(response) => FetchOutcome::from(response),
        Err(error) => FetchOutcome::Failed(format!("invalid bookmarks in '{}': {error}", path.display())),
    }
}

pub fn run_with_options(options: RuntimeOptions) -> Result<(), RuntimeError> {
    let config = config::load(options.config_path.as_deref())?;
    crate::logging::init(&config.log_dir)?;
    info!(
        "startup provider={} threshold={} config_path={} bookmarks_path={}",
        config.provider,
        config.threshold,
        config.config_path.display(),
        options.bookmarks_path.display(),
    );

    let (events_tx, events_rx) = mpsc::channel();
    let host = StdioHost {
        bookmarks_path: options.bookmarks_path,
        fetch_delay: options.fetch_delay,
        events: events_tx.clone(),
    };
    let mut service = PaletteService::from_config(&config, NoopListenerRegistrar::default(), host)?;

    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if events_tx.send(RuntimeEvent::Line(line)).is_err() {
                return;
            }
        }
        let _ = events_tx.send(RuntimeEvent::InputClosed);
    });

    while let Ok(event) = events_rx.recv() {
        match event {
            RuntimeEvent::Line(line) => handle_line(&mut service, &line),
            RuntimeEvent::Fetched(outcome) => {
                if let Err(error) = service.handle_fetch(outcome) {
                    warn!("fetch completion rejected: {error}");
                }
            }
            RuntimeEvent::InputClosed => break,
        }
    }

    service.dispose();
    info!("shutdown");
    Ok(())
}

fn handle_line(service: &mut PaletteService<StdioHost, NoopListenerRegistrar>, line: &str) {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return;
    }

    match serde_json::from_str::<HostEvent>(trimmed) {
        Ok(event) => {
            let is_key = matches!(event, HostEvent::Key { .. });
            let disposition = service.handle_event(event);
            if is_key {
                if let Ok(encoded) = serde_json::to_string(&KeyFrame { key: disposition }) {
                    emit_line(&encoded);
                }
            }
        }
        Err(_) => emit_line(&handle_json(service, trimmed)),
    }
}

fn emit_line(line: &str) {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let _ = writeln!(out, "{line}");
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::{parse_cli_args, read_bookmarks_file};
    use crate::contract::FetchOutcome;
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_required_and_optional_flags() {
        let options = parse_cli_args(&args(&[
            "--bookmarks",
            "marks.json",
            "--fetch-delay-ms",
            "25",
        ]))
        .unwrap();
        assert_eq!(options.bookmarks_path, PathBuf::from("marks.json"));
        assert_eq!(options.fetch_delay, Duration::from_millis(25));
        assert!(options.config_path.is_none());
    }

    #[test]
    fn rejects_missing_bookmarks_path() {
        assert!(parse_cli_args(&[]).is_err());
        assert!(parse_cli_args(&args(&["--bookmarks"])).is_err());
        assert!(parse_cli_args(&args(&["--verbose"])).is_err());
    }

    #[test]
    fn bookmarks_file_accepts_comments() {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be valid")
            .as_nanos();
        let path = std::env::temp_dir().join(format!("quickmark-bookmarks-{unique}.json5"));
        std::fs::write(
            &path,
            "{\n  // exported from the toolbar\n  bookmarks: [{ id: '1', title: 'GitHub', url: 'https://github.com' }],\n}\n",
        )
        .unwrap();

        let outcome = read_bookmarks_file(&path);
        std::fs::remove_file(&path).unwrap();

        match outcome {
            FetchOutcome::Loaded(bookmarks) => assert_eq!(bookmarks[0].title, "GitHub"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn missing_bookmarks_file_is_a_failed_fetch() {
        let outcome = read_bookmarks_file(&std::env::temp_dir().join("quickmark-no-such-file.json"));
        assert!(matches!(outcome, FetchOutcome::Failed(_)));
    }
}
