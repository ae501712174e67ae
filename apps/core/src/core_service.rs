use tracing::{error, info, warn};

use crate::action_executor::{open_candidate, ActionDispatcher};
use crate::config::{validate, Config};
use crate::contract::{FetchOutcome, HostEvent, HostRequest, HostResponse};
use crate::keymap::{command_for, parse_key, KeyCommand, KeyDisposition};
use crate::listeners::{ListenerError, ListenerRegistrar};
use crate::overlay_state::{CancelSignal, ShowOutcome, Visibility, VisibilityController};
use crate::search::{MatchEngine, PaletteError};
use crate::session::{PaletteView, SearchSession, SessionState};

#[derive(Debug)]
pub enum ServiceError {
    Config(String),
    Palette(PaletteError),
    Listener(ListenerError),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(error) => write!(f, "config error: {error}"),
            Self::Palette(error) => write!(f, "palette error: {error}"),
            Self::Listener(error) => write!(f, "listener error: {error}"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<PaletteError> for ServiceError {
    fn from(value: PaletteError) -> Self {
        Self::Palette(value)
    }
}

impl From<ListenerError> for ServiceError {
    fn from(value: ListenerError) -> Self {
        Self::Listener(value)
    }
}

pub trait PaletteHost: ActionDispatcher {
    fn request_bookmarks(&mut self);
    fn render(&mut self, view: &PaletteView);
}

pub struct PaletteService<H: PaletteHost, R: ListenerRegistrar> {
    controller: VisibilityController<R>,
    host: H,
}

impl<H: PaletteHost, R: ListenerRegistrar> PaletteService<H, R> {
    pub fn new(engine: MatchEngine, registrar: R, host: H) -> Self {
        Self {
            controller: VisibilityController::new(SearchSession::new(engine), registrar),
            host,
        }
    }

    pub fn from_config(cfg: &Config, registrar: R, host: H) -> Result<Self, ServiceError> {
        validate(cfg).map_err(ServiceError::Config)?;
        let engine = MatchEngine::from_config(cfg)?;
        Ok(Self::new(engine, registrar, host))
    }

    pub fn handle_command(&mut self, request: HostRequest) -> Result<HostResponse, ListenerError> {
        match request {
            HostRequest::Ping => Ok(HostResponse::Pong),
            HostRequest::Toggle => self.toggle().map(HostResponse::from),
        }
    }

    pub fn show(&mut self) -> Result<ShowOutcome, ListenerError> {
        let outcome = match self.controller.show() {
            Ok(outcome) => outcome,
            Err(error) => {
                error!("palette show failed: {error}");
                return Err(error);
            }
        };
        if outcome.fetch {
            info!("requesting bookmarks");
            self.host.request_bookmarks();
        }
        self.render();
        Ok(outcome)
    }

    pub fn hide(&mut self) -> bool {
        let changed = self.controller.hide();
        if changed {
            self.render();
        }
        changed
    }

    pub fn toggle(&mut self) -> Result<Visibility, ListenerError> {
        if self.controller.is_visible() {
            self.hide();
        } else {
            self.show()?;
        }
        Ok(self.controller.visibility())
    }

    pub fn handle_input(&mut self, text: &str) {
        if self.controller.input(text) {
            self.render();
        }
    }

    pub fn handle_key(&mut self, key: &str) -> KeyDisposition {
        if !self.controller.is_visible() {
            return KeyDisposition::ignored();
        }

        match command_for(&parse_key(key)) {
            Some(KeyCommand::Cancel) => {
                if self.cancel(CancelSignal::Escape) {
                    KeyDisposition::swallowed()
                } else {
                    KeyDisposition::ignored()
                }
            }
            Some(KeyCommand::Navigate(direction)) => {
                if self.controller.navigate(direction) {
                    self.render();
                    KeyDisposition::consumed()
                } else {
                    KeyDisposition::ignored()
                }
            }
            Some(KeyCommand::Commit) => {
                if self.controller.session().results().is_empty() {
                    return KeyDisposition::ignored();
                }
                self.commit_selection();
                KeyDisposition::consumed()
            }
            None => KeyDisposition::ignored(),
        }
    }

    pub fn handle_pointer_down(&mut self, inside: bool) -> bool {
        !inside && self.cancel(CancelSignal::OutsideClick)
    }

    pub fn handle_host_visibility(&mut self, hidden: bool) -> bool {
        hidden && self.cancel(CancelSignal::HostHidden)
    }

    pub fn hover(&mut self, index: usize) -> bool {
        if !self.controller.is_visible() || !self.controller.session_mut().hover(index) {
            return false;
        }
        self.render();
        true
    }

    pub fn click(&mut self, index: usize) -> bool {
        if !self.controller.is_visible() || !self.controller.session_mut().hover(index) {
            return false;
        }
        self.commit_selection();
        true
    }

    pub fn handle_fetch(&mut self, outcome: FetchOutcome) -> Result<usize, PaletteError> {
        let result = match outcome {
            FetchOutcome::Loaded(candidates) => self.controller.session_mut().load(candidates),
            // Fetches only start while unindexed, so a failure arriving after a
            // load belongs to a superseded request.
            FetchOutcome::Failed(reason) if self.controller.session().is_indexed() => {
                warn!("ignoring stale fetch failure: {reason}");
                return Err(PaletteError::FetchFailed(reason));
            }
            FetchOutcome::Failed(reason) => Err(PaletteError::FetchFailed(reason)),
        };

        match &result {
            Ok(count) => {
                info!("bookmarks indexed count={count}");
                self.render();
            }
            Err(error) => {
                warn!("palette degraded: {error}");
                if !self.hide() {
                    self.render();
                }
            }
        }
        result
    }

    pub fn handle_event(&mut self, event: HostEvent) -> KeyDisposition {
        match event {
            HostEvent::Key { key } => return self.handle_key(&key),
            HostEvent::Input { text } => self.handle_input(&text),
            HostEvent::PointerDown { inside } => {
                self.handle_pointer_down(inside);
            }
            HostEvent::Visibility { hidden } => {
                self.handle_host_visibility(hidden);
            }
            HostEvent::Click { index } => {
                self.click(index);
            }
            HostEvent::Hover { index } => {
                self.hover(index);
            }
        }
        KeyDisposition::ignored()
    }

    pub fn controller(&self) -> &VisibilityController<R> {
        &self.controller
    }

    pub fn state(&self) -> SessionState {
        self.controller.state()
    }

    pub fn view(&self) -> PaletteView {
        self.controller.view()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn dispose(self) -> H {
        let Self { controller, host } = self;
        controller.dispose();
        host
    }

    fn cancel(&mut self, signal: CancelSignal) -> bool {
        let changed = self.controller.cancel(signal);
        if changed {
            info!("palette cancelled by {signal:?}");
            self.render();
        }
        changed
    }

    fn commit_selection(&mut self) {
        if let Some(candidate) = self.controller.session().commit().cloned() {
            if let Err(error) = open_candidate(&mut self.host, &candidate) {
                warn!("open bookmark id={} failed: {error}", candidate.id);
            }
        }
        self.hide();
    }

    fn render(&mut self) {
        let view = self.controller.view();
        self.host.render(&view);
    }
}
