use tracing::{info, warn};

use crate::cursor::Direction;
use crate::listeners::{
    ListenerBundle, ListenerError, ListenerKind, ListenerRegistrar, PALETTE_LISTENERS,
};
use crate::session::{PaletteView, SearchSession, SessionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    Visible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelSignal {
    Escape,
    OutsideClick,
    HostHidden,
}

impl CancelSignal {
    pub fn listener(&self) -> ListenerKind {
        match self {
            Self::Escape => ListenerKind::GlobalKeydown,
            Self::OutsideClick => ListenerKind::PointerDown,
            Self::HostHidden => ListenerKind::HostVisibility,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShowOutcome {
    pub fetch: bool,
    pub refocused: bool,
}

pub struct VisibilityController<R: ListenerRegistrar> {
    visibility: Visibility,
    session: SearchSession,
    registrar: R,
    listeners: Option<ListenerBundle>,
    shown_once: bool,
}

impl<R: ListenerRegistrar> VisibilityController<R> {
    pub fn new(session: SearchSession, registrar: R) -> Self {
        Self {
            visibility: Visibility::Hidden,
            session,
            registrar,
            listeners: None,
            shown_once: false,
        }
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }

    pub fn show(&mut self) -> Result<ShowOutcome, ListenerError> {
        if self.is_visible() {
            self.session.reset();
            return Ok(ShowOutcome {
                fetch: false,
                refocused: true,
            });
        }

        let bundle = ListenerBundle::acquire(&mut self.registrar, &PALETTE_LISTENERS)?;
        self.listeners = Some(bundle);
        self.session.reset();
        self.visibility = Visibility::Visible;

        let fetch = !self.shown_once || !self.session.is_indexed();
        self.shown_once = true;
        info!("palette shown fetch={fetch}");
        Ok(ShowOutcome {
            fetch,
            refocused: false,
        })
    }

    pub fn hide(&mut self) -> bool {
        if !self.is_visible() {
            return false;
        }
        self.release_listeners();
        self.session.reset();
        self.visibility = Visibility::Hidden;
        info!("palette hidden");
        true
    }

    pub fn toggle(&mut self) -> Result<Visibility, ListenerError> {
        if self.is_visible() {
            self.hide();
        } else {
            self.show()?;
        }
        Ok(self.visibility)
    }

    pub fn cancel(&mut self, signal: CancelSignal) -> bool {
        if !self.is_listening(signal.listener()) {
            return false;
        }
        self.hide()
    }

    pub fn is_listening(&self, kind: ListenerKind) -> bool {
        self.listeners
            .as_ref()
            .is_some_and(|bundle| bundle.contains(kind))
    }

    pub fn input(&mut self, text: &str) -> bool {
        if !self.is_visible() {
            return false;
        }
        self.session.set_query(text);
        true
    }

    pub fn navigate(&mut self, direction: Direction) -> bool {
        if !self.is_visible() || self.session.results().is_empty() {
            return false;
        }
        self.session.navigate(direction);
        true
    }

    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SearchSession {
        &mut self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state(self.is_visible())
    }

    pub fn view(&self) -> PaletteView {
        self.session.view(self.is_visible())
    }

    pub fn registrar(&self) -> &R {
        &self.registrar
    }

    pub fn dispose(mut self) {
        self.hide();
        self.release_listeners();
    }

    fn release_listeners(&mut self) {
        if let Some(mut bundle) = self.listeners.take() {
            let failures = bundle.release(&mut self.registrar);
            if failures > 0 {
                warn!("released palette listeners with {failures} failure(s)");
            }
        }
    }
}

impl<R: ListenerRegistrar> Drop for VisibilityController<R> {
    fn drop(&mut self) {
        self.release_listeners();
    }
}

#[cfg(test)]
mod tests {
    use super::{CancelSignal, Visibility, VisibilityController};
    use crate::listeners::{ListenerKind, MockListenerRegistrar};
    use crate::model::Candidate;
    use crate::search::{EditDistanceScorer, MatchEngine, MatchOptions};
    use crate::session::SearchSession;

    fn controller() -> VisibilityController<MockListenerRegistrar> {
        let engine = MatchEngine::new(Box::new(EditDistanceScorer::default()), MatchOptions::default());
        VisibilityController::new(SearchSession::new(engine), MockListenerRegistrar::default())
    }

    #[test]
    fn starts_hidden_without_listeners() {
        let controller = controller();
        assert_eq!(controller.visibility(), Visibility::Hidden);
        assert!(controller.registrar().active().is_empty());
    }

    #[test]
    fn first_show_requests_fetch_and_acquires_listeners() {
        let mut controller = controller();
        let outcome = controller.show().unwrap();
        assert!(outcome.fetch);
        assert!(!outcome.refocused);
        assert_eq!(controller.registrar().active().len(), 3);
    }

    #[test]
    fn indexed_session_skips_refetch() {
        let mut controller = controller();
        controller.show().unwrap();
        controller
            .session_mut()
            .load(vec![Candidate::new("1", "GitHub", "https://github.com")])
            .unwrap();
        controller.hide();

        let outcome = controller.show().unwrap();
        assert!(!outcome.fetch);
    }

    #[test]
    fn unindexed_session_refetches_on_every_show() {
        let mut controller = controller();
        assert!(controller.show().unwrap().fetch);
        controller.hide();
        assert!(controller.show().unwrap().fetch);
    }

    #[test]
    fn show_while_visible_clears_query_only() {
        let mut controller = controller();
        controller.show().unwrap();
        controller.input("git");
        let outcome = controller.show().unwrap();
        assert!(outcome.refocused);
        assert!(!outcome.fetch);
        assert_eq!(controller.session().query(), "");
        assert_eq!(controller.registrar().active().len(), 3);
    }

    #[test]
    fn hide_releases_listeners() {
        let mut controller = controller();
        controller.show().unwrap();
        assert!(controller.hide());
        assert!(controller.registrar().active().is_empty());
        assert!(!controller.hide());
    }

    #[test]
    fn cancel_signals_hide_only_while_visible() {
        let mut controller = controller();
        assert!(!controller.cancel(CancelSignal::Escape));

        for signal in [
            CancelSignal::Escape,
            CancelSignal::OutsideClick,
            CancelSignal::HostHidden,
        ] {
            controller.show().unwrap();
            assert!(controller.cancel(signal));
            assert!(!controller.is_visible());
            assert!(!controller.is_listening(ListenerKind::GlobalKeydown));
        }
    }

    #[test]
    fn input_is_ignored_while_hidden() {
        let mut controller = controller();
        assert!(!controller.input("git"));
        assert_eq!(controller.session().query(), "");
    }

    #[test]
    fn failed_subscription_keeps_palette_hidden() {
        let engine = MatchEngine::new(Box::new(EditDistanceScorer::default()), MatchOptions::default());
        let mut controller = VisibilityController::new(
            SearchSession::new(engine),
            MockListenerRegistrar::failing_on(ListenerKind::PointerDown),
        );
        assert!(controller.show().is_err());
        assert!(!controller.is_visible());
        assert!(controller.registrar().active().is_empty());
    }

    #[test]
    fn dispose_releases_borrowed_registrar() {
        let mut registrar = MockListenerRegistrar::default();
        let engine = MatchEngine::new(Box::new(EditDistanceScorer::default()), MatchOptions::default());
        let mut controller = VisibilityController::new(SearchSession::new(engine), &mut registrar);
        controller.show().unwrap();
        assert_eq!(controller.registrar().active().len(), 3);

        controller.dispose();

        assert!(registrar.active().is_empty());
    }

    #[test]
    fn dropping_visible_controller_releases_listeners() {
        let mut registrar = MockListenerRegistrar::default();
        {
            let engine = MatchEngine::new(Box::new(EditDistanceScorer::default()), MatchOptions::default());
            let mut controller =
                VisibilityController::new(SearchSession::new(engine), &mut registrar);
            controller.show().unwrap();
        }
        assert!(registrar.active().is_empty());
    }

    #[test]
    fn toggle_alternates_visibility() {
        let mut controller = controller();
        assert_eq!(controller.toggle().unwrap(), Visibility::Visible);
        assert_eq!(controller.toggle().unwrap(), Visibility::Hidden);
    }
}
