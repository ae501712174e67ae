use std::fmt::{Display, Formatter};

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    GlobalKeydown,
    PointerDown,
    HostVisibility,
}

pub const PALETTE_LISTENERS: [ListenerKind; 3] = [
    ListenerKind::GlobalKeydown,
    ListenerKind::PointerDown,
    ListenerKind::HostVisibility,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle {
    pub id: u64,
    pub kind: ListenerKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerError {
    SubscribeFailed(String),
    UnsubscribeFailed(String),
}

impl Display for ListenerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SubscribeFailed(reason) => write!(f, "subscribe failed: {reason}"),
            Self::UnsubscribeFailed(reason) => write!(f, "unsubscribe failed: {reason}"),
        }
    }
}

impl std::error::Error for ListenerError {}

pub trait ListenerRegistrar {
    fn subscribe(&mut self, kind: ListenerKind) -> Result<ListenerHandle, ListenerError>;
    fn unsubscribe(&mut self, handle: ListenerHandle) -> Result<(), ListenerError>;
}

impl<R: ListenerRegistrar + ?Sized> ListenerRegistrar for &mut R {
    fn subscribe(&mut self, kind: ListenerKind) -> Result<ListenerHandle, ListenerError> {
        (**self).subscribe(kind)
    }

    fn unsubscribe(&mut self, handle: ListenerHandle) -> Result<(), ListenerError> {
        (**self).unsubscribe(handle)
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListenerBundle {
    handles: Vec<ListenerHandle>,
}

impl ListenerBundle {
    /// Subscribes every kind or none of them.
    pub fn acquire<R: ListenerRegistrar + ?Sized>(
        registrar: &mut R,
        kinds: &[ListenerKind],
    ) -> Result<Self, ListenerError> {
        let mut bundle = Self::default();
        for kind in kinds {
            match registrar.subscribe(*kind) {
                Ok(handle) => bundle.handles.push(handle),
                Err(error) => {
                    bundle.release(registrar);
                    return Err(error);
                }
            }
        }
        Ok(bundle)
    }

    pub fn release<R: ListenerRegistrar + ?Sized>(&mut self, registrar: &mut R) -> usize {
        let mut failures = 0;
        for handle in self.handles.drain(..) {
            if let Err(error) = registrar.unsubscribe(handle) {
                warn!("listener release failed kind={:?}: {error}", handle.kind);
                failures += 1;
            }
        }
        failures
    }

    pub fn contains(&self, kind: ListenerKind) -> bool {
        self.handles.iter().any(|handle| handle.kind == kind)
    }

    pub fn handles(&self) -> &[ListenerHandle] {
        &self.handles
    }
}

#[derive(Debug, Default)]
pub struct MockListenerRegistrar {
    next_id: u64,
    active: Vec<ListenerHandle>,
    fail_on: Option<ListenerKind>,
}

impl MockListenerRegistrar {
    pub fn failing_on(kind: ListenerKind) -> Self {
        Self {
            fail_on: Some(kind),
            ..Self::default()
        }
    }

    pub fn active(&self) -> &[ListenerHandle] {
        &self.active
    }
}

impl ListenerRegistrar for MockListenerRegistrar {
    fn subscribe(&mut self, kind: ListenerKind) -> Result<ListenerHandle, ListenerError> {
        if self.fail_on == Some(kind) {
            return Err(ListenerError::SubscribeFailed(format!("{kind:?}")));
        }
        self.next_id += 1;
        let handle = ListenerHandle {
            id: self.next_id,
            kind,
        };
        self.active.push(handle);
        Ok(handle)
    }

    fn unsubscribe(&mut self, handle: ListenerHandle) -> Result<(), ListenerError> {
        let before = self.active.len();
        self.active.retain(|active| *active != handle);
        if self.active.len() == before {
            return Err(ListenerError::UnsubscribeFailed(format!(
                "unknown handle {}",
                handle.id
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct NoopListenerRegistrar {
    next_id: u64,
}

impl ListenerRegistrar for NoopListenerRegistrar {
    fn subscribe(&mut self, kind: ListenerKind) -> Result<ListenerHandle, ListenerError> {
        self.next_id += 1;
        Ok(ListenerHandle {
            id: self.next_id,
            kind,
        })
    }

    fn unsubscribe(&mut self, _handle: ListenerHandle) -> Result<(), ListenerError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ListenerBundle, ListenerKind, MockListenerRegistrar, PALETTE_LISTENERS};

    #[test]
    fn bundle_acquires_and_releases_every_kind() {
        let mut registrar = MockListenerRegistrar::default();
        let mut bundle = ListenerBundle::acquire(&mut registrar, &PALETTE_LISTENERS).unwrap();
        assert_eq!(registrar.active().len(), 3);
        assert!(bundle.contains(ListenerKind::PointerDown));

        assert_eq!(bundle.release(&mut registrar), 0);
        assert!(registrar.active().is_empty());
        assert!(bundle.handles().is_empty());
    }

    #[test]
    fn partial_acquire_rolls_back() {
        let mut registrar = MockListenerRegistrar::failing_on(ListenerKind::HostVisibility);
        let result = ListenerBundle::acquire(&mut registrar, &PALETTE_LISTENERS);
        assert!(result.is_err());
        assert!(registrar.active().is_empty());
    }
}
