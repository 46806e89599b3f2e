use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Counts the grid's active global pointer captures.
///
/// A drag-resize has to keep tracking the pointer after it leaves the header
/// cell, which means grabbing input at the host level for the duration of the
/// drag. The registry makes that grab an observable resource: tests assert the
/// count returns to its baseline after every drag, which is how a leaked
/// capture would show up.
#[derive(Debug, Clone, Default)]
pub struct CaptureRegistry {
    active: Arc<AtomicUsize>,
}

impl CaptureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Acquire a scoped capture. Released when the returned grab drops.
    pub fn grab(&self) -> PointerGrab {
        self.active.fetch_add(1, Ordering::SeqCst);
        trace!("pointer capture acquired ({} active)", self.active_count());
        PointerGrab {
            active: Arc::clone(&self.active),
        }
    }
}

/// A held global pointer capture. Dropping it (on mouse-up, on starting a
/// replacement drag, or on grid teardown) releases the capture
/// unconditionally.
#[derive(Debug)]
pub struct PointerGrab {
    active: Arc<AtomicUsize>,
}

impl Drop for PointerGrab {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
        trace!("pointer capture released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grab_and_drop_return_to_baseline() {
        let registry = CaptureRegistry::new();
        assert_eq!(registry.active_count(), 0);

        let grab = registry.grab();
        assert_eq!(registry.active_count(), 1);

        drop(grab);
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn nested_grabs_release_independently() {
        let registry = CaptureRegistry::new();
        let a = registry.grab();
        let b = registry.grab();
        assert_eq!(registry.active_count(), 2);
        drop(a);
        assert_eq!(registry.active_count(), 1);
        drop(b);
        assert_eq!(registry.active_count(), 0);
    }
}
