use std::{
    sync::{
        Arc, OnceLock,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Instant,
};

use crate::{
    assets::{source::ImageSource, store::AssetStore},
    foundation::error::LoadError,
    layout::slots::Layout,
};

/// Observable phase of an [`AssetLoader`]. Moves forward only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoaderState {
    /// Nobody has asked for the assets yet.
    Unloaded,
    /// The single population is running; other callers are blocked on it.
    Loading,
    /// The store is populated and read-only.
    Loaded,
    /// Population failed; every caller gets the same error.
    Failed,
}

/// Lazily populates one [`AssetStore`] from an [`ImageSource`], exactly once.
///
/// The first [`ensure_loaded`](AssetLoader::ensure_loaded) call performs the population while
/// every concurrent caller blocks on the same gate. Afterwards the call is a lock-free read. A
/// failed population is final: it is not retried, and its error is handed to every caller.
pub struct AssetLoader {
    source: Arc<dyn ImageSource>,
    layout: Arc<Layout>,
    store: OnceLock<Result<AssetStore, LoadError>>,
    started: AtomicBool,
    populations: AtomicUsize,
}

impl AssetLoader {
    /// Loader that will populate from `source` following `layout`.
    pub fn new(source: Arc<dyn ImageSource>, layout: Arc<Layout>) -> Self {
        Self {
            source,
            layout,
            store: OnceLock::new(),
            started: AtomicBool::new(false),
            populations: AtomicUsize::new(0),
        }
    }

    /// Return the populated store, populating it first if nobody has yet.
    pub fn ensure_loaded(&self) -> Result<&AssetStore, LoadError> {
        match self.store.get_or_init(|| self.populate()) {
            Ok(store) => Ok(store),
            Err(err) => Err(err.clone()),
        }
    }

    /// Layout the store is (or will be) populated from.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Current lifecycle phase.
    pub fn state(&self) -> LoaderState {
        match self.store.get() {
            Some(Ok(_)) => LoaderState::Loaded,
            Some(Err(_)) => LoaderState::Failed,
            None if self.started.load(Ordering::Acquire) => LoaderState::Loading,
            None => LoaderState::Unloaded,
        }
    }

    /// How many times population has run. Never exceeds one.
    pub fn populations(&self) -> usize {
        self.populations.load(Ordering::Acquire)
    }

    fn populate(&self) -> Result<AssetStore, LoadError> {
        self.started.store(true, Ordering::Release);
        self.populations.fetch_add(1, Ordering::AcqRel);

        let t0 = Instant::now();
        let result = AssetStore::prepare(self.source.as_ref(), &self.layout);
        let elapsed_ms = t0.elapsed().as_millis() as u64;
        match &result {
            Ok(store) => {
                let variants: usize = store.variant_counts().iter().map(|(_, n)| n).sum();
                tracing::info!(
                    elapsed_ms,
                    slots = self.layout.slots().len(),
                    variants,
                    "assets loaded"
                );
            }
            Err(err) => tracing::error!(elapsed_ms, error = %err, "asset load failed"),
        }
        result
    }
}

impl std::fmt::Debug for AssetLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetLoader")
            .field("state", &self.state())
            .field("positions", &self.layout.position_count())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
