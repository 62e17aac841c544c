use std::any::Any;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Views derived from a [`Model`](super::structure::Model) on first need.
///
/// This crate never computes them; evaluators that need e.g. a spatial index supply the
/// initializer and every later caller receives the same memoized value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DerivedViewKind {
    SpatialLookup,
    ConnectedComponents,
    Bonds,
    Rings,
}

impl DerivedViewKind {
    pub const ALL: [Self; 4] = [
        Self::SpatialLookup,
        Self::ConnectedComponents,
        Self::Bonds,
        Self::Rings,
    ];

    fn slot(self) -> usize {
        match self {
            Self::SpatialLookup => 0,
            Self::ConnectedComponents => 1,
            Self::Bonds => 2,
            Self::Rings => 3,
        }
    }
}

type View = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
pub struct DerivedViews {
    slots: [OnceLock<View>; 4],
}

impl DerivedViews {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self, kind: DerivedViewKind) -> bool {
        self.slots[kind.slot()].get().is_some()
    }

    /// Returns the view if it has been computed and has type `T`.
    pub fn get<T: Any + Send + Sync>(&self, kind: DerivedViewKind) -> Option<Arc<T>> {
        self.slots[kind.slot()]
            .get()
            .and_then(|view| Arc::clone(view).downcast::<T>().ok())
    }

    /// Returns the memoized view, computing it with `init` on first use.
    ///
    /// Returns `None` when the view was already initialized with a different type.
    pub fn get_or_init<T, F>(&self, kind: DerivedViewKind, init: F) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        let view = self.slots[kind.slot()].get_or_init(|| Arc::new(init()) as View);
        Arc::clone(view).downcast::<T>().ok()
    }
}

impl fmt::Debug for DerivedViews {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for kind in DerivedViewKind::ALL {
            if self.is_initialized(kind) {
                list.entry(&kind);
            }
        }
        list.finish()
    }
}
