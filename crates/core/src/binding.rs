//! Value storage for leaf properties
//!
//! ## Table of Contents
//! 1. Shared - Live build targets
//! 2. Place - Read/write access to a value the tree does not own
//! 3. Projection - Place of a field nested inside another place
//! 4. Binding - Owned value or accessor pair behind a leaf

use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, Weak};

// ============================================================================
// 1. Shared
// ============================================================================

/// A live object shared between its owner and the property trees built over it
pub type Shared<T> = Arc<RwLock<T>>;

/// Wrap a value so it can be introspected and edited through a tree
pub fn shared<T>(value: T) -> Shared<T> {
    Arc::new(RwLock::new(value))
}

// ============================================================================
// 2. Place
// ============================================================================

/// Somewhere a `T` may live.
///
/// Both methods return `false` without calling `f` when the value is absent
/// (dropped target, `None` optional field).
pub trait Place<T: ?Sized>: Send + Sync {
    fn with_ref(&self, f: &mut dyn FnMut(&T)) -> bool;
    fn with_mut(&self, f: &mut dyn FnMut(&mut T)) -> bool;
}

impl<T: Send + Sync> Place<T> for RwLock<T> {
    fn with_ref(&self, f: &mut dyn FnMut(&T)) -> bool {
        f(&*self.read());
        true
    }

    fn with_mut(&self, f: &mut dyn FnMut(&mut T)) -> bool {
        f(&mut *self.write());
        true
    }
}

impl<T: Send + Sync> Place<T> for Weak<RwLock<T>> {
    fn with_ref(&self, f: &mut dyn FnMut(&T)) -> bool {
        match self.upgrade() {
            Some(target) => target.with_ref(f),
            None => false,
        }
    }

    fn with_mut(&self, f: &mut dyn FnMut(&mut T)) -> bool {
        match self.upgrade() {
            Some(target) => target.with_mut(f),
            None => false,
        }
    }
}

/// Closure-friendly helpers over any [`Place`]
pub trait PlaceExt<T: ?Sized> {
    /// Read through the place, `None` when the value is absent
    fn inspect<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R>;

    /// Mutate through the place, `None` when the value is absent
    fn modify<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R>;

    /// Whether the value is currently present
    fn is_present(&self) -> bool {
        self.inspect(|_| ()).is_some()
    }
}

impl<T: ?Sized, P: Place<T> + ?Sized> PlaceExt<T> for P {
    fn inspect<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let mut f = Some(f);
        let mut out = None;
        self.with_ref(&mut |value: &T| {
            if let Some(f) = f.take() {
                out = Some(f(value));
            }
        });
        out
    }

    fn modify<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut f = Some(f);
        let mut out = None;
        self.with_mut(&mut |value: &mut T| {
            if let Some(f) = f.take() {
                out = Some(f(value));
            }
        });
        out
    }
}

// ============================================================================
// 3. Projection
// ============================================================================

type ProjectRef<P, C> = Arc<dyn Fn(&P) -> Option<&C> + Send + Sync>;
type ProjectMut<P, C> = Arc<dyn Fn(&mut P) -> Option<&mut C> + Send + Sync>;

/// The place of a child value reached from a parent place
pub struct Projection<P: ?Sized, C: ?Sized> {
    parent: Arc<dyn Place<P>>,
    get: ProjectRef<P, C>,
    get_mut: ProjectMut<P, C>,
}

impl<P: ?Sized, C: ?Sized> Projection<P, C> {
    pub fn new(parent: Arc<dyn Place<P>>, get: ProjectRef<P, C>, get_mut: ProjectMut<P, C>) -> Self {
        Self { parent, get, get_mut }
    }
}

impl<P: ?Sized + 'static, C: ?Sized + 'static> Place<C> for Projection<P, C> {
    fn with_ref(&self, f: &mut dyn FnMut(&C)) -> bool {
        let mut found = false;
        self.parent.with_ref(&mut |parent: &P| {
            if let Some(child) = (self.get)(parent) {
                f(child);
                found = true;
            }
        });
        found
    }

    fn with_mut(&self, f: &mut dyn FnMut(&mut C)) -> bool {
        let mut found = false;
        self.parent.with_mut(&mut |parent: &mut P| {
            if let Some(child) = (self.get_mut)(parent) {
                f(child);
                found = true;
            }
        });
        found
    }
}

// ============================================================================
// 4. Binding
// ============================================================================

/// Boxed getter of a bound leaf
pub type Getter<T> = Box<dyn Fn() -> T + Send + Sync>;
/// Boxed setter of a bound leaf
pub type Setter<T> = Box<dyn Fn(T) + Send + Sync>;

enum BindingInner<T> {
    Owned(T),
    Bound { get: Getter<T>, set: Setter<T> },
}

/// Storage behind a value leaf: either the leaf owns the value, or it is an
/// adapter over accessor closures bound to external storage.
pub struct Binding<T> {
    inner: BindingInner<T>,
}

impl<T: Clone> Binding<T> {
    /// Leaf owns `value` directly
    pub fn owned(value: T) -> Self {
        Self {
            inner: BindingInner::Owned(value),
        }
    }

    /// Leaf reads and writes through accessor closures
    pub fn bound(
        get: impl Fn() -> T + Send + Sync + 'static,
        set: impl Fn(T) + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner: BindingInner::Bound {
                get: Box::new(get),
                set: Box::new(set),
            },
        }
    }

    pub fn get(&self) -> T {
        match &self.inner {
            BindingInner::Owned(value) => value.clone(),
            BindingInner::Bound { get, .. } => get(),
        }
    }

    pub fn set(&mut self, value: T) {
        match &mut self.inner {
            BindingInner::Owned(slot) => *slot = value,
            BindingInner::Bound { set, .. } => set(value),
        }
    }

    /// True when the leaf owns its value instead of adapting external storage
    pub fn is_owned(&self) -> bool {
        matches!(self.inner, BindingInner::Owned(_))
    }
}

impl<T: Clone + Default> Default for Binding<T> {
    fn default() -> Self {
        Self::owned(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            BindingInner::Owned(value) => f.debug_tuple("Owned").field(value).finish(),
            BindingInner::Bound { .. } => f.write_str("Bound"),
        }
    }
}
