//! Completion-callback contract shared by the animators.
//!
//! A listener receives a shared reference to the component that finished.
//! The component lends itself out by taking the callback out of its slot for
//! the duration of the call, so no interior mutability is involved.

use std::fmt;

/// Boxed completion callback for a component of type `T`.
pub type OnComplete<T> = Box<dyn FnMut(&T)>;

/// Optional completion callback slot.
pub struct CompletionListener<T> {
    callback: Option<OnComplete<T>>,
}

impl<T> CompletionListener<T> {
    /// An empty slot.
    #[must_use]
    pub const fn none() -> Self {
        Self { callback: None }
    }

    /// Register `callback`, replacing any previous one.
    pub fn set(&mut self, callback: impl FnMut(&T) + 'static) {
        self.callback = Some(Box::new(callback));
    }

    /// Remove the registered callback.
    pub fn clear(&mut self) {
        self.callback = None;
    }

    /// Whether a callback is registered.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        self.callback.is_some()
    }
}

impl<T> Default for CompletionListener<T> {
    fn default() -> Self {
        Self::none()
    }
}

impl<T> fmt::Debug for CompletionListener<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionListener")
            .field("set", &self.is_set())
            .finish()
    }
}

/// Invoke the callback held in `target`'s listener slot, passing `target`.
///
/// `slot` projects the listener out of the component. Returns whether a
/// callback ran.
pub fn notify<T>(target: &mut T, slot: fn(&mut T) -> &mut CompletionListener<T>) -> bool {
    let Some(mut callback) = slot(target).callback.take() else {
        return false;
    };
    callback(&*target);
    let listener = slot(target);
    if listener.callback.is_none() {
        listener.callback = Some(callback);
    }
    true
}
