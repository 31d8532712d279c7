//! Single-owner cell holding the page runtime.
//!
//! Browser callbacks can arrive while the runtime is already borrowed, so
//! every access is a `try_borrow`. A busy slot is reported, never forced:
//! taking from it leaves the value in place for a later attempt.

use std::cell::{RefCell, RefMut};

/// Outcome of [`RuntimeSlot::take`].
#[derive(Debug, PartialEq, Eq)]
pub enum Take<T> {
    Taken(T),
    Empty,
    /// Someone holds the value right now; it stays in the slot.
    Busy,
}

#[derive(Debug)]
pub struct RuntimeSlot<T> {
    inner: RefCell<Option<T>>,
}

impl<T> Default for RuntimeSlot<T> {
    fn default() -> Self {
        Self {
            inner: RefCell::new(None),
        }
    }
}

impl<T> RuntimeSlot<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value`, returning the previous one. A busy slot hands `value`
    /// back as `Err`.
    pub fn install(&self, value: T) -> Result<Option<T>, T> {
        match self.inner.try_borrow_mut() {
            Ok(mut slot) => Ok(slot.replace(value)),
            Err(_) => Err(value),
        }
    }

    /// Exclusive access, or `None` when empty or already borrowed.
    pub fn lock(&self) -> Option<RefMut<'_, T>> {
        let slot = self.inner.try_borrow_mut().ok()?;
        RefMut::filter_map(slot, Option::as_mut).ok()
    }

    pub fn take(&self) -> Take<T> {
        match self.inner.try_borrow_mut() {
            Ok(mut slot) => slot.take().map_or(Take::Empty, Take::Taken),
            Err(_) => Take::Busy,
        }
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.inner.try_borrow_mut().is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn take_while_locked_keeps_the_value() {
        let slot = RuntimeSlot::new();
        assert_eq!(slot.install("runtime"), Ok(None));

        {
            let guard = slot.lock();
            assert!(guard.is_some());
            assert!(slot.is_busy());
            assert_eq!(slot.take(), Take::Busy);
            assert!(slot.lock().is_none());
        }

        assert_eq!(slot.take(), Take::Taken("runtime"));
        assert_eq!(slot.take(), Take::Empty);
    }

    #[test]
    fn install_replaces_and_refuses_while_locked() {
        let slot = RuntimeSlot::new();
        assert_eq!(slot.install(1), Ok(None));
        assert_eq!(slot.install(2), Ok(Some(1)));
        let guard = slot.lock();
        assert_eq!(slot.install(3), Err(3));
        drop(guard);
        assert_eq!(slot.lock().map(|v| *v), Some(2));
    }

    #[test]
    fn empty_slot_has_no_lock() {
        let slot: RuntimeSlot<u8> = RuntimeSlot::new();
        assert!(slot.lock().is_none());
        assert!(!slot.is_busy());
    }
}
