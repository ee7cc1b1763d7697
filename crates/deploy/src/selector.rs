//! Choosing one method when several are available.

use mikroclaw_protocol::Endpoint;

/// Picks a method from a non-empty, priority-ordered list.
pub trait MethodSelector: Send + Sync {
    /// Returns a 1-based choice. Anything outside `1..=methods.len()`
    /// falls back to the first method.
    fn select(&self, methods: &[Endpoint]) -> usize;
}

/// Always takes the highest-priority method.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstAvailable;

impl MethodSelector for FirstAvailable {
    fn select(&self, _methods: &[Endpoint]) -> usize {
        1
    }
}

/// Resolves `selector`'s choice against `methods`.
///
/// Returns `None` only when `methods` is empty. A single method is
/// returned without consulting the selector.
pub fn choose(selector: &dyn MethodSelector, methods: &[Endpoint]) -> Option<Endpoint> {
    match methods {
        [] => None,
        [only] => Some(*only),
        _ => {
            let choice = selector.select(methods);
            let index = if (1..=methods.len()).contains(&choice) {
                choice - 1
            } else {
                0
            };
            Some(methods[index])
        }
    }
}
