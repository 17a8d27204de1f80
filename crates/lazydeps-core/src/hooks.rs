//! Synchronous load lifecycle hooks.

use crate::error::LoaderError;

/// Callbacks invoked on dependency status transitions.
///
/// Hooks run inline on the task driving the load and should return quickly.
/// They are not wrapped in `catch_unwind`: a panicking hook aborts the attempt.
pub trait LoadHooks: Send + Sync {
    /// A load attempt for `name` started.
    fn on_loading(&self, name: &str) {
        let _ = name;
    }

    /// `name` finished loading.
    fn on_loaded(&self, name: &str) {
        let _ = name;
    }

    /// The attempt for `name` failed; status is back to unloaded.
    fn on_error(&self, name: &str, error: &LoaderError) {
        let _ = (name, error);
    }
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl LoadHooks for NoopHooks {}

type NameCallback = Box<dyn Fn(&str) + Send + Sync>;
type ErrorCallback = Box<dyn Fn(&str, &LoaderError) + Send + Sync>;

/// Hooks assembled from closures.
///
/// ```rust
/// use lazydeps_core::CallbackHooks;
///
/// let hooks = CallbackHooks::new()
///     .on_loaded(|name| println!("{name} ready"))
///     .on_error(|name, err| eprintln!("{name}: {err}"));
/// # let _ = hooks;
/// ```
#[derive(Default)]
pub struct CallbackHooks {
    loading: Option<NameCallback>,
    loaded: Option<NameCallback>,
    error: Option<ErrorCallback>,
}

impl std::fmt::Debug for CallbackHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackHooks")
            .field("on_loading", &self.loading.is_some())
            .field("on_loaded", &self.loaded.is_some())
            .field("on_error", &self.error.is_some())
            .finish()
    }
}

impl CallbackHooks {
    /// Create hooks with no callbacks set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the `on_loading` callback.
    #[must_use]
    pub fn on_loading(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.loading = Some(Box::new(f));
        self
    }

    /// Set the `on_loaded` callback.
    #[must_use]
    pub fn on_loaded(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.loaded = Some(Box::new(f));
        self
    }

    /// Set the `on_error` callback.
    #[must_use]
    pub fn on_error(mut self, f: impl Fn(&str, &LoaderError) + Send + Sync + 'static) -> Self {
        self.error = Some(Box::new(f));
        self
    }
}

impl LoadHooks for CallbackHooks {
    fn on_loading(&self, name: &str) {
        if let Some(f) = &self.loading {
            f(name);
        }
    }

    fn on_loaded(&self, name: &str) {
        if let Some(f) = &self.loaded {
            f(name);
        }
    }

    fn on_error(&self, name: &str, error: &LoaderError) {
        if let Some(f) = &self.error {
            f(name, error);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn test_callback_hooks_dispatch() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (a, b, c) = (Arc::clone(&seen), Arc::clone(&seen), Arc::clone(&seen));

        let hooks = CallbackHooks::new()
            .on_loading(move |n| a.lock().unwrap().push(format!("loading {n}")))
            .on_loaded(move |n| b.lock().unwrap().push(format!("loaded {n}")))
            .on_error(move |n, e| c.lock().unwrap().push(format!("error {n}: {e}")));

        LoadHooks::on_loading(&hooks, "widget");
        LoadHooks::on_loaded(&hooks, "widget");
        LoadHooks::on_error(&hooks, "chart", &LoaderError::Aborted("chart".into()));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                "loading widget",
                "loaded widget",
                "error chart: load of 'chart' was aborted before it settled",
            ]
        );
    }

    #[test]
    fn test_unset_callbacks_are_noops() {
        let hooks = CallbackHooks::new();
        LoadHooks::on_loading(&hooks, "x");
        LoadHooks::on_error(&hooks, "x", &LoaderError::NotConfigured);
        NoopHooks.on_loaded("x");
    }
}
