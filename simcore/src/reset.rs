use std::sync::Mutex;

use once_cell::sync::Lazy;
use tracing::debug;

type ResetFn = Box<dyn Fn() + Send + Sync>;

static RESET_REGISTRY: Lazy<Mutex<Vec<(String, ResetFn)>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Register a named clear function. Registering the same name again
/// replaces the previous entry, so assembling several backends in one
/// process keeps the registry stable.
pub fn register_reset<F>(name: &str, reset: F)
where
    F: Fn() + Send + Sync + 'static,
{
    let mut registry = RESET_REGISTRY.lock().unwrap();
    registry.retain(|(existing, _)| existing != name);
    registry.push((name.to_string(), Box::new(reset)));
}

/// Run every registered clear function so tests start from a blank slate.
/// Safe to call with nothing registered.
pub fn reset_all() {
    let registry = RESET_REGISTRY.lock().unwrap();
    for (name, reset) in registry.iter() {
        debug!(store = %name, "resetting mock store");
        reset();
    }
}

/// Names of the registered clear functions, in registration order.
pub fn registered() -> Vec<String> {
    RESET_REGISTRY
        .lock()
        .unwrap()
        .iter()
        .map(|(name, _)| name.clone())
        .collect()
}
