//! Environment-variable overrides layered on top of caller-supplied
//! [`crate::spec::RunnerOptions`], in the same spirit as the teacher's own
//! `CRITERION_DEBUG`-style environment knobs -- plain parsing, no config-file format,
//! resolved once at construction time.

use crate::spec::RunnerOptions;
use std::env;

const ENV_MAX_TIME_MS: &str = "BENCHCORE_MAX_TIME_MS";
const ENV_MAX_ITERATIONS: &str = "BENCHCORE_MAX_ITERATIONS";
const ENV_NO_COLOR: &str = "BENCHCORE_NO_COLOR";
const ENV_ADAPTIVE: &str = "BENCHCORE_ADAPTIVE";
const ENV_TARGET_CONFIDENCE: &str = "BENCHCORE_TARGET_CONFIDENCE";

fn env_u64(name: &str) -> Option<u64> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

fn env_f64(name: &str) -> Option<f64> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

fn env_bool(name: &str) -> Option<bool> {
    env::var(name).ok().map(|v| {
        let v = v.trim().to_ascii_lowercase();
        !(v.is_empty() || v == "0" || v == "false" || v == "no")
    })
}

/// Whether colored output should be suppressed, per `BENCHCORE_NO_COLOR`. Consulted
/// by embedders that render the adaptive controller's progress line (§4.4); this
/// crate's own stderr writer doesn't color its output, but the flag is exposed here
/// since it's read from the same environment layer as everything else.
pub fn no_color() -> bool {
    env_bool(ENV_NO_COLOR).unwrap_or(false)
}

/// Applies `BENCHCORE_*` environment overrides on top of `options`, returning the
/// merged result. Caller-supplied values win unless the corresponding environment
/// variable is set and parses; an unset or unparsable variable is silently ignored
/// (this is an override layer, not a validation layer -- [`RunnerOptions::validate`]
/// still runs afterward).
pub fn apply_env_overrides(mut options: RunnerOptions) -> RunnerOptions {
    if let Some(ms) = env_u64(ENV_MAX_TIME_MS) {
        options.max_time_ms = Some(ms);
    }
    if let Some(iters) = env_u64(ENV_MAX_ITERATIONS) {
        options.max_iterations = Some(iters);
    }
    if let Some(adaptive) = env_bool(ENV_ADAPTIVE) {
        options.adaptive = adaptive;
    }
    if let Some(confidence) = env_f64(ENV_TARGET_CONFIDENCE) {
        options.target_confidence = confidence;
    }
    options
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::Mutex;

    // Environment variables are process-global; serialize the tests that touch them.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn override_replaces_default_max_time() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::set_var(ENV_MAX_TIME_MS, "1234");
        let options = apply_env_overrides(RunnerOptions::default());
        assert_eq!(options.max_time_ms, Some(1234));
        env::remove_var(ENV_MAX_TIME_MS);
    }

    #[test]
    fn unset_variable_leaves_caller_value_untouched() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::remove_var(ENV_MAX_ITERATIONS);
        let mut options = RunnerOptions::default();
        options.max_iterations = Some(42);
        let merged = apply_env_overrides(options);
        assert_eq!(merged.max_iterations, Some(42));
    }

    #[test]
    fn no_color_defaults_to_false() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::remove_var(ENV_NO_COLOR);
        assert!(!no_color());
    }
}
