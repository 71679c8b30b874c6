//! Environment helpers: centralized dotenv loading and ergonomic getters.
//! Call `bootstrap_cli()` once early in each binary (or rely on lazy Once).
use std::str::FromStr;
use std::sync::Once;
use tracing::debug;

static INIT: Once = Once::new();

/// Load .env exactly once. Safe to call many times.
pub fn init_env() {
    INIT.call_once(|| {
        // Try the working directory first, then the project root so the
        // tools can be run from anywhere inside the checkout.
        if dotenv::dotenv().is_err() {
            let candidate = format!("{}/.env", env!("CARGO_MANIFEST_DIR"));
            let _ = dotenv::from_filename(candidate);
        }
    });
}

/// Common bootstrap for CLI binaries: dotenv first (so a RUST_LOG set in
/// .env reaches the filter), then the shared tracing subscriber, then a
/// startup trace line.
pub fn bootstrap_cli(bin_name: &str) {
    init_env();
    let _ = crate::logging::init_tracing("info");
    debug!(target = "bootstrap", bin = bin_name, "environment loaded");
}

/// Get required env var; error if missing.
pub fn env_req(key: &str) -> anyhow::Result<String> {
    init_env();
    std::env::var(key).map_err(|_| anyhow::anyhow!("missing env var {key}"))
}

/// Get optional env var (None if unset or empty).
pub fn env_opt(key: &str) -> Option<String> {
    init_env();
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

/// Boolean flag; accepts 1/true/on/yes (case-insensitive) as true.
pub fn env_flag(key: &str, default: bool) -> bool {
    init_env();
    match std::env::var(key) {
        Ok(raw) => {
            let v = raw.trim().to_ascii_lowercase();
            matches!(v.as_str(), "1" | "true" | "on" | "yes")
        }
        Err(_) => default,
    }
}

/// Get parsed value with default fallback.
pub fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Clone,
{
    init_env();
    match std::env::var(key) {
        Ok(raw) => raw.parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_is_repeatable() {
        // dotenv runs once, the subscriber install tolerates a second call,
        // and the startup line fires with tracing already initialized.
        bootstrap_cli("first");
        bootstrap_cli("second");
    }
}
