use env_logger::Env;

use crate::config::WireConfig;

/// Installs env_logger with `filter` as the fallback when `RUST_LOG` is unset.
///
/// Returns false if a logger was already installed.
pub fn init_logging(filter: &str) -> bool {
    env_logger::Builder::from_env(Env::default().default_filter_or(filter))
        .format_timestamp_millis()
        .try_init()
        .is_ok()
}

#[inline]
pub fn init_from_config(cfg: &WireConfig) -> bool {
    init_logging(&cfg.log_filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_reports_existing_logger() {
        let _ = init_logging("warn");
        assert!(!init_logging("debug"));
    }
}
