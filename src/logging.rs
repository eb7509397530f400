//! Logger installation for the binaries.
//!
//! Library code only uses the `log` macros; the host application decides
//! where records go. The bundled tools install `env_logger` through
//! [`init_logging`].

use env_logger::{Builder, Env};

use crate::config::LoggingConfig;

/// Installs `env_logger` at the configured level.
///
/// `RUST_LOG` overrides the configured level when set. Does nothing when
/// logging is disabled or a logger is already installed.
pub fn init_logging(config: &LoggingConfig) {
    if !config.enabled {
        return;
    }

    let env = Env::default().default_filter_or(config.level.to_lowercase());
    if Builder::from_env(env).try_init().is_err() {
        log::debug!("Logger already installed, keeping it");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let config = LoggingConfig {
            enabled: true,
            level: "debug".to_string(),
        };
        init_logging(&config);
        init_logging(&config);
    }

    #[test]
    fn disabled_logging_is_a_no_op() {
        init_logging(&LoggingConfig::default());
    }
}
