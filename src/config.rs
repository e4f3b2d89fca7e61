//! Environment configuration and how it feeds the transport and prefs.

use std::env;

use opencode_api::ApiConfig;

use crate::prefs::Prefs;

/// Environment overrides read once at startup.
///
/// `SESSION_MIRROR_BASE_URL` points the transport at a non-default server,
/// `SESSION_MIRROR_LOCALE` overrides the persisted locale preference for
/// this run only, and `SESSION_MIRROR_DEBUG_EVENTS` raises per-event
/// dispatch logging from trace to debug.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub base_url: Option<String>,
    pub locale: Option<String>,
    pub debug_events: bool,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: env_string_opt("SESSION_MIRROR_BASE_URL"),
            locale: env_string_opt("SESSION_MIRROR_LOCALE"),
            debug_events: env_flag("SESSION_MIRROR_DEBUG_EVENTS"),
        }
    }

    /// Transport configuration for this run: the env base URL when present,
    /// the default local server otherwise.
    #[must_use]
    pub fn api_config(&self) -> ApiConfig {
        match &self.base_url {
            Some(base_url) => ApiConfig::new(base_url.clone()),
            None => ApiConfig::default(),
        }
    }

    /// Applies the locale override on top of loaded preferences. The
    /// override is per-run and is not written back unless the prefs are
    /// saved afterwards.
    pub fn apply_to_prefs(&self, prefs: &mut Prefs) {
        if let Some(locale) = &self.locale {
            prefs.locale = locale.clone();
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key)
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
