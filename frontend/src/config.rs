use std::time::Duration;

pub struct Config;

impl Config {
    /// Base URL of the hosted store, e.g. `https://abc.supabase.co`.
    ///
    /// Baked in at build time from `SUPABASE_URL`; empty means same-origin,
    /// which works when a reverse proxy forwards `/rest/v1/` to the store.
    pub fn store_url() -> String {
        option_env!("SUPABASE_URL")
            .unwrap_or("")
            .trim_end_matches('/')
            .to_string()
    }

    /// Public (anonymous) API key sent with every store request.
    pub fn store_anon_key() -> String {
        option_env!("SUPABASE_ANON_KEY").unwrap_or("").to_string()
    }

    /// How long the plan catalog is served from cache before a refresh.
    pub fn plans_stale_time() -> Duration {
        Duration::from_secs(5 * 60)
    }

    /// Creator status gates access, so it is never served stale.
    pub fn status_stale_time() -> Duration {
        Duration::ZERO
    }
}
