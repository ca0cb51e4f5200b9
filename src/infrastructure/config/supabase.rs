//! Hosted backend connection settings.

use serde::Deserialize;

/// Supabase project settings.
///
/// The anon key may be left out of the file and supplied through
/// `SUPABASE_ANON_KEY` (or `NEXT_PUBLIC_SUPABASE_ANON_KEY`).
#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://abcd.supabase.co`.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub anon_key: String,
    #[serde(default = "default_schema")]
    pub schema: String,
    #[serde(default = "default_table")]
    pub table: String,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_schema() -> String {
    "public".into()
}

fn default_table() -> String {
    "products".into()
}

const fn default_timeout_secs() -> u64 {
    10
}

impl SupabaseConfig {
    /// PostgREST endpoint for the product table.
    #[must_use]
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1/{}", self.url.trim_end_matches('/'), self.table)
    }

    /// Realtime websocket endpoint, with the key and protocol version attached.
    #[must_use]
    pub fn realtime_url(&self) -> String {
        let base = self.url.trim_end_matches('/');
        let base = base
            .strip_prefix("https://")
            .map(|rest| format!("wss://{rest}"))
            .or_else(|| base.strip_prefix("http://").map(|rest| format!("ws://{rest}")))
            .unwrap_or_else(|| base.to_string());
        format!(
            "{base}/realtime/v1/websocket?apikey={}&vsn=1.0.0",
            self.anon_key
        )
    }

    /// Fill url and key from the environment where set.
    pub fn apply_env(&mut self) {
        if let Some(url) = env_first(&["SUPABASE_URL", "NEXT_PUBLIC_SUPABASE_URL"]) {
            self.url = url;
        }
        if let Some(key) = env_first(&["SUPABASE_ANON_KEY", "NEXT_PUBLIC_SUPABASE_ANON_KEY"]) {
            self.anon_key = key;
        }
    }
}

fn env_first(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            schema: default_schema(),
            table: default_table(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
