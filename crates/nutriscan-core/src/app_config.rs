#[derive(Clone)]
pub struct AppConfig {
    pub google_api_key: String,
    pub log_level: String,
    pub user_agent: String,
    pub foodfacts_base_url: String,
    pub foodfacts_timeout_secs: u64,
    pub scorer_base_url: String,
    pub scorer_model: String,
    pub scorer_timeout_secs: u64,
    pub upscale_min_dimension: u32,
    pub debounce_ms: u64,
    pub capture_poll_ms: u64,
    pub session_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("google_api_key", &"[redacted]")
            .field("log_level", &self.log_level)
            .field("user_agent", &self.user_agent)
            .field("foodfacts_base_url", &self.foodfacts_base_url)
            .field("foodfacts_timeout_secs", &self.foodfacts_timeout_secs)
            .field("scorer_base_url", &self.scorer_base_url)
            .field("scorer_model", &self.scorer_model)
            .field("scorer_timeout_secs", &self.scorer_timeout_secs)
            .field("upscale_min_dimension", &self.upscale_min_dimension)
            .field("debounce_ms", &self.debounce_ms)
            .field("capture_poll_ms", &self.capture_poll_ms)
            .field("session_timeout_secs", &self.session_timeout_secs)
            .finish()
    }
}
