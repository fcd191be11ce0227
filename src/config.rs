use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub care_api_url: String,
    pub care_api_timeout_secs: u64,
    pub roster_cache_ttl_secs: u64,
    pub diary_page_size: u32,
    pub bind_addr: String,
    pub cors_origin: String,
    pub debug_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let care_api_url = lookup("CARE_API_URL")
            .ok_or_else(|| "CARE_API_URL must be set".to_string())?;

        // Joined with "/api/..." paths later
        let care_api_url = care_api_url.trim_end_matches('/').to_string();
        if !care_api_url.starts_with("http://") && !care_api_url.starts_with("https://") {
            return Err(format!("CARE_API_URL must be an http(s) URL, got {}", care_api_url));
        }

        Ok(Self {
            care_api_url,
            care_api_timeout_secs: parse_or(&lookup, "CARE_API_TIMEOUT_SECS", 10)?,
            roster_cache_ttl_secs: parse_or(&lookup, "ROSTER_CACHE_TTL_SECS", 300)?,
            diary_page_size: parse_or(&lookup, "DIARY_PAGE_SIZE", 100)?,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            cors_origin: lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string()),
            debug_key: lookup("DEBUG_KEY").filter(|k| !k.is_empty()),
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| format!("{} is invalid: {}", key, e)),
        None => Ok(default),
    }
}
