use civiclens_core::DEFAULT_SESSION_SALT;

/// Server configuration. Built from the environment in `main`; tests use
/// the defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub demo_mode_default: bool,
    pub session_salt: String,
    pub cors_allowed_origins: Vec<String>,
    pub max_body_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            demo_mode_default: true,
            session_salt: DEFAULT_SESSION_SALT.to_string(),
            cors_allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "https://localhost:3000".to_string(),
            ],
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}
