use std::env;
use std::time::Duration;

use crate::ai::prompt::SYSTEM_PREAMBLE;
use crate::gemini::{DEFAULT_GEMINI_API_HOST, DEFAULT_GEMINI_MODEL};

const DEFAULT_SESSION_TTL_SECS: u64 = 60 * 60;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub gemini_api_hostname: String,
    pub gemini_model: String,
    pub system_preamble: String,
    pub web_ui_path: String,
    // Sessions idle for longer than this are discarded
    pub session_ttl: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        let gemini_api_hostname = env::var("CCMI_GEMINI_API_HOST")
            .unwrap_or_else(|_| DEFAULT_GEMINI_API_HOST.to_string());
        let gemini_model =
            env::var("CCMI_GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string());
        let system_preamble =
            env::var("CCMI_SYSTEM_PREAMBLE").unwrap_or_else(|_| SYSTEM_PREAMBLE.to_string());
        let web_ui_path = env::var("CCMI_WEB_UI_PATH").unwrap_or("./web-ui/src".to_string());
        let session_ttl_secs = env::var("CCMI_SESSION_TTL_SECS")
            .ok()
            .and_then(|secs| secs.parse().ok())
            .unwrap_or(DEFAULT_SESSION_TTL_SECS);

        Self {
            gemini_api_hostname,
            gemini_model,
            system_preamble,
            web_ui_path,
            session_ttl: Duration::from_secs(session_ttl_secs),
        }
    }
}
