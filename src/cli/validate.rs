use anyhow::{Result, bail};

use crate::ai::chat::validate_api_key;
use crate::core::AppConfig;
use crate::gemini::GeminiClient;

pub async fn run(api_key: String) -> Result<()> {
    let config = AppConfig::default();
    let generator = GeminiClient::new(&config.gemini_api_hostname, &config.gemini_model);

    match validate_api_key(&generator, &api_key).await {
        Ok(message) => {
            println!("{}", message);
            Ok(())
        }
        Err(e) => bail!(e),
    }
}
