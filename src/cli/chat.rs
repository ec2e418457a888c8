use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::env;

use crate::ai::chat::{ChatSession, GREETING};
use crate::core::AppConfig;
use crate::gemini::GeminiClient;

const RESET_COMMAND: &str = "/reset";

pub async fn run(api_key: Option<String>) -> Result<()> {
    let config = AppConfig::default();
    let generator = GeminiClient::new(&config.gemini_api_hostname, &config.gemini_model);
    let mut session = ChatSession::new(&config.system_preamble);
    let mut rl = DefaultEditor::new()?;

    // Fall back to prompting for the key if it wasn't provided
    let api_key = match api_key.or_else(|| env::var("GOOGLE_API_KEY").ok()) {
        Some(key) => key,
        None => match rl.readline("API Key: ") {
            Ok(line) => line.trim().to_string(),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(()),
            Err(err) => return Err(err.into()),
        },
    };

    println!("Validating API key...");
    let message = session.set_credential(&generator, &api_key).await?;
    println!("{}\n", message);
    println!("{}", GREETING);
    println!("(Type {} to start over, Ctrl-D to quit)\n", RESET_COMMAND);

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                if line.trim() == RESET_COMMAND {
                    session.reset();
                    println!("Conversation has been reset.");
                    continue;
                }
                rl.add_history_entry(line.as_str())?;

                session.set_input(&line);
                let turn = session.send_message(&generator).await?;
                if let Some(reply) = turn.reply() {
                    println!("{}\n", reply.content);
                }
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
