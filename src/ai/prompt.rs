//! Prompt assembly using Handlebars for templating. Strict mode makes
//! a missing field a render error instead of silently rendering an
//! empty string, and escaping is disabled since the output is plain
//! text sent to the model rather than HTML.

use std::fmt;

use handlebars::{Handlebars, RenderError};
use serde_json::json;

use crate::ai::chat::{Role, Transcript};

#[derive(Debug)]
pub enum Prompt {
    Conversation,
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Instruction text prepended to every prompt. Never shown in the
/// transcript.
pub const SYSTEM_PREAMBLE: &str = "You are an AI assistant for the CCMI Team, a group of data analysts specializing in automation solutions, SharePoint integration, Power Automate workflows, Power BI reporting, VBA scripting, and advanced Excel functions. Your role is to provide clear, precise, and actionable guidance on coding, Excel queries, VBA scripts, Power Query, M code, and automation processes. Make sure your responses are tailored to help streamline the team's workflow and enhance their reporting capabilities.";

// Every turn starts on a new line and the trailing cue asks the model
// for the next assistant turn. Keep the block tags on the same line as
// other content so Handlebars doesn't strip the newlines as standalone.
const CONVERSATION_PROMPT: &str =
    "{{preamble}}{{#each turns}}\n{{speaker}}: {{content}}{{/each}}\nAssistant:";

pub fn templates<'a>() -> Handlebars<'a> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry.register_escape_fn(handlebars::no_escape);
    registry
        .register_template_string(&Prompt::Conversation.to_string(), CONVERSATION_PROMPT)
        .expect("Failed to register template");
    registry
}

fn speaker(role: &Role) -> &'static str {
    match role {
        Role::User => "User",
        Role::Assistant => "Assistant",
    }
}

/// Serializes the preamble and the full transcript into the single
/// prompt string sent to the model.
pub fn conversation_prompt(preamble: &str, transcript: &Transcript) -> Result<String, RenderError> {
    let turns: Vec<_> = transcript
        .iter()
        .map(|msg| json!({ "speaker": speaker(&msg.role), "content": msg.content }))
        .collect();

    templates().render(
        &Prompt::Conversation.to_string(),
        &json!({ "preamble": preamble, "turns": turns }),
    )
}
