//! parley-cli — drive a running parley-server by posting simulated webhooks
//!
//! Builds the same JSON body Business Messages sends to the agent webhook, so a
//! conversation can be exercised locally without the platform. Replies go to
//! the real messaging API configured on the server.
//!
//! # Subcommands
//! - `send <conversation> <text> [--locale <tag>]` — user text message
//! - `postback <conversation> <data>`              — suggestion tap with raw postback data
//! - `switch <conversation> <language>`            — switch-language suggestion tap
//! - `status`                                      — show server health

use clap::{Parser, Subcommand};
use serde::Serialize;

const DEFAULT_SERVER: &str = "http://127.0.0.1:8080";
const DEFAULT_WEBHOOK_PATH: &str = "/callback";
const DEFAULT_AGENT: &str = "brands/local/agents/parley";
const DEFAULT_MARKER: &str = "SWITCH_LANGUAGE";

#[derive(Debug, Parser)]
#[command(
    name = "parley-cli",
    version,
    about = "Post simulated Business Messages webhooks to a parley-server"
)]
struct Cli {
    /// Parley HTTP server URL (overrides PARLEY_HTTP_URL env var)
    #[arg(long, env = "PARLEY_HTTP_URL", default_value = DEFAULT_SERVER)]
    server: String,

    /// Webhook route on the server
    #[arg(long, default_value = DEFAULT_WEBHOOK_PATH)]
    path: String,

    /// Agent resource name placed in the payload
    #[arg(long, default_value = DEFAULT_AGENT)]
    agent: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Send a text message as the user
    Send {
        conversation: String,
        text: String,

        /// Locale the platform would resolve for the user
        #[arg(long, default_value = "en-US")]
        locale: String,

        /// Display name of the simulated user
        #[arg(long)]
        name: Option<String>,
    },

    /// Tap a suggestion carrying arbitrary postback data
    Postback { conversation: String, data: String },

    /// Tap the switch-language suggestion for a language code
    Switch {
        conversation: String,
        language: String,

        #[arg(long, default_value = DEFAULT_MARKER)]
        marker: String,
    },

    /// Show parley-server status
    Status,
}

// ============================================================================
// Webhook payloads
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedWebhook {
    pub conversation_id: String,
    pub request_id: String,
    pub agent: String,
    pub context: SimulatedContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<SimulatedMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion_response: Option<SimulatedSuggestionResponse>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_info: Option<SimulatedUser>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedUser {
    pub display_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedMessage {
    pub message_id: String,
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedSuggestionResponse {
    pub message: String,
    pub postback_data: String,
}

impl SimulatedWebhook {
    fn base(agent: &str, conversation_id: &str) -> Self {
        Self {
            conversation_id: conversation_id.to_string(),
            request_id: uuid::Uuid::new_v4().to_string(),
            agent: agent.to_string(),
            context: SimulatedContext::default(),
            message: None,
            suggestion_response: None,
        }
    }

    pub fn text(
        agent: &str,
        conversation_id: &str,
        text: &str,
        locale: &str,
        name: Option<&str>,
    ) -> Self {
        let mut webhook = Self::base(agent, conversation_id);
        webhook.context = SimulatedContext {
            resolved_locale: Some(locale.to_string()),
            user_info: name.map(|n| SimulatedUser {
                display_name: n.to_string(),
            }),
        };
        webhook.message = Some(SimulatedMessage {
            message_id: uuid::Uuid::new_v4().to_string(),
            text: text.to_string(),
        });
        webhook
    }

    pub fn postback(agent: &str, conversation_id: &str, postback_data: &str) -> Self {
        let mut webhook = Self::base(agent, conversation_id);
        webhook.suggestion_response = Some(SimulatedSuggestionResponse {
            message: uuid::Uuid::new_v4().to_string(),
            postback_data: postback_data.to_string(),
        });
        webhook
    }
}

/// Postback data the server emits on its switch-language suggestions.
pub fn switch_postback(marker: &str, language: &str) -> String {
    format!("{}{}", marker, language.trim().to_lowercase())
}

// ============================================================================
// HTTP Client Calls
// ============================================================================

fn post_webhook(url: &str, webhook: &SimulatedWebhook) -> anyhow::Result<()> {
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()?;

    let resp = match client.post(url).json(webhook).send() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("parley-cli: connection failed to {}: {}", url, e);
            std::process::exit(1);
        }
    };

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().unwrap_or_default();
        eprintln!("parley-cli: server returned {}: {}", status, body);
        std::process::exit(1);
    }

    println!(
        "Accepted: conversation {} (request {})",
        webhook.conversation_id, webhook.request_id
    );
    Ok(())
}

/// Show the server status by calling GET /health.
fn do_status(server: &str) -> anyhow::Result<()> {
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()?;

    let url = format!("{}/health", server);
    match client.get(&url).send() {
        Ok(r) if r.status().is_success() => {
            let body: serde_json::Value = r.json().unwrap_or_default();
            println!("Parley server:   {}", body["status"].as_str().unwrap_or("unknown"));
            println!("Version:         {}", body["version"].as_str().unwrap_or("?"));
            println!("Server language: {}", body["server_language"].as_str().unwrap_or("?"));
            println!("Sessions:        {}", body["sessions"].as_u64().unwrap_or(0));
        }
        Ok(r) => {
            eprintln!("parley-cli: server unhealthy (HTTP {})", r.status());
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("parley-cli: cannot reach {}: {}", url, e);
            std::process::exit(1);
        }
    }

    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn main() {
    let cli = Cli::parse();
    let server = cli.server.trim_end_matches('/').to_string();
    let webhook_url = format!("{}{}", server, cli.path);

    let result = match cli.command {
        Commands::Send {
            conversation,
            text,
            locale,
            name,
        } => post_webhook(
            &webhook_url,
            &SimulatedWebhook::text(&cli.agent, &conversation, &text, &locale, name.as_deref()),
        ),
        Commands::Postback { conversation, data } => post_webhook(
            &webhook_url,
            &SimulatedWebhook::postback(&cli.agent, &conversation, &data),
        ),
        Commands::Switch {
            conversation,
            language,
            marker,
        } => post_webhook(
            &webhook_url,
            &SimulatedWebhook::postback(
                &cli.agent,
                &conversation,
                &switch_postback(&marker, &language),
            ),
        ),
        Commands::Status => do_status(&server),
    };

    if let Err(e) = result {
        eprintln!("parley-cli: {}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// Tests
// ============================================================================
