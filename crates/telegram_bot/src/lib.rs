//! Telegram bot.
//!
//! The bot is a thin client: it talks only to the HTTP server API and never
//! accesses the database directly.

use std::{sync::Arc, time::Duration};

use chrono_tz::Tz;
use reqwest::Client;
use teloxide::prelude::*;

mod api;
mod conversation;
mod dialogue;
mod handlers;
mod parsing;
mod state;
mod ui;

const API_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct ConfigParameters {
    conversation: Arc<conversation::Conversation<api::ApiClient>>,
    timezone: Tz,
}

pub struct Bot {
    token: String,
    server: String,
    timezone: Tz,
    client: Client,
}

impl Bot {
    pub fn new(token: &str, server: &str, timezone: Tz) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(API_TIMEOUT)
            .build()
            .map_err(|err| format!("failed to build http client: {err}"))?;

        Ok(Self {
            token: token.to_string(),
            server: server.to_string(),
            timezone,
            client,
        })
    }

    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    pub async fn run(&self) {
        tracing::info!("Starting telegram bot...");

        let bot = teloxide::Bot::new(&self.token);

        let parameters = ConfigParameters {
            conversation: Arc::new(conversation::Conversation::new(api::ApiClient::new(
                self.client.clone(),
                self.server.clone(),
            ))),
            timezone: self.timezone,
        };

        let handler =
            dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

        Dispatcher::builder(bot, handler)
            .dependencies(dptree::deps![parameters])
            .default_handler(|upd| async move {
                tracing::debug!("Unhandled update: {:?}", upd);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }
}

#[derive(Default, Debug)]
pub struct BotBuilder {
    token: String,
    server: String,
    timezone: Option<Tz>,
}

impl BotBuilder {
    pub fn token(mut self, token: &str) -> BotBuilder {
        self.token = token.to_string();
        self
    }

    /// Base URL of the expenses API.
    pub fn server(mut self, server: &str) -> BotBuilder {
        self.server = server.to_string();
        self
    }

    /// Time zone used to tell "today" apart from "yesterday".
    pub fn timezone(mut self, timezone: Tz) -> BotBuilder {
        self.timezone = Some(timezone);
        self
    }

    pub fn build(self) -> Result<Bot, String> {
        tracing::info!("Initializing telegram bot...");
        if self.token.is_empty() {
            return Err("missing bot token".to_string());
        }
        if self.server.is_empty() {
            return Err("missing api base url".to_string());
        }
        Bot::new(&self.token, &self.server, self.timezone.unwrap_or(Tz::UTC))
    }
}
