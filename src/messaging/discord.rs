//! Discord adapter: gateway events, thread lifecycle, and reply dispatch.
//!
//! The bot reacts to two kinds of inbound messages: @-mentions in a guild
//! channel (which open a fresh thread) and replies inside a thread the bot
//! created (which continue the stored conversation). Everything else is
//! ignored. The conversation turn itself runs in [`ChatEngine`]; this module
//! owns the platform branching, the typing indicator, and message delivery.

use crate::conversation::engine::ChatEngine;
use crate::conversation::store::ThreadRecordId;
use crate::messaging::{split_message, MESSAGE_CHAR_LIMIT, REPLY_CHUNK_CHARS};

use async_trait::async_trait;
use serenity::all::{
    AutoArchiveDuration, Channel, ChannelId, Context, CreateThread, EventHandler, GatewayIntents,
    GuildChannel, Message, Ready, UserId,
};
use serenity::http::HttpError;
use std::sync::Arc;

/// Prompt substituted when a mention carries no text of its own.
const GREETING_PROMPT: &str = "Hello! Is there anything I can help you with?";

const DM_REFUSAL: &str =
    "Starting a conversation from a direct message isn't supported. Mention me in a server channel instead.";
const COULD_NOT_START: &str = "Sorry, I couldn't start a conversation just now.";
const NO_RESPONSE: &str = "I couldn't get a response. Please try again.";
const NO_THREAD_PERMISSION: &str = "I don't have permission to create threads in this channel.";

/// Threads the bot starts auto-archive after a day of inactivity.
const THREAD_AUTO_ARCHIVE: AutoArchiveDuration = AutoArchiveDuration::OneDay;

/// Serenity event handler wiring gateway messages into the engine.
pub struct DiscordHandler {
    engine: Arc<ChatEngine>,
}

impl DiscordHandler {
    pub fn new(engine: Arc<ChatEngine>) -> Self {
        Self { engine }
    }

    /// Gateway intents the bot needs. Direct messages are delivered only so
    /// they can be refused with an explanation.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
    }

    /// A reply inside a thread the bot owns.
    async fn continue_thread(&self, ctx: &Context, msg: &Message, thread: &GuildChannel) {
        let parent_id = thread
            .parent_id
            .map(|id| id.get())
            .unwrap_or_else(|| msg.channel_id.get());
        let Some(record) = self
            .engine
            .resolve_thread(thread.id.get(), msg.author.id.get(), parent_id)
            .await
        else {
            // Store unreachable mid-thread: drop the event silently, the
            // gateway raised no error worth reporting to the channel.
            return;
        };

        if msg.content.is_empty() {
            return;
        }

        self.finish_turn(ctx, msg.channel_id, record, &msg.content)
            .await;
    }

    /// A fresh mention outside any owned thread.
    async fn start_conversation(&self, ctx: &Context, msg: &Message, bot_id: UserId) {
        if msg.guild_id.is_none() {
            send_text(ctx, msg.channel_id, DM_REFUSAL).await;
            return;
        }

        let thread_name = format!("Chat with {}", msg.author.display_name());
        let builder = CreateThread::new(thread_name).auto_archive_duration(THREAD_AUTO_ARCHIVE);
        let thread = match msg
            .channel_id
            .create_thread_from_message(&ctx.http, msg.id, builder)
            .await
        {
            Ok(thread) => thread,
            Err(error) => {
                tracing::warn!(%error, channel_id = %msg.channel_id, "failed to create thread");
                send_text(ctx, msg.channel_id, &thread_create_error_text(&error)).await;
                return;
            }
        };
        tracing::info!(thread_id = %thread.id, name = %thread.name, "created conversation thread");

        let parent_id = thread
            .parent_id
            .map(|id| id.get())
            .unwrap_or_else(|| msg.channel_id.get());
        let Some(record) = self
            .engine
            .resolve_thread(thread.id.get(), msg.author.id.get(), parent_id)
            .await
        else {
            send_text(ctx, msg.channel_id, COULD_NOT_START).await;
            return;
        };

        let prompt = extract_mention_prompt(&msg.content, bot_id);
        self.finish_turn(ctx, thread.id, record, &prompt).await;
    }

    /// Persist the prompt, query the model, and deliver the outcome into
    /// `target`.
    async fn finish_turn(
        &self,
        ctx: &Context,
        target: ChannelId,
        record: ThreadRecordId,
        prompt: &str,
    ) {
        match self.engine.run_turn(record, prompt).await {
            Some(reply) => send_reply(ctx, target, &reply).await,
            None => send_text(ctx, target, NO_RESPONSE).await,
        }
    }
}

#[async_trait]
impl EventHandler for DiscordHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        tracing::info!(user = %ready.user.name, guilds = ready.guilds.len(), "discord gateway ready");
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let bot_id = ctx.cache.current_user().id;
        if msg.author.id == bot_id {
            return;
        }

        let is_mentioned = msg.mentions_user_id(bot_id);
        let channel = msg.channel(&ctx).await.ok();
        let owned_thread = match &channel {
            Some(Channel::Guild(guild_channel))
                if guild_channel.thread_metadata.is_some()
                    && guild_channel.owner_id == Some(bot_id) =>
            {
                Some(guild_channel)
            }
            _ => None,
        };

        if !is_mentioned && owned_thread.is_none() {
            return;
        }

        // Typing stays on for the whole resolution/inference span; dropping
        // the guard clears it on every exit path.
        let typing = msg.channel_id.start_typing(&ctx.http);
        if let Some(thread) = owned_thread {
            self.continue_thread(&ctx, &msg, thread).await;
        } else {
            self.start_conversation(&ctx, &msg, bot_id).await;
        }
        typing.stop();
    }
}

/// Strip the bot's mention tokens and trim; fall back to a fixed greeting
/// when the mention carried no text of its own, so the model still has a
/// turn to answer.
fn extract_mention_prompt(content: &str, bot_id: UserId) -> String {
    let stripped = content
        .replace(&format!("<@{bot_id}>"), "")
        .replace(&format!("<@!{bot_id}>"), "");
    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        GREETING_PROMPT.to_string()
    } else {
        trimmed.to_string()
    }
}

fn thread_create_error_text(error: &serenity::Error) -> String {
    match error {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response))
            if response.status_code.as_u16() == 403 =>
        {
            NO_THREAD_PERMISSION.to_string()
        }
        other => format!("Something went wrong while creating the thread: {other}"),
    }
}

async fn send_text(ctx: &Context, channel_id: ChannelId, text: &str) {
    if let Err(error) = channel_id.say(&ctx.http, text).await {
        tracing::warn!(%error, channel_id = %channel_id, "failed to send message");
    }
}

/// Deliver a model reply, splitting anything over the platform limit into
/// ordered chunks. Each send is awaited before the next so the chunks land
/// in order.
async fn send_reply(ctx: &Context, channel_id: ChannelId, text: &str) {
    if text.chars().count() <= MESSAGE_CHAR_LIMIT {
        send_text(ctx, channel_id, text).await;
        return;
    }
    for chunk in split_message(text, REPLY_CHUNK_CHARS) {
        send_text(ctx, channel_id, chunk).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_both_mention_token_forms() {
        let bot = UserId::new(42);
        assert_eq!(
            extract_mention_prompt("<@42> what is 2+2?", bot),
            "what is 2+2?"
        );
        assert_eq!(extract_mention_prompt("<@!42>  hello", bot), "hello");
        assert_eq!(
            extract_mention_prompt("hey <@42>, are you there?", bot),
            "hey , are you there?"
        );
    }

    #[test]
    fn empty_mention_substitutes_the_greeting() {
        let bot = UserId::new(42);
        assert_eq!(extract_mention_prompt("<@42>", bot), GREETING_PROMPT);
        assert_eq!(extract_mention_prompt("  <@!42>  ", bot), GREETING_PROMPT);
    }

    #[test]
    fn foreign_mentions_are_left_alone() {
        let bot = UserId::new(42);
        assert_eq!(extract_mention_prompt("<@99> ping", bot), "<@99> ping");
    }
}
