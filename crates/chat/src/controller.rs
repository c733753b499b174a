use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::warn;

use snapshelf_core::emoji;
use snapshelf_core::session::BrowseSession;
use snapshelf_core::store::AlbumStore;

use crate::commands::{parse_command, AlbumCommand, CommandUsage};
use crate::events::{Attachment, EventContext, MessageEvent, ReactionEvent};
use crate::render;

/// Most menu entries one listing will arm: the numbered-emoji vocabulary
/// stops at ten. Titles beyond this bound are dropped from the menu; the
/// footer says how many were hidden.
pub const MENU_LIMIT: usize = 10;

/// Extensions accepted by the `add` flow, matched case-sensitively against
/// the substring after the last `.` of the attachment filename.
const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// One render instruction for the gateway. `Post` sends a message and arms
/// the listed reactions on it; `Delete` removes an earlier message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderAction {
    Post { text: String, reactions: Vec<String> },
    Delete { message_id: String },
}

impl RenderAction {
    pub fn post(text: impl Into<String>) -> Self {
        Self::Post { text: text.into(), reactions: Vec::new() }
    }

    pub fn post_with_reactions(text: impl Into<String>, reactions: Vec<String>) -> Self {
        Self::Post { text: text.into(), reactions }
    }
}

/// Interaction phase of one channel. A channel with no entry is idle.
#[derive(Clone, Debug, PartialEq, Eq)]
enum ChannelPhase {
    /// A numbered menu was presented. Reaction indices resolve against this
    /// title snapshot, never against a fresh listing.
    MenuShown { titles: Vec<String> },
    Browsing(BrowseSession),
}

/// The interaction state machine: translates commands and reactions into
/// render actions against the album store.
///
/// One phase per channel, behind a single mutex so events for a channel are
/// processed one at a time. Starting a new menu replaces whatever phase was
/// there; nothing is ever merged.
pub struct AlbumController {
    store: Arc<dyn AlbumStore>,
    table: String,
    call_command: String,
    sessions: Mutex<HashMap<String, ChannelPhase>>,
}

impl AlbumController {
    pub fn new(
        store: Arc<dyn AlbumStore>,
        table: impl Into<String>,
        call_command: impl Into<String>,
    ) -> Self {
        Self {
            store,
            table: table.into(),
            call_command: call_command.into(),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Handles an inbound text message. Returns no actions when the message
    /// is not addressed to the bot.
    pub async fn handle_message(
        &self,
        event: &MessageEvent,
        ctx: &EventContext,
    ) -> Vec<RenderAction> {
        if event.author_is_bot {
            return Vec::new();
        }
        let Some(command) = parse_command(&self.call_command, &event.text) else {
            return Vec::new();
        };

        match command {
            AlbumCommand::Menu => self.show_menu(&event.channel_id, ctx).await,
            AlbumCommand::Help => vec![RenderAction::post(render::help_text(&self.call_command))],
            AlbumCommand::Create { title } => self.create_album(&title, ctx).await,
            AlbumCommand::Add { title } => self.add_images(&title, &event.attachments, ctx).await,
            AlbumCommand::Invalid { usage } => vec![RenderAction::post(match usage {
                CommandUsage::Create => render::create_usage(&self.call_command),
                CommandUsage::Add => render::add_usage(&self.call_command),
            })],
            AlbumCommand::Unknown { verb } => {
                vec![RenderAction::post(render::unknown_verb_text(&verb, &self.call_command))]
            }
        }
    }

    /// Handles an emoji reaction. Reactions from the bot itself, or on
    /// messages the bot did not author, never trigger a transition.
    pub async fn handle_reaction(
        &self,
        event: &ReactionEvent,
        ctx: &EventContext,
    ) -> Vec<RenderAction> {
        if event.reactor_is_bot || !event.message_author_is_bot {
            return Vec::new();
        }

        let mut sessions = self.sessions.lock().await;
        let phase = sessions.get(&event.channel_id).cloned();
        match phase {
            Some(ChannelPhase::MenuShown { titles }) => {
                let Some(index) = emoji::index_from_glyph(&event.emoji) else {
                    return Vec::new();
                };
                // A glyph past the listed titles was never armed.
                let Some(title) = titles.get(index).cloned() else {
                    return Vec::new();
                };

                let urls = match self.store.get_images(&self.table, &title).await {
                    Ok(urls) => urls,
                    Err(error) => {
                        warn!(
                            correlation_id = %ctx.correlation_id,
                            channel_id = %event.channel_id,
                            album = %title,
                            error = %error,
                            "album load failed; menu left in place"
                        );
                        return vec![RenderAction::post(render::error_text(&error))];
                    }
                };

                let session = BrowseSession::new(event.channel_id.clone(), title, urls);
                let actions = vec![
                    RenderAction::Delete { message_id: event.message_id.clone() },
                    page_action(&session),
                ];
                sessions.insert(event.channel_id.clone(), ChannelPhase::Browsing(session));
                actions
            }
            Some(ChannelPhase::Browsing(mut session)) => {
                let moved = match event.emoji.as_str() {
                    emoji::NEXT_PAGE => {
                        if !session.advance() {
                            return vec![RenderAction::post(render::no_next_page())];
                        }
                        true
                    }
                    emoji::PREV_PAGE => {
                        if !session.retreat() {
                            return vec![RenderAction::post(render::no_prev_page())];
                        }
                        true
                    }
                    _ => false,
                };
                if !moved {
                    return Vec::new();
                }

                let actions = vec![
                    RenderAction::Delete { message_id: event.message_id.clone() },
                    page_action(&session),
                ];
                sessions.insert(event.channel_id.clone(), ChannelPhase::Browsing(session));
                actions
            }
            None => Vec::new(),
        }
    }

    async fn show_menu(&self, channel_id: &str, ctx: &EventContext) -> Vec<RenderAction> {
        let titles = match self.store.list_titles(&self.table).await {
            Ok(titles) => titles,
            Err(error) => {
                warn!(
                    correlation_id = %ctx.correlation_id,
                    channel_id = %channel_id,
                    error = %error,
                    "album listing failed"
                );
                return vec![RenderAction::post(render::error_text(&error))];
            }
        };

        if titles.is_empty() {
            return vec![RenderAction::post(render::empty_menu(&self.call_command))];
        }

        let hidden = titles.len().saturating_sub(MENU_LIMIT);
        let mut titles = titles;
        titles.truncate(MENU_LIMIT);

        let mut lines = render::menu_lines(&titles);
        if hidden > 0 {
            lines.push('\n');
            lines.push_str(&render::hidden_titles_note(hidden));
        }

        let reactions = (1..=titles.len()).map(emoji::number_glyph).collect();

        let mut sessions = self.sessions.lock().await;
        sessions.insert(channel_id.to_owned(), ChannelPhase::MenuShown { titles });

        vec![
            RenderAction::post(lines),
            RenderAction::post_with_reactions(render::menu_prompt(), reactions),
        ]
    }

    async fn create_album(&self, title: &str, ctx: &EventContext) -> Vec<RenderAction> {
        match self.store.create_album(&self.table, title).await {
            Ok(()) => vec![RenderAction::post(render::created_text(title))],
            Err(error) => {
                warn!(
                    correlation_id = %ctx.correlation_id,
                    album = %title,
                    error = %error,
                    "album create failed"
                );
                vec![RenderAction::post(render::error_text(&error))]
            }
        }
    }

    /// `add` is stateless with explicit partial success: every valid
    /// attachment is applied and reported on its own, invalid ones are
    /// collected and reported together at the end.
    async fn add_images(
        &self,
        title: &str,
        attachments: &[Attachment],
        ctx: &EventContext,
    ) -> Vec<RenderAction> {
        let titles = match self.store.list_titles(&self.table).await {
            Ok(titles) => titles,
            Err(error) => {
                warn!(correlation_id = %ctx.correlation_id, error = %error, "album listing failed");
                return vec![RenderAction::post(render::error_text(&error))];
            }
        };
        if !titles.iter().any(|existing| existing == title) {
            return vec![RenderAction::post(render::unknown_album_text(
                title,
                &self.call_command,
            ))];
        }
        if attachments.is_empty() {
            return vec![RenderAction::post(render::no_attachments_text())];
        }

        let mut actions = Vec::new();
        let mut ignored = Vec::new();
        for attachment in attachments {
            if !is_image_filename(&attachment.filename) {
                ignored.push(attachment.filename.clone());
                continue;
            }
            match self.store.add_image(&self.table, title, &attachment.url).await {
                Ok(()) => {
                    actions.push(RenderAction::post(render::image_added_text(
                        &attachment.url,
                        title,
                    )));
                }
                Err(error) => {
                    warn!(
                        correlation_id = %ctx.correlation_id,
                        album = %title,
                        url = %attachment.url,
                        error = %error,
                        "image append failed"
                    );
                    actions.push(RenderAction::post(render::error_text(&error)));
                }
            }
        }
        if !ignored.is_empty() {
            actions.push(RenderAction::post(render::ignored_attachments_text(&ignored)));
        }
        actions
    }
}

fn page_action(session: &BrowseSession) -> RenderAction {
    let Some((urls, start, end)) = session.visible_page() else {
        return RenderAction::post(render::empty_album_text(session.album_title()));
    };

    let mut reactions = Vec::new();
    if session.has_prev_page() {
        reactions.push(emoji::PREV_PAGE.to_owned());
    }
    if session.has_next_page() {
        reactions.push(emoji::NEXT_PAGE.to_owned());
    }
    RenderAction::post_with_reactions(
        render::page_text(urls, start, end, session.total_images()),
        reactions,
    )
}

fn is_image_filename(filename: &str) -> bool {
    filename.rsplit_once('.').is_some_and(|(_, extension)| IMAGE_EXTENSIONS.contains(&extension))
}
