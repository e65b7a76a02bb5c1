//! Discovery engine
//!
//! Loads a conversation's records, runs the menu transition, executes its
//! effects in order and answers with a render instruction. Nothing is
//! persisted unless every earlier effect succeeded.

use crate::db::Node;
use crate::error::{DiscoveryError, DiscoveryResult};
use crate::generator::{Generator, LlmGenerator};
use crate::interaction::{Action, Interaction, RenderInstruction, RenderMode};
use crate::menu::{
    render, transition, ControlAction, ControlPress, Delivery, Effect, MenuEvent, MenuProgress,
    Notice, TransitionResult,
};
use crate::records::{RecordStore, CONVERSATION_PREFIX, SESSION_PREFIX};
use crate::session::NavigationState;
use crate::store::{DatabaseStorage, Storage};
use crate::tree::ContentTree;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

pub const MENU_TITLE: &str = "Infinite Buttons!";

/// Interactions older than this are dropped
pub const DEFAULT_MAX_INTERACTION_AGE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

const HELP_TEXT: &str =
    "Send /start to begin discovering, or /menu to pick up where you left off.";

pub type ProductionEngine = DiscoveryEngine<DatabaseStorage, LlmGenerator>;

pub struct DiscoveryEngine<S, G> {
    tree: ContentTree<S, G>,
    sessions: RecordStore<S, NavigationState>,
    progress: RecordStore<S, MenuProgress>,
    max_age: Duration,
}

impl<S: Storage + Clone, G: Generator> DiscoveryEngine<S, G> {
    pub fn new(storage: S, generator: G) -> Self {
        Self {
            tree: ContentTree::new(storage.clone(), generator),
            sessions: RecordStore::new(storage.clone(), SESSION_PREFIX),
            progress: RecordStore::new(storage, CONVERSATION_PREFIX),
            max_age: DEFAULT_MAX_INTERACTION_AGE,
        }
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Handle one interaction. Never fails: errors are logged and turned
    /// into a message for the actor.
    pub async fn respond(&self, interaction: Interaction) -> RenderInstruction {
        let span = tracing::info_span!(
            "interaction",
            request_id = %Uuid::new_v4(),
            actor = %interaction.actor_id,
            conversation = %interaction.conversation_id,
            kind = interaction.action.kind(),
        );

        async move {
            match self.handle(&interaction).await {
                Ok(instruction) => {
                    tracing::debug!(mode = ?instruction.mode, "Interaction handled");
                    instruction
                }
                Err(e) => {
                    tracing::error!(error = %e, "Interaction failed");
                    RenderInstruction::message(e.user_message())
                }
            }
        }
        .instrument(span)
        .await
    }

    pub async fn handle(&self, interaction: &Interaction) -> DiscoveryResult<RenderInstruction> {
        if self.is_expired(interaction.sent_at, Utc::now()) {
            tracing::info!(sent_at = ?interaction.sent_at, "Ignoring old interaction");
            return Ok(RenderInstruction::ignore());
        }

        let event = match &interaction.action {
            Action::Text { text } => return Ok(RenderInstruction::message(format!("echo: {text}"))),
            Action::Command { name } => match command_name(name) {
                "start" => MenuEvent::Open,
                "menu" => MenuEvent::Resume,
                other => {
                    tracing::debug!(command = other, "Unknown command");
                    return Ok(RenderInstruction::message(HELP_TEXT));
                }
            },
            Action::Control { id } => match ControlPress::parse(id) {
                Some(press) => MenuEvent::Press(press),
                None => {
                    tracing::warn!(control = %id, "Unrecognized control");
                    return Ok(RenderInstruction::message(HELP_TEXT));
                }
            },
        };

        self.run_menu(interaction, event).await
    }

    fn is_expired(&self, sent_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        sent_at
            .and_then(|sent| now.signed_duration_since(sent).to_std().ok())
            .is_some_and(|age| age > self.max_age)
    }

    async fn run_menu(
        &self,
        interaction: &Interaction,
        event: MenuEvent,
    ) -> DiscoveryResult<RenderInstruction> {
        let conversation = interaction.conversation_id.as_str();
        let (nav, progress) = if event == MenuEvent::Open {
            // A reset must work even when the stored records are unreadable
            let progress = self.progress.load(conversation).await.unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Discarding unreadable menu progress");
                None
            });
            (NavigationState::default(), progress.unwrap_or_default())
        } else {
            let nav = self.sessions.load(conversation).await?.unwrap_or_default();
            let progress = self.progress.load(conversation).await?.unwrap_or_default();
            (nav, progress)
        };
        let event = self.check_selection(&nav, progress, event).await?;

        let TransitionResult {
            mut nav,
            progress,
            effects,
        } = transition(&nav, progress, event, Utc::now());

        let mut listing: Vec<Node> = Vec::new();
        let mut instruction = RenderInstruction::ignore();

        for effect in effects {
            match effect {
                Effect::LoadChildren { node_id } => {
                    let children = self.tree.children(node_id, &interaction.actor_id).await?;
                    nav.record_discovered(children.discovered.iter().copied());
                    listing = children.nodes;
                }
                Effect::Render { delivery, notice } => {
                    instruction = self
                        .render_menu(&nav, progress, &listing, delivery, notice)
                        .await?;
                }
                Effect::PersistSession => self.sessions.save(conversation, &nav).await?,
                Effect::PersistProgress => self.progress.save(conversation, &progress).await?,
                Effect::CloseMenu => instruction = RenderInstruction::close(),
            }
        }

        Ok(instruction)
    }

    /// A live select must name a child of the current position; anything
    /// else is answered with a refresh.
    async fn check_selection(
        &self,
        nav: &NavigationState,
        progress: MenuProgress,
        event: MenuEvent,
    ) -> DiscoveryResult<MenuEvent> {
        let MenuEvent::Press(ControlPress {
            phase,
            revision,
            action: ControlAction::Select(node_id),
        }) = event
        else {
            return Ok(event);
        };
        if !progress.is_current(phase, revision) {
            return Ok(event);
        }

        let parent_id = match self.tree.node(node_id).await {
            Ok(node) => node.parent_id,
            Err(DiscoveryError::NotFound(_)) => {
                tracing::warn!(node_id, "Select of unknown node");
                return Ok(MenuEvent::Refresh(Notice::Unavailable));
            }
            Err(e) => return Err(e),
        };
        if parent_id != nav.current_node_id {
            tracing::warn!(
                node_id,
                ?parent_id,
                current = ?nav.current_node_id,
                "Select of node outside the current menu"
            );
            return Ok(MenuEvent::Refresh(Notice::Unavailable));
        }
        Ok(event)
    }

    async fn render_menu(
        &self,
        nav: &NavigationState,
        progress: MenuProgress,
        children: &[Node],
        delivery: Delivery,
        notice: Option<Notice>,
    ) -> DiscoveryResult<RenderInstruction> {
        let mut lines = vec![MENU_TITLE.to_string()];
        if let Some(id) = nav.current_node_id {
            let node = self.tree.node(id).await?;
            lines.push(format!("📍 {}", node.label()));
        }
        if let Some(notice) = notice {
            lines.push(notice.text().to_string());
        }
        lines.push(nav.stats().to_string());

        Ok(RenderInstruction {
            mode: match delivery {
                Delivery::Send => RenderMode::Send,
                Delivery::Edit => RenderMode::Edit,
            },
            text: lines.join("\n"),
            controls: render(progress.phase, progress.revision, children, nav.can_go_back()),
        })
    }
}

/// `/start@SomeBot` -> `start`
fn command_name(raw: &str) -> &str {
    let name = raw.trim().trim_start_matches('/');
    name.split('@').next().unwrap_or(name)
}
