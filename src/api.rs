//! HTTP adapter for the interaction boundary

mod handlers;
mod types;

pub use handlers::create_router;

use crate::engine::DiscoveryEngine;
use crate::generator::Generator;
use crate::interaction::{Interaction, RenderInstruction};
use crate::store::Storage;
use async_trait::async_trait;
use std::sync::Arc;

/// Anything that can answer an interaction
#[async_trait]
pub trait InteractionHandler: Send + Sync {
    async fn respond(&self, interaction: Interaction) -> RenderInstruction;
}

#[async_trait]
impl<S, G> InteractionHandler for DiscoveryEngine<S, G>
where
    S: Storage + Clone + 'static,
    G: Generator + 'static,
{
    async fn respond(&self, interaction: Interaction) -> RenderInstruction {
        DiscoveryEngine::respond(self, interaction).await
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<dyn InteractionHandler>,
    pub secret_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(engine: Arc<dyn InteractionHandler>, secret_token: Option<String>) -> Self {
        Self {
            engine,
            secret_token: secret_token.map(Arc::from),
        }
    }
}
