//! Long-lived services shared by every event handler

use crate::config::BotConfig;
use crate::moderator::Moderator;
use automod_classifier::ClassificationClient;
use automod_core::Result;
use automod_policy::{Enforcer, GroupConfigStore};
use std::sync::Arc;
use tracing::{error, info};

/// Owns the classification client and group store for the process lifetime
pub struct ServiceContext {
    client: Arc<ClassificationClient>,
    store: Arc<GroupConfigStore>,
    moderator: Moderator,
}

impl ServiceContext {
    /// Open the classification session and load the group store
    pub fn init(config: BotConfig) -> Result<Self> {
        let client = Arc::new(ClassificationClient::new(config.classifier)?);
        info!(url = %client.config().completions_url(), "Classification client ready");
        let store = Arc::new(GroupConfigStore::load(config.store.path));

        let mut enforcer = Enforcer::new();
        if let Some(emoji) = config.enforcement.annotate_reaction {
            enforcer = enforcer.with_annotate_reaction(emoji);
        }

        let moderator = Moderator::new(client.clone(), store.clone(), enforcer);
        info!(groups = store.snapshot().len(), "Service context initialized");

        Ok(Self {
            client,
            store,
            moderator,
        })
    }

    pub fn moderator(&self) -> Moderator {
        self.moderator.clone()
    }

    pub fn store(&self) -> Arc<GroupConfigStore> {
        self.store.clone()
    }

    /// Close the classification session and flush the group store
    pub fn shutdown(&self) {
        self.client.close();
        if let Err(e) = self.store.persist() {
            error!(
                path = %self.store.path().display(),
                error = %e,
                "Failed to persist group configuration"
            );
        }
        info!("Service context shut down");
    }
}
