//! The `/automod` slash command

use automod_core::GroupId;
use automod_policy::GroupConfigStore;
use serenity::all::{
    CommandDataOptionValue, CommandInteraction, CommandOptionType, Context, CreateCommand,
    CreateCommandOption, CreateInteractionResponse, CreateInteractionResponseMessage,
};
use tracing::{error, info, warn};

pub const NAME: &str = "automod";

const OWNER_ONLY: &str = "Only the bot owner can use this command.";
const GUILD_ONLY: &str = "This command can only be used in a server.";

/// Command definition registered globally on startup
pub fn register() -> CreateCommand {
    CreateCommand::new(NAME)
        .description("Enable or disable AI automod for this server.")
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::Boolean,
                "enabled",
                "True to enable, False to disable",
            )
            .required(true),
        )
}

/// Apply a toggle request and return the reply text.
///
/// Only the application owner may toggle, and only inside a server. A failed
/// save is logged; the in-memory setting still takes effect.
pub fn toggle(
    store: &GroupConfigStore,
    caller: u64,
    owner: Option<u64>,
    group: Option<GroupId>,
    enabled: bool,
) -> String {
    if owner != Some(caller) {
        info!(caller, "Rejected automod toggle from non-owner");
        return OWNER_ONLY.to_string();
    }

    let Some(group) = group else {
        return GUILD_ONLY.to_string();
    };

    if let Err(e) = store.set(group, enabled) {
        error!(group, error = %e, "Failed to persist group configuration");
    }
    metrics::counter!("automod_toggles_total", "enabled" => if enabled { "true" } else { "false" })
        .increment(1);
    info!(group, enabled, "AI automod toggled");

    format!(
        "AI automod has been **{}** for this server.",
        if enabled { "enabled" } else { "disabled" }
    )
}

/// Handle an `/automod` invocation
pub async fn run(ctx: &Context, command: &CommandInteraction, store: &GroupConfigStore) {
    let enabled = command
        .data
        .options
        .iter()
        .find(|option| option.name == "enabled")
        .and_then(|option| match option.value {
            CommandDataOptionValue::Boolean(value) => Some(value),
            _ => None,
        });

    let Some(enabled) = enabled else {
        warn!("automod command invoked without the enabled option");
        return;
    };

    let owner = match ctx.http.get_current_application_info().await {
        Ok(info) => info.owner.map(|user| user.id.get()),
        Err(e) => {
            warn!(error = %e, "Failed to fetch application owner");
            None
        }
    };

    let reply = toggle(
        store,
        command.user.id.get(),
        owner,
        command.guild_id.map(|id| id.get()),
        enabled,
    );

    let response = CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .content(reply)
            .ephemeral(true),
    );
    if let Err(e) = command.create_response(&ctx.http, response).await {
        warn!(error = %e, "Failed to respond to automod command");
    }
}
