use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::warn;

use crate::oauth::{AuthService, CodeSubmission};
use crate::utils::{format_activities, format_athlete, format_stats, format_zones};

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    Start,
    Activities,
    Athlete,
    Zones,
    Stats,
}

const START_PROMPT: &str = "Please use /start command to authorize first.";
const REAUTHORIZE_PROMPT: &str =
    "Failed to refresh access token. Please reauthorize with /start command.";
const AUTHORIZED_COMMANDS: &str = "You can now use the following commands:\n\
    /activities - View your activities\n\
    /stats - View your statistics\n\
    /athlete - View your profile\n\
    /zones - View your heart rate zones";

/// Handler tree: commands first, then free text (a pasted authorization
/// code). Unknown `/` messages and media are dropped.
pub fn schema() -> UpdateHandler<teloxide::RequestError> {
    Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(
            dptree::filter_map(|msg: Message| {
                msg.text()
                    .filter(|text| !text.starts_with('/'))
                    .map(ToOwned::to_owned)
            })
            .endpoint(handle_auth_code),
        )
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    auth: AuthService,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id;
    match cmd {
        Command::Start => start(&bot, chat_id, &auth).await,
        Command::Activities => activities(&bot, chat_id, &auth).await,
        Command::Athlete => athlete(&bot, chat_id, &auth).await,
        Command::Zones => zones(&bot, chat_id, &auth).await,
        Command::Stats => stats(&bot, chat_id, &auth).await,
    }
}

async fn start(bot: &Bot, chat_id: ChatId, auth: &AuthService) -> ResponseResult<()> {
    if auth.is_authorized(chat_id.0).await {
        bot.send_message(
            chat_id,
            "You are already authorized! You can use /activities, /stats, /athlete, or /zones commands.",
        )
        .await?;
        return Ok(());
    }

    let authorize_url = auth.begin_authorization(chat_id.0).await;
    bot.send_message(
        chat_id,
        format!(
            "Hello! To authorize this app with Strava, click the following link:\n{authorize_url}\n\n\
            After authorizing, copy the authorization code from the URL and send it back to this chat."
        ),
    )
    .await?;
    Ok(())
}

async fn handle_auth_code(
    bot: Bot,
    msg: Message,
    text: String,
    auth: AuthService,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id;
    match auth.submit_code(chat_id.0, &text).await {
        Ok(CodeSubmission::Ignored) => {}
        Ok(CodeSubmission::Authorized) => {
            bot.send_message(chat_id, format!("Authorization successful! {AUTHORIZED_COMMANDS}"))
                .await?;
        }
        Err(err) => {
            warn!(chat_id = chat_id.0, error = %err, "authorization code exchange failed");
            bot.send_message(chat_id, "Authorization failed. Please try again with /start command.")
                .await?;
        }
    }
    Ok(())
}

async fn activities(bot: &Bot, chat_id: ChatId, auth: &AuthService) -> ResponseResult<()> {
    let Some(token) = require_access_token(bot, chat_id, auth).await? else {
        return Ok(());
    };

    match auth.api().athlete_activities(&token).await {
        Ok(activities) => {
            bot.send_message(chat_id, format_activities(&activities)).await?;
        }
        Err(err) => {
            warn!(chat_id = chat_id.0, error = %err, "activities request failed");
            bot.send_message(chat_id, "Failed to retrieve activities. Please try again later.")
                .await?;
        }
    }
    Ok(())
}

async fn athlete(bot: &Bot, chat_id: ChatId, auth: &AuthService) -> ResponseResult<()> {
    let Some(token) = require_access_token(bot, chat_id, auth).await? else {
        return Ok(());
    };

    match auth.api().athlete(&token).await {
        Ok(profile) => {
            bot.send_message(chat_id, format_athlete(&profile)).await?;
        }
        Err(err) => {
            warn!(chat_id = chat_id.0, error = %err, "athlete request failed");
            bot.send_message(
                chat_id,
                "Failed to retrieve athlete information. Please try again later.",
            )
            .await?;
        }
    }
    Ok(())
}

async fn zones(bot: &Bot, chat_id: ChatId, auth: &AuthService) -> ResponseResult<()> {
    let Some(token) = require_access_token(bot, chat_id, auth).await? else {
        return Ok(());
    };

    match auth.api().athlete_zones(&token).await {
        Ok(zones) => {
            bot.send_message(chat_id, format_zones(&zones)).await?;
        }
        Err(err) => {
            warn!(chat_id = chat_id.0, error = %err, "zones request failed");
            bot.send_message(
                chat_id,
                "Failed to retrieve zones information. Please try again later.",
            )
            .await?;
        }
    }
    Ok(())
}

async fn stats(bot: &Bot, chat_id: ChatId, auth: &AuthService) -> ResponseResult<()> {
    let Some(token) = require_access_token(bot, chat_id, auth).await? else {
        return Ok(());
    };

    // The stats endpoint is keyed by athlete id. Older sessions may predate
    // the id capture, so fall back to one profile lookup.
    let athlete_id = match auth.athlete_id(chat_id.0).await {
        Some(id) => id,
        None => match auth.api().athlete(&token).await {
            Ok(profile) => {
                auth.remember_athlete(chat_id.0, profile.id).await;
                profile.id
            }
            Err(err) => {
                warn!(chat_id = chat_id.0, error = %err, "athlete lookup for stats failed");
                bot.send_message(chat_id, "Failed to retrieve statistics. Please try again later.")
                    .await?;
                return Ok(());
            }
        },
    };

    match auth.api().athlete_stats(&token, athlete_id).await {
        Ok(stats) => {
            bot.send_message(chat_id, format_stats(&stats)).await?;
        }
        Err(err) => {
            warn!(chat_id = chat_id.0, error = %err, "stats request failed");
            bot.send_message(chat_id, "Failed to retrieve statistics. Please try again later.")
                .await?;
        }
    }
    Ok(())
}

/// Resolves a usable access token or sends the appropriate prompt and
/// reports `None` so the command bails out.
async fn require_access_token(
    bot: &Bot,
    chat_id: ChatId,
    auth: &AuthService,
) -> ResponseResult<Option<String>> {
    match auth.access_token(chat_id.0).await {
        Ok(Some(token)) => Ok(Some(token)),
        Ok(None) => {
            bot.send_message(chat_id, REAUTHORIZE_PROMPT).await?;
            Ok(None)
        }
        Err(err) => {
            warn!(chat_id = chat_id.0, error = %err, "no usable session");
            bot.send_message(chat_id, START_PROMPT).await?;
            Ok(None)
        }
    }
}
