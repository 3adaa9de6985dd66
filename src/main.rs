use shuttle_runtime::SecretStore;
use strava_telegram_bot::bot_service::BotService;

#[shuttle_runtime::main]
async fn shuttle_main(
    #[shuttle_runtime::Secrets] secrets: SecretStore,
) -> Result<BotService, shuttle_runtime::Error> {
    Ok(BotService { secrets })
}
