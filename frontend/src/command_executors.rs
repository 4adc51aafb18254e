use crate::network::api_client::ApiClient;
use crate::programme_state::ProgrammeCommand;

/// Persist a programme transition in the background.  Failures are logged;
/// the caller re-fetches the list to reconcile.
pub fn execute_programme_command(cmd: ProgrammeCommand) {
    wasm_bindgen_futures::spawn_local(async move {
        let id = cmd.id();
        let action = describe(&cmd);
        match ApiClient::send_programme_command(&cmd).await {
            Ok(()) => tracing::info!(programme_id = id, "spray programme {}", action),
            Err(e) => tracing::error!(
                programme_id = id,
                "Failed to persist spray programme change ({}): {:?}",
                action,
                e
            ),
        }
    });
}

fn describe(cmd: &ProgrammeCommand) -> &'static str {
    match cmd {
        ProgrammeCommand::Update { .. } => "updated",
        ProgrammeCommand::Deactivate { .. } => "removed from schedule",
        ProgrammeCommand::Delete { .. } => "deleted",
    }
}
