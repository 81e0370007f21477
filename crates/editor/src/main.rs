//! `wppfm-editor` -- headless feed editor.
//!
//! Loads an editor page snapshot, activates the requested categories, prints
//! the resulting save payload and, when an admin-ajax endpoint is
//! configured, saves the feed and lists the channel's output attributes.
//!
//! # Environment variables
//!
//! | Variable                     | Required | Default | Description                           |
//! |------------------------------|----------|---------|---------------------------------------|
//! | `WPPFM_SNAPSHOT_PATH`        | yes      | --      | JSON page snapshot to edit            |
//! | `WPPFM_ACTIVATE`             | no       | --      | Comma-separated category ids          |
//! | `WPPFM_AJAX_URL`             | no       | --      | `admin-ajax.php` endpoint             |
//! | `WPPFM_AJAX_NONCE`           | no       | empty   | Nonce sent with every call            |
//! | `WPPFM_REQUEST_TIMEOUT_SECS` | no       | `30`    | HTTP timeout per call                 |

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wppfm_core::snapshot::PageSnapshot;
use wppfm_editor::ajax::AjaxClient;
use wppfm_editor::config::EditorConfig;
use wppfm_editor::session::{EditorSession, SaveOutcome};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wppfm_editor=info,wppfm_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = EditorConfig::from_env()?;

    tracing::info!(
        snapshot = %config.snapshot_path,
        ajax = config.ajax_url.is_some(),
        "Starting wppfm-editor",
    );

    let raw = tokio::fs::read_to_string(&config.snapshot_path)
        .await
        .with_context(|| format!("reading snapshot {}", config.snapshot_path))?;
    let mut session = EditorSession::from_snapshot(PageSnapshot::from_json(&raw)?)?;

    for id in &config.activate {
        session.activate_category(id);
    }

    tracing::info!(
        active = session.feed().active_count(),
        channel = session.feed().channel(),
        "Categories applied",
    );

    println!("{}", serde_json::to_string_pretty(&session.feed().to_payload())?);

    let Some(url) = config.ajax_url.as_deref() else {
        tracing::info!("WPPFM_AJAX_URL not set, skipping save");
        return Ok(());
    };

    let client = AjaxClient::new(url, config.ajax_nonce.clone(), config.request_timeout())?;

    match session.save(&client).await? {
        SaveOutcome::Applied => {}
        SaveOutcome::Stale => tracing::warn!("Save response arrived after further edits"),
    }

    let attributes = session.output_attributes(&client).await?;
    tracing::info!(count = attributes.len(), "Fetched channel output attributes");

    Ok(())
}
