//! CMS entry-point: loads settings, opens storage, and serves the pages.

mod server;

use std::sync::Arc;

use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use cms::config::CmsSettings;
use cms::domain::CredentialLoginService;
use cms::inbound::http::session_config::session_settings_from_env;
use cms::inbound::http::state::HttpState;
use cms::outbound::{CapDocumentRepository, YamlCredentialRepository};
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = CmsSettings::load().map_err(|e| std::io::Error::other(e.to_string()))?;
    let mode = settings.mode().map_err(std::io::Error::other)?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let paths = settings.storage_paths(mode);
    let session = session_settings_from_env(&DefaultEnv::new(), mode).map_err(std::io::Error::other)?;

    let documents = CapDocumentRepository::open(&paths.data_dir).map_err(|e| {
        std::io::Error::other(format!(
            "failed to open documents at {}: {e}",
            paths.data_dir.display()
        ))
    })?;
    let credentials =
        YamlCredentialRepository::load(&paths.users_file).map_err(std::io::Error::other)?;
    if credentials.is_empty() {
        warn!(path = %paths.users_file.display(), "credential file lists no users");
    }

    let state = HttpState::new(
        Arc::new(CredentialLoginService::new(Arc::new(credentials))),
        Arc::new(documents),
    );

    info!(
        %mode,
        %bind_addr,
        data_dir = %paths.data_dir.display(),
        "starting cms"
    );
    let config = ServerConfig::new(session.key, session.cookie_secure, bind_addr, state);
    create_server(config)?.await
}
