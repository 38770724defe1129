mod logging;
mod server;

use anyhow::Result;
use camino::Utf8Path;
use gls_conf::Settings;
use gls_workspace::DocumentStore;
use tower_lsp_server::LspService;
use tower_lsp_server::Server;
use tracing::info;

pub use crate::logging::init_tracing;
pub use crate::logging::LspLayer;
pub use crate::server::GaugeLanguageServer;

/// Run the language server over stdio until the client disconnects.
///
/// Logging is set up against the connected client before the first message
/// is handled, writing to the log file resolved from `settings`.
pub async fn serve(settings: &Settings, project_root: &Utf8Path) -> Result<()> {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let log_file = settings.log_file(project_root);
    let mut log_guard = None;
    let mut log_setup = Ok(());

    let (service, socket) = LspService::build(|client| {
        let init = init_tracing(&log_file, settings.log_level, move |message_type, message| {
            let client = client.clone();
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                handle.spawn(async move {
                    client.log_message(message_type, message).await;
                });
            }
        });
        match init {
            Ok(guard) => log_guard = Some(guard),
            Err(e) => log_setup = Err(e),
        }

        GaugeLanguageServer::new(DocumentStore::new())
    })
    .finish();

    log_setup?;
    let _log_guard = log_guard;

    info!(%project_root, %log_file, "Starting LSP server");
    Server::new(stdin, stdout, socket).serve(service).await;
    info!("LSP server shutdown");

    Ok(())
}
