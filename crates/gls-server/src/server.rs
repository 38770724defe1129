use gls_workspace::DocumentId;
use gls_workspace::DocumentStore;
use tower_lsp_server::jsonrpc::Result as LspResult;
use tower_lsp_server::ls_types::DidChangeTextDocumentParams;
use tower_lsp_server::ls_types::DidCloseTextDocumentParams;
use tower_lsp_server::ls_types::DidOpenTextDocumentParams;
use tower_lsp_server::ls_types::InitializeParams;
use tower_lsp_server::ls_types::InitializeResult;
use tower_lsp_server::ls_types::InitializedParams;
use tower_lsp_server::ls_types::ServerCapabilities;
use tower_lsp_server::ls_types::ServerInfo;
use tower_lsp_server::ls_types::TextDocumentSyncCapability;
use tower_lsp_server::ls_types::TextDocumentSyncKind;
use tower_lsp_server::ls_types::TextDocumentSyncOptions;
use tower_lsp_server::LanguageServer;
use tracing::debug;
use tracing::info;
use tracing::instrument;
use tracing::warn;

const SERVER_NAME: &str = "Gauge Language Server";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Translates document lifecycle notifications into [`DocumentStore`] calls.
///
/// The store is shared: feature providers get the same documents through
/// [`GaugeLanguageServer::documents`].
pub struct GaugeLanguageServer {
    documents: DocumentStore,
}

impl GaugeLanguageServer {
    #[must_use]
    pub fn new(documents: DocumentStore) -> Self {
        Self { documents }
    }

    #[must_use]
    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }
}

impl LanguageServer for GaugeLanguageServer {
    #[instrument(skip_all)]
    async fn initialize(&self, params: InitializeParams) -> LspResult<InitializeResult> {
        let client = params
            .client_info
            .as_ref()
            .map_or("unknown client", |client| client.name.as_str());
        info!(client, "Initializing server");

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::FULL),
                        will_save: Some(false),
                        will_save_wait_until: Some(false),
                        save: None,
                    },
                )),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: SERVER_NAME.to_string(),
                version: Some(SERVER_VERSION.to_string()),
            }),
            ..Default::default()
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        info!("Server received initialized notification");
    }

    async fn shutdown(&self) -> LspResult<()> {
        info!(open_documents = self.documents.len(), "Shutting down");
        Ok(())
    }

    #[instrument(skip_all, fields(uri = %params.text_document.uri.as_str()))]
    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let id = DocumentId::from(params.text_document.uri);
        self.documents.open(id.clone(), &params.text_document.text);
        debug!(
            version = params.text_document.version,
            language = %params.text_document.language_id,
            lines = ?self.documents.line_count(&id),
            "Opened document"
        );
    }

    #[instrument(skip_all, fields(uri = %params.text_document.uri.as_str()))]
    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let version = params.text_document.version;
        let changes = params.content_changes.len();
        let id = DocumentId::from(params.text_document.uri);

        // Full sync: the first change carries the whole text, later ones are ignored.
        let Some(change) = params.content_changes.into_iter().next() else {
            warn!(version, "Change notification without content changes");
            return;
        };

        if change.range.is_some() {
            debug!(version, "Ranged change applied as whole text");
        }
        if changes > 1 {
            debug!(version, ignored = changes - 1, "Only the first change is applied");
        }

        self.documents.change(id.clone(), &change.text);
        debug!(version, lines = ?self.documents.line_count(&id), "Changed document");
    }

    #[instrument(skip_all, fields(uri = %params.text_document.uri.as_str()))]
    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let id = DocumentId::from(&params.text_document.uri);
        self.documents.close(&id);
        debug!("Closed document");
    }
}
