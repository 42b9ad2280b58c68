//
// backend.rs
//
// tower-lsp backend for the path completion server
//

use std::sync::Arc;

use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::Client;
use tower_lsp::LanguageServer;
use tower_lsp::LspService;
use tower_lsp::Server;

use crate::candidates::to_completion_item;
use crate::config::parse_config;
use crate::lister::FsDirectoryLister;
use crate::provider::{provide_completions, RequestContext};
use crate::state::{Document, WorldState};
use crate::utf16::utf16_column_to_char_offset;

pub struct Backend {
    client: Client,
    state: Arc<RwLock<WorldState>>,
}

impl Backend {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            state: Arc::new(RwLock::new(WorldState::new())),
        }
    }

    /// Capture everything the engine needs for one request under a brief
    /// read lock: the line under the cursor, the current file path, the
    /// workspace root and the config snapshot.
    async fn request_context(
        &self,
        uri: &Url,
        position: Position,
    ) -> Option<(RequestContext, Arc<crate::config::Config>)> {
        let state = self.state.read().await;

        let document = state.documents.get(uri)?;
        let line_text = document.line_text(position.line as usize)?;
        let cursor_offset = utf16_column_to_char_offset(&line_text, position.character);

        let current_file_path = uri.to_file_path().ok()?;
        let workspace_root = state.workspace_root();
        let config = state.config.clone();

        Some((
            RequestContext {
                line_text,
                cursor_offset,
                current_file_path,
                workspace_root,
            },
            config,
        ))
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        log::info!("Initializing pathsense");

        let mut state = self.state.write().await;

        if let Some(folders) = params.workspace_folders {
            for folder in folders {
                log::info!("Adding workspace folder: {}", folder.uri);
                state.workspace_folders.push(folder.uri);
            }
        } else if let Some(root_uri) = params.root_uri {
            log::info!("Adding root URI as workspace folder: {}", root_uri);
            state.workspace_folders.push(root_uri);
        }

        drop(state);

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::INCREMENTAL,
                )),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec![
                        String::from("/"),
                        String::from("\""),
                        String::from("'"),
                        String::from("`"),
                        String::from("\\"),
                    ]),
                    ..Default::default()
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: String::from("pathsense"),
                version: Some(String::from(env!("CARGO_PKG_VERSION"))),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        log::info!("pathsense initialized");
        self.client
            .log_message(MessageType::INFO, "pathsense ready")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        log::info!("Shutting down");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        log::trace!("Opened document: {}", doc.uri);
        let mut state = self.state.write().await;
        state
            .documents
            .insert(doc.uri, Document::new(&doc.text, Some(doc.version)));
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let mut state = self.state.write().await;
        if let Some(document) = state.documents.get_mut(&params.text_document.uri) {
            for change in params.content_changes {
                document.apply_change(change);
            }
            document.version = Some(params.text_document.version);
        } else {
            log::warn!("Change for unopened document: {}", params.text_document.uri);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let mut state = self.state.write().await;
        state.documents.remove(&params.text_document.uri);
    }

    /// Replace the configuration snapshot wholesale. A request that already
    /// cloned the previous Arc keeps observing it until it completes.
    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        log::trace!("Configuration changed");

        match parse_config(&params.settings) {
            Some(config) => {
                let mut state = self.state.write().await;
                state.config = Arc::new(config);
            }
            None => {
                log::warn!("No pathsense section in settings, keeping existing configuration");
            }
        }
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        let Some((ctx, config)) = self.request_context(&uri, position).await else {
            return Ok(None);
        };

        match provide_completions(&ctx, &config, &FsDirectoryLister).await {
            Ok(candidates) => {
                let items: Vec<CompletionItem> = candidates
                    .iter()
                    .enumerate()
                    .map(|(index, candidate)| to_completion_item(candidate, index))
                    .collect();
                Ok(Some(CompletionResponse::Array(items)))
            }
            Err(e) => {
                log::warn!("Completion request failed for {}: {:#}", uri, e);
                let mut error = tower_lsp::jsonrpc::Error::internal_error();
                error.message = format!("path completion failed: {e}").into();
                Err(error)
            }
        }
    }
}

pub async fn start_lsp() -> anyhow::Result<()> {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::build(Backend::new).finish();
    Server::new(stdin, stdout, socket).serve(service).await;

    Ok(())
}
