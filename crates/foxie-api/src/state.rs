//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! Services are generic over store/provider/blob-store traits, but AppState
//! pins them to the concrete infra implementations. The completion provider
//! and blob store are boxed so they can be picked at startup (and swapped for
//! fakes in tests).

use std::path::PathBuf;
use std::sync::Arc;

use foxie_core::chat::service::ChatSessionService;
use foxie_core::llm::box_provider::BoxLlmProvider;
use foxie_core::llm::prompt::CompletionSettings;
use foxie_core::notes::service::NoteService;
use foxie_core::storage::blob_store::BoxBlobStore;
use foxie_infra::config::{Secrets, load_app_config, resolve_data_dir};
use foxie_infra::llm::{UnconfiguredProvider, create_provider};
use foxie_infra::sqlite::chat::SqliteSessionStore;
use foxie_infra::sqlite::note::SqliteNoteRepository;
use foxie_infra::sqlite::pool::{DatabasePool, database_url};
use foxie_infra::storage::UnconfiguredBlobStore;
use foxie_infra::storage::cloudinary::CloudinaryBlobStore;
use foxie_types::config::AppConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteChatService = ChatSessionService<SqliteSessionStore, BoxLlmProvider>;

pub type ConcreteNoteService = NoteService<SqliteNoteRepository, BoxBlobStore>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub note_service: Arc<ConcreteNoteService>,
    pub config: Arc<AppConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state: load config, connect to DB, wire services.
    ///
    /// Missing credentials do not abort startup. The affected collaborator is
    /// replaced by a stand-in that fails every call, so session browsing
    /// still works without an API key.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_app_config(&data_dir).await;
        let secrets = Secrets::from_env();

        let db_url = format!("{}?mode=rwc", database_url(&data_dir));
        let pool = DatabasePool::new(&db_url).await?;

        let provider = match create_provider(&config.completion, secrets.openai_api_key) {
            Ok(provider) => provider,
            Err(e) => {
                tracing::warn!(error = %e, "OPENAI_API_KEY not set, completions are disabled");
                BoxLlmProvider::new(UnconfiguredProvider)
            }
        };

        let blobs = match secrets.cloudinary {
            Some(credentials) => {
                BoxBlobStore::new(CloudinaryBlobStore::new(&config.blob_store, credentials)?)
            }
            None => {
                tracing::warn!("Cloudinary credentials not set, file operations are disabled");
                BoxBlobStore::new(UnconfiguredBlobStore)
            }
        };

        Ok(Self::from_parts(pool, provider, blobs, config, data_dir))
    }

    /// Wire services from already-built collaborators.
    pub fn from_parts(
        pool: DatabasePool,
        provider: BoxLlmProvider,
        blobs: BoxBlobStore,
        config: AppConfig,
        data_dir: PathBuf,
    ) -> Self {
        let settings = CompletionSettings::from(config.completion.clone());
        let chat_service =
            ChatSessionService::new(SqliteSessionStore::new(pool.clone()), provider, settings);
        let note_service = NoteService::new(SqliteNoteRepository::new(pool), blobs);

        Self {
            chat_service: Arc::new(chat_service),
            note_service: Arc::new(note_service),
            config: Arc::new(config),
            data_dir,
        }
    }
}
