pub mod arc_graph;
pub mod arc_templates;
pub mod beats;
pub mod db;
pub mod errors;
pub mod graph_host;
pub mod ids;
pub mod library;
pub mod migration;
pub mod models;
pub mod scene_index;
pub mod settings;

pub use crate::arc_graph::{prepare_graph, ArcGraph, GraphData, GraphState, RenderOutcome};
pub use crate::db::{BlobStore, LibraryStore, MemoryBlobStore, SqliteBlobStore};
pub use crate::errors::{AppError, AppResult};
pub use crate::graph_host::{GraphHost, HeadlessGraphHost};
pub use crate::ids::{IdGenerator, SeededIdGenerator, UuidIdGenerator};
pub use crate::library::Library;
pub use crate::migration::{needs_migration, LegacyReferenceMigrator};
pub use crate::models::{ArcBeat, Book, Chapter, Character, CharacterArc, NavigationState, Scene};
pub use crate::scene_index::move_scene;
pub use crate::settings::AppSettings;

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

pub fn init_tracing(log_dir: &Path, default_filter: &str) -> Result<(), String> {
    std::fs::create_dir_all(log_dir).map_err(|error| error.to_string())?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "story-arcs.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| error.to_string())
}
