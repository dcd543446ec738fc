/*
 * This module consolidates the core, platform-agnostic logic of the installation.
 * It re-exports the content model (`Catalog`, `ArtworkDescriptor`), the session
 * state with its decision and arrangement operations, the navigation state
 * machine, the fail-open persistence layer, the gesture-unifying reorder engine,
 * and configuration. Collaborators that touch the outside world sit behind
 * traits (`CatalogLoaderOperations`, `SessionStoreOperations`,
 * `ConfigManagerOperations`) so they can be mocked in tests.
 */
pub mod catalog_loader;
pub mod config;
pub mod models;
pub mod navigation;
pub mod path_utils;
pub mod persistence;
pub mod reorder_engine;
pub mod session_state;

pub use models::Catalog;

pub use catalog_loader::{CatalogLoaderOperations, CoreCatalogLoader};

pub use config::{AppConfig, CoreConfigManager};

pub use session_state::{Phase, SessionState};

pub use navigation::{NavTrigger, NavigationError, RestoreOutcome};

pub use persistence::{FileSessionStore, PersistenceManager, SessionStoreOperations};

pub use reorder_engine::{
    CardBounds, GalleryLayout, GestureOutcome, MoveRequest, Point, PointerDragTracker,
    PointerFeedback, Rect, TouchDragTracker, TouchRelease, TouchUpdate,
};
