pub mod error;
pub mod validate;
pub mod progress;
pub mod reconcile;
pub mod upsert;
pub mod keyed;
pub mod store;
pub mod file_store;
pub mod service;

pub use error::{ServiceError, StoreError, ValidationError};
pub use validate::{decode_entries, decode_records, validate_entries, validate_records};
pub use progress::{compute_progress, CompletionIndex};
pub use reconcile::{reconcile, ReconcileOutcome};
pub use upsert::{upsert_entry, UpsertOutcome};
pub use keyed::KeyedWatchlist;
pub use store::{DocumentStore, MemoryStore, Versioned};
pub use file_store::JsonFileStore;
pub use service::{BatchItem, OpenCourseReport, ReconcileReport, ServiceOptions, WatchlistService};
