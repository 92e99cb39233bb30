pub mod state_storage;
pub use state_storage::{FileStateStorage, PgStateStorage, StateStorage};
pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
