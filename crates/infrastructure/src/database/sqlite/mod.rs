pub mod sqlite_coord_action_repository;

pub use sqlite_coord_action_repository::SqliteCoordActionRepository;
