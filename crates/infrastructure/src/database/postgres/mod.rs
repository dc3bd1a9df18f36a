pub mod postgres_coord_action_repository;

pub use postgres_coord_action_repository::PostgresCoordActionRepository;
