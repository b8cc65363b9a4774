pub mod collection_repository;
pub mod memory_repository;

pub use collection_repository::SeaOrmCollectionRepository;
pub use memory_repository::MemoryCollectionRepository;
