pub mod memory;
pub mod pg_attempts;
pub mod pg_catalog;
pub mod pool;
pub mod repository;
