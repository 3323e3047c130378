pub mod dump_discovery;
pub mod postgres_executor;
