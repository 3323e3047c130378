pub mod boolean_rewrite;
pub mod deployment_stage;
pub mod dump_file;
pub mod namespace;
pub mod schema_introspection;
pub mod sql_dialect;
pub mod tuple_values;
