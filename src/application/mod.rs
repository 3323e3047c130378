pub mod commands;
pub mod deployment_script;
pub mod executor;
pub mod use_cases;
