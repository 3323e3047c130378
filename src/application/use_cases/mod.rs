pub mod deploy_dumps;
pub mod preview_dumps;
