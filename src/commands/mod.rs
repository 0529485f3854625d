pub mod install;
pub mod status;
