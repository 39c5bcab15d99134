pub mod deprovision;
pub mod import;
