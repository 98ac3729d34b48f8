pub mod comuna;
pub mod import;
pub mod region;
pub mod upload;
