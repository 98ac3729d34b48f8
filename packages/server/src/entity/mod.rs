pub mod comuna;
pub mod region;
