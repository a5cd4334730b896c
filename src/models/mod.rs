pub mod appointment;
pub mod enums;
pub mod physician;

pub use appointment::*;
pub use enums::*;
pub use physician::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },
}
