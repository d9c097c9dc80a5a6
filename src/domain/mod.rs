pub mod calibration;
pub mod data_center;
pub mod error;
pub mod tariff;
pub mod trajectory;
pub mod types;
pub mod utility;

pub use calibration::*;
pub use data_center::*;
pub use error::*;
pub use tariff::*;
pub use trajectory::*;
pub use types::*;
pub use utility::*;
