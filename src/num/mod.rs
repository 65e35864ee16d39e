pub mod number;
pub mod scalar;

pub use number::format_json_number;
pub use scalar::Scalar;
