//! Common numeric types shared by every pool model

pub mod errors;
pub mod fixed_point;
pub mod log_exp;
pub mod wide;
