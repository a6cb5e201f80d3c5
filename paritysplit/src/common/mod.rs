pub mod constants;
pub mod id;
