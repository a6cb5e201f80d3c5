pub mod parity;
pub mod path;
