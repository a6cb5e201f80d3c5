mod join;
mod split;

pub use join::handle_join;
pub use split::handle_split;
