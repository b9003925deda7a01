pub mod filesystem;

pub use filesystem::{ensure_directory, init_layout, move_entry};
