pub mod loader;
pub mod types;
pub mod utils;

pub use loader::load_table;
pub use types::RawTable;
