pub mod loader;
pub mod schema;

pub use loader::{load_game_data, load_game_data_bytes, DataLoadError, GameData};
