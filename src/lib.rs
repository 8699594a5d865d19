pub mod export;
pub mod history;
pub mod loader;
pub mod search;
pub mod selection;
pub mod state;
pub mod table;
