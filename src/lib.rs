pub mod cli;
pub mod config;
pub mod due;
pub mod list;
pub mod models;
pub mod store;
pub mod tui;
pub mod utils;

pub use config::Config;
pub use list::TaskList;
pub use models::{Task, TaskId};
pub use store::TaskStore;
pub use utils::Profile;
