pub mod config;
pub mod nodes;
pub mod query;
pub mod store;
pub mod utils;

pub use config::{handle_config_command, ConfigCommands};
pub use nodes::{handle_nodes_command, NodesCommands};
pub use query::{handle_query_command, QueryArgs};
pub use store::{handle_store_command, StoreCommands};
