pub mod json_loader;
pub mod toml_loader;

pub use json_loader::{load_container_library, save_container_library};
pub use toml_loader::{load_all_task_files, load_toml_to_task};
