pub mod comment;
pub mod library;
pub mod loaders;
pub mod post;
pub mod task;

pub use comment::{CommentData, RawCommentRecord, ReplyData};
pub use library::{ContainerEntry, ContainerLibrary, PersistedOperation};
pub use loaders::{load_all_task_files, load_container_library, save_container_library};
pub use post::{CaptureStats, CapturedPost, PostData};
pub use task::CaptureTask;
