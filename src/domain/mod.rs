mod item;
mod quality;

pub use item::{is_graduated, ItemKind, ReviewItem, ReviewRecord};
pub(crate) use item::{average_quality, due_after, truncate_history};
pub use quality::Quality;
