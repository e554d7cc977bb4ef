pub mod file_type;
pub mod serde_helpers;
pub mod text;

pub use file_type::{JsFileKind, detect_file_type};
pub use text::offset_at;
