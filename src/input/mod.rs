pub mod extractor;
pub mod file_tailer;

pub use extractor::{read_tail_lines, FailedLoginExtractor, TAIL_WINDOW_LINES};
pub use file_tailer::FileTailer;
