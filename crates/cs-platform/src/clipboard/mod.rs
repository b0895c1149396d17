mod mapping;
mod system_clipboard;

pub use system_clipboard::RsSystemClipboard;
