// Adapters layer: concrete implementations for external systems (documents, storage, console).

pub mod console;
pub mod docx;
pub mod storage;

pub use console::ConsoleInteraction;
pub use storage::LocalStorage;
