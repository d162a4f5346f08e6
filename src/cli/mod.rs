pub mod command;
pub mod extract;
pub mod index;
pub mod info;
pub mod progress;
