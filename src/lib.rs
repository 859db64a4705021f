pub mod audio;
pub mod codec;
pub mod commands;
pub mod connection;
pub mod error;
pub mod frame;
pub mod server;
pub mod store;
pub mod streamer;
pub mod tokenizer;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Result<T> = std::result::Result<T, Error>;
