pub mod message;
pub mod mode;
pub mod event;
pub mod config;
pub mod error;
pub mod session;
pub mod settings;
pub mod memory;
pub mod mood;
pub mod user;


pub use error::LyoError;
pub type Result<T> = std::result::Result<T, LyoError>;
