pub mod scope;
pub mod tags;
pub mod citation;
pub mod message;
pub mod session;
pub mod filter;
pub mod exchange;
pub mod config;
pub mod event;
pub mod error;


pub use error::ChatError;
pub type Result<T> = std::result::Result<T, ChatError>;
