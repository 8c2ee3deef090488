pub mod ports;
pub mod event_bus;
pub mod state;
pub mod timeline;
pub mod staging;
pub mod registry;
pub mod exchange;
pub mod snapshot;
pub mod controller;


pub use controller::ChatController;
pub use exchange::SendOutcome;
