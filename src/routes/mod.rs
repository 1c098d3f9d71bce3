pub mod attendance;
pub mod event;
pub mod health;
pub mod session;
