pub mod attendance;
pub mod payload;
pub mod requests;
pub mod responses;
pub mod session;
pub mod user;
