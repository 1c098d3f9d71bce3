pub mod scan;
pub mod session;
