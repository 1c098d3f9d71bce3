pub mod code_generator;
pub mod rate_limiter;
