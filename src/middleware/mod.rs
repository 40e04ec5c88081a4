pub mod admin;
pub mod cors;
pub mod rate_limit;
pub mod session;
