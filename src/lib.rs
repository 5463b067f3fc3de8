pub mod cli;
pub mod collection;
pub mod config;
pub mod errors;
pub mod follow;
pub mod otp;
