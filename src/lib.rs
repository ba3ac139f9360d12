pub mod aws;
pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod display;
pub mod error;
pub mod params;
pub mod profile;
pub mod source;
pub mod store;

pub use error::{Error, Result};
