pub mod arguments;
pub mod command;
pub mod config;
pub mod countdown;
pub mod domain;
pub mod infra;
pub mod observer;
pub mod resolver;
mod run;
pub mod session;
pub mod swap;
pub mod util;
pub mod wrap;

pub use run::{run, start};
