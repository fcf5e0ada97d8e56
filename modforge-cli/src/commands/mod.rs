use std::fmt::Display;

pub mod config;
pub mod generate;

pub use config::*;
pub use generate::*;

pub fn handle_error<E>(error: E)
where
    E: Display,
{
    eprintln!("{error}");
    ::std::process::exit(1);
}
