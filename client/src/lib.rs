#![warn(rust_2018_idioms)]

mod client;
pub mod console;
pub mod remote;
pub mod settings;

pub use client::{run, Stats};
pub use console::Surface;
