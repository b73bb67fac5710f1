#![forbid(unsafe_code)]

pub mod model;
pub mod prompt;
pub mod script;
pub mod sync;
pub mod time;

pub use time::Clock;
