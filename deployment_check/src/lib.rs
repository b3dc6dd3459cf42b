mod verify;

pub mod config;

pub use verify::run;
