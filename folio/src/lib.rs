pub mod commands;

mod cache;
mod email;
mod environment;
