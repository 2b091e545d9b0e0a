pub mod aggregate;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod fanout;
pub mod mail;
pub mod pipeline;
pub mod platform;
pub mod policy;
pub mod render;
pub mod report;
pub mod scanner;
pub mod util;
