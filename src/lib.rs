pub mod config;
pub mod event;
pub mod logging;
pub mod platforms;
pub mod publish;
pub mod session;
pub mod web;
