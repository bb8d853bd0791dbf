//! Gitca - fetch server root certificates and trust them in Git.

pub mod cert;
pub mod chain;
pub mod cli;
pub mod doctor;
pub mod error;
pub mod fetch;
pub mod install;
pub mod pathenv;
pub mod platform;
