pub mod audit;
pub mod auth;
pub mod cli;
pub mod config;
pub mod errors;
pub mod extraction;
pub mod http;
pub mod listener;
pub mod models;
pub mod oracle;
pub mod pipeline;
pub mod privesc;
pub mod rce;
pub mod reporting;
