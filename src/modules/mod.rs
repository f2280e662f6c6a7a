pub mod audit;
pub mod auth;
pub mod certificates;
pub mod config;
pub mod logs;
pub mod sites;
pub mod system;
pub mod users;
