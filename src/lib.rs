pub mod app;
pub mod channel;
pub mod error;
pub mod gateway;
pub mod http_handler;
pub mod middleware;
pub mod options;
pub mod origin_validation;
pub mod presence;
pub mod protocol;
pub mod server;
pub mod token;
