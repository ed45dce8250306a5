pub mod cgi;
pub mod server;
