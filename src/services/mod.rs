pub mod command_builder;
pub mod logger;
pub mod output_filter;
pub mod process;
pub mod registry;
pub mod request;
pub mod response;
pub mod validation;
