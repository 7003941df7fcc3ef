// HTTP surface consumed by the request layer
pub mod handler;
pub mod models;
