pub mod errors;
pub mod db;
pub mod client;
pub mod service;
pub mod client_service;

#[cfg(test)]
mod tests;
