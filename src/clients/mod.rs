#[macro_use]
mod macros;
mod address_client;

pub use address_client::*;
