//! hunter-server — Remote tool surface for the Protein-Hunter design
//! pipelines.
//!
//! The server wires two [`hunter_engine::DesignEngine`]s (Boltz and Chai,
//! sharing one GPU admission gate) into a named tool registry and serves
//! it over stdio or HTTP.

pub mod config;
pub mod resources;
pub mod rpc;
pub mod tools;
