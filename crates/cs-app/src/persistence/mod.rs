//! Asynchronous durability for the in-memory history.

mod gateway;

pub use gateway::PersistenceGateway;
