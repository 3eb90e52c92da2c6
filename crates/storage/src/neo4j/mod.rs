//! Neo4j graph database session

pub(crate) mod client;
pub(crate) mod mock;
pub(crate) mod traits;

pub use client::Neo4jClient;
pub use mock::MockGraphSession;
pub use traits::GraphSession;
