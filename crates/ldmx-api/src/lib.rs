// ldmx-api: self-healing async TCP connection to a Lumize DMX Engine 2

pub mod connection;
pub mod error;
pub mod protocol;
pub mod transport;

pub use connection::{Connection, ConnectionState};
pub use error::Error;
pub use transport::{ConnectionConfig, Connector, TcpConnector};
