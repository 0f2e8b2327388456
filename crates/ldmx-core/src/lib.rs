// ldmx-core: Channel-level command layer between ldmx-api and consumers (CLI, integrations).

pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod light;
pub mod model;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::Command;
pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{CoreError, SendError};
pub use light::Light;
pub use model::{Channel, StateReply};

pub use ldmx_api::{ConnectionState, Connector, Error as ConnectionError, TcpConnector};
