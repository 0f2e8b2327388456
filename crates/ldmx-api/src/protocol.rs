// Wire constants for the Lumize DMX Engine 2 text protocol.
//
// The engine greets every accepted connection with a fixed banner, then
// answers one comma-separated command per exchange. Nothing here knows
// about channels; command encoding lives in `ldmx-core`.

/// Banner the engine writes immediately after accepting a connection.
pub const WELCOME_MESSAGE: &[u8] = b"Lumize DMX Engine v2.0\n";

/// Extra bytes read past the banner length, so an oversized greeting is
/// detected as a mismatch instead of silently truncated.
pub const WELCOME_SLACK: usize = 5;

/// Heartbeat probe command.
pub const CONNCHECK_MESSAGE: &str = "conncheck";

/// Reply the engine sends for a successful command or probe.
pub const OK_REPLY: &str = "ok";

/// Upper bound on a single reply read.
pub const RESPONSE_BUFFER_SIZE: usize = 64;

/// Default TCP port of the engine.
pub const DEFAULT_PORT: u16 = 8056;
