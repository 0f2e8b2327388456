// ── Command encoding ──
//
// Every operation a light can perform is one `Command` value, encoded to a
// single comma-separated line with no terminator.

use std::fmt::{self, Write as _};
use std::time::Duration;

use ldmx_api::protocol::CONNCHECK_MESSAGE;

use crate::model::Channel;

/// A request the engine understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    TurnOn {
        channel: Channel,
        brightness: Option<u8>,
        transition: Option<Duration>,
    },
    TurnOff {
        channel: Channel,
        transition: Option<Duration>,
    },
    QueryState {
        channel: Channel,
    },
    ConnCheck,
}

impl Command {
    /// Wire form of the command. Transitions are sent as whole milliseconds.
    pub fn encode(&self) -> String {
        match self {
            Self::TurnOn {
                channel,
                brightness,
                transition,
            } => {
                let mut line = format!("on,{channel}");
                if let Some(b) = brightness {
                    let _ = write!(line, ",b{b}");
                }
                push_transition(&mut line, *transition);
                line
            }
            Self::TurnOff {
                channel,
                transition,
            } => {
                let mut line = format!("off,{channel}");
                push_transition(&mut line, *transition);
                line
            }
            Self::QueryState { channel } => format!("sreq,{channel}"),
            Self::ConnCheck => CONNCHECK_MESSAGE.to_owned(),
        }
    }
}

fn push_transition(line: &mut String, transition: Option<Duration>) {
    if let Some(t) = transition {
        let _ = write!(line, ",t{}", t.as_millis());
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
