// ── Domain model ──
//
// Validated channel addresses and parsed state replies.

use std::fmt;

use serde::Serialize;

use crate::error::{CoreError, SendError};

/// Number of addressable DMX channels on one engine.
pub const CHANNEL_COUNT: u16 = 512;

/// A DMX channel number in `0..512`.
///
/// Only constructible through validation, so every `Channel` in a command is
/// known to be in range before any network I/O happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Channel(u16);

impl Channel {
    pub fn new(channel: u16) -> Result<Self, CoreError> {
        if channel < CHANNEL_COUNT {
            Ok(Self(channel))
        } else {
            Err(CoreError::WrongChannel { channel })
        }
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for Channel {
    type Error = CoreError;

    fn try_from(channel: u16) -> Result<Self, Self::Error> {
        Self::new(channel)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ── State reply ──────────────────────────────────────────────────────

/// Output level of one channel as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StateReply {
    pub is_on: bool,
    pub brightness: u8,
}

impl StateReply {
    /// Parse `sres,<channel>,<flag>-<brightness>` for `channel`.
    ///
    /// Checks run in wire order: the tag, then the echoed channel, then the
    /// state field. A non-zero flag means on.
    pub fn parse(reply: &str, channel: Channel) -> Result<Self, SendError> {
        let malformed = |reason: String| SendError::MalformedState {
            reply: reply.to_owned(),
            reason,
        };

        let mut fields = reply.trim().split(',');

        let tag = fields.next().unwrap_or_default();
        if tag != "sres" {
            return Err(malformed(format!("expected `sres`, got {tag:?}")));
        }

        let echoed = fields
            .next()
            .ok_or_else(|| malformed("missing channel field".into()))?;
        let echoed: u16 = echoed
            .parse()
            .map_err(|e| malformed(format!("bad channel {echoed:?}: {e}")))?;
        if echoed != channel.get() {
            return Err(malformed(format!(
                "reply is for channel {echoed}, expected {channel}"
            )));
        }

        let state = fields
            .next()
            .ok_or_else(|| malformed("missing state field".into()))?;
        if fields.next().is_some() {
            return Err(malformed("trailing fields".into()));
        }

        let Some((flag, brightness)) = state.split_once('-') else {
            return Err(malformed(format!("state {state:?} is not `<flag>-<brightness>`")));
        };
        let flag: i64 = flag
            .parse()
            .map_err(|e| malformed(format!("bad on/off flag {flag:?}: {e}")))?;
        let brightness: u8 = brightness
            .parse()
            .map_err(|e| malformed(format!("bad brightness {brightness:?}: {e}")))?;

        Ok(Self {
            is_on: flag != 0,
            brightness,
        })
    }
}
