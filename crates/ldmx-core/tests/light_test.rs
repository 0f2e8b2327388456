#![allow(clippy::unwrap_used)]
// Light and Engine tests against scripted engine streams.
//
// Each `tokio_test::io::Mock` asserts the exact bytes written and panics on
// drop if part of its script was not consumed.

use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio_test::io::{Builder, Mock};

use ldmx_api::protocol::WELCOME_MESSAGE;
use ldmx_core::{Connector, CoreError, Engine, EngineConfig, SendError, StateReply};

// ── Helpers ─────────────────────────────────────────────────────────

/// Hands out one scripted stream per connect; refuses once the queue is empty.
#[derive(Default)]
struct ScriptedConnector {
    streams: Mutex<VecDeque<Mock>>,
}

impl Connector for ScriptedConnector {
    type Stream = Mock;

    fn connect(
        &self,
        _host: &str,
        _port: u16,
    ) -> impl std::future::Future<Output = io::Result<Mock>> + Send {
        let next = self.streams.lock().unwrap().pop_front();
        async move { next.ok_or_else(|| io::Error::from(io::ErrorKind::ConnectionRefused)) }
    }
}

/// A session that greets, then expects `command` and answers `reply`.
fn session(command: &str, reply: &str) -> Mock {
    Builder::new()
        .read(WELCOME_MESSAGE)
        .write(command.as_bytes())
        .read(reply.as_bytes())
        .build()
}

async fn engine_with(streams: Vec<Mock>) -> Engine<ScriptedConnector> {
    let connector = ScriptedConnector {
        streams: Mutex::new(streams.into()),
    };
    let engine = Engine::with_connector(EngineConfig::new("dmx.lan", 8056), connector);
    engine.start().await;
    engine
}

// ── Channel addressing ──────────────────────────────────────────────

#[tokio::test]
async fn test_out_of_range_channel_is_rejected() {
    let engine = Engine::with_connector(EngineConfig::default(), ScriptedConnector::default());

    let err = engine.light(512).unwrap_err();
    assert!(matches!(err, CoreError::WrongChannel { channel: 512 }));
    assert!(engine.light(u16::MAX).is_err());

    assert_eq!(engine.light(0).unwrap().channel().get(), 0);
    assert_eq!(engine.light(511).unwrap().channel().get(), 511);

    engine.stop().await;
}

#[tokio::test]
async fn test_unique_id_combines_host_and_channel() {
    let engine = Engine::with_connector(
        EngineConfig::new("dmx.lan", 8056),
        ScriptedConnector::default(),
    );
    assert_eq!(engine.light(5).unwrap().unique_id(), "dmx.lan-5");
}

// ── On / off ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_turn_on_sends_brightness_and_transition() {
    let engine = engine_with(vec![session("on,3,b128,t2000", "ok\n")]).await;
    let light = engine.light(3).unwrap();

    light
        .turn_on(Some(128), Some(Duration::from_secs(2)))
        .await
        .unwrap();

    engine.stop().await;
}

#[tokio::test]
async fn test_turn_on_rejects_non_ok_reply() {
    let engine = engine_with(vec![session("on,3", "err")]).await;
    let light = engine.light(3).unwrap();

    let err = light.turn_on(None, None).await.unwrap_err();
    match err {
        SendError::UnexpectedReply { command, reply } => {
            assert_eq!(command, "on,3");
            assert_eq!(reply, "err");
        }
        other => panic!("expected UnexpectedReply, got {other:?}"),
    }

    engine.stop().await;
}

#[tokio::test]
async fn test_turn_off_with_transition() {
    let engine = engine_with(vec![session("off,42,t500", "ok")]).await;

    engine
        .light(42)
        .unwrap()
        .turn_off(Some(Duration::from_millis(500)))
        .await
        .unwrap();

    engine.stop().await;
}

#[tokio::test]
async fn test_unreachable_engine_yields_send_error() {
    let engine = engine_with(vec![]).await;
    let light = engine.light(1).unwrap();

    assert!(!light.is_available());
    let err = light.turn_off(None).await.unwrap_err();
    assert!(err.is_connection(), "expected connection error, got {err:?}");

    engine.stop().await;
}

// ── State queries ───────────────────────────────────────────────────

#[tokio::test]
async fn test_get_state_parses_reply() {
    let engine = engine_with(vec![session("sreq,7", "sres,7,1-200")]).await;

    let state = engine.light(7).unwrap().get_state().await.unwrap();
    assert_eq!(
        state,
        StateReply {
            is_on: true,
            brightness: 200
        }
    );

    engine.stop().await;
}

#[tokio::test]
async fn test_get_state_rejects_other_channel() {
    let engine = engine_with(vec![session("sreq,7", "sres,8,1-200")]).await;

    let err = engine.light(7).unwrap().get_state().await.unwrap_err();
    assert!(matches!(err, SendError::MalformedState { .. }));

    engine.stop().await;
}

#[tokio::test]
async fn test_get_state_rejects_garbage_state() {
    let engine = engine_with(vec![session("sreq,7", "sres,7,xyz")]).await;

    let err = engine.light(7).unwrap().get_state().await.unwrap_err();
    assert!(matches!(err, SendError::MalformedState { .. }));

    engine.stop().await;
}

#[tokio::test]
async fn test_get_state_survives_one_dropped_connection() {
    let broken = Builder::new()
        .read(WELCOME_MESSAGE)
        .write(b"sreq,2")
        .read_error(io::Error::from(io::ErrorKind::ConnectionReset))
        .build();
    let engine = engine_with(vec![broken, session("sreq,2", "sres,2,0-0")]).await;
    let light = engine.light(2).unwrap();

    let state = light.get_state().await.unwrap();
    assert!(!state.is_on);
    assert_eq!(state.brightness, 0);
    assert!(light.is_available());

    engine.stop().await;
}

// ── Engine ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_check_and_availability() {
    let engine = engine_with(vec![session("conncheck", "ok")]).await;

    assert!(engine.is_connected());
    assert!(engine.light(10).unwrap().is_available());
    assert!(engine.check().await.unwrap());

    let state = engine.connection_state();
    engine.stop().await;
    assert!(state.has_changed().unwrap());
    assert!(!engine.is_connected());
}

#[tokio::test]
async fn test_lights_share_one_connection() {
    let first = Builder::new()
        .read(WELCOME_MESSAGE)
        .write(b"on,1")
        .read(b"ok")
        .write(b"off,2")
        .read(b"ok")
        .build();
    let engine = engine_with(vec![first]).await;

    engine.light(1).unwrap().turn_on(None, None).await.unwrap();
    engine.light(2).unwrap().turn_off(None).await.unwrap();

    engine.stop().await;
}
