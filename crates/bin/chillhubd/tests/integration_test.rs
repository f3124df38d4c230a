//! End-to-end smoke tests for the full chillhubd stack.
//!
//! Each test wires a simulated appliance through the real setup flow, the
//! real coordinator, and the real poller — no TCP is involved, and paused
//! tokio time keeps the poll schedule deterministic.

use std::time::Duration;

use chillhub_adapter_virtual::SimulatedAc;
use chillhub_app::ports::DeviceTransport;
use chillhub_app::poller;
use chillhub_app::setup::{SetupOutcome, setup_device};
use chillhub_domain::capability::{CapabilitySet, OperationalMode, ValueCode};
use chillhub_domain::device::Credentials;
use chillhub_domain::entity_config::SwitchProperty;
use chillhub_domain::error::DeviceError;

async fn healthy_setup() -> (SimulatedAc, SetupOutcome<SimulatedAc>) {
    let unit = SimulatedAc::builder()
        .latency(Duration::from_millis(5))
        .build();
    let outcome = setup_device(unit.clone(), None)
        .await
        .expect("healthy simulated unit should set up");
    (unit, outcome)
}

// ---------------------------------------------------------------------------
// Setup flow
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn should_set_up_and_resolve_entities() {
    let (_, outcome) = healthy_setup().await;

    assert_eq!(
        outcome.entities.climate.hvac_modes,
        vec!["off", "auto", "cool", "dry", "heat", "fan_only"]
    );
    assert!(outcome.entities.climate.fan_modes.contains(&"auto".to_string()));
    // The default unit has no purifier; only the display switch resolves.
    assert_eq!(outcome.entities.switches.len(), 1);
    assert_eq!(
        outcome.entities.switches[0].property,
        SwitchProperty::Display
    );
}

#[tokio::test(start_paused = true)]
async fn should_resolve_purifier_switch_for_two_mode_unit() {
    let unit = SimulatedAc::builder()
        .capabilities(CapabilitySet {
            purifier_modes: vec![ValueCode::new(1, "On"), ValueCode::new(2, "Off")],
            ..CapabilitySet::default()
        })
        .latency(Duration::from_millis(5))
        .build();

    let outcome = setup_device(unit, None).await.unwrap();
    let purifier = outcome
        .entities
        .switches
        .iter()
        .find(|s| s.property == SwitchProperty::Purifier)
        .expect("two purifier modes should resolve to a switch");
    assert_eq!(purifier.on_code, 1);
    assert_eq!(purifier.off_code, 2);
}

#[tokio::test(start_paused = true)]
async fn should_authenticate_before_first_read() {
    let credentials = Credentials::from_hex("a1b2c3d4", "0011ff").unwrap();
    let unit = SimulatedAc::builder()
        .credentials(credentials.clone())
        .latency(Duration::from_millis(5))
        .build();

    let outcome = setup_device(unit.clone(), Some(&credentials)).await;
    assert!(outcome.is_ok());
    assert_eq!(unit.auth_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn should_classify_rejected_handshake_as_invalid_auth() {
    let unit = SimulatedAc::builder()
        .credentials(Credentials::from_hex("a1b2", "c3d4").unwrap())
        .latency(Duration::from_millis(5))
        .build();
    let wrong = Credentials::from_hex("dead", "beef").unwrap();

    let err = setup_device(unit.clone(), Some(&wrong)).await.unwrap_err();
    assert_eq!(err.reason(), "invalid_auth");
    // A failed handshake must abort before the first state read.
    assert_eq!(unit.read_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn should_classify_offline_device_as_cannot_connect() {
    let unit = SimulatedAc::builder()
        .offline()
        .latency(Duration::from_millis(5))
        .build();

    let err = setup_device(unit, None).await.unwrap_err();
    assert_eq!(err.reason(), "cannot_connect");
}

#[tokio::test(start_paused = true)]
async fn should_classify_unrecognised_model_as_unsupported() {
    let unit = SimulatedAc::builder()
        .unsupported()
        .latency(Duration::from_millis(5))
        .build();

    let err = setup_device(unit, None).await.unwrap_err();
    assert_eq!(err.reason(), "unsupported_device");
}

// ---------------------------------------------------------------------------
// Coordinator + poller against the simulated transport
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn should_poll_and_pick_up_out_of_band_changes() {
    let (unit, outcome) = healthy_setup().await;
    let coordinator = outcome.coordinator;

    // Someone hits the unit with an IR handset between polls.
    let mut changed = unit.device_state();
    changed.power = true;
    changed.mode = OperationalMode::Heat.code();
    unit.set_device_state(changed.clone());

    let poller = poller::start(coordinator.clone(), Duration::from_secs(30));
    tokio::time::sleep(Duration::from_secs(31)).await;
    poller.shutdown().await;

    assert_eq!(coordinator.state().await, changed);
}

#[tokio::test(start_paused = true)]
async fn should_keep_polling_after_a_transient_failure() {
    let (unit, outcome) = healthy_setup().await;
    let reads_after_setup = unit.read_calls();
    unit.script_read_failures(1);

    let poller = poller::start(outcome.coordinator, Duration::from_secs(30));
    tokio::time::sleep(Duration::from_secs(65)).await;
    poller.shutdown().await;

    // First tick failed, second succeeded; both reached the device.
    assert_eq!(unit.read_calls() - reads_after_setup, 2);
}

#[tokio::test(start_paused = true)]
async fn should_apply_changes_and_update_the_cache_from_the_ack() {
    let (unit, outcome) = healthy_setup().await;
    let coordinator = outcome.coordinator;

    coordinator
        .apply(|state| {
            state.power = true;
            state.mode = OperationalMode::Cool.code();
            state.target_temperature = 22.0;
        })
        .await
        .unwrap();

    let cached = coordinator.state().await;
    assert!(cached.power);
    assert_eq!(cached.target_temperature, 22.0);
    assert_eq!(unit.device_state(), cached);
}

#[tokio::test(start_paused = true)]
async fn should_reject_out_of_capability_values_without_io() {
    let (unit, outcome) = healthy_setup().await;
    let writes_before = unit.write_calls();

    let err = outcome
        .coordinator
        .apply(|state| state.target_temperature = 35.0)
        .await
        .unwrap_err();

    assert!(matches!(err, DeviceError::Validation(_)));
    assert_eq!(unit.write_calls(), writes_before);
}

#[tokio::test(start_paused = true)]
async fn should_serialise_poll_and_apply_without_violations() {
    let (unit, outcome) = healthy_setup().await;
    let coordinator = outcome.coordinator;

    let poller = poller::start(coordinator.clone(), Duration::from_secs(1));
    for n in 0..10u8 {
        tokio::time::sleep(Duration::from_millis(300)).await;
        coordinator
            .apply(|state| state.target_temperature = 18.0 + f32::from(n % 5))
            .await
            .unwrap();
    }
    poller.shutdown().await;

    // Every conversation went through the coordinator's lock.
    assert!(unit.read_calls() > 0);
    assert_eq!(unit.write_calls(), 10);

    let mut direct = unit.device_state();
    direct.beep = false;
    unit.set_device_state(direct);
    // The session itself is still healthy after the mixed load.
    assert!(DeviceTransport::read_state(&unit).await.is_ok());
}
