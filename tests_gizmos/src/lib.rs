//! Gizmo Scenario Test Utilities
//!
//! Shared setup for the cross-crate scenario tests.
//!
//! ## Test Philosophy
//!
//! - **Host in the loop**: Scenarios drive the registry through the simulated planner
//! - **Deterministic**: No clocks or randomness beyond session ids
//! - **Observable**: `RUST_LOG=gizmo_correction=trace` shows every correction

use core_types::SessionId;
use maneuver_types::MomentumVector;
use services_gizmo_registry::SessionRegistry;
use sim_planner::{KeplerOrbit, SimPlanner};
use std::sync::Once;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Installs a test-writer subscriber once per test binary
///
/// Filter comes from `RUST_LOG`, defaulting to `warn`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Low circular orbit used by most scenarios
pub fn low_orbit() -> KeplerOrbit {
    KeplerOrbit::circular(LOW_ORBIT_RADIUS, LOW_ORBIT_SPEED)
        .unwrap_or_else(|err| panic!("fixture orbit rejected: {err}"))
}

pub const LOW_ORBIT_RADIUS: f64 = 700_000.0;
pub const LOW_ORBIT_SPEED: f64 = 7_000.0;

/// Bootstrap helper for tests
///
/// Opens `count` zero-vector sessions on [`low_orbit`] at epoch 0 and runs one
/// tick so every session already carries its engine and listeners.
pub fn test_bootstrap(count: usize) -> (SimPlanner, SessionRegistry, Vec<SessionId>) {
    init_tracing();

    let mut planner = SimPlanner::new();
    let ids = (0..count)
        .map(|_| planner.open_session(low_orbit(), 0.0, MomentumVector::ZERO))
        .collect();

    let mut registry = SessionRegistry::default();
    registry.tick(&mut planner);

    (planner, registry, ids)
}
