//! End-to-end tests through the background [`SimulationWorld`] thread.
//!
//! Timing here is real, so assertions poll with generous deadlines
//! instead of counting ticks.

use std::time::{Duration, Instant};

use glam::{Mat4, Vec3};

use tether_core::{BodyConfig, BodyId, Command, Slot};
use tether_engine::{ConfigError, HostEvent, SimConfig, SimulationWorld, SubmitError};
use tether_test_utils::MockEngine;

const DEADLINE: Duration = Duration::from_secs(2);

fn fast_config() -> SimConfig {
    SimConfig {
        max_bodies: 8,
        tick_rate_hz: 240.0,
        ..Default::default()
    }
}

#[test]
fn invalid_config_is_rejected_at_spawn() {
    let config = SimConfig {
        max_bodies: 0,
        ..Default::default()
    };
    let err = SimulationWorld::spawn(Box::new(MockEngine::new()), config).unwrap_err();
    assert_eq!(err, ConfigError::ZeroMaxBodies);
}

#[test]
fn world_reports_ready_then_body_ready() {
    let (world, mut host) =
        SimulationWorld::spawn(Box::new(MockEngine::new()), fast_config()).unwrap();

    assert_eq!(world.recv_event_timeout(DEADLINE), Some(HostEvent::Ready));

    world
        .submit(Command::AddBody {
            body: BodyId(7),
            pose: Mat4::IDENTITY,
            config: BodyConfig::default(),
        })
        .unwrap();

    // Commands apply on owned ticks, so the host must keep handing the
    // frame back while waiting for the slot assignment.
    let deadline = Instant::now() + DEADLINE;
    let mut ready = None;
    while ready.is_none() && Instant::now() < deadline {
        if host.try_acquire() {
            host.release();
        }
        if let Some(HostEvent::BodyReady { body, slot }) = world.poll_event() {
            ready = Some((body, slot));
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(ready, Some((BodyId(7), Slot(0))));
}

#[test]
fn dynamic_body_falls_after_host_authors_its_pose() {
    let (world, mut host) =
        SimulationWorld::spawn(Box::new(MockEngine::new()), fast_config()).unwrap();
    assert_eq!(world.recv_event_timeout(DEADLINE), Some(HostEvent::Ready));

    world
        .submit(Command::AddBody {
            body: BodyId(1),
            pose: Mat4::IDENTITY,
            config: BodyConfig::default(),
        })
        .unwrap();
    let spawn_y = 100.0;
    let spawn = Mat4::from_translation(Vec3::new(0.0, spawn_y, 0.0));
    let deadline = Instant::now() + DEADLINE;

    // Commands apply on owned ticks, so the host must keep handing the
    // frame back while waiting for the slot assignment — and the spawn
    // pose must be authored into the BodyReady frame itself: the sync
    // counter advances on every owned tick, so releasing that frame
    // unauthored forfeits the host's one-tick authoring window.
    let mut slot = None;
    while slot.is_none() && Instant::now() < deadline {
        if host.try_acquire() {
            if let Some(HostEvent::BodyReady { slot: assigned, .. }) =
                world.recv_event_timeout(Duration::from_millis(50))
            {
                host.write_pose(assigned, &spawn);
                slot = Some(assigned);
            }
            host.release();
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    let Some(slot) = slot else {
        panic!("expected BodyReady, got None");
    };

    // Play the host: keep the frames flowing and wait for the
    // published pose to drop below the authored spawn.
    let mut fallen = false;
    while Instant::now() < deadline {
        if host.try_acquire() {
            let y = host.read_pose(slot).w_axis.y;
            if y > 0.0 && y < spawn_y - 1e-3 {
                fallen = true;
            }
            host.release();
            if fallen {
                break;
            }
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    assert!(fallen, "body never fell below its authored spawn pose");
}

#[test]
fn shutdown_refuses_further_commands() {
    let (mut world, _host) =
        SimulationWorld::spawn(Box::new(MockEngine::new()), fast_config()).unwrap();
    assert_eq!(world.recv_event_timeout(DEADLINE), Some(HostEvent::Ready));

    world.shutdown();
    let err = world
        .submit(Command::EnableDebug { enable: true })
        .unwrap_err();
    assert_eq!(err, SubmitError::Shutdown);
}
