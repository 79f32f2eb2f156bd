//! Deterministic end-to-end tests driving a [`TickEngine`] directly,
//! with the host side of the buffer played by the test.

use glam::{Mat4, Vec3};

use tether_buffer::{ExchangeBuffer, HostBuffer, CONTACT_SLOTS};
use tether_core::{
    BodyConfig, BodyHandle, BodyId, BodyKind, BodyUpdate, Command, ConstraintId, Geometry,
    GeometryPart, ShapeConfig, ShapeSetId, Slot,
};
use tether_engine::{HostEvent, TickEngine, TickOutcome};
use tether_test_utils::{MockEngine, SharedMockEngine};

const DT: f32 = 0.1;

fn world(max_bodies: u32, gravity: Vec3) -> (TickEngine, HostBuffer, SharedMockEngine) {
    let mock = SharedMockEngine::new(MockEngine::with_gravity(gravity));
    let (sim, host) = ExchangeBuffer::shared(max_bodies);
    (TickEngine::new(Box::new(mock.clone()), sim), host, mock)
}

fn step(engine: &mut TickEngine) {
    assert_eq!(
        engine.execute_tick(DT),
        TickOutcome::Stepped {
            tick: engine.tick()
        },
        "tick should not be skipped"
    );
}

/// Run one tick and immediately hand the frame back.
fn step_and_ack(engine: &mut TickEngine, host: &mut HostBuffer) {
    step(engine);
    assert!(host.try_acquire());
    host.release();
}

fn add_body(id: u64, kind: BodyKind) -> Command {
    Command::AddBody {
        body: BodyId(id),
        pose: Mat4::IDENTITY,
        config: BodyConfig {
            kind,
            ..Default::default()
        },
    }
}

fn body_ready_slots(events: &[HostEvent]) -> Vec<(BodyId, Slot)> {
    events
        .iter()
        .filter_map(|e| match e {
            HostEvent::BodyReady { body, slot } => Some((*body, *slot)),
            HostEvent::Ready => None,
        })
        .collect()
}

fn translation(pose: &Mat4) -> Vec3 {
    pose.w_axis.truncate()
}

fn unit_geometry() -> Geometry {
    Geometry {
        parts: vec![GeometryPart {
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            indices: vec![0, 1, 2],
            transform: Mat4::IDENTITY,
        }],
        world_transform: Mat4::IDENTITY,
    }
}

#[test]
fn skipped_tick_while_host_holds_the_frame() {
    let (mut engine, mut host, _) = world(2, Vec3::ZERO);
    step(&mut engine);
    // Host has not released; the next tick must skip, not wait.
    assert_eq!(engine.execute_tick(DT), TickOutcome::Skipped);
    assert!(host.try_acquire());
    host.release();
    step(&mut engine);
}

#[test]
fn capacity_overflow_rejects_without_corrupting_slots() {
    let (mut engine, mut host, _) = world(1, Vec3::ZERO);
    engine.submit(add_body(1, BodyKind::Dynamic));
    engine.submit(add_body(2, BodyKind::Dynamic));
    step_and_ack(&mut engine, &mut host);

    let ready = body_ready_slots(&engine.take_events());
    assert_eq!(ready, vec![(BodyId(1), Slot(0))]);
    assert_eq!(engine.bodies().len(), 1);
    assert!(!engine.bodies().contains(BodyId(2)));
    // The overflow add is dropped, not retried.
    assert_eq!(engine.pending_commands(), 0);

    // Removing the occupant frees the slot for the next add.
    engine.submit(Command::RemoveBody { body: BodyId(1) });
    step_and_ack(&mut engine, &mut host);
    engine.submit(add_body(3, BodyKind::Dynamic));
    step_and_ack(&mut engine, &mut host);
    let ready = body_ready_slots(&engine.take_events());
    assert_eq!(ready, vec![(BodyId(3), Slot(0))]);
}

#[test]
fn deferred_commands_apply_in_arrival_order_after_dependency() {
    let (mut engine, mut host, mock) = world(2, Vec3::ZERO);
    engine.submit(add_body(1, BodyKind::Dynamic));
    step_and_ack(&mut engine, &mut host);

    // Assign-then-detach queued before the shape set exists; both hold
    // until it does. Applied in arrival order the body ends bare;
    // reversed, it would end with the set attached.
    engine.submit(Command::SetShapes {
        bodies: vec![BodyId(1)],
        shapes: ShapeSetId(10),
    });
    engine.submit(Command::RemoveShapes {
        body: BodyId(1),
        shapes: ShapeSetId(10),
    });
    step_and_ack(&mut engine, &mut host);
    assert_eq!(engine.pending_commands(), 2, "both defer until the set exists");

    // The create arrived after the pair, so it applies one tick ahead
    // of them.
    engine.submit(Command::CreateShapes {
        shapes: ShapeSetId(10),
        geometry: unit_geometry(),
        config: ShapeConfig::default(),
    });
    step_and_ack(&mut engine, &mut host);
    assert!(engine.shapes().contains(ShapeSetId(10)));
    assert_eq!(engine.pending_commands(), 2);

    step_and_ack(&mut engine, &mut host);
    assert_eq!(engine.pending_commands(), 0);
    let set = engine.shapes().get(ShapeSetId(10)).unwrap();
    assert!(set.attached.is_empty(), "attach must land before detach");
    assert!(mock.lock().attached_shapes(BodyHandle(1)).is_empty());
    // The shared set itself survives the detach.
    assert_eq!(mock.lock().shape_count(), 1);
}

#[test]
fn stale_remove_of_an_unknown_body_is_dropped() {
    let (mut engine, mut host, _) = world(2, Vec3::ZERO);

    // Remove issued before the body ever exists.
    engine.submit(Command::RemoveBody { body: BodyId(5) });
    step_and_ack(&mut engine, &mut host);
    assert_eq!(engine.pending_commands(), 0, "unknown remove must not defer");

    // A later body reusing the id must not be destroyed by it.
    engine.submit(add_body(5, BodyKind::Dynamic));
    step_and_ack(&mut engine, &mut host);
    step_and_ack(&mut engine, &mut host);
    assert!(engine.bodies().contains(BodyId(5)));
}

#[test]
fn update_for_an_unknown_body_is_dropped() {
    let (mut engine, mut host, _) = world(2, Vec3::ZERO);
    engine.submit(Command::UpdateBody {
        body: BodyId(5),
        update: BodyUpdate {
            mass: Some(3.0),
            ..Default::default()
        },
    });
    step_and_ack(&mut engine, &mut host);
    assert_eq!(engine.pending_commands(), 0, "unknown update must not defer");

    engine.submit(add_body(5, BodyKind::Dynamic));
    step_and_ack(&mut engine, &mut host);
    let entry = engine.bodies().get(BodyId(5)).unwrap();
    assert_eq!(entry.config.mass, 1.0, "stale delta must not reach the new body");
}

#[test]
fn unknown_destructive_commands_drop_instead_of_deferring() {
    let (mut engine, mut host, _) = world(2, Vec3::ZERO);
    engine.submit(Command::RemoveConstraint {
        constraint: ConstraintId(9),
    });
    engine.submit(Command::DestroyShapes {
        shapes: ShapeSetId(9),
    });
    step_and_ack(&mut engine, &mut host);
    assert_eq!(engine.pending_commands(), 0);
}

#[test]
fn spawn_echoes_host_pose_then_steps_from_it() {
    let (mut engine, mut host, _) = world(4, Vec3::new(0.0, -10.0, 0.0));
    engine.submit(add_body(1, BodyKind::Dynamic));

    // Tick 1: the body is registered; its record is left for the host.
    step(&mut engine);
    let ready = body_ready_slots(&engine.take_events());
    assert_eq!(ready.len(), 1);
    let slot = ready[0].1;

    // Host authors the spawn pose.
    let spawn = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
    assert!(host.try_acquire());
    host.write_pose(slot, &spawn);
    host.release();

    // Tick 2: the spawn pose comes back exactly as authored, at rest.
    step(&mut engine);
    assert!(host.try_acquire());
    assert_eq!(
        host.read_pose(slot),
        spawn,
        "spawn pose must be echoed unmodified"
    );
    assert_eq!(host.read_speeds(slot), (0.0, 0.0));
    host.release();

    // Tick 3: the first engine-driven frame is exactly one step away.
    step(&mut engine);
    assert!(host.try_acquire());
    let published = translation(&host.read_pose(slot));
    let expected = Vec3::new(1.0, 2.0 - 10.0 * DT * DT, 3.0);
    assert!(
        (published - expected).length() < 1e-4,
        "expected {expected}, got {published}"
    );
    let (linear, _) = host.read_speeds(slot);
    assert!((linear - 10.0 * DT).abs() < 1e-4);
    host.release();

    // Tick 4: plain engine-driven motion continues downward.
    step(&mut engine);
    assert!(host.try_acquire());
    let next = translation(&host.read_pose(slot));
    assert!(next.y < published.y);
    host.release();
}

#[test]
fn static_body_keeps_host_pose_while_dynamic_falls() {
    let (mut engine, mut host, _) = world(4, Vec3::new(0.0, -10.0, 0.0));
    engine.submit(add_body(1, BodyKind::Static));
    engine.submit(add_body(2, BodyKind::Dynamic));
    step(&mut engine);

    let ready = body_ready_slots(&engine.take_events());
    assert_eq!(ready.len(), 2);
    let (static_slot, dynamic_slot) = (ready[0].1, ready[1].1);

    let floor = Mat4::from_translation(Vec3::new(0.0, -1.0, 0.0));
    let spawn = Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0));
    assert!(host.try_acquire());
    host.write_pose(static_slot, &floor);
    host.write_pose(dynamic_slot, &spawn);
    host.release();

    for _ in 0..3 {
        step_and_ack(&mut engine, &mut host);
    }
    step(&mut engine);

    assert!(host.try_acquire());
    // Static record is never overwritten by the simulation side.
    assert_eq!(host.read_pose(static_slot), floor);
    // Dynamic record has fallen below its spawn height.
    assert!(translation(&host.read_pose(dynamic_slot)).y < 5.0);
    host.release();
}

#[test]
fn reset_restarts_handover_and_echoes_host_pose() {
    let (mut engine, mut host, _) = world(2, Vec3::new(0.0, -10.0, 0.0));
    engine.submit(add_body(1, BodyKind::Dynamic));
    step(&mut engine);
    let slot = body_ready_slots(&engine.take_events())[0].1;

    assert!(host.try_acquire());
    host.write_pose(slot, &Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0)));
    host.release();
    // Complete the handover and fall for a couple of ticks.
    for _ in 0..3 {
        step_and_ack(&mut engine, &mut host);
    }

    // Host re-authors the pose, then asks for the reset. Both handover
    // ticks that follow must echo the re-authored pose instead of
    // clobbering it with the engine's.
    let teleport = Mat4::from_translation(Vec3::new(9.0, 9.0, 9.0));
    step(&mut engine);
    assert!(host.try_acquire());
    host.write_pose(slot, &teleport);
    host.release();
    engine.submit(Command::ResetDynamicBody { body: BodyId(1) });
    step(&mut engine);

    assert!(host.try_acquire());
    assert_eq!(host.read_pose(slot), teleport, "authoring tick must not clobber");
    let contacts = host.read_contacts(slot);
    assert!(contacts.iter().all(|&c| c == -1));
    host.release();

    // Adopt tick: still the echo, now landed in the engine at rest.
    step(&mut engine);
    assert!(host.try_acquire());
    assert_eq!(host.read_pose(slot), teleport, "adopt tick must not clobber");
    host.release();

    // Engine-driven again: falling resumes exactly one step from the
    // teleport pose.
    step(&mut engine);
    assert!(host.try_acquire());
    let resumed = translation(&host.read_pose(slot));
    assert!((resumed.x - 9.0).abs() < 1e-4);
    let expected_y = 9.0 - 10.0 * DT * DT;
    assert!((resumed.y - expected_y).abs() < 1e-4);
    host.release();
}

#[test]
fn contacting_bodies_cross_reference_slots() {
    let (mut engine, mut host, mock) = world(4, Vec3::ZERO);
    engine.submit(add_body(1, BodyKind::Dynamic));
    engine.submit(add_body(2, BodyKind::Dynamic));
    engine.submit(add_body(3, BodyKind::Dynamic));
    step_and_ack(&mut engine, &mut host);
    let ready = body_ready_slots(&engine.take_events());
    assert_eq!(ready.len(), 3);

    // Mock handles are issued in add order.
    let (a, b) = (BodyHandle(1), BodyHandle(2));
    mock.lock().set_contacts(a, vec![b]);
    mock.lock().set_contacts(b, vec![a]);

    // Finish the sync handover, then one steady-state tick.
    step_and_ack(&mut engine, &mut host);
    step(&mut engine);

    assert!(host.try_acquire());
    let slot_of = |id: u64| {
        ready
            .iter()
            .find(|(body, _)| *body == BodyId(id))
            .map(|(_, slot)| *slot)
            .unwrap()
    };
    let contacts_a = host.read_contacts(slot_of(1));
    let contacts_b = host.read_contacts(slot_of(2));
    let contacts_c = host.read_contacts(slot_of(3));
    assert_eq!(contacts_a[0], slot_of(2).0 as i32);
    assert!(contacts_a[1..].iter().all(|&c| c == -1));
    assert_eq!(contacts_b[0], slot_of(1).0 as i32);
    assert!(contacts_c.iter().all(|&c| c == -1), "contact-free body publishes -1");
    host.release();
}

#[test]
fn contacts_beyond_the_record_are_truncated() {
    let (mut engine, mut host, mock) = world(16, Vec3::ZERO);
    for id in 1..=11 {
        engine.submit(add_body(id, BodyKind::Dynamic));
    }
    step_and_ack(&mut engine, &mut host);
    assert_eq!(engine.bodies().len(), 11);

    let peers: Vec<BodyHandle> = (2..=11).map(BodyHandle).collect();
    mock.lock().set_contacts(BodyHandle(1), peers);

    step_and_ack(&mut engine, &mut host);
    step(&mut engine);

    assert!(host.try_acquire());
    let contacts = host.read_contacts(Slot(0));
    assert_eq!(contacts.len(), CONTACT_SLOTS);
    assert!(contacts.iter().all(|&c| c != -1), "all lanes filled");
    // First eight peers in engine order: slots 1..=8.
    assert_eq!(contacts, [1, 2, 3, 4, 5, 6, 7, 8]);
    host.release();
}

#[test]
fn destroy_shapes_detaches_from_every_referencing_body() {
    let (mut engine, mut host, mock) = world(4, Vec3::ZERO);
    engine.submit(add_body(1, BodyKind::Dynamic));
    engine.submit(add_body(2, BodyKind::Dynamic));
    engine.submit(Command::CreateShapes {
        shapes: ShapeSetId(10),
        geometry: unit_geometry(),
        config: ShapeConfig::default(),
    });
    engine.submit(Command::SetShapes {
        bodies: vec![BodyId(1), BodyId(2)],
        shapes: ShapeSetId(10),
    });
    step_and_ack(&mut engine, &mut host);

    assert!(engine.shapes().contains(ShapeSetId(10)));
    assert_eq!(mock.lock().attached_shapes(BodyHandle(1)).len(), 1);
    assert_eq!(mock.lock().attached_shapes(BodyHandle(2)).len(), 1);

    engine.submit(Command::DestroyShapes {
        shapes: ShapeSetId(10),
    });
    step_and_ack(&mut engine, &mut host);

    assert!(!engine.shapes().contains(ShapeSetId(10)));
    assert!(mock.lock().attached_shapes(BodyHandle(1)).is_empty());
    assert!(mock.lock().attached_shapes(BodyHandle(2)).is_empty());
    assert_eq!(mock.lock().shape_count(), 0);
}

#[test]
fn remove_body_destroys_its_exclusive_shapes_only() {
    let (mut engine, mut host, mock) = world(4, Vec3::ZERO);
    engine.submit(add_body(1, BodyKind::Dynamic));
    engine.submit(add_body(2, BodyKind::Dynamic));
    step_and_ack(&mut engine, &mut host);

    engine.submit(Command::AddShapes {
        body: BodyId(1),
        shapes: ShapeSetId(10),
        geometry: unit_geometry(),
        config: ShapeConfig::default(),
    });
    engine.submit(Command::CreateShapes {
        shapes: ShapeSetId(20),
        geometry: unit_geometry(),
        config: ShapeConfig::default(),
    });
    engine.submit(Command::SetShapes {
        bodies: vec![BodyId(1), BodyId(2)],
        shapes: ShapeSetId(20),
    });
    step_and_ack(&mut engine, &mut host);
    assert_eq!(mock.lock().shape_count(), 2);

    engine.submit(Command::RemoveBody { body: BodyId(1) });
    step_and_ack(&mut engine, &mut host);

    // Exclusive set died with the body; the shared set lives on.
    assert!(!engine.shapes().contains(ShapeSetId(10)));
    assert!(engine.shapes().contains(ShapeSetId(20)));
    assert_eq!(mock.lock().shape_count(), 1);
    assert_eq!(mock.lock().attached_shapes(BodyHandle(2)).len(), 1);
    assert_eq!(engine.bodies().len(), 1);
}

#[test]
fn remove_shapes_on_exclusive_owner_destroys_the_set() {
    let (mut engine, mut host, mock) = world(2, Vec3::ZERO);
    engine.submit(add_body(1, BodyKind::Dynamic));
    step_and_ack(&mut engine, &mut host);
    engine.submit(Command::AddShapes {
        body: BodyId(1),
        shapes: ShapeSetId(10),
        geometry: unit_geometry(),
        config: ShapeConfig::default(),
    });
    step_and_ack(&mut engine, &mut host);
    assert_eq!(mock.lock().shape_count(), 1);

    engine.submit(Command::RemoveShapes {
        body: BodyId(1),
        shapes: ShapeSetId(10),
    });
    step_and_ack(&mut engine, &mut host);
    assert!(!engine.shapes().contains(ShapeSetId(10)));
    assert_eq!(mock.lock().shape_count(), 0);
    assert!(mock.lock().attached_shapes(BodyHandle(1)).is_empty());
}

#[test]
fn removing_a_body_purges_its_pending_commands() {
    let (mut engine, mut host, _) = world(2, Vec3::ZERO);
    engine.submit(add_body(1, BodyKind::Dynamic));
    step_and_ack(&mut engine, &mut host);

    // Blocked on a shape set that does not exist yet.
    engine.submit(Command::SetShapes {
        bodies: vec![BodyId(1)],
        shapes: ShapeSetId(10),
    });
    step_and_ack(&mut engine, &mut host);
    assert_eq!(engine.pending_commands(), 1);

    engine.submit(Command::RemoveBody { body: BodyId(1) });
    step_and_ack(&mut engine, &mut host);
    assert_eq!(engine.pending_commands(), 0, "stale command must be purged");

    // The set arriving later must not resurrect the assignment.
    engine.submit(Command::CreateShapes {
        shapes: ShapeSetId(10),
        geometry: unit_geometry(),
        config: ShapeConfig::default(),
    });
    step_and_ack(&mut engine, &mut host);
    let set = engine.shapes().get(ShapeSetId(10)).unwrap();
    assert!(set.attached.is_empty());
}

#[test]
fn constraints_are_removed_with_either_body() {
    let (mut engine, mut host, mock) = world(4, Vec3::ZERO);
    engine.submit(add_body(1, BodyKind::Dynamic));
    engine.submit(add_body(2, BodyKind::Dynamic));
    engine.submit(Command::AddConstraint {
        constraint: ConstraintId(1),
        body: BodyId(1),
        target: BodyId(2),
        kind: Default::default(),
    });
    step_and_ack(&mut engine, &mut host);
    assert_eq!(engine.constraints().len(), 1);
    assert_eq!(mock.lock().constraint_count(), 1);

    engine.submit(Command::RemoveBody { body: BodyId(2) });
    step_and_ack(&mut engine, &mut host);
    assert!(engine.constraints().is_empty());
    assert_eq!(mock.lock().constraint_count(), 0);
}

#[test]
fn transfer_transport_round_trips_the_same_protocol() {
    let mock = SharedMockEngine::new(MockEngine::with_gravity(Vec3::new(0.0, -10.0, 0.0)));
    let (sim, mut host) = ExchangeBuffer::transfer(2);
    let mut engine = TickEngine::new(Box::new(mock), sim);

    engine.submit(add_body(1, BodyKind::Dynamic));
    step(&mut engine);
    let slot = body_ready_slots(&engine.take_events())[0].1;

    assert!(host.try_acquire());
    let spawn = Mat4::from_translation(Vec3::new(0.0, 4.0, 0.0));
    host.write_pose(slot, &spawn);
    host.release();

    // Echo frame, then the first engine-driven frame.
    step(&mut engine);
    assert!(host.try_acquire());
    assert_eq!(host.read_pose(slot), spawn);
    host.release();

    step(&mut engine);
    assert!(host.try_acquire());
    let published = translation(&host.read_pose(slot));
    assert!((published.y - (4.0 - 10.0 * DT * DT)).abs() < 1e-4);
    host.release();
}
