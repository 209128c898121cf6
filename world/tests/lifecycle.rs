use bunny_hop_core::{
    Command, Event, GameState, Heading, Instruction, Rejection, TokenHandle, Verdict,
};
use bunny_hop_world::{self as world, default_levels, query, World};
use glam::DVec2;

fn add(world: &mut World, instruction: Instruction) -> Vec<Event> {
    let token = TokenHandle::new(query::program(world).len() as u32);
    let mut events = Vec::new();
    world::apply(world, Command::AddInstruction { instruction, token }, &mut events);
    events
}

fn submit(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

#[test]
fn geometry_partitions_the_grid_for_every_level() {
    let mut world = World::new();
    for index in 0..query::level_count(&world) {
        let _ = submit(&mut world, Command::SelectLevel { index });
        let path = query::path_cells(&world);
        let danger = query::danger_cells(&world);

        assert_eq!(path.len() + danger.len(), query::grid(&world).len());
        assert!(path.iter().all(|cell| !danger.contains(cell)));
    }
}

#[test]
fn instructions_append_until_capacity() {
    let mut world = World::new();
    for _ in 0..query::program_capacity(&world) {
        let events = add(&mut world, Instruction::Forward);
        assert!(matches!(events.as_slice(), [Event::InstructionAdded { .. }]));
    }

    let events = add(&mut world, Instruction::TurnLeft);

    assert_eq!(
        events,
        vec![Event::InstructionRejected {
            instruction: Instruction::TurnLeft,
            reason: Rejection::CapacityExceeded,
        }]
    );
    assert_eq!(query::program(&world).len(), 10);
}

#[test]
fn removal_restores_the_slot_height() {
    let mut world = World::new();
    let before = query::next_slot_height(&world);
    let _ = add(&mut world, Instruction::TurnRight);

    let events = submit(&mut world, Command::RemoveLastInstruction);

    assert_eq!(
        events,
        vec![Event::InstructionRemoved {
            instruction: Instruction::TurnRight,
            token: TokenHandle::new(0),
        }]
    );
    assert!((query::next_slot_height(&world) - before).abs() < 1e-12);
    assert_eq!(
        submit(&mut world, Command::RemoveLastInstruction),
        vec![Event::RemovalRejected {
            reason: Rejection::Empty
        }]
    );
}

#[test]
fn authoring_requires_the_idle_state() {
    let mut world = World::new();
    let _ = add(&mut world, Instruction::Forward);
    let _ = submit(&mut world, Command::StartProgram);
    assert_eq!(query::state(&world), GameState::Running);

    assert_eq!(
        add(&mut world, Instruction::Forward),
        vec![Event::InstructionRejected {
            instruction: Instruction::Forward,
            reason: Rejection::WrongState,
        }]
    );
    assert_eq!(
        submit(&mut world, Command::RemoveLastInstruction),
        vec![Event::RemovalRejected {
            reason: Rejection::WrongState
        }]
    );
    assert_eq!(
        submit(&mut world, Command::StartProgram),
        vec![Event::ProgramRejected {
            reason: Rejection::WrongState
        }]
    );
}

#[test]
fn starting_an_empty_program_is_rejected() {
    let mut world = World::new();

    assert_eq!(
        submit(&mut world, Command::StartProgram),
        vec![Event::ProgramRejected {
            reason: Rejection::Empty
        }]
    );
    assert_eq!(query::state(&world), GameState::Idle);
}

#[test]
fn program_start_snapshots_the_queue() {
    let mut world = World::new();
    let _ = add(&mut world, Instruction::Forward);
    let _ = add(&mut world, Instruction::TurnLeft);

    let events = submit(&mut world, Command::StartProgram);

    assert_eq!(
        events,
        vec![
            Event::StateChanged {
                from: GameState::Idle,
                to: GameState::Running,
            },
            Event::ProgramStarted {
                instructions: vec![Instruction::Forward, Instruction::TurnLeft],
            },
        ]
    );
    assert_eq!(query::program(&world).len(), 2);
}

#[test]
fn reset_restores_facing_position_and_empty_queue() {
    let mut world = World::new();
    let _ = add(&mut world, Instruction::TurnRight);
    let _ = add(&mut world, Instruction::Forward);
    let _ = submit(&mut world, Command::StartProgram);
    let _ = submit(
        &mut world,
        Command::ExecuteInstruction {
            step: 0,
            instruction: Instruction::TurnRight,
        },
    );
    assert_eq!(query::heading(&world), Heading::South);

    let events = submit(&mut world, Command::ResetLevel);

    assert_eq!(
        events,
        vec![
            Event::StateChanged {
                from: GameState::Running,
                to: GameState::Idle,
            },
            Event::ProgramCleared,
            Event::TokensReleased {
                tokens: vec![TokenHandle::new(0), TokenHandle::new(1)],
            },
            Event::LevelLoaded {
                index: 0,
                facing: Heading::East,
                path: query::path_cells(&world).to_vec(),
            },
        ]
    );
    assert_eq!(query::heading(&world), Heading::East);
    assert_eq!(
        query::actor_position(&world),
        query::start_cell(&world).position()
    );
    assert!(query::program(&world).is_empty());
    assert_eq!(query::current_level(&world), 0);
}

#[test]
fn advance_wraps_after_the_last_level() {
    let mut world = World::new();
    let count = default_levels().len();

    for expected in (1..count).chain(std::iter::once(0)) {
        let _ = submit(&mut world, Command::AdvanceLevel);
        assert_eq!(query::current_level(&world), expected);
        assert_eq!(query::state(&world), GameState::Idle);
    }
}

#[test]
fn out_of_range_selection_keeps_the_current_level() {
    let mut world = World::new();
    let _ = submit(&mut world, Command::SelectLevel { index: 2 });

    let events = submit(&mut world, Command::SelectLevel { index: 99 });

    assert_eq!(
        events,
        vec![Event::LevelSelectionRejected {
            index: 99,
            reason: Rejection::LevelOutOfRange,
        }]
    );
    assert_eq!(query::current_level(&world), 2);
}

#[test]
fn conclusion_outside_running_is_ignored() {
    let mut world = World::new();
    let _ = add(&mut world, Instruction::Forward);

    assert!(submit(&mut world, Command::ConcludeProgram).is_empty());
    assert_eq!(query::state(&world), GameState::Idle);
    assert_eq!(query::program(&world).len(), 1);
}

#[test]
fn authoring_is_rejected_after_every_outcome() {
    let endings = [GameState::Complete, GameState::Failed, GameState::Unresolved];

    for ending in endings {
        let mut world = World::new();
        let _ = add(&mut world, Instruction::Forward);
        let _ = submit(&mut world, Command::StartProgram);
        let finish = match ending {
            GameState::Complete => Command::DeclareVerdict {
                verdict: Verdict::ReachedGoal,
                cell: query::goal_cell(&world),
            },
            GameState::Failed => Command::DeclareVerdict {
                verdict: Verdict::EnteredDanger,
                cell: *query::danger_cells(&world)
                    .iter()
                    .next()
                    .expect("level has danger cells"),
            },
            _ => Command::ConcludeProgram,
        };
        let _ = submit(&mut world, finish);
        assert_eq!(query::state(&world), ending);

        assert_eq!(
            add(&mut world, Instruction::TurnLeft),
            vec![Event::InstructionRejected {
                instruction: Instruction::TurnLeft,
                reason: Rejection::WrongState,
            }]
        );
        assert_eq!(
            submit(&mut world, Command::RemoveLastInstruction),
            vec![Event::RemovalRejected {
                reason: Rejection::WrongState
            }]
        );
        assert_eq!(
            submit(&mut world, Command::StartProgram),
            vec![Event::ProgramRejected {
                reason: Rejection::WrongState
            }]
        );
    }
}

#[test]
fn position_reports_only_move_a_running_actor() {
    let mut world = World::new();
    let start = query::start_cell(&world).position();

    assert!(submit(
        &mut world,
        Command::ReportActorPosition {
            position: start + DVec2::new(0.05, 0.0),
        }
    )
    .is_empty());
    assert_eq!(query::actor_position(&world), start);

    let _ = add(&mut world, Instruction::Forward);
    let _ = submit(&mut world, Command::StartProgram);
    let midway = start + DVec2::new(0.06, 0.0);

    assert_eq!(
        submit(&mut world, Command::ReportActorPosition { position: midway }),
        vec![Event::ActorObserved { position: midway }]
    );
    assert_eq!(query::actor_position(&world), midway);
}
