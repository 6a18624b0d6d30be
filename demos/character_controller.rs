//! Character Controller
//!
//! Drives the classic character-movement tree over a scripted input stream:
//!
//! ```text
//! Root
//! ├── Grounded
//! │   ├── Idle
//! │   └── Move
//! └── Airborne
//! ```
//!
//! Key concepts:
//! - Transitions between siblings pivot on their parent (Grounded stays
//!   entered while Idle and Move swap)
//! - Jumping crosses branches: Move and Grounded exit, Airborne enters
//! - Landing re-enters the Grounded subtree from scratch
//!
//! Run with: cargo run --example character_controller

use stratum::{State, StateMachineBuilder};

const MOVE_SPEED: f32 = 4.0;
const JUMP_IMPULSE: f32 = 8.0;
const GRAVITY: f32 = -20.0;

#[derive(Default)]
struct PlayerCtx {
    move_input: f32,
    jump_pressed: bool,
    grounded: bool,
    velocity: f32,
    vertical_velocity: f32,
}

struct Shell;

impl State<PlayerCtx> for Shell {
    fn name(&self) -> &str {
        "Root"
    }
}

struct Grounded;

impl State<PlayerCtx> for Grounded {
    fn name(&self) -> &str {
        "Grounded"
    }

    fn on_enter(&mut self, ctx: &mut PlayerCtx) {
        ctx.vertical_velocity = 0.0;
    }
}

struct Idle;

impl State<PlayerCtx> for Idle {
    fn name(&self) -> &str {
        "Idle"
    }

    fn on_enter(&mut self, ctx: &mut PlayerCtx) {
        ctx.velocity = 0.0;
    }
}

struct Move;

impl State<PlayerCtx> for Move {
    fn name(&self) -> &str {
        "Move"
    }

    fn on_update(&mut self, ctx: &mut PlayerCtx, _dt: f32) {
        ctx.velocity = ctx.move_input * MOVE_SPEED;
    }
}

struct Airborne;

impl State<PlayerCtx> for Airborne {
    fn name(&self) -> &str {
        "Airborne"
    }

    fn on_enter(&mut self, ctx: &mut PlayerCtx) {
        ctx.vertical_velocity = JUMP_IMPULSE;
    }

    fn on_update(&mut self, ctx: &mut PlayerCtx, dt: f32) {
        ctx.vertical_velocity += GRAVITY * dt;
    }
}

fn main() {
    env_logger::init();

    let mut builder = StateMachineBuilder::new();
    let root = builder.root(Shell).unwrap();
    let grounded = builder.child(root, Grounded).unwrap();
    let idle = builder.child(grounded, Idle).unwrap();
    let moving = builder.child(grounded, Move).unwrap();
    let airborne = builder.child(root, Airborne).unwrap();

    builder.transition(root, idle, |_: &PlayerCtx| true).unwrap();
    builder
        .transition(idle, airborne, |ctx: &PlayerCtx| ctx.jump_pressed)
        .unwrap();
    builder
        .transition(idle, moving, |ctx: &PlayerCtx| ctx.move_input.abs() > 0.0)
        .unwrap();
    builder
        .transition(moving, airborne, |ctx: &PlayerCtx| ctx.jump_pressed)
        .unwrap();
    builder
        .transition(moving, idle, |ctx: &PlayerCtx| ctx.move_input == 0.0)
        .unwrap();
    builder
        .transition(airborne, idle, |ctx: &PlayerCtx| ctx.grounded)
        .unwrap();

    let mut machine = builder.build().unwrap();
    let mut ctx = PlayerCtx {
        grounded: true,
        ..PlayerCtx::default()
    };

    println!("=== Character Controller ===\n");

    // (move_input, jump_pressed, grounded) per frame.
    let script: [(f32, bool, bool); 10] = [
        (0.0, false, true),  // settle into Idle
        (0.0, false, true),  // idle
        (1.0, false, true),  // start running
        (1.0, false, true),  // run
        (1.0, true, false),  // jump mid-run
        (1.0, false, false), // rising
        (1.0, false, false), // falling
        (0.0, false, true),  // land
        (0.0, false, true),  // settle back into Idle
        (0.0, false, true),  // idle
    ];

    for (frame, (move_input, jump_pressed, grounded)) in script.into_iter().enumerate() {
        ctx.move_input = move_input;
        ctx.jump_pressed = jump_pressed;
        ctx.grounded = grounded;

        machine.update(&mut ctx, 1.0 / 60.0).unwrap();

        println!(
            "frame {:>2}  {:<24} velocity {:>5.2}  vertical {:>6.2}",
            frame + 1,
            machine.active_path_string(),
            ctx.velocity,
            ctx.vertical_velocity,
        );
    }

    println!("\nTransition history:");
    for transition in machine.history().transitions() {
        println!(
            "  tick {:>2}: {} -> {}",
            transition.tick, transition.from, transition.to
        );
    }

    println!("\n=== Done ===");
}
