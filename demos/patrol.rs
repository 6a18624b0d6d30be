//! Patrol AI
//!
//! A sentry with two branches of behavior:
//!
//! ```text
//! Sentry
//! ├── Calm
//! │   ├── Patrol
//! │   └── Rest
//! └── Alert
//!     ├── Chase
//!     └── Attack
//! ```
//!
//! Moving between Patrol and Chase crosses the Calm/Alert boundary, so the
//! whole Calm branch exits and the Alert branch enters (and vice versa);
//! swapping Chase and Attack pivots on Alert without touching the rest of
//! the tree. A diagnostic snapshot is printed at the end.
//!
//! Run with: RUST_LOG=debug cargo run --example patrol

use stratum::{Snapshot, State, StateMachineBuilder};

const SPOT_RANGE: f32 = 10.0;
const ATTACK_RANGE: f32 = 2.0;
const ESCAPE_RANGE: f32 = 14.0;

struct SentryCtx {
    target_distance: f32,
    stamina: f32,
}

struct Named(&'static str);

impl State<SentryCtx> for Named {
    fn name(&self) -> &str {
        self.0
    }
}

struct Patrol;

impl State<SentryCtx> for Patrol {
    fn name(&self) -> &str {
        "Patrol"
    }

    fn on_update(&mut self, ctx: &mut SentryCtx, dt: f32) {
        ctx.stamina -= 5.0 * dt;
    }
}

struct Rest;

impl State<SentryCtx> for Rest {
    fn name(&self) -> &str {
        "Rest"
    }

    fn on_update(&mut self, ctx: &mut SentryCtx, dt: f32) {
        ctx.stamina += 20.0 * dt;
    }
}

struct Chase;

impl State<SentryCtx> for Chase {
    fn name(&self) -> &str {
        "Chase"
    }

    fn on_update(&mut self, ctx: &mut SentryCtx, dt: f32) {
        ctx.target_distance -= 4.0 * dt;
        ctx.stamina -= 10.0 * dt;
    }
}

struct Attack;

impl State<SentryCtx> for Attack {
    fn name(&self) -> &str {
        "Attack"
    }
}

fn main() {
    env_logger::init();

    let mut builder = StateMachineBuilder::new();
    let sentry = builder.root(Named("Sentry")).unwrap();
    let calm = builder.child(sentry, Named("Calm")).unwrap();
    let patrol = builder.child(calm, Patrol).unwrap();
    let rest = builder.child(calm, Rest).unwrap();
    let alert = builder.child(sentry, Named("Alert")).unwrap();
    let chase = builder.child(alert, Chase).unwrap();
    let attack = builder.child(alert, Attack).unwrap();

    builder
        .transition(sentry, patrol, |_: &SentryCtx| true)
        .unwrap();
    builder
        .transition(patrol, chase, |ctx: &SentryCtx| {
            ctx.target_distance < SPOT_RANGE
        })
        .unwrap();
    builder
        .transition(patrol, rest, |ctx: &SentryCtx| ctx.stamina < 20.0)
        .unwrap();
    builder
        .transition(rest, patrol, |ctx: &SentryCtx| ctx.stamina > 80.0)
        .unwrap();
    builder
        .transition(chase, attack, |ctx: &SentryCtx| {
            ctx.target_distance < ATTACK_RANGE
        })
        .unwrap();
    builder
        .transition(chase, patrol, |ctx: &SentryCtx| {
            ctx.target_distance > ESCAPE_RANGE
        })
        .unwrap();
    builder
        .transition(attack, chase, |ctx: &SentryCtx| {
            ctx.target_distance > ATTACK_RANGE
        })
        .unwrap();

    let mut machine = builder.build().unwrap();
    let mut ctx = SentryCtx {
        target_distance: 30.0,
        stamina: 100.0,
    };

    println!("=== Patrol AI ===\n");

    for second in 1..=20 {
        // An intruder closes in over the first half of the run, then bolts.
        if second <= 10 {
            ctx.target_distance = (ctx.target_distance - 2.5).max(0.0);
        } else {
            ctx.target_distance += 5.0;
        }

        machine.update(&mut ctx, 1.0).unwrap();

        println!(
            "t={:>2}s  {:<22} distance {:>5.1}  stamina {:>5.1}",
            second,
            machine.active_path_string(),
            ctx.target_distance,
            ctx.stamina,
        );
    }

    let snapshot = Snapshot::capture(&machine);
    println!("\nSnapshot: {}", snapshot.to_json().unwrap());

    println!("\n=== Done ===");
}
