//! Basic example of connecting callbacks to an event, dispatching it and disconnecting.
//!
//! Shows the three ways to disconnect a callback (drop, revoke, disconnect by id) and how
//! shared events are obtained from an `EventRegistry`.

use signals::{Event, EventBase, EventRegistry};

struct FrameRendered;

fn main() {
    println!("=== Signals Basic Example ===");

    let event = Event::<u32>::builder().name("score_changed").build();

    let logger = event.connect(|score| println!("logger: score is now {score}"));
    let achievements = event.connect(|score| {
        if *score >= 100 {
            println!("achievements: unlocked 'centurion'");
        }
    });
    let hud = event.connect(|score| println!("hud: drawing {score}"));

    println!("Dispatching with all three callbacks connected...");
    event.dispatch(&100).unwrap();

    println!("Dropping the logger connection...");
    drop(logger);

    println!("Revoking the achievements connection...");
    achievements.revoke();

    println!("Disconnecting the HUD by id...");
    if let Some(id) = hud.id() {
        event.disconnect(id);
    }

    println!(
        "Registrations before next dispatch: {}",
        event.connection_count()
    );
    event.dispatch(&150).unwrap();
    println!(
        "Registrations after next dispatch: {}",
        event.connection_count()
    );

    let registry = EventRegistry::new();
    let _frame_counter = registry
        .get::<u64, FrameRendered>()
        .connect(|frame| println!("frame {frame} rendered"));

    for frame in 0..3 {
        registry.get::<u64, FrameRendered>().dispatch(&frame).unwrap();
    }

    println!(
        "Frame event signaled: {}",
        registry.get::<u64, FrameRendered>().signaled()
    );
    println!("Example completed successfully!");
}
