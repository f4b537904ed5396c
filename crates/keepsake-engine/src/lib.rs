pub mod api;
pub mod assets;
pub mod bridge;
pub mod claw;
pub mod core;
pub mod error;
pub mod gesture;
pub mod input;
pub mod maze;
pub mod stages;
pub mod timeline;

// Re-export key types at crate root for convenience
pub use api::stage::{Stage, StageConfig, StageContext};
pub use api::types::{CueEvent, StageEvent};
pub use assets::manifest::{SceneManifest, TimelineDef};
pub use bridge::protocol::{FrameData, ProtocolLayout};
pub use self::core::rng::Rng;
pub use self::core::schedule::{Scheduler, TimerHandle};
pub use self::core::time::FixedTimestep;
pub use error::{KeepsakeError, Result};
pub use input::queue::{Control, InputEvent, InputQueue};

// Engines
pub use claw::{ClawConfig, ClawEvent, ClawMachine, GantryPhase, MachineLayout, MachineMeasurements};
pub use gesture::{GestureEvent, PourAccumulator, PourConfig, StirAccumulator, StirConfig};
pub use maze::{Difficulty, Direction, MazeGrid, MazeSession};
pub use timeline::{AutoScroller, Easing, Keyframes, ScenePreset, ScrollRegion, Spring, SpringConfig, Timeline};

// Stages
pub use stages::{ChocolateDay, ProposeDay, ScrollDay, TeddyDay};
