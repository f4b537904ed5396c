pub mod gantry;
pub mod layout;
pub mod machine;
pub mod toys;

pub use gantry::{Axis, Gantry, GantryPhase};
pub use layout::{ClawConfig, MachineLayout, MachineMeasurements, Rect};
pub use machine::{ClawEvent, ClawMachine};
pub use toys::{Toy, ToyBox, ToyId, ToyKind};
