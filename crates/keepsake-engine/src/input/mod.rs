pub mod queue;

pub use queue::{Control, InputEvent, InputQueue};
