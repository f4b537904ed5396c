// stages/mod.rs
//
// One Stage per day. Each owns the engines of its current phase and
// drops them on the way out.

pub mod chocolate;
pub mod propose;
pub mod scroll;
pub mod teddy;

pub use chocolate::{ChocolateDay, ChocolatePhase, DecorStatus, DecoratingConfig};
pub use propose::{ProposeDay, ProposePhase};
pub use scroll::{ScrollDay, ScrollPhase};
pub use teddy::{TeddyDay, TeddyPhase};
