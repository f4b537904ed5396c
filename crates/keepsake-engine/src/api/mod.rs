pub mod stage;
pub mod types;
