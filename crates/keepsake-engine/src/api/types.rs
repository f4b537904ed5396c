use bytemuck::{Pod, Zeroable};

/// An audio cue emitted by stage logic.
/// The numeric value maps to a clip in the host's audio player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct CueEvent(pub u32);

impl CueEvent {
    pub const CLICK: CueEvent = CueEvent(1);
    pub const STEP: CueEvent = CueEvent(2);
    pub const BUMP: CueEvent = CueEvent(3);
    pub const MOTOR: CueEvent = CueEvent(4);
    pub const GRAB: CueEvent = CueEvent(5);
    pub const MISS: CueEvent = CueEvent(6);
    pub const DROP: CueEvent = CueEvent(7);
    pub const WIN: CueEvent = CueEvent(8);
    pub const WARNING: CueEvent = CueEvent(9);
    pub const COMPLETE: CueEvent = CueEvent(10);
    pub const CURTAIN: CueEvent = CueEvent(11);
}

/// A stage event communicated from Rust to the host.
/// Generic container: `kind` identifies the event, `a/b/c` carry payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct StageEvent {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl StageEvent {
    pub const FLOATS: usize = 4;

    /// a = phase code.
    pub const PHASE_CHANGED: u32 = 1;
    /// a = x, b = y, c = intensity.
    pub const PLAYER_MOVED: u32 = 2;
    pub const MAZE_SOLVED: u32 = 3;
    /// a = message index, b = message count.
    pub const MESSAGE: u32 = 4;
    /// a = toy id.
    pub const TOY_GRABBED: u32 = 5;
    pub const GRAB_MISSED: u32 = 6;
    /// a = toy id, b = tray slot.
    pub const TOY_COLLECTED: u32 = 7;
    pub const CLAW_WON: u32 = 8;
    /// a = 1 when shown, 0 when cleared.
    pub const WARNING: u32 = 9;
    /// a = step progress at completion.
    pub const STEP_COMPLETE: u32 = 10;
    /// a = ingredient id, b = distinct ingredients so far.
    pub const INGREDIENT_ADDED: u32 = 11;
    /// a = target scroll offset.
    pub const SCROLL_TO: u32 = 12;
    pub const CURTAIN_OPEN: u32 = 13;
    pub const STAGE_FINISHED: u32 = 14;

    pub fn new(kind: u32, a: f32, b: f32, c: f32) -> Self {
        Self { kind: kind as f32, a, b, c }
    }

    pub fn signal(kind: u32) -> Self {
        Self::new(kind, 0.0, 0.0, 0.0)
    }

    pub fn kind(&self) -> u32 {
        self.kind as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_is_four_floats_on_the_wire() {
        let events = [StageEvent::new(StageEvent::MESSAGE, 2.0, 7.0, 0.0)];
        let floats: &[f32] = bytemuck::cast_slice(&events);
        assert_eq!(floats.len(), StageEvent::FLOATS);
        assert_eq!(floats[0], StageEvent::MESSAGE as f32);
        assert_eq!(floats[2], 7.0);
    }
}
