use crate::maze::Direction;

/// Input event types the engine understands.
/// The host forwards raw browser input; stages decode what they need.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A touch/click began at stage coordinates (x, y).
    PointerDown { x: f32, y: f32 },
    /// A touch/click ended at stage coordinates (x, y).
    PointerUp { x: f32, y: f32 },
    /// A touch/cursor moved to stage coordinates (x, y).
    PointerMove { x: f32, y: f32 },
    /// A key was pressed.
    KeyDown { key_code: u32 },
    /// A key was released.
    KeyUp { key_code: u32 },
    /// The page scrolled. `offset` is the scroll position in pixels,
    /// `viewport` the visible height and `content` the scrollable height.
    Scroll { offset: f32, viewport: f32, content: f32 },
    /// A custom event from the UI layer (React buttons, etc.).
    /// `kind` identifies the event type; `a`, `b`, `c` carry arbitrary data.
    Custom { kind: u32, a: f32, b: f32, c: f32 },
}

/// Browser key codes for the arrow keys.
pub const KEY_LEFT: u32 = 37;
pub const KEY_UP: u32 = 38;
pub const KEY_RIGHT: u32 = 39;
pub const KEY_DOWN: u32 = 40;
pub const KEY_A: u32 = 65;
pub const KEY_D: u32 = 68;
pub const KEY_S: u32 = 83;
pub const KEY_W: u32 = 87;

/// Custom event kinds (UI buttons → Rust).
pub const CUSTOM_ADVANCE: u32 = 1;
pub const CUSTOM_CHOOSE_EASY: u32 = 2;
pub const CUSTOM_CHOOSE_HARD: u32 = 3;
pub const CUSTOM_HORIZONTAL_PRESS: u32 = 4;
pub const CUSTOM_HORIZONTAL_RELEASE: u32 = 5;
pub const CUSTOM_DEPTH_PRESS: u32 = 6;
pub const CUSTOM_DEPTH_RELEASE: u32 = 7;
pub const CUSTOM_ADD_INGREDIENT: u32 = 8;
pub const CUSTOM_PROCEED: u32 = 9;

/// Decoded UI control carried by `InputEvent::Custom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// "Next" / "Let's begin" style click.
    Advance,
    ChooseEasy,
    ChooseHard,
    HorizontalPress,
    HorizontalRelease,
    DepthPress,
    DepthRelease,
    /// Drop a decoration ingredient (by id) onto the chocolate.
    AddIngredient(u32),
    /// External "unlocked" / "time lock elapsed" signal.
    Proceed,
}

impl Control {
    pub fn from_custom(kind: u32, a: f32) -> Option<Self> {
        match kind {
            CUSTOM_ADVANCE => Some(Control::Advance),
            CUSTOM_CHOOSE_EASY => Some(Control::ChooseEasy),
            CUSTOM_CHOOSE_HARD => Some(Control::ChooseHard),
            CUSTOM_HORIZONTAL_PRESS => Some(Control::HorizontalPress),
            CUSTOM_HORIZONTAL_RELEASE => Some(Control::HorizontalRelease),
            CUSTOM_DEPTH_PRESS => Some(Control::DepthPress),
            CUSTOM_DEPTH_RELEASE => Some(Control::DepthRelease),
            CUSTOM_ADD_INGREDIENT if a >= 0.0 => Some(Control::AddIngredient(a as u32)),
            CUSTOM_PROCEED => Some(Control::Proceed),
            _ => None,
        }
    }

    /// Encode back into a custom event (used by hosts and tests).
    pub fn to_event(self) -> InputEvent {
        let (kind, a) = match self {
            Control::Advance => (CUSTOM_ADVANCE, 0.0),
            Control::ChooseEasy => (CUSTOM_CHOOSE_EASY, 0.0),
            Control::ChooseHard => (CUSTOM_CHOOSE_HARD, 0.0),
            Control::HorizontalPress => (CUSTOM_HORIZONTAL_PRESS, 0.0),
            Control::HorizontalRelease => (CUSTOM_HORIZONTAL_RELEASE, 0.0),
            Control::DepthPress => (CUSTOM_DEPTH_PRESS, 0.0),
            Control::DepthRelease => (CUSTOM_DEPTH_RELEASE, 0.0),
            Control::AddIngredient(id) => (CUSTOM_ADD_INGREDIENT, id as f32),
            Control::Proceed => (CUSTOM_PROCEED, 0.0),
        };
        InputEvent::Custom { kind, a, b: 0.0, c: 0.0 }
    }
}

impl InputEvent {
    /// Decode a UI control, if this is a recognised custom event.
    pub fn control(&self) -> Option<Control> {
        match *self {
            InputEvent::Custom { kind, a, .. } => Control::from_custom(kind, a),
            _ => None,
        }
    }

    /// Map a key-down to a maze direction (arrows and WASD).
    pub fn direction(&self) -> Option<Direction> {
        match *self {
            InputEvent::KeyDown { key_code } => match key_code {
                KEY_UP | KEY_W => Some(Direction::Up),
                KEY_DOWN | KEY_S => Some(Direction::Down),
                KEY_LEFT | KEY_A => Some(Direction::Left),
                KEY_RIGHT | KEY_D => Some(Direction::Right),
                _ => None,
            },
            _ => None,
        }
    }
}

/// A queue of input events.
/// JS writes events into the queue; Rust reads and drains them each frame.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    /// Push a new input event (called from JS via wasm-bindgen).
    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Push a decoded control as a custom event.
    pub fn push_control(&mut self, control: Control) {
        self.events.push(control.to_event());
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    /// Iterate over pending events without consuming them.
    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    /// Check if there are pending events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_drain() {
        let mut q = InputQueue::new();
        q.push(InputEvent::PointerDown { x: 10.0, y: 20.0 });
        q.push(InputEvent::KeyDown { key_code: KEY_UP });
        assert_eq!(q.len(), 2);
        let events = q.drain();
        assert_eq!(events.len(), 2);
        assert!(q.is_empty());
    }

    #[test]
    fn controls_round_trip_through_custom_events() {
        let mut q = InputQueue::new();
        q.push_control(Control::AddIngredient(3));
        q.push_control(Control::DepthRelease);
        let decoded: Vec<_> = q.iter().filter_map(|e| e.control()).collect();
        assert_eq!(decoded, vec![Control::AddIngredient(3), Control::DepthRelease]);
    }

    #[test]
    fn unknown_custom_kind_is_ignored() {
        let e = InputEvent::Custom { kind: 999, a: 0.0, b: 0.0, c: 0.0 };
        assert_eq!(e.control(), None);
    }

    #[test]
    fn arrow_keys_map_to_directions() {
        assert_eq!(InputEvent::KeyDown { key_code: KEY_LEFT }.direction(), Some(Direction::Left));
        assert_eq!(InputEvent::KeyDown { key_code: KEY_S }.direction(), Some(Direction::Down));
        assert_eq!(InputEvent::KeyUp { key_code: KEY_LEFT }.direction(), None);
        assert_eq!(InputEvent::KeyDown { key_code: 13 }.direction(), None);
    }
}
