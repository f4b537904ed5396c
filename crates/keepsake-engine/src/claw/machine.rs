// claw/machine.rs
//
// Tick-driven claw machine. Owns the gantry, the toys and every timer the
// cycle needs; dropping the machine drops all of them.
//
// Usage:
//   let mut machine = ClawMachine::new(ClawConfig::default(), layout, &mut rng);
//   machine.handle(Control::HorizontalPress);
//   for event in machine.advance(dt) { ... }

use glam::Vec2;

use super::gantry::{Axis, Gantry, GantryPhase, Step};
use super::layout::{ClawConfig, MachineLayout, Rect};
use super::toys::{ToyBox, ToyId};
use crate::core::rng::Rng;
use crate::core::schedule::{Scheduler, TimerHandle};
use crate::input::Control;

/// Something the host or the owning stage should react to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClawEvent {
    /// Start-up move finished; the horizontal button is live.
    Calibrated,
    PhaseChanged(GantryPhase),
    Grabbed(ToyId),
    /// The claw closed on nothing. The cycle still completes.
    Missed,
    /// A dropped toy landed and took a tray slot.
    Collected { toy: ToyId, slot: usize },
    /// Enough toys collected; fired once after the display hold.
    Won,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClawTimer {
    /// Motion tick for the leg with this number.
    Motion(u32),
    /// Fall tick for the leg with this number.
    Fall(u32),
    Lower,
    Grab,
    ReleaseDone,
    Win,
}

/// An axis travelling towards a target, one tick per period.
#[derive(Debug, Clone, Copy)]
struct Motion {
    leg: u32,
    axis: Axis,
    target: f32,
    handle: TimerHandle,
}

/// A released toy dropping to the floor.
#[derive(Debug, Clone, Copy)]
struct Fall {
    leg: u32,
    toy: ToyId,
    target: f32,
    handle: TimerHandle,
}

pub struct ClawMachine {
    config: ClawConfig,
    layout: MachineLayout,
    gantry: Gantry,
    toys: ToyBox,
    phase: GantryPhase,
    timers: Scheduler<ClawTimer>,
    motion: Option<Motion>,
    fall: Option<Fall>,
    next_leg: u32,
    win_scheduled: bool,
    won: bool,
    events: Vec<ClawEvent>,
}

impl ClawMachine {
    /// Place toys and start calibrating.
    pub fn new(config: ClawConfig, layout: MachineLayout, rng: &mut Rng) -> Self {
        let config = config.sanitized();
        let toys = ToyBox::populate(&layout, &config, rng);
        Self::with_toys(config, layout, toys)
    }

    /// Start calibrating with a prepared toy box.
    pub fn with_toys(config: ClawConfig, layout: MachineLayout, toys: ToyBox) -> Self {
        let config = config.sanitized();
        let gantry = Gantry::new(layout.arm_rest_length, layout.max_arm_length());
        let mut machine = Self {
            config,
            layout,
            gantry,
            toys,
            phase: GantryPhase::Calibrating,
            timers: Scheduler::new(),
            motion: None,
            fall: None,
            next_leg: 0,
            win_scheduled: false,
            won: false,
            events: Vec::new(),
        };
        let home_depth = machine.layout.home_depth();
        let period = machine.config.fast_period;
        machine.start_motion(Axis::Depth, home_depth, period);
        log::info!("claw machine: calibrating with {} toys", machine.toys.len());
        machine
    }

    // -- Controls --

    /// Start the rail. Only accepted while idle.
    pub fn press_horizontal(&mut self) -> bool {
        if self.phase != GantryPhase::Idle {
            return false;
        }
        self.set_phase(GantryPhase::MovingHorizontal);
        let limit = self.layout.rail_limit();
        self.start_motion(Axis::Rail, limit, self.config.move_period);
        true
    }

    /// Stop the rail where it is.
    pub fn release_horizontal(&mut self) -> bool {
        if self.phase != GantryPhase::MovingHorizontal {
            return false;
        }
        self.stop_motion();
        self.set_phase(GantryPhase::Aligned);
        true
    }

    /// Start moving the joint towards the back wall. Only accepted once aligned.
    pub fn press_depth(&mut self) -> bool {
        if self.phase != GantryPhase::Aligned {
            return false;
        }
        self.set_phase(GantryPhase::MovingDepth);
        let limit = self.layout.depth_limit();
        self.start_motion(Axis::Depth, limit, self.config.move_period);
        true
    }

    /// Stop the joint and start the drop.
    pub fn release_depth(&mut self) -> bool {
        if self.phase != GantryPhase::MovingDepth {
            return false;
        }
        self.stop_motion();
        self.set_phase(GantryPhase::Lowering);
        self.timers.after(self.config.lower_delay, ClawTimer::Lower);
        true
    }

    /// Route a decoded control. Returns whether it was accepted.
    pub fn handle(&mut self, control: Control) -> bool {
        match control {
            Control::HorizontalPress => self.press_horizontal(),
            Control::HorizontalRelease => self.release_horizontal(),
            Control::DepthPress => self.press_depth(),
            Control::DepthRelease => self.release_depth(),
            _ => false,
        }
    }

    // -- Frame --

    /// Run timers for `dt` seconds and return what happened.
    pub fn advance(&mut self, dt: f32) -> Vec<ClawEvent> {
        for tag in self.timers.advance(dt) {
            self.on_timer(tag);
        }
        std::mem::take(&mut self.events)
    }

    fn on_timer(&mut self, tag: ClawTimer) {
        match tag {
            ClawTimer::Motion(leg) => self.tick_motion(leg),
            ClawTimer::Fall(leg) => self.tick_fall(leg),
            ClawTimer::Lower => {
                if self.phase == GantryPhase::Lowering {
                    let reach = self.gantry.max_arm_length;
                    self.start_motion(Axis::Arm, reach, self.config.move_period);
                }
            }
            ClawTimer::Grab => {
                if self.phase == GantryPhase::Grabbing {
                    self.grab();
                    self.set_phase(GantryPhase::Raising);
                    let rest = self.gantry.rest_arm;
                    self.start_motion(Axis::Arm, rest, self.config.move_period);
                }
            }
            ClawTimer::ReleaseDone => {
                if self.phase == GantryPhase::Releasing {
                    self.set_phase(GantryPhase::Idle);
                }
            }
            ClawTimer::Win => {
                if !self.won {
                    self.won = true;
                    log::info!("claw machine: won with {} toys", self.toys.collected_count());
                    self.events.push(ClawEvent::Won);
                }
            }
        }
    }

    fn tick_motion(&mut self, leg: u32) {
        // Ticks left over from a finished leg in the same frame are dropped
        let Some(motion) = self.motion.filter(|m| m.leg == leg) else {
            return;
        };
        match self.gantry.step(motion.axis, motion.target, self.config.step) {
            Step::Moved(delta) => self.carry(motion.axis, delta),
            Step::Arrived => {
                self.stop_motion();
                self.on_arrival(motion.axis);
            }
        }
    }

    fn on_arrival(&mut self, axis: Axis) {
        match (self.phase, axis) {
            (GantryPhase::Calibrating, Axis::Depth) => {
                let home = self.layout.home_rail();
                self.start_motion(Axis::Rail, home, self.config.fast_period);
            }
            (GantryPhase::Calibrating, Axis::Rail) => {
                self.gantry.home_rail = self.gantry.rail_x;
                self.gantry.home_depth = self.gantry.depth_y;
                self.set_phase(GantryPhase::Idle);
                self.events.push(ClawEvent::Calibrated);
            }
            // Hitting the end of the rail counts as a release
            (GantryPhase::MovingHorizontal, Axis::Rail) => self.set_phase(GantryPhase::Aligned),
            (GantryPhase::Lowering, Axis::Arm) => {
                self.set_phase(GantryPhase::Grabbing);
                self.timers.after(self.config.grab_hold, ClawTimer::Grab);
            }
            (GantryPhase::Raising, Axis::Arm) => {
                self.set_phase(GantryPhase::Returning);
                let home = self.gantry.home_rail;
                self.start_motion(Axis::Rail, home, self.config.move_period);
            }
            (GantryPhase::Returning, Axis::Rail) => {
                let home = self.gantry.home_depth;
                self.start_motion(Axis::Depth, home, self.config.move_period);
            }
            (GantryPhase::Returning, Axis::Depth) => self.begin_release(),
            // Depth limit: wait for the button release
            _ => {}
        }
    }

    fn grab(&mut self) {
        let footprint = self.footprint();
        match self.toys.topmost_under(&footprint) {
            Some(id) => {
                let claw = self.claw_point();
                if let Some(toy) = self.toys.get_mut(id) {
                    toy.grabbed = true;
                    toy.swing_towards(claw);
                }
                self.gantry.held = Some(id);
                log::debug!("claw machine: grabbed toy {}", id.0);
                self.events.push(ClawEvent::Grabbed(id));
            }
            None => {
                log::debug!("claw machine: missed at {:?}", footprint.pos);
                self.events.push(ClawEvent::Missed);
            }
        }
    }

    fn begin_release(&mut self) {
        self.set_phase(GantryPhase::Releasing);
        if let Some(id) = self.gantry.held.take() {
            if let Some(toy) = self.toys.get_mut(id) {
                toy.grabbed = false;
                toy.swing = 0.0;
                let target = self.layout.floor_for(toy.size.y);
                self.start_fall(id, target);
            }
        }
        self.timers.after(self.config.release_hold, ClawTimer::ReleaseDone);
    }

    fn start_fall(&mut self, toy: ToyId, target: f32) {
        if let Some(previous) = self.fall.take() {
            // Land the earlier toy immediately
            self.timers.cancel(previous.handle);
            if let Some(t) = self.toys.get_mut(previous.toy) {
                t.pos.y = previous.target;
            }
            self.land(previous.toy);
        }
        let leg = self.take_leg();
        let handle = self.timers.every(self.config.fast_period, ClawTimer::Fall(leg));
        self.fall = Some(Fall { leg, toy, target, handle });
    }

    fn tick_fall(&mut self, leg: u32) {
        let Some(fall) = self.fall.filter(|f| f.leg == leg) else {
            return;
        };
        let step = self.config.step;
        let Some(toy) = self.toys.get_mut(fall.toy) else {
            self.fall = None;
            self.timers.cancel(fall.handle);
            return;
        };
        match super::gantry::step_toward(toy.pos.y, fall.target, step) {
            Step::Moved(delta) => toy.pos.y += delta,
            Step::Arrived => {
                self.fall = None;
                self.timers.cancel(fall.handle);
                self.land(fall.toy);
            }
        }
    }

    fn land(&mut self, id: ToyId) {
        let Some(slot) = self.toys.collect(id) else {
            return;
        };
        log::debug!("claw machine: toy {} collected into slot {}", id.0, slot);
        self.events.push(ClawEvent::Collected { toy: id, slot });

        let collected = self.toys.collected_count() as u32;
        if collected >= self.config.target_collections && !self.win_scheduled {
            self.win_scheduled = true;
            self.timers.after(self.config.win_hold, ClawTimer::Win);
        }
    }

    /// Move the held toy along with the gantry. The arm length maps to toy y.
    fn carry(&mut self, axis: Axis, delta: f32) {
        let Some(id) = self.gantry.held else {
            return;
        };
        let claw = self.claw_point();
        if let Some(toy) = self.toys.get_mut(id) {
            match axis {
                Axis::Rail => toy.pos.x += delta,
                Axis::Depth | Axis::Arm => toy.pos.y += delta,
            }
            toy.swing_towards(claw);
        }
    }

    fn start_motion(&mut self, axis: Axis, target: f32, period: f32) {
        self.stop_motion();
        let leg = self.take_leg();
        let handle = self.timers.every(period, ClawTimer::Motion(leg));
        self.motion = Some(Motion { leg, axis, target, handle });
    }

    fn stop_motion(&mut self) {
        if let Some(m) = self.motion.take() {
            self.timers.cancel(m.handle);
        }
    }

    fn take_leg(&mut self) -> u32 {
        let leg = self.next_leg;
        self.next_leg = self.next_leg.wrapping_add(1);
        leg
    }

    fn set_phase(&mut self, phase: GantryPhase) {
        if self.phase != phase {
            log::debug!("claw machine: {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
            self.events.push(ClawEvent::PhaseChanged(phase));
        }
    }

    // -- Queries --

    /// Area the claw closes on at full extension.
    pub fn footprint(&self) -> Rect {
        let offset = self.config.footprint_offset;
        Rect::new(
            self.gantry.rail_x + offset,
            self.gantry.depth_y + self.gantry.max_arm_length + self.layout.buffer.y + offset,
            self.config.footprint[0],
            self.config.footprint[1],
        )
    }

    /// Toy the claw would take if it closed now.
    pub fn closest_toy(&self) -> Option<ToyId> {
        self.toys.topmost_under(&self.footprint())
    }

    /// Tip of the claw in machine space.
    pub fn claw_point(&self) -> Vec2 {
        Vec2::new(
            self.gantry.rail_x + self.layout.joint_size.x * 0.5,
            self.gantry.depth_y + self.gantry.arm_length + self.layout.buffer.y,
        )
    }

    pub fn phase(&self) -> GantryPhase {
        self.phase
    }

    pub fn gantry(&self) -> &Gantry {
        &self.gantry
    }

    pub fn layout(&self) -> &MachineLayout {
        &self.layout
    }

    pub fn config(&self) -> &ClawConfig {
        &self.config
    }

    pub fn toys(&self) -> &ToyBox {
        &self.toys
    }

    pub fn toys_mut(&mut self) -> &mut ToyBox {
        &mut self.toys
    }

    pub fn held(&self) -> Option<ToyId> {
        self.gantry.held
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    /// Live timers (motion ticks, holds, falls).
    pub fn active_timers(&self) -> usize {
        self.timers.active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claw::layout::MachineMeasurements;
    use crate::claw::toys::{Toy, ToyKind};

    const DT: f32 = 1.0 / 60.0;

    fn run(machine: &mut ClawMachine, seconds: f32) -> Vec<ClawEvent> {
        let frames = (seconds / DT).round() as usize;
        let mut events = Vec::new();
        for _ in 0..frames {
            events.extend(machine.advance(DT));
        }
        events
    }

    fn calibrated(toys: ToyBox) -> ClawMachine {
        let mut m = ClawMachine::with_toys(ClawConfig::default(), MachineLayout::default(), toys);
        let events = run(&mut m, 3.0);
        assert!(events.contains(&ClawEvent::Calibrated));
        m
    }

    fn toy(index: usize, pos: Vec2) -> Toy {
        Toy {
            id: ToyId(index as u32),
            kind: ToyKind::Penguin,
            index,
            pos,
            size: ToyKind::Penguin.size(),
            swing: 0.0,
            grabbed: false,
            collected: false,
            tray_slot: None,
        }
    }

    /// Drive the rail and joint a little, then let go of the depth button.
    fn aim_and_drop(m: &mut ClawMachine) {
        assert!(m.press_horizontal());
        run(m, 0.25);
        assert!(m.release_horizontal());
        assert!(m.press_depth());
        run(m, 0.35);
        assert!(m.release_depth());
    }

    #[test]
    fn calibration_homes_the_gantry() {
        let m = calibrated(ToyBox::new());
        let layout = MachineLayout::default();
        assert_eq!(m.phase(), GantryPhase::Idle);
        assert_eq!(m.gantry().rail_x, layout.home_rail());
        assert_eq!(m.gantry().depth_y, layout.home_depth());
        assert_eq!(m.gantry().home_rail, layout.home_rail());
    }

    #[test]
    fn controls_outside_their_phase_are_ignored() {
        let mut m = ClawMachine::with_toys(ClawConfig::default(), MachineLayout::default(), ToyBox::new());
        assert!(!m.press_horizontal());
        run(&mut m, 3.0);
        assert!(!m.press_depth());
        assert!(!m.release_depth());
        assert!(!m.handle(Control::Advance));
        assert!(m.handle(Control::HorizontalPress));
        assert!(!m.handle(Control::HorizontalPress));
    }

    #[test]
    fn release_stops_rail_without_snapping() {
        let mut m = calibrated(ToyBox::new());
        m.press_horizontal();
        run(&mut m, 0.35);
        m.release_horizontal();
        let stopped = m.gantry().rail_x;
        assert!(stopped > MachineLayout::default().home_rail());
        run(&mut m, 1.0);
        assert_eq!(m.gantry().rail_x, stopped);
        assert_eq!(m.phase(), GantryPhase::Aligned);
    }

    #[test]
    fn rail_limit_auto_aligns() {
        let mut m = calibrated(ToyBox::new());
        m.press_horizontal();
        run(&mut m, 5.0);
        assert_eq!(m.phase(), GantryPhase::Aligned);
        assert_eq!(m.gantry().rail_x, MachineLayout::default().rail_limit());
        // Button release after arrival changes nothing
        assert!(!m.release_horizontal());
    }

    #[test]
    fn depth_limit_waits_for_release() {
        let mut m = calibrated(ToyBox::new());
        m.press_horizontal();
        m.release_horizontal();
        m.press_depth();
        run(&mut m, 3.0);
        assert_eq!(m.phase(), GantryPhase::MovingDepth);
        assert_eq!(m.gantry().depth_y, MachineLayout::default().depth_limit());
        assert!(m.release_depth());
    }

    #[test]
    fn miss_still_completes_the_cycle() {
        let mut m = calibrated(ToyBox::new());
        aim_and_drop(&mut m);
        let events = run(&mut m, 20.0);

        assert!(events.contains(&ClawEvent::Missed));
        assert!(!events.iter().any(|e| matches!(e, ClawEvent::Collected { .. })));
        assert_eq!(m.phase(), GantryPhase::Idle);
        assert_eq!(m.gantry().rail_x, m.gantry().home_rail);
        assert_eq!(m.gantry().depth_y, m.gantry().home_depth);
        assert_eq!(m.gantry().arm_length, m.gantry().rest_arm);
        assert_eq!(m.active_timers(), 0);
    }

    #[test]
    fn full_cycle_collects_and_wins() {
        let mut m = calibrated(ToyBox::new());
        aim_and_drop(&mut m);
        let spot = m.footprint().pos;
        m.toys_mut().insert(toy(3, spot));

        let events = run(&mut m, 25.0);
        let grabbed = events.iter().position(|e| *e == ClawEvent::Grabbed(ToyId(3)));
        let collected = events.iter().position(|e| *e == ClawEvent::Collected { toy: ToyId(3), slot: 0 });
        let won = events.iter().position(|e| *e == ClawEvent::Won);
        assert!(grabbed < collected && collected < won, "{events:?}");
        assert!(grabbed.is_some());

        let t = m.toys().get(ToyId(3)).unwrap();
        assert!(t.collected);
        assert_eq!(t.pos.y, MachineLayout::default().floor_for(t.size.y));
        assert_eq!(m.phase(), GantryPhase::Idle);
        assert!(m.is_won());
        assert_eq!(events.iter().filter(|e| **e == ClawEvent::Won).count(), 1);
    }

    #[test]
    fn held_toy_follows_the_arm() {
        let mut m = calibrated(ToyBox::new());
        aim_and_drop(&mut m);
        let spot = m.footprint().pos;
        m.toys_mut().insert(toy(0, spot));

        // Lower delay + full extension + grab hold
        let mut grabbed_at = None;
        for _ in 0..1200 {
            if m.advance(DT).contains(&ClawEvent::Grabbed(ToyId(0))) {
                grabbed_at = Some(m.toys().get(ToyId(0)).unwrap().pos.y);
                break;
            }
        }
        let start_y = grabbed_at.expect("toy under footprint");
        let start_arm = m.gantry().arm_length;
        run(&mut m, 0.5);
        let moved_arm = m.gantry().arm_length - start_arm;
        let moved_toy = m.toys().get(ToyId(0)).unwrap().pos.y - start_y;
        assert!(moved_arm < 0.0);
        assert!((moved_arm - moved_toy).abs() < 0.01);
    }

    #[test]
    fn overlapping_toys_grab_highest_index() {
        for _ in 0..5 {
            let mut m = calibrated(ToyBox::new());
            aim_and_drop(&mut m);
            let spot = m.footprint().pos;
            m.toys_mut().insert(toy(2, spot - Vec2::new(4.0, 4.0)));
            m.toys_mut().insert(toy(5, spot + Vec2::new(4.0, 2.0)));
            assert_eq!(m.closest_toy(), Some(ToyId(5)));

            let events = run(&mut m, 6.0);
            assert!(events.contains(&ClawEvent::Grabbed(ToyId(5))));
            assert!(!events.contains(&ClawEvent::Grabbed(ToyId(2))));
        }
    }

    #[test]
    fn stalling_tunables_still_calibrate() {
        for step in [0.0, -10.0, f32::NAN] {
            let config = ClawConfig { step, move_period: 0.0, ..ClawConfig::default() };
            let mut m = ClawMachine::with_toys(config, MachineLayout::default(), ToyBox::new());
            let events = run(&mut m, 3.0);
            assert!(events.contains(&ClawEvent::Calibrated), "step {step}");
            assert_eq!(m.gantry().depth_y, MachineLayout::default().home_depth());
        }
    }

    #[test]
    fn narrow_machine_rail_never_runs_backwards() {
        let layout = MachineLayout::from_measurements(&MachineMeasurements {
            width: Some(60.0),
            ..Default::default()
        });
        let mut m = ClawMachine::with_toys(ClawConfig::default(), layout, ToyBox::new());
        run(&mut m, 3.0);
        assert!(m.press_horizontal());
        run(&mut m, 1.0);
        assert!(m.gantry().rail_x >= layout.home_rail());
    }
}
