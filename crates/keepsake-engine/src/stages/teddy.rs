// stages/teddy.rs
//
// Two click-through screens, a short game intro, then the claw machine.
// The machine is built when play starts and dropped on the win screen.
//
// Outputs per frame:
//   [phase, claw_phase, rail_x, depth_y, arm_length, held, collected, toy_count,
//    per toy: id, kind, x, y, swing, grabbed, collected]

use crate::api::stage::{Stage, StageContext};
use crate::api::types::{CueEvent, StageEvent};
use crate::claw::{ClawConfig, ClawEvent, ClawMachine, GantryPhase, MachineLayout, MachineMeasurements};
use crate::core::schedule::Scheduler;
use crate::input::queue::InputQueue;
use crate::input::Control;

pub const GAME_INTRO_DELAY: f32 = 3.0;

/// Floats written per toy.
pub const TOY_FLOATS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeddyPhase {
    Intro,
    Invitation,
    GameIntro,
    Playing,
    Win,
}

impl TeddyPhase {
    pub fn code(self) -> u32 {
        match self {
            TeddyPhase::Intro => 0,
            TeddyPhase::Invitation => 1,
            TeddyPhase::GameIntro => 2,
            TeddyPhase::Playing => 3,
            TeddyPhase::Win => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TeddyTimer {
    StartGame,
}

pub struct TeddyDay {
    phase: TeddyPhase,
    config: ClawConfig,
    layout: MachineLayout,
    machine: Option<ClawMachine>,
    /// Toy kinds collected in the finished game, in tray order.
    prizes: Vec<u32>,
    timers: Scheduler<TeddyTimer>,
}

impl TeddyDay {
    pub fn new(config: ClawConfig, measurements: MachineMeasurements) -> Self {
        Self {
            phase: TeddyPhase::Intro,
            config,
            layout: MachineLayout::from_measurements(&measurements),
            machine: None,
            prizes: Vec::new(),
            timers: Scheduler::new(),
        }
    }

    pub fn phase(&self) -> TeddyPhase {
        self.phase
    }

    pub fn machine(&self) -> Option<&ClawMachine> {
        self.machine.as_ref()
    }

    pub fn machine_mut(&mut self) -> Option<&mut ClawMachine> {
        self.machine.as_mut()
    }

    pub fn prizes(&self) -> &[u32] {
        &self.prizes
    }

    fn enter(&mut self, phase: TeddyPhase, ctx: &mut StageContext) {
        self.timers.begin_session();
        self.phase = phase;
        log::info!("teddy day: entering {:?}", phase);
        ctx.emit_phase(phase.code());

        match phase {
            TeddyPhase::GameIntro => {
                self.timers.after(GAME_INTRO_DELAY, TeddyTimer::StartGame);
            }
            TeddyPhase::Playing => {
                self.machine = Some(ClawMachine::new(self.config.clone(), self.layout, &mut ctx.rng));
            }
            TeddyPhase::Win => {
                if let Some(machine) = self.machine.take() {
                    self.prizes = machine
                        .toys()
                        .iter()
                        .filter(|t| t.collected)
                        .map(|t| t.kind.code())
                        .collect();
                }
                ctx.emit_event(StageEvent::signal(StageEvent::STAGE_FINISHED));
            }
            TeddyPhase::Intro | TeddyPhase::Invitation => {}
        }
    }

    fn handle_control(&mut self, control: Control, ctx: &mut StageContext) {
        match (self.phase, control) {
            (TeddyPhase::Intro, Control::Advance) => {
                ctx.emit_cue(CueEvent::CLICK);
                self.enter(TeddyPhase::Invitation, ctx);
            }
            (TeddyPhase::Invitation, Control::Advance) => {
                ctx.emit_cue(CueEvent::CLICK);
                self.enter(TeddyPhase::GameIntro, ctx);
            }
            (TeddyPhase::Playing, control) => {
                let Some(machine) = &mut self.machine else { return };
                if machine.handle(control) {
                    log::debug!("teddy day: {:?} accepted in {:?}", control, machine.phase());
                }
            }
            _ => {}
        }
    }

    fn forward(&mut self, events: Vec<ClawEvent>, ctx: &mut StageContext) {
        for event in events {
            match event {
                ClawEvent::PhaseChanged(phase) => {
                    if matches!(
                        phase,
                        GantryPhase::MovingHorizontal | GantryPhase::MovingDepth | GantryPhase::Lowering
                    ) {
                        ctx.emit_cue(CueEvent::MOTOR);
                    }
                }
                ClawEvent::Calibrated => {}
                ClawEvent::Grabbed(toy) => {
                    ctx.emit_event(StageEvent::new(StageEvent::TOY_GRABBED, toy.0 as f32, 0.0, 0.0));
                    ctx.emit_cue(CueEvent::GRAB);
                }
                ClawEvent::Missed => {
                    ctx.emit_event(StageEvent::signal(StageEvent::GRAB_MISSED));
                    ctx.emit_cue(CueEvent::MISS);
                }
                ClawEvent::Collected { toy, slot } => {
                    ctx.emit_event(StageEvent::new(StageEvent::TOY_COLLECTED, toy.0 as f32, slot as f32, 0.0));
                    ctx.emit_cue(CueEvent::DROP);
                }
                ClawEvent::Won => {
                    ctx.emit_event(StageEvent::signal(StageEvent::CLAW_WON));
                    ctx.emit_cue(CueEvent::WIN);
                    self.enter(TeddyPhase::Win, ctx);
                    // The machine is gone; nothing after Won matters
                    return;
                }
            }
        }
    }

    fn write_outputs(&self, out: &mut Vec<f32>) {
        out.clear();
        out.push(self.phase.code() as f32);

        let Some(machine) = &self.machine else {
            out.extend_from_slice(&[-1.0, 0.0, 0.0, 0.0, -1.0]);
            out.push(self.prizes.len() as f32);
            out.push(0.0);
            return;
        };

        let gantry = machine.gantry();
        out.push(machine.phase().code() as f32);
        out.push(gantry.rail_x);
        out.push(gantry.depth_y);
        out.push(gantry.arm_length);
        out.push(machine.held().map_or(-1.0, |id| id.0 as f32));
        out.push(machine.toys().collected_count() as f32);
        out.push(machine.toys().len() as f32);
        for toy in machine.toys().iter() {
            out.extend_from_slice(&[
                toy.id.0 as f32,
                toy.kind.code() as f32,
                toy.pos.x,
                toy.pos.y,
                toy.swing,
                if toy.grabbed { 1.0 } else { 0.0 },
                if toy.collected { 1.0 } else { 0.0 },
            ]);
        }
    }
}

impl Default for TeddyDay {
    fn default() -> Self {
        Self::new(ClawConfig::default(), MachineMeasurements::default())
    }
}

impl Stage for TeddyDay {
    fn init(&mut self, ctx: &mut StageContext) {
        self.enter(TeddyPhase::Intro, ctx);
    }

    fn update(&mut self, ctx: &mut StageContext, input: &InputQueue) {
        for event in input.iter() {
            if let Some(control) = event.control() {
                self.handle_control(control, ctx);
            }
        }

        for tag in self.timers.advance(ctx.dt) {
            match tag {
                TeddyTimer::StartGame => self.enter(TeddyPhase::Playing, ctx),
            }
        }

        if let Some(machine) = &mut self.machine {
            let events = machine.advance(ctx.dt);
            self.forward(events, ctx);
        }

        self.write_outputs(&mut ctx.outputs);
    }

    fn phase_code(&self) -> u32 {
        self.phase.code()
    }

    fn is_finished(&self) -> bool {
        self.phase == TeddyPhase::Win
    }
}
