// stages/chocolate.rs
//
// Melt by stirring, pour by holding, decorate with three distinct
// ingredients, then wait for the freeze and lock the result in.
//
// Outputs per frame:
//   [phase, stir_progress, warning, melt x cubes..., pour_progress, pouring,
//    ingredient_count, decor_status]

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::stage::{Stage, StageContext};
use crate::api::types::{CueEvent, StageEvent};
use crate::core::schedule::Scheduler;
use crate::gesture::{GestureEvent, PourAccumulator, PourConfig, StirAccumulator, StirConfig};
use crate::input::queue::{InputEvent, InputQueue};
use crate::input::Control;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoratingConfig {
    /// Distinct ingredients needed before the chocolate freezes.
    pub required: usize,
    /// Seconds from the last required ingredient to completion.
    pub freeze_time: f32,
}

impl Default for DecoratingConfig {
    fn default() -> Self {
        Self {
            required: 3,
            freeze_time: 4.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChocolatePhase {
    Intro,
    Melting,
    Pouring,
    Decorating,
    Locked,
}

impl ChocolatePhase {
    pub fn code(self) -> u32 {
        match self {
            ChocolatePhase::Intro => 0,
            ChocolatePhase::Melting => 1,
            ChocolatePhase::Pouring => 2,
            ChocolatePhase::Decorating => 3,
            ChocolatePhase::Locked => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecorStatus {
    #[default]
    Decorating,
    Freezing,
    Complete,
}

impl DecorStatus {
    fn code(self) -> f32 {
        match self {
            DecorStatus::Decorating => 0.0,
            DecorStatus::Freezing => 1.0,
            DecorStatus::Complete => 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChocolateTimer {
    Frozen,
}

pub struct ChocolateDay {
    phase: ChocolatePhase,
    stir_config: StirConfig,
    pour_config: PourConfig,
    decor_config: DecoratingConfig,
    pot_center: Vec2,
    stir: Option<StirAccumulator>,
    pour: Option<PourAccumulator>,
    ingredients: Vec<u32>,
    decor: DecorStatus,
    timers: Scheduler<ChocolateTimer>,
}

impl ChocolateDay {
    pub fn new(stir_config: StirConfig, pour_config: PourConfig, decor_config: DecoratingConfig) -> Self {
        Self {
            phase: ChocolatePhase::Intro,
            stir_config,
            pour_config,
            decor_config,
            pot_center: Vec2::ZERO,
            stir: None,
            pour: None,
            ingredients: Vec::new(),
            decor: DecorStatus::default(),
            timers: Scheduler::new(),
        }
    }

    /// Pivot for stirring, in the same space as pointer events.
    pub fn with_pot_center(mut self, center: Vec2) -> Self {
        self.pot_center = center;
        self
    }

    pub fn set_pot_center(&mut self, center: Vec2) {
        self.pot_center = center;
        if let Some(stir) = &mut self.stir {
            stir.set_center(center);
        }
    }

    pub fn phase(&self) -> ChocolatePhase {
        self.phase
    }

    pub fn stir(&self) -> Option<&StirAccumulator> {
        self.stir.as_ref()
    }

    pub fn pour(&self) -> Option<&PourAccumulator> {
        self.pour.as_ref()
    }

    pub fn ingredients(&self) -> &[u32] {
        &self.ingredients
    }

    pub fn decor_status(&self) -> DecorStatus {
        self.decor
    }

    fn enter(&mut self, phase: ChocolatePhase, ctx: &mut StageContext) {
        self.timers.begin_session();
        self.phase = phase;
        log::info!("chocolate day: entering {:?}", phase);
        ctx.emit_phase(phase.code());

        // Accumulators live exactly as long as their step
        self.stir = None;
        self.pour = None;
        match phase {
            ChocolatePhase::Melting => {
                self.stir = Some(StirAccumulator::new(self.stir_config, self.pot_center));
            }
            ChocolatePhase::Pouring => {
                self.pour = Some(PourAccumulator::new(self.pour_config));
            }
            ChocolatePhase::Decorating => {
                self.ingredients.clear();
                self.decor = DecorStatus::Decorating;
            }
            ChocolatePhase::Locked => {
                ctx.emit_event(StageEvent::signal(StageEvent::STAGE_FINISHED));
            }
            ChocolatePhase::Intro => {}
        }
    }

    fn handle_input(&mut self, event: &InputEvent, ctx: &mut StageContext) {
        match self.phase {
            ChocolatePhase::Intro => {
                if event.control() == Some(Control::Advance) {
                    ctx.emit_cue(CueEvent::CLICK);
                    self.enter(ChocolatePhase::Melting, ctx);
                }
            }
            ChocolatePhase::Melting => {
                if let (InputEvent::PointerMove { x, y }, Some(stir)) = (event, &mut self.stir) {
                    stir.on_pointer_move(Vec2::new(*x, *y));
                }
            }
            ChocolatePhase::Pouring => {
                let Some(pour) = &mut self.pour else { return };
                match event {
                    InputEvent::PointerDown { .. } => {
                        pour.press();
                    }
                    InputEvent::PointerUp { .. } => {
                        pour.release();
                    }
                    _ => {}
                }
            }
            ChocolatePhase::Decorating => match event.control() {
                Some(Control::AddIngredient(id)) => self.add_ingredient(id, ctx),
                Some(Control::Advance | Control::Proceed) if self.decor == DecorStatus::Complete => {
                    ctx.emit_cue(CueEvent::CLICK);
                    self.enter(ChocolatePhase::Locked, ctx);
                }
                _ => {}
            },
            ChocolatePhase::Locked => {}
        }
    }

    fn add_ingredient(&mut self, id: u32, ctx: &mut StageContext) {
        if self.decor != DecorStatus::Decorating || self.ingredients.contains(&id) {
            return;
        }
        self.ingredients.push(id);
        ctx.emit_event(StageEvent::new(
            StageEvent::INGREDIENT_ADDED,
            id as f32,
            self.ingredients.len() as f32,
            0.0,
        ));
        ctx.emit_cue(CueEvent::DROP);

        if self.ingredients.len() >= self.decor_config.required {
            self.decor = DecorStatus::Freezing;
            log::info!("chocolate day: freezing");
            self.timers.after(self.decor_config.freeze_time, ChocolateTimer::Frozen);
        }
    }

    fn step_events(&mut self, events: Vec<GestureEvent>, progress: f32, next: ChocolatePhase, ctx: &mut StageContext) {
        for event in events {
            match event {
                GestureEvent::TooFast => {
                    ctx.emit_event(StageEvent::new(StageEvent::WARNING, 1.0, 0.0, 0.0));
                    ctx.emit_cue(CueEvent::WARNING);
                }
                GestureEvent::WarningCleared => {
                    ctx.emit_event(StageEvent::new(StageEvent::WARNING, 0.0, 0.0, 0.0));
                }
                GestureEvent::Completed => {
                    ctx.emit_event(StageEvent::new(StageEvent::STEP_COMPLETE, progress, 0.0, 0.0));
                    ctx.emit_cue(CueEvent::COMPLETE);
                }
                GestureEvent::Finished => {
                    self.enter(next, ctx);
                    return;
                }
            }
        }
    }

    fn write_outputs(&self, out: &mut Vec<f32>) {
        out.clear();
        out.push(self.phase.code() as f32);
        match &self.stir {
            Some(stir) => {
                out.push(stir.progress());
                out.push(if stir.warning() { 1.0 } else { 0.0 });
                out.extend(stir.melt_factors());
            }
            None => {
                // Melting is behind us once the stir is dropped
                let done = if self.phase == ChocolatePhase::Intro { 0.0 } else { 1.0 };
                out.push(done * 100.0);
                out.push(0.0);
                out.extend(std::iter::repeat(done).take(self.stir_config.cubes));
            }
        }
        match &self.pour {
            Some(pour) => {
                out.push(pour.progress());
                out.push(if pour.is_pouring() { 1.0 } else { 0.0 });
            }
            None => {
                let poured = matches!(self.phase, ChocolatePhase::Decorating | ChocolatePhase::Locked);
                out.push(if poured { 100.0 } else { 0.0 });
                out.push(0.0);
            }
        }
        out.push(self.ingredients.len() as f32);
        out.push(self.decor.code());
    }
}

impl Default for ChocolateDay {
    fn default() -> Self {
        Self::new(StirConfig::default(), PourConfig::default(), DecoratingConfig::default())
    }
}

impl Stage for ChocolateDay {
    fn init(&mut self, ctx: &mut StageContext) {
        self.enter(ChocolatePhase::Intro, ctx);
    }

    fn update(&mut self, ctx: &mut StageContext, input: &InputQueue) {
        for event in input.iter() {
            self.handle_input(event, ctx);
        }

        if let Some(stir) = &mut self.stir {
            let events = stir.advance(ctx.dt);
            let progress = stir.progress();
            self.step_events(events, progress, ChocolatePhase::Pouring, ctx);
        }
        if let Some(pour) = &mut self.pour {
            let events = pour.advance(ctx.dt);
            let progress = pour.progress();
            self.step_events(events, progress, ChocolatePhase::Decorating, ctx);
        }

        for tag in self.timers.advance(ctx.dt) {
            match tag {
                ChocolateTimer::Frozen => {
                    self.decor = DecorStatus::Complete;
                    log::info!("chocolate day: decoration complete");
                    ctx.emit_event(StageEvent::new(StageEvent::STEP_COMPLETE, 100.0, 0.0, 0.0));
                    ctx.emit_cue(CueEvent::COMPLETE);
                }
            }
        }

        self.write_outputs(&mut ctx.outputs);
    }

    fn phase_code(&self) -> u32 {
        self.phase.code()
    }

    fn is_finished(&self) -> bool {
        self.phase == ChocolatePhase::Locked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn frame(day: &mut ChocolateDay, ctx: &mut StageContext, events: &[InputEvent]) {
        let mut input = InputQueue::new();
        for e in events {
            input.push(*e);
        }
        ctx.clear_frame_data();
        day.update(ctx, &input);
    }

    fn idle(day: &mut ChocolateDay, ctx: &mut StageContext, seconds: f32) {
        for _ in 0..(seconds / DT).round() as usize {
            frame(day, ctx, &[]);
        }
    }

    fn started() -> (ChocolateDay, StageContext) {
        let mut day = ChocolateDay::default().with_pot_center(Vec2::new(200.0, 200.0));
        let mut ctx = StageContext::new(1);
        day.init(&mut ctx);
        frame(&mut day, &mut ctx, &[Control::Advance.to_event()]);
        assert_eq!(day.phase(), ChocolatePhase::Melting);
        (day, ctx)
    }

    fn stir_to_completion(day: &mut ChocolateDay, ctx: &mut StageContext) {
        let mut angle = 0.0f32;
        while !day.stir().is_some_and(|s| s.is_complete()) {
            angle += 0.3;
            let pos = Vec2::new(200.0, 200.0) + Vec2::new(angle.cos(), angle.sin()) * 80.0;
            frame(day, ctx, &[InputEvent::PointerMove { x: pos.x, y: pos.y }]);
        }
    }

    #[test]
    fn stirring_then_delay_moves_to_pouring() {
        let (mut day, mut ctx) = started();
        stir_to_completion(&mut day, &mut ctx);
        assert_eq!(day.phase(), ChocolatePhase::Melting);
        idle(&mut day, &mut ctx, 2.1);
        assert_eq!(day.phase(), ChocolatePhase::Pouring);
        assert!(day.stir().is_none());
        assert!(day.pour().is_some());
    }

    #[test]
    fn fast_stir_raises_warning_event() {
        let (mut day, mut ctx) = started();
        frame(&mut day, &mut ctx, &[InputEvent::PointerMove { x: 300.0, y: 200.0 }]);
        frame(&mut day, &mut ctx, &[InputEvent::PointerMove { x: 200.0, y: 300.0 }]);
        assert!(ctx.has_event(StageEvent::WARNING));
        assert_eq!(ctx.outputs[2], 1.0);
        assert_eq!(day.stir().unwrap().progress(), 0.0);
    }

    #[test]
    fn pointer_moves_outside_melting_are_ignored() {
        let mut day = ChocolateDay::default();
        let mut ctx = StageContext::new(1);
        day.init(&mut ctx);
        frame(&mut day, &mut ctx, &[InputEvent::PointerMove { x: 1.0, y: 1.0 }]);
        assert_eq!(day.phase(), ChocolatePhase::Intro);
        assert!(day.stir().is_none());
    }

    #[test]
    fn ingredients_dedupe_then_freeze_then_lock() {
        let (mut day, mut ctx) = started();
        day.enter(ChocolatePhase::Decorating, &mut ctx);

        let add = |id| Control::AddIngredient(id).to_event();
        frame(&mut day, &mut ctx, &[add(1), add(1), add(2)]);
        assert_eq!(day.ingredients(), &[1, 2]);
        assert_eq!(day.decor_status(), DecorStatus::Decorating);

        // Clicking before completion does nothing
        frame(&mut day, &mut ctx, &[Control::Advance.to_event()]);
        assert_eq!(day.phase(), ChocolatePhase::Decorating);

        frame(&mut day, &mut ctx, &[add(3)]);
        assert_eq!(day.decor_status(), DecorStatus::Freezing);
        frame(&mut day, &mut ctx, &[add(4)]);
        assert_eq!(day.ingredients().len(), 3);

        idle(&mut day, &mut ctx, 4.1);
        assert_eq!(day.decor_status(), DecorStatus::Complete);
        frame(&mut day, &mut ctx, &[Control::Advance.to_event()]);
        assert!(day.is_finished());
        assert!(ctx.has_event(StageEvent::STAGE_FINISHED));
    }
}
