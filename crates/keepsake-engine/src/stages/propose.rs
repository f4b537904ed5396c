// stages/propose.rs
//
// Difficulty choice, maze, a win sequence that depends on the difficulty,
// closing lines, then the curtain.
//
// Outputs per frame:
//   [phase, difficulty, message, curtain_open,
//    player_x, player_y, intensity, glow_blur, glow_spread, glow_alpha, glow_border,
//    maze_width, maze_height, cells...]

use crate::api::stage::{Stage, StageConfig, StageContext};
use crate::api::types::{CueEvent, StageEvent};
use crate::core::schedule::{Scheduler, TimerHandle};
use crate::input::queue::InputQueue;
use crate::input::Control;
use crate::maze::{Cell, CellPos, Difficulty, Direction, MazeSession};

/// Click-through messages after a hard win.
pub const HARD_MESSAGES: usize = 3;
/// Display time of each easy-win message, in seconds.
pub const EASY_MESSAGE_DELAYS: [f32; 7] = [2.0, 3.0, 2.0, 3.0, 2.0, 3.0, 4.0];
/// Click-through closing lines.
pub const FINAL_TEXTS: usize = 5;
pub const CURTAIN_DELAY: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposePhase {
    Choice,
    Game,
    HardWin,
    EasyWin,
    Texts,
    Reveal,
}

impl ProposePhase {
    pub fn code(self) -> u32 {
        match self {
            ProposePhase::Choice => 0,
            ProposePhase::Game => 1,
            ProposePhase::HardWin => 2,
            ProposePhase::EasyWin => 3,
            ProposePhase::Texts => 4,
            ProposePhase::Reveal => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProposeTimer {
    NextEasyMessage,
    OpenCurtain,
}

pub struct ProposeDay {
    phase: ProposePhase,
    difficulty: Difficulty,
    maze: Option<MazeSession>,
    message: usize,
    easy_timer: Option<TimerHandle>,
    curtain_open: bool,
    timers: Scheduler<ProposeTimer>,
}

impl ProposeDay {
    pub fn new() -> Self {
        Self {
            phase: ProposePhase::Choice,
            difficulty: Difficulty::default(),
            maze: None,
            message: 0,
            easy_timer: None,
            curtain_open: false,
            timers: Scheduler::new(),
        }
    }

    pub fn phase(&self) -> ProposePhase {
        self.phase
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn maze(&self) -> Option<&MazeSession> {
        self.maze.as_ref()
    }

    pub fn message(&self) -> usize {
        self.message
    }

    pub fn curtain_open(&self) -> bool {
        self.curtain_open
    }

    fn enter(&mut self, phase: ProposePhase, ctx: &mut StageContext) {
        self.timers.begin_session();
        self.easy_timer = None;
        self.phase = phase;
        self.message = 0;
        log::info!("propose day: entering {:?}", phase);
        ctx.emit_phase(phase.code());

        match phase {
            ProposePhase::Choice => self.maze = None,
            ProposePhase::Game => {
                self.maze = Some(MazeSession::for_difficulty(self.difficulty, &mut ctx.rng));
            }
            ProposePhase::HardWin => {
                self.maze = None;
                emit_message(ctx, 0, HARD_MESSAGES);
            }
            ProposePhase::EasyWin => {
                self.maze = None;
                emit_message(ctx, 0, EASY_MESSAGE_DELAYS.len());
                self.easy_timer = Some(self.timers.after(EASY_MESSAGE_DELAYS[0], ProposeTimer::NextEasyMessage));
            }
            ProposePhase::Texts => emit_message(ctx, 0, FINAL_TEXTS),
            ProposePhase::Reveal => {
                self.timers.after(CURTAIN_DELAY, ProposeTimer::OpenCurtain);
            }
        }
    }

    fn choose(&mut self, difficulty: Difficulty, ctx: &mut StageContext) {
        self.difficulty = difficulty;
        ctx.emit_cue(CueEvent::CLICK);
        self.enter(ProposePhase::Game, ctx);
    }

    fn try_move(&mut self, dir: Direction, ctx: &mut StageContext) {
        let Some(maze) = &mut self.maze else { return };
        let outcome = maze.attempt_move(dir);
        if !outcome.accepted {
            ctx.emit_cue(CueEvent::BUMP);
            return;
        }

        let pos = maze.player();
        ctx.emit_event(StageEvent::new(StageEvent::PLAYER_MOVED, pos.x as f32, pos.y as f32, maze.intensity()));
        ctx.emit_cue(CueEvent::STEP);

        if outcome.reached_goal {
            let grid = maze.grid();
            let shortest = grid.shortest_path_len(grid.start(), grid.goal()).unwrap_or(0);
            ctx.emit_event(StageEvent::new(StageEvent::MAZE_SOLVED, maze.moves() as f32, shortest as f32, 0.0));
            ctx.emit_cue(CueEvent::WIN);
            let next = match self.difficulty {
                Difficulty::Hard => ProposePhase::HardWin,
                Difficulty::Easy => ProposePhase::EasyWin,
            };
            self.enter(next, ctx);
        }
    }

    /// Step a click-through sequence, or move on once it is exhausted.
    fn click_through(&mut self, count: usize, next: ProposePhase, ctx: &mut StageContext) {
        if self.message + 1 < count {
            self.message += 1;
            emit_message(ctx, self.message, count);
        } else {
            self.enter(next, ctx);
        }
    }

    fn next_easy_message(&mut self, ctx: &mut StageContext) {
        self.timers.cancel_opt(&mut self.easy_timer);
        let count = EASY_MESSAGE_DELAYS.len();
        if self.message + 1 < count {
            self.message += 1;
            emit_message(ctx, self.message, count);
            let delay = EASY_MESSAGE_DELAYS[self.message];
            self.easy_timer = Some(self.timers.after(delay, ProposeTimer::NextEasyMessage));
        } else {
            self.enter(ProposePhase::Texts, ctx);
        }
    }

    fn write_outputs(&self, out: &mut Vec<f32>) {
        out.clear();
        out.push(self.phase.code() as f32);
        out.push(match self.difficulty {
            Difficulty::Easy => 0.0,
            Difficulty::Hard => 1.0,
        });
        out.push(self.message as f32);
        out.push(if self.curtain_open { 1.0 } else { 0.0 });

        let Some(maze) = &self.maze else {
            out.extend_from_slice(&[0.0; 9]);
            return;
        };
        let pos = maze.player();
        let glow = maze.glow();
        out.extend_from_slice(&[
            pos.x as f32,
            pos.y as f32,
            maze.intensity(),
            glow.blur,
            glow.spread,
            glow.alpha,
            glow.border_alpha,
        ]);
        let grid = maze.grid();
        out.push(grid.width() as f32);
        out.push(grid.height() as f32);
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let open = grid.cell(CellPos::new(x, y)) == Cell::Path;
                out.push(if open { 1.0 } else { 0.0 });
            }
        }
    }
}

fn emit_message(ctx: &mut StageContext, index: usize, count: usize) {
    ctx.emit_event(StageEvent::new(StageEvent::MESSAGE, index as f32, count as f32, 0.0));
}

impl Default for ProposeDay {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for ProposeDay {
    fn config(&self) -> StageConfig {
        // Room for the largest maze grid
        StageConfig {
            max_outputs: 1024,
            ..StageConfig::default()
        }
    }

    fn init(&mut self, ctx: &mut StageContext) {
        self.enter(ProposePhase::Choice, ctx);
    }

    fn update(&mut self, ctx: &mut StageContext, input: &InputQueue) {
        for event in input.iter() {
            match self.phase {
                ProposePhase::Choice => match event.control() {
                    Some(Control::ChooseEasy) => self.choose(Difficulty::Easy, ctx),
                    Some(Control::ChooseHard) => self.choose(Difficulty::Hard, ctx),
                    _ => {}
                },
                ProposePhase::Game => {
                    if let Some(dir) = event.direction() {
                        self.try_move(dir, ctx);
                    }
                }
                ProposePhase::HardWin => {
                    if event.control() == Some(Control::Advance) {
                        self.click_through(HARD_MESSAGES, ProposePhase::Texts, ctx);
                    }
                }
                ProposePhase::EasyWin => {
                    if event.control() == Some(Control::Advance) {
                        self.next_easy_message(ctx);
                    }
                }
                ProposePhase::Texts => {
                    if event.control() == Some(Control::Advance) {
                        self.click_through(FINAL_TEXTS, ProposePhase::Reveal, ctx);
                    }
                }
                ProposePhase::Reveal => {}
            }
        }

        for tag in self.timers.advance(ctx.dt) {
            match tag {
                ProposeTimer::NextEasyMessage => {
                    if self.phase == ProposePhase::EasyWin {
                        self.next_easy_message(ctx);
                    }
                }
                ProposeTimer::OpenCurtain => {
                    self.curtain_open = true;
                    log::info!("propose day: curtain open");
                    ctx.emit_event(StageEvent::signal(StageEvent::CURTAIN_OPEN));
                    ctx.emit_event(StageEvent::signal(StageEvent::STAGE_FINISHED));
                    ctx.emit_cue(CueEvent::CURTAIN);
                }
            }
        }

        self.write_outputs(&mut ctx.outputs);
    }

    fn phase_code(&self) -> u32 {
        self.phase.code()
    }

    fn is_finished(&self) -> bool {
        self.phase == ProposePhase::Reveal && self.curtain_open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::queue::{InputEvent, KEY_DOWN};

    fn step(day: &mut ProposeDay, ctx: &mut StageContext, events: &[InputEvent]) {
        let mut input = InputQueue::new();
        for e in events {
            input.push(*e);
        }
        ctx.clear_frame_data();
        day.update(ctx, &input);
    }

    fn started() -> (ProposeDay, StageContext) {
        let mut day = ProposeDay::new();
        let mut ctx = StageContext::new(9);
        day.init(&mut ctx);
        (day, ctx)
    }

    #[test]
    fn choice_builds_maze_for_difficulty() {
        let (mut day, mut ctx) = started();
        step(&mut day, &mut ctx, &[Control::ChooseHard.to_event()]);
        assert_eq!(day.phase(), ProposePhase::Game);
        assert_eq!(day.maze().unwrap().grid().width(), 25);
        assert_eq!(ctx.outputs[11], 25.0);
        assert_eq!(ctx.outputs.len(), 13 + 25 * 25);
    }

    #[test]
    fn keys_ignored_before_choice() {
        let (mut day, mut ctx) = started();
        step(&mut day, &mut ctx, &[InputEvent::KeyDown { key_code: KEY_DOWN }]);
        assert_eq!(day.phase(), ProposePhase::Choice);
        assert!(day.maze().is_none());
    }

    #[test]
    fn hard_win_clicks_through_to_texts_then_reveal() {
        let (mut day, mut ctx) = started();
        day.difficulty = Difficulty::Hard;
        day.enter(ProposePhase::HardWin, &mut ctx);

        for _ in 0..HARD_MESSAGES - 1 {
            step(&mut day, &mut ctx, &[Control::Advance.to_event()]);
            assert_eq!(day.phase(), ProposePhase::HardWin);
        }
        step(&mut day, &mut ctx, &[Control::Advance.to_event()]);
        assert_eq!(day.phase(), ProposePhase::Texts);

        for _ in 0..FINAL_TEXTS {
            step(&mut day, &mut ctx, &[Control::Advance.to_event()]);
        }
        assert_eq!(day.phase(), ProposePhase::Reveal);
        assert!(!day.is_finished());

        for _ in 0..40 {
            step(&mut day, &mut ctx, &[]);
        }
        assert!(day.curtain_open());
        assert!(day.is_finished());
    }

    #[test]
    fn easy_win_messages_run_on_timers() {
        let (mut day, mut ctx) = started();
        day.enter(ProposePhase::EasyWin, &mut ctx);

        // 19 s of messages in total
        let mut seen = Vec::new();
        for _ in 0..(60 * 18) {
            step(&mut day, &mut ctx, &[]);
            seen.extend(ctx.events.iter().filter(|e| e.kind() == StageEvent::MESSAGE).map(|e| e.a as usize));
        }
        assert_eq!(day.phase(), ProposePhase::EasyWin);
        assert_eq!(seen, vec![1, 2, 3, 4, 5, 6]);

        for _ in 0..(60 * 2) {
            step(&mut day, &mut ctx, &[]);
        }
        assert_eq!(day.phase(), ProposePhase::Texts);
    }

    #[test]
    fn click_skips_an_easy_message_without_double_advance() {
        let (mut day, mut ctx) = started();
        day.enter(ProposePhase::EasyWin, &mut ctx);
        step(&mut day, &mut ctx, &[Control::Advance.to_event()]);
        assert_eq!(day.message(), 1);
        // The first message's timer was cancelled; only message 1's 3 s delay runs
        for _ in 0..(60 * 2 + 30) {
            step(&mut day, &mut ctx, &[]);
        }
        assert_eq!(day.message(), 1);
    }

    #[test]
    fn phase_exit_cancels_curtain_timer() {
        let (mut day, mut ctx) = started();
        day.enter(ProposePhase::Reveal, &mut ctx);
        day.enter(ProposePhase::Choice, &mut ctx);
        for _ in 0..60 {
            step(&mut day, &mut ctx, &[]);
        }
        assert!(!day.curtain_open());
    }
}
