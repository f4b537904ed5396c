use glam::Vec2;

use super::layout::{ClawConfig, MachineLayout, Rect};
use crate::core::rng::Rng;

/// Identifier of a toy inside one machine session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToyId(pub u32);

/// The six plush kinds on the machine floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToyKind {
    Bear,
    Bunny,
    Golem,
    Cucumber,
    Penguin,
    Robot,
}

impl ToyKind {
    pub const ALL: [ToyKind; 6] = [
        ToyKind::Bear,
        ToyKind::Bunny,
        ToyKind::Golem,
        ToyKind::Cucumber,
        ToyKind::Penguin,
        ToyKind::Robot,
    ];

    /// Sprite size at 2x pixel scale.
    pub fn size(self) -> Vec2 {
        match self {
            ToyKind::Bear => Vec2::new(40.0, 54.0),
            ToyKind::Bunny => Vec2::new(40.0, 58.0),
            ToyKind::Golem => Vec2::new(40.0, 54.0),
            ToyKind::Cucumber => Vec2::new(32.0, 56.0),
            ToyKind::Penguin => Vec2::new(48.0, 44.0),
            ToyKind::Robot => Vec2::new(40.0, 60.0),
        }
    }

    pub fn code(self) -> u32 {
        match self {
            ToyKind::Bear => 0,
            ToyKind::Bunny => 1,
            ToyKind::Golem => 2,
            ToyKind::Cucumber => 3,
            ToyKind::Penguin => 4,
            ToyKind::Robot => 5,
        }
    }
}

/// A toy on the machine floor.
#[derive(Debug, Clone)]
pub struct Toy {
    pub id: ToyId,
    pub kind: ToyKind,
    /// Placement slot. Higher slots sit on top when toys overlap.
    pub index: usize,
    /// Top-left corner in machine space.
    pub pos: Vec2,
    pub size: Vec2,
    /// Tilt in degrees while hanging from the claw.
    pub swing: f32,
    pub grabbed: bool,
    pub collected: bool,
    /// Position in the collection tray once collected.
    pub tray_slot: Option<usize>,
}

impl Toy {
    pub fn rect(&self) -> Rect {
        Rect { pos: self.pos, size: self.size }
    }

    /// Tilt the toy so it hangs towards the claw point.
    pub fn swing_towards(&mut self, claw: Vec2) {
        let center = self.rect().center();
        let angle = (center.y - claw.y).atan2(center.x - claw.x).to_degrees().round() - 90.0;
        let adjusted = angle.rem_euclid(360.0).round();
        self.swing = if adjusted < 180.0 { -adjusted } else { 360.0 - adjusted };
    }
}

/// Owns every toy of a claw session. The gantry only refers to toys by id.
#[derive(Debug, Clone, Default)]
pub struct ToyBox {
    toys: Vec<Toy>,
    collected: usize,
}

impl ToyBox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lay toys out on a 4-column grid over the machine floor with a little jitter.
    pub fn populate(layout: &MachineLayout, config: &ClawConfig, rng: &mut Rng) -> Self {
        let mut kinds: Vec<ToyKind> = ToyKind::ALL.iter().chain(ToyKind::ALL.iter()).copied().collect();
        rng.shuffle(&mut kinds);

        let cb = layout.corner_buffer;
        let col_width = (layout.width - cb * 3.0) / 4.0;
        let row_height = (layout.bottom_height - cb * 2.0) / 3.0;

        let mut toys = Vec::with_capacity(config.toy_slots);
        for index in 0..config.toy_slots {
            if Some(index) == config.reserved_slot {
                continue;
            }
            let kind = kinds[index % kinds.len()];
            let size = kind.size();
            let col = (index % 4) as f32;
            let row = (index / 4) as f32;
            let x = cb + col * col_width + size.x / 2.0 + rng.range_inclusive(-6, 6) as f32;
            let y = layout.bottom_top + cb + row * row_height - size.y / 2.0 + rng.range_inclusive(-2, 2) as f32;

            toys.push(Toy {
                id: ToyId(index as u32),
                kind,
                index,
                pos: Vec2::new(x, y),
                size,
                swing: 0.0,
                grabbed: false,
                collected: false,
                tray_slot: None,
            });
        }

        log::debug!("claw machine: placed {} toys", toys.len());
        Self { toys, collected: 0 }
    }

    /// Add a toy directly (tests and scripted layouts).
    pub fn insert(&mut self, toy: Toy) {
        self.toys.push(toy);
    }

    pub fn get(&self, id: ToyId) -> Option<&Toy> {
        self.toys.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: ToyId) -> Option<&mut Toy> {
        self.toys.iter_mut().find(|t| t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toy> {
        self.toys.iter()
    }

    /// Toys still available to grab.
    pub fn remaining(&self) -> impl Iterator<Item = &Toy> {
        self.toys.iter().filter(|t| !t.collected)
    }

    /// Highest-slot uncollected toy whose box intersects the footprint.
    pub fn topmost_under(&self, footprint: &Rect) -> Option<ToyId> {
        self.remaining()
            .filter(|t| t.rect().intersects(footprint))
            .max_by_key(|t| t.index)
            .map(|t| t.id)
    }

    /// Flag a toy as collected and give it the next tray slot.
    pub fn collect(&mut self, id: ToyId) -> Option<usize> {
        let slot = self.collected;
        let toy = self.toys.iter_mut().find(|t| t.id == id && !t.collected)?;
        toy.collected = true;
        toy.grabbed = false;
        toy.swing = 0.0;
        toy.tray_slot = Some(slot);
        self.collected += 1;
        Some(slot)
    }

    pub fn collected_count(&self) -> usize {
        self.collected
    }

    pub fn len(&self) -> usize {
        self.toys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_at(index: usize, x: f32, y: f32) -> Toy {
        Toy {
            id: ToyId(index as u32),
            kind: ToyKind::Bear,
            index,
            pos: Vec2::new(x, y),
            size: ToyKind::Bear.size(),
            swing: 0.0,
            grabbed: false,
            collected: false,
            tray_slot: None,
        }
    }

    #[test]
    fn populate_skips_reserved_slot() {
        let mut rng = Rng::new(3);
        let toys = ToyBox::populate(&MachineLayout::default(), &ClawConfig::default(), &mut rng);
        assert_eq!(toys.len(), 11);
        assert!(toys.iter().all(|t| t.index != 8));
    }

    #[test]
    fn populate_uses_each_kind_at_most_twice() {
        let mut rng = Rng::new(12);
        let toys = ToyBox::populate(&MachineLayout::default(), &ClawConfig::default(), &mut rng);
        for kind in ToyKind::ALL {
            assert!(toys.iter().filter(|t| t.kind == kind).count() <= 2);
        }
    }

    #[test]
    fn topmost_under_prefers_highest_index() {
        let mut toys = ToyBox::new();
        toys.insert(toy_at(2, 100.0, 300.0));
        toys.insert(toy_at(5, 110.0, 305.0));
        toys.insert(toy_at(9, 250.0, 300.0));
        let footprint = Rect::new(105.0, 310.0, 40.0, 32.0);

        for _ in 0..5 {
            assert_eq!(toys.topmost_under(&footprint), Some(ToyId(5)));
        }
    }

    #[test]
    fn collected_toys_are_not_candidates() {
        let mut toys = ToyBox::new();
        toys.insert(toy_at(2, 100.0, 300.0));
        toys.insert(toy_at(5, 110.0, 305.0));
        let footprint = Rect::new(105.0, 310.0, 40.0, 32.0);

        assert_eq!(toys.collect(ToyId(5)), Some(0));
        assert_eq!(toys.topmost_under(&footprint), Some(ToyId(2)));
        assert_eq!(toys.collect(ToyId(5)), None);
        assert_eq!(toys.collected_count(), 1);
    }

    #[test]
    fn swing_is_zero_when_hanging_straight_down() {
        let mut toy = toy_at(0, 0.0, 100.0);
        let center = toy.rect().center();
        toy.swing_towards(Vec2::new(center.x, 0.0));
        assert_eq!(toy.swing, 0.0);
    }
}
