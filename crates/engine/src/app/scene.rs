use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use super::input::{ActionStates, InputAction};
use super::rendering::Canvas;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

/// Input gathered for one simulation tick. `pressed` actions are edges and
/// appear in exactly one snapshot per physical press; `down` actions stay
/// set while the key is held.
#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    down: ActionStates,
    pressed: ActionStates,
    typed_text: String,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(down: ActionStates, pressed: ActionStates, typed_text: String) -> Self {
        Self {
            down,
            pressed,
            typed_text,
        }
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.down.is_down(action)
    }

    pub fn was_pressed(&self, action: InputAction) -> bool {
        self.pressed.is_down(action)
    }

    pub fn typed_text(&self) -> &str {
        &self.typed_text
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.down.set(action, is_down);
        self
    }

    /// Marks `action` as both held and freshly pressed.
    pub fn with_action_pressed(mut self, action: InputAction) -> Self {
        self.down.set(action, true);
        self.pressed.set(action, true);
        self
    }

    pub fn with_typed_text(mut self, text: &str) -> Self {
        self.typed_text.push_str(text);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (self - other).length()
    }

    pub fn lerp(self, target: Vec2, t: f32) -> Vec2 {
        self + (target - self) * t
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

pub trait Scene {
    fn load(&mut self);
    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand;
    fn render(&mut self, canvas: &mut Canvas<'_>);
    fn unload(&mut self);
    fn debug_title(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_marks_pressed_actions_as_down() {
        let snapshot = InputSnapshot::empty().with_action_pressed(InputAction::Confirm);
        assert!(snapshot.was_pressed(InputAction::Confirm));
        assert!(snapshot.is_down(InputAction::Confirm));
        assert!(!snapshot.was_pressed(InputAction::Submit));
    }

    #[test]
    fn held_action_is_not_a_press() {
        let snapshot = InputSnapshot::empty().with_action_down(InputAction::MoveLeft, true);
        assert!(snapshot.is_down(InputAction::MoveLeft));
        assert!(!snapshot.was_pressed(InputAction::MoveLeft));
    }

    #[test]
    fn vec2_lerp_hits_both_endpoints() {
        let a = Vec2::new(0.0, 48.0);
        let b = Vec2::new(96.0, 0.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Vec2::new(48.0, 24.0));
    }

    #[test]
    fn vec2_distance_is_euclidean() {
        assert_eq!(Vec2::new(0.0, 0.0).distance(Vec2::new(3.0, 4.0)), 5.0);
    }
}
