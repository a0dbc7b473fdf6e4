/// Input state written by the host's capture layer and read by the camera
use std::collections::HashSet;

/// Whether pointer/keyboard input is currently captured by the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    Active,
}

/// Look movement accumulated since the last camera update
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LookDelta {
    pub pitch: f32,
    pub yaw: f32,
}

/// Held keys, pending look delta and capture state.
///
/// Key identifiers are compared case-insensitively by storing them uppercased.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<String>,
    look: LookDelta,
    capture: CaptureState,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: &str) {
        self.held.insert(key.to_uppercase());
    }

    pub fn release(&mut self, key: &str) {
        self.held.remove(&key.to_uppercase());
    }

    pub fn release_all(&mut self) {
        self.held.clear();
    }

    pub fn is_held(&self, key: &str) -> bool {
        self.held.contains(&key.to_uppercase())
    }

    pub fn held_keys(&self) -> impl Iterator<Item = &str> {
        self.held.iter().map(String::as_str)
    }

    /// Add raw look movement; several events within one tick are summed
    pub fn accumulate_look(&mut self, d_pitch: f32, d_yaw: f32) {
        self.look.pitch += d_pitch;
        self.look.yaw += d_yaw;
    }

    pub fn look_delta(&self) -> LookDelta {
        self.look
    }

    /// Return the pending look delta and reset it
    pub fn take_look_delta(&mut self) -> LookDelta {
        std::mem::take(&mut self.look)
    }

    pub fn discard_look_delta(&mut self) {
        self.look = LookDelta::default();
    }

    pub fn capture_state(&self) -> CaptureState {
        self.capture
    }

    pub fn is_active(&self) -> bool {
        self.capture == CaptureState::Active
    }

    /// idle -> active
    pub fn capture(&mut self) {
        if self.capture == CaptureState::Idle {
            log::debug!("Input captured");
        }
        self.capture = CaptureState::Active;
    }

    /// active -> idle. Pending look movement is dropped together with the
    /// state change so it cannot leak into the next capture.
    pub fn cancel(&mut self) {
        if self.capture == CaptureState::Active {
            log::debug!("Input released");
        }
        self.capture = CaptureState::Idle;
        self.discard_look_delta();
    }
}
