/// First-person camera and its view-projection matrix
use std::f32::consts::FRAC_PI_2;
use std::time::Duration;

use crate::input::InputState;
use crate::matrix::Matrix4;
use crate::vector::Vector3;

/// Key identifiers (uppercase) driving the player camera
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBindings {
    pub forward: String,
    pub back: String,
    pub left: String,
    pub right: String,
    pub run: String,
    pub jump: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: "W".into(),
            back: "S".into(),
            left: "A".into(),
            right: "D".into(),
            run: "SHIFT".into(),
            jump: " ".into(),
        }
    }
}

/// Movement and projection tunables.
///
/// Speeds are per millisecond; gravity is applied once per tick.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    pub speed: f32,
    pub sensitivity: f32,
    pub eye_height: f32,
    pub run_multiplier: f32,
    pub jump_impulse: f32,
    pub gravity: f32,
    pub vertical_fov_degrees: f32,
    pub bindings: KeyBindings,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            speed: 0.003,
            sensitivity: 0.005,
            eye_height: 1.7,
            run_multiplier: 2.0,
            jump_impulse: 0.13,
            gravity: 0.01,
            vertical_fov_degrees: 90.0,
            bindings: KeyBindings::default(),
        }
    }
}

/// Vertical velocity is divided by this per millisecond of elapsed time
const VERTICAL_TIME_SCALE: f32 = 20.0;

/// Height of the ground plane the camera rests on
const REST_HEIGHT: f32 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraRole {
    /// Reads live input and integrates movement
    Player,
    /// Fixed or script-driven secondary viewpoint
    Projector,
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vector3,
    pub pitch: f32,
    pub yaw: f32,
    pub velocity: Vector3,
    pub config: CameraConfig,
    role: CameraRole,
}

impl Camera {
    pub fn player(config: CameraConfig) -> Self {
        Self {
            position: Vector3::zero(),
            pitch: 0.0,
            yaw: 0.0,
            velocity: Vector3::zero(),
            config,
            role: CameraRole::Player,
        }
    }

    pub fn projector(config: CameraConfig, position: Vector3, pitch: f32, yaw: f32) -> Self {
        Self {
            position,
            pitch,
            yaw,
            velocity: Vector3::zero(),
            config,
            role: CameraRole::Projector,
        }
    }

    pub fn role(&self) -> CameraRole {
        self.role
    }

    /// Move a scripted camera; pitch is clamped like the player's
    pub fn set_pose(&mut self, position: Vector3, pitch: f32, yaw: f32) {
        self.position = position;
        self.pitch = pitch.clamp(-FRAC_PI_2, FRAC_PI_2);
        self.yaw = yaw;
    }

    pub fn is_grounded(&self) -> bool {
        self.position.y == REST_HEIGHT
    }

    /// Advance one tick. Projectors ignore input entirely.
    pub fn update(&mut self, input: &mut InputState, dt: Duration) {
        if self.role == CameraRole::Projector {
            return;
        }
        if !input.is_active() {
            input.discard_look_delta();
            return;
        }

        let dt_ms = dt.as_secs_f32() * 1000.0;
        self.look(input);
        self.walk(input, dt_ms);
        self.fall(input, dt_ms);
    }

    fn look(&mut self, input: &mut InputState) {
        let delta = input.take_look_delta();
        let pitch = self.pitch + delta.pitch * self.config.sensitivity;
        self.pitch = pitch.clamp(-FRAC_PI_2, FRAC_PI_2);
        self.yaw += delta.yaw * self.config.sensitivity;
    }

    /// Planar movement: build in (x, forward) space, rotate by yaw, map onto x/z
    fn walk(&mut self, input: &InputState, dt_ms: f32) {
        let bindings = &self.config.bindings;
        let moves = [
            (&bindings.forward, Vector3::new(0.0, -1.0, 0.0)),
            (&bindings.back, Vector3::new(0.0, 1.0, 0.0)),
            (&bindings.left, Vector3::new(-1.0, 0.0, 0.0)),
            (&bindings.right, Vector3::new(1.0, 0.0, 0.0)),
        ];

        let mut planar = Vector3::zero();
        for (key, direction) in moves {
            if input.is_held(key) {
                planar.add(direction);
            }
        }

        let run = if input.is_held(&bindings.run) {
            self.config.run_multiplier
        } else {
            1.0
        };
        planar
            .rotate_z(self.yaw)
            .normalize()
            .multiply(self.config.speed)
            .multiply(run)
            .multiply(dt_ms);

        self.position.add(Vector3::new(planar.x, 0.0, planar.y));
    }

    fn fall(&mut self, input: &InputState, dt_ms: f32) {
        if self.is_grounded() && input.is_held(&self.config.bindings.jump) {
            self.velocity.y = self.config.jump_impulse;
        }
        if self.position.y > REST_HEIGHT {
            self.velocity.y -= self.config.gravity;
        }

        self.position.y += self.velocity.y * dt_ms / VERTICAL_TIME_SCALE;

        if self.position.y <= REST_HEIGHT {
            self.position.y = REST_HEIGHT;
            self.velocity.y = 0.0;
        }
    }

    /// `P(aspect, 90°) * Rx(pitch) * Ry(yaw) * T(-position) * T(0, -eye_height, 0)`
    pub fn view_projection(&self, aspect_ratio: f32) -> Matrix4 {
        Matrix4::perspective(aspect_ratio, false, self.config.vertical_fov_degrees)
            .x_rotate(self.pitch)
            .y_rotate(self.yaw)
            .translate(-self.position.x, -self.position.y, -self.position.z)
            .translate(0.0, -self.config.eye_height, 0.0)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::player(CameraConfig::default())
    }
}
