/// Maps crossterm events onto the core `InputState`
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use fpv_core::InputState;

/// Look counts per terminal column / row of mouse travel
const MOUSE_COUNTS_PER_COLUMN: f32 = 8.0;
const MOUSE_COUNTS_PER_ROW: f32 = 16.0;

/// Look counts per arrow key press
const ARROW_COUNTS: f32 = 20.0;

/// How long a key counts as held after its last press or repeat, when the
/// terminal cannot report releases
const HOLD_TIMEOUT: Duration = Duration::from_millis(250);

const SHIFT: &str = "SHIFT";

/// Host-level actions that do not belong to the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    ToggleView,
    Resize(u16, u16),
}

/// Owns the input state; the only writer of it
pub struct InputCapture {
    input: InputState,
    reports_release: bool,
    last_seen: HashMap<String, Instant>,
    last_mouse: Option<(u16, u16)>,
}

impl InputCapture {
    /// `reports_release` is true when the terminal sends key release events
    pub fn new(reports_release: bool) -> Self {
        Self {
            input: InputState::new(),
            reports_release,
            last_seen: HashMap::new(),
            last_mouse: None,
        }
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn handle_event(&mut self, event: Event, now: Instant) -> Option<Command> {
        match event {
            Event::Key(key) => self.handle_key(key, now),
            Event::Mouse(mouse) => {
                self.handle_mouse(mouse);
                None
            }
            Event::Resize(width, height) => Some(Command::Resize(width, height)),
            Event::FocusLost => {
                self.input.cancel();
                self.release_all();
                None
            }
            _ => None,
        }
    }

    /// Release keys not seen within the hold timeout
    pub fn expire_keys(&mut self, now: Instant) {
        if self.reports_release {
            return;
        }
        let expired: Vec<String> = self
            .last_seen
            .iter()
            .filter(|(_, seen)| now.duration_since(**seen) > HOLD_TIMEOUT)
            .map(|(key, _)| key.clone())
            .collect();
        for key in expired {
            self.last_seen.remove(&key);
            self.input.release(&key);
        }
    }

    fn release_all(&mut self) {
        self.last_seen.clear();
        self.input.release_all();
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Option<Command> {
        if key.kind == KeyEventKind::Release {
            if let Some(name) = key_name(key.code) {
                self.input.release(&name);
            }
            if !key.modifiers.contains(KeyModifiers::SHIFT) {
                self.input.release(SHIFT);
            }
            return None;
        }

        match key.code {
            KeyCode::Esc => {
                self.input.cancel();
                self.release_all();
                return None;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => return Some(Command::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Some(Command::Quit)
            }
            KeyCode::Char('v') | KeyCode::Char('V') => return Some(Command::ToggleView),
            KeyCode::Enter => {
                self.input.capture();
                return None;
            }
            KeyCode::Up => self.input.accumulate_look(-ARROW_COUNTS, 0.0),
            KeyCode::Down => self.input.accumulate_look(ARROW_COUNTS, 0.0),
            KeyCode::Left => self.input.accumulate_look(0.0, -ARROW_COUNTS),
            KeyCode::Right => self.input.accumulate_look(0.0, ARROW_COUNTS),
            _ => {}
        }

        // Shifted letters arrive uppercase with the SHIFT modifier.
        let shifted = key.modifiers.contains(KeyModifiers::SHIFT)
            || matches!(key.code, KeyCode::Char(c) if c.is_uppercase());
        if shifted {
            self.hold(SHIFT.to_string(), now);
        } else if self.reports_release {
            self.input.release(SHIFT);
        }

        if let Some(name) = key_name(key.code) {
            self.hold(name, now);
        }
        None
    }

    fn hold(&mut self, name: String, now: Instant) {
        self.input.press(&name);
        if !self.reports_release {
            self.last_seen.insert(name, now);
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let position = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(_) => self.input.capture(),
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                if let Some((column, row)) = self.last_mouse {
                    let d_yaw = (mouse.column as f32 - column as f32) * MOUSE_COUNTS_PER_COLUMN;
                    let d_pitch = (mouse.row as f32 - row as f32) * MOUSE_COUNTS_PER_ROW;
                    self.input.accumulate_look(d_pitch, d_yaw);
                }
            }
            _ => {}
        }
        self.last_mouse = Some(position);
    }
}

/// Uppercase identifier for keys the camera may bind
fn key_name(code: KeyCode) -> Option<String> {
    match code {
        KeyCode::Char(c) => Some(c.to_uppercase().collect()),
        _ => None,
    }
}
