/// Terminal host for the first-person viewer
///
/// Captures keyboard and mouse input with crossterm, drives the core frame
/// loop at a fixed rate and rasterizes the result as colored ASCII.
use crossterm::{
    cursor,
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use fpv_core::{CameraRole, FrameStats, Viewer};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod assets;
pub mod capture;
pub mod renderer;

pub use capture::{Command, InputCapture};
pub use renderer::AsciiRenderer;

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    viewer: Viewer,
    capture: InputCapture,
    renderer: AsciiRenderer,
    running: bool,
    target_frame_time: Duration,
    last_tick: Instant,
    last_fps_sample: Instant,
    frame_count: u32,
    fps: f32,
    stats: FrameStats,
    keyboard_enhanced: bool,
}

impl TerminalApp {
    pub fn new(viewer: Viewer, target_fps: u32) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let keyboard_enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false);
        let now = Instant::now();

        Ok(Self {
            viewer,
            capture: InputCapture::new(keyboard_enhanced),
            renderer: AsciiRenderer::new(width as usize, height as usize),
            running: true,
            target_frame_time: Duration::from_millis(1000 / u64::from(target_fps.max(1))),
            last_tick: now,
            last_fps_sample: now,
            frame_count: 0,
            fps: 0.0,
            stats: FrameStats::default(),
            keyboard_enhanced,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        enter_session(&mut stdout(), self.keyboard_enhanced)?;
        log::info!(
            "Terminal session started (key release reporting: {})",
            self.keyboard_enhanced
        );

        let result = self.main_loop();

        // Cleanup
        leave_session(&mut stdout(), self.keyboard_enhanced)?;
        terminal::disable_raw_mode()?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        self.last_tick = Instant::now();

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            self.handle_input()?;

            // Update and render
            let dt = frame_start.duration_since(self.last_tick);
            self.last_tick = frame_start;
            self.tick(dt);
            self.present()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < self.target_frame_time {
                std::thread::sleep(self.target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_fps_sample).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_fps_sample).as_secs_f32();
                self.frame_count = 0;
                self.last_fps_sample = now;
            }
        }

        Ok(())
    }

    /// Drain every pending event, then age out keys the terminal won't release
    fn handle_input(&mut self) -> io::Result<()> {
        while event::poll(Duration::from_millis(0))? {
            let event = event::read()?;
            match self.capture.handle_event(event, Instant::now()) {
                Some(Command::Quit) => self.running = false,
                Some(Command::ToggleView) => {
                    self.renderer.toggle_view();
                    log::debug!("Viewing from {:?}", self.renderer.view());
                }
                Some(Command::Resize(width, height)) => {
                    self.renderer.resize(width as usize, height as usize);
                    queue!(stdout(), terminal::Clear(ClearType::All))?;
                }
                None => {}
            }
        }
        self.capture.expire_keys(Instant::now());
        Ok(())
    }

    fn tick(&mut self, dt: Duration) {
        let aspect_ratio = self.renderer.aspect_ratio();
        let result = self
            .viewer
            .tick(self.capture.input_mut(), dt, aspect_ratio, &mut self.renderer);
        self.stats = match result {
            Ok(stats) => stats,
            Err(never) => match never {},
        };
    }

    fn present(&mut self) -> io::Result<()> {
        let mut stdout = stdout();
        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        let view = match self.renderer.view() {
            CameraRole::Player => "player",
            CameraRole::Projector => "projector",
        };
        let hint = if self.capture.input().is_active() {
            "WASD=Move Shift=Run Space=Jump Mouse/Arrows=Look Esc=Release"
        } else {
            "Click or Enter to capture input"
        };
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "FPV | FPS: {:.1} | {} parts, {} tris | view: {} (V) | {} | Q=Quit",
                self.fps, self.stats.parts_drawn, self.stats.triangles_drawn, view, hint
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

/// Alternate screen, hidden cursor, mouse and focus reporting
fn enter_session<W: Write>(out: &mut W, keyboard_enhanced: bool) -> io::Result<()> {
    execute!(
        out,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        EnableMouseCapture,
        EnableFocusChange
    )?;
    if keyboard_enhanced {
        execute!(
            out,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    Ok(())
}

fn leave_session<W: Write>(out: &mut W, keyboard_enhanced: bool) -> io::Result<()> {
    if keyboard_enhanced {
        execute!(out, PopKeyboardEnhancementFlags)?;
    }
    execute!(
        out,
        DisableFocusChange,
        DisableMouseCapture,
        terminal::LeaveAlternateScreen,
        cursor::Show
    )
}
