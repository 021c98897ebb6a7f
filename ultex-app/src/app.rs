use crate::screens::ImageBank;
use crate::text::LabelPainter;
use anyhow::Result;
use log::error;
use pixels::{Pixels, SurfaceTexture};
use std::sync::Arc;
use tiny_skia::{Color, Pixmap, PixmapPaint, Transform};
use ultex_capture::SessionRecorder;
use ultex_core::Decision;
use ultex_experiment::{Session, SessionEvent};
use ultex_timing::SystemClock;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Fullscreen, Window, WindowId},
};

/// Full-screen shell: one redraw is one scheduler tick of the session.
pub struct App {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    session: Session<SystemClock, SessionRecorder>,
    images: ImageBank,
    label: LabelPainter,
    label_cache: Option<(String, Pixmap)>,
    current_size: Option<PhysicalSize<u32>>,
    scale_factor: f64,
    fatal: Option<anyhow::Error>,
}

impl App {
    pub fn new(
        session: Session<SystemClock, SessionRecorder>,
        images: ImageBank,
        label: LabelPainter,
    ) -> Self {
        Self {
            window: None,
            pixels: None,
            session,
            images,
            label,
            label_cache: None,
            current_size: None,
            scale_factor: 1.0,
            fatal: None,
        }
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;

        println!("=== ULTIMATUM GAME EXPERIMENT ===");
        println!("Platform: {}", std::env::consts::OS);
        println!("Subject: {}", self.session.config().subject_id);
        println!("Press SPACE to advance the instructions or ESC to exit.\n");

        event_loop.run_app(&mut self)?;

        if let Some(e) = self.fatal.take() {
            return Err(e);
        }
        Ok(())
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let primary_monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .ok_or_else(|| anyhow::anyhow!("No monitor available"))?;

        let window_attributes = Window::default_attributes()
            .with_title("Ultimatum Game")
            .with_fullscreen(Some(Fullscreen::Borderless(Some(primary_monitor))))
            .with_resizable(false);

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let physical_size = window.inner_size();
        self.current_size = Some(physical_size);
        self.scale_factor = window.scale_factor();

        println!(
            "Display: {}×{} at scale {:.2}",
            physical_size.width, physical_size.height, self.scale_factor
        );

        let surface_texture =
            SurfaceTexture::new(physical_size.width, physical_size.height, window.clone());
        self.pixels = Some(Pixels::new(
            physical_size.width,
            physical_size.height,
            surface_texture,
        )?);

        window.set_cursor_visible(false);
        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let (Some(pixels), Some(size)) = (&mut self.pixels, self.current_size) else {
            return Ok(());
        };

        let mut canvas = Pixmap::new(size.width, size.height)
            .ok_or_else(|| anyhow::anyhow!("failed to create canvas"))?;
        canvas.fill(Color::BLACK);

        let screen = self.session.screen();
        if let Some(image) = self.images.scaled(screen, size.width, size.height) {
            canvas.draw_pixmap(
                0,
                0,
                image.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
        }

        if let Some(text) = self.session.offer_label() {
            let stale = self
                .label_cache
                .as_ref()
                .is_none_or(|(cached, _)| cached != text);
            if stale {
                self.label_cache = self
                    .label
                    .render(text)
                    .map(|pm| (text.to_string(), pm));
            }
            if let Some((_, pm)) = &self.label_cache {
                let x = (size.width as i32 - pm.width() as i32) / 2;
                canvas.draw_pixmap(
                    x,
                    40,
                    pm.as_ref(),
                    &PixmapPaint::default(),
                    Transform::identity(),
                    None,
                );
            }
        } else {
            self.label_cache = None;
        }

        pixels.frame_mut().copy_from_slice(canvas.data());
        pixels.render()?;
        Ok(())
    }

    fn handle_input(&mut self, key: winit::keyboard::PhysicalKey, event_loop: &ActiveEventLoop) {
        use winit::keyboard::{KeyCode, PhysicalKey};
        let PhysicalKey::Code(code) = key else {
            return;
        };
        let event = match code {
            KeyCode::Space | KeyCode::Enter => Some(SessionEvent::Ack),
            KeyCode::ArrowLeft => Some(SessionEvent::Choose(Decision::Left)),
            KeyCode::ArrowRight => Some(SessionEvent::Choose(Decision::Right)),
            KeyCode::Escape => {
                self.cleanup_and_exit(event_loop);
                None
            }
            _ => None,
        };
        if let Some(event) = event {
            if let Err(e) = self.session.handle_event(event) {
                self.fail(e, event_loop);
            }
        }
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        self.current_size = Some(new_size);
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.resize_surface(new_size.width, new_size.height) {
                eprintln!("Failed to resize surface: {e}");
            }
            if let Err(e) = pixels.resize_buffer(new_size.width, new_size.height) {
                eprintln!("Failed to resize buffer: {e}");
            }
        }
    }

    fn fail(&mut self, e: anyhow::Error, event_loop: &ActiveEventLoop) {
        error!("session aborted: {e:#}");
        self.fatal = Some(e);
        event_loop.exit();
    }

    fn cleanup_and_exit(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.set_cursor_visible(true);
        }
        println!("\nSession ended at run {}, trial {}.", self.session.run(), self.session.trial());
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                self.fail(e, event_loop);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.cleanup_and_exit(event_loop),
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.render() {
                    self.fail(e, event_loop);
                    return;
                }
                if let Err(e) = self.session.tick() {
                    self.fail(e, event_loop);
                    return;
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() => {
                self.handle_input(event.physical_key, event_loop);
            }
            WindowEvent::Resized(size) => self.handle_resize(size),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.scale_factor = scale_factor;
                if let Some(window) = &self.window {
                    self.handle_resize(window.inner_size());
                }
            }
            _ => {}
        }
    }
}
