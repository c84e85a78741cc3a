use std::cell::RefCell;

use pixels::{Pixels, SurfaceTexture};
use tracing::debug;
use winit::event::{Event, WindowEvent};
use winit::event_loop::EventLoop;
use winit::platform::run_return::EventLoopExtRunReturn;
use winit::window::{Window, WindowBuilder};

use super::{Frame, RasterRenderer, RenderAdapter, RenderMode, Scene};
use crate::config::ScreenSize;
use crate::error::Error;
use crate::Result;

thread_local! {
    static EVENT_LOOP: RefCell<LoopSlot<EventLoop<()>>> = RefCell::new(LoopSlot::new());
}

/// Holds a value that may be built only once, lending it to one owner at a
/// time.
struct LoopSlot<T> {
    item: Option<T>,
    created: bool,
}

impl<T> LoopSlot<T> {
    fn new() -> Self {
        Self {
            item: None,
            created: false,
        }
    }

    fn checkout(&mut self, make: impl FnOnce() -> T) -> Result<T> {
        if let Some(item) = self.item.take() {
            return Ok(item);
        }
        if self.created {
            return Err(Error::Render("event loop is held by another window renderer".into()));
        }
        self.created = true;
        Ok(make())
    }

    fn give_back(&mut self, item: T) {
        self.item = Some(item);
    }
}

struct Surface {
    // Dropped before the window it draws into
    pixels: Pixels,
    window: Window,
}

/// Presents raster frames in a desktop window.
///
/// winit allows one event loop per process. Renderers borrow it from a
/// thread-local slot and hand it back on close, so a closed environment can
/// be followed by a new window; two open at once is an error.
pub struct WindowRenderer {
    raster: RasterRenderer,
    surface: Option<Surface>,
    event_loop: Option<EventLoop<()>>,
}

impl WindowRenderer {
    pub fn new(screen: ScreenSize) -> Result<Self> {
        let raster = RasterRenderer::new(screen)?;
        let event_loop = EVENT_LOOP.with(|slot| slot.borrow_mut().checkout(EventLoop::new))?;
        match Self::open(screen, &event_loop) {
            Ok(surface) => Ok(Self {
                raster,
                surface: Some(surface),
                event_loop: Some(event_loop),
            }),
            Err(e) => {
                EVENT_LOOP.with(|slot| slot.borrow_mut().give_back(event_loop));
                Err(e)
            }
        }
    }

    fn open(screen: ScreenSize, event_loop: &EventLoop<()>) -> Result<Surface> {
        let (width, height) = (screen.width as u32, screen.height as u32);
        let window = WindowBuilder::new()
            .with_title("Flappy Bird")
            .with_inner_size(winit::dpi::LogicalSize::new(width, height))
            .with_resizable(false)
            .build(event_loop)
            .map_err(|e| Error::Render(e.to_string()))?;

        let window_size = window.inner_size();
        let surface_texture = SurfaceTexture::new(window_size.width, window_size.height, &window);
        let pixels = Pixels::new(width, height, surface_texture).map_err(|e| Error::Render(e.to_string()))?;
        debug!(width, height, "window renderer opened");
        Ok(Surface { pixels, window })
    }

    fn present(&mut self) -> Result<()> {
        let (Some(surface), Some(event_loop)) = (self.surface.as_mut(), self.event_loop.as_mut()) else {
            return Ok(());
        };
        surface.pixels.frame_mut().copy_from_slice(self.raster.buffer());
        surface.pixels.render().map_err(|e| Error::Render(e.to_string()))?;
        surface.window.request_redraw();

        let mut close_requested = false;
        event_loop.run_return(|event, _, control_flow| match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => close_requested = true,
            Event::MainEventsCleared => control_flow.set_exit(),
            _ => {}
        });

        if close_requested {
            debug!("window closed by user");
            self.surface = None;
        }
        Ok(())
    }
}

impl RenderAdapter for WindowRenderer {
    fn draw(&mut self, scene: &Scene, mode: RenderMode) -> Result<Option<Frame>> {
        self.raster.rasterize(scene);
        match mode {
            RenderMode::Human => {
                self.present()?;
                Ok(None)
            }
            RenderMode::RgbArray => Ok(Some(self.raster.frame())),
        }
    }

    fn close(&mut self) {
        if self.surface.take().is_some() {
            debug!("window renderer closed");
        }
        if let Some(event_loop) = self.event_loop.take() {
            // The slot is gone only during thread teardown
            let _ = EVENT_LOOP.try_with(|slot| slot.borrow_mut().give_back(event_loop));
        }
    }
}

impl Drop for WindowRenderer {
    fn drop(&mut self) {
        self.close();
    }
}
