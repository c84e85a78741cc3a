#[cfg(feature = "viz")]
mod window;
#[cfg(feature = "viz")]
pub use window::WindowRenderer;

use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::config::{ScreenSize, MAX_SCREEN_DIMENSION};
use crate::error::Error;
use crate::Result;

const SKY: [u8; 4] = [135, 206, 235, 255];
const PIPE: [u8; 4] = [0, 255, 0, 255];
const BIRD: [u8; 4] = [204, 153, 102, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Present to a display if the adapter has one; returns no frame.
    Human,
    /// Return the RGBA frame.
    RgbArray,
}

/// Read-only snapshot of everything a renderer needs. World coordinates,
/// `y` grows upward from the bottom of the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scene {
    pub screen: ScreenSize,
    pub agent: Rect,
    pub obstacle: Rect,
    /// Vertical span `[low, high)` of the obstacle column left open.
    pub safe_band: (i32, i32),
}

/// Row-major RGBA pixels, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let mut px = [0; 4];
        px.copy_from_slice(&self.data[idx..idx + 4]);
        Some(px)
    }
}

/// Draws scenes on behalf of the environment wrapper.
///
/// Created lazily by `FlappyBirdEnv::render` and released by `close`.
pub trait RenderAdapter {
    fn draw(&mut self, scene: &Scene, mode: RenderMode) -> Result<Option<Frame>>;
    fn close(&mut self);
}

/// Byte length of an RGBA buffer covering `screen`.
fn buffer_len(screen: ScreenSize) -> Result<usize> {
    let ScreenSize { width, height } = screen;
    if width <= 0 || height <= 0 || width > MAX_SCREEN_DIMENSION || height > MAX_SCREEN_DIMENSION {
        return Err(Error::Render(format!("cannot rasterize a {}x{} screen", width, height)));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or_else(|| Error::Render(format!("{}x{} frame buffer overflows", width, height)))
}

/// Software renderer into an in-memory RGBA buffer.
pub struct RasterRenderer {
    width: u32,
    height: u32,
    len: usize,
    buffer: Vec<u8>,
}

impl RasterRenderer {
    pub fn new(screen: ScreenSize) -> Result<Self> {
        let len = buffer_len(screen)?;
        Ok(Self {
            width: screen.width as u32,
            height: screen.height as u32,
            len,
            buffer: vec![0; len],
        })
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn rasterize(&mut self, scene: &Scene) {
        self.buffer.resize(self.len, 0);
        for pixel in self.buffer.chunks_exact_mut(4) {
            pixel.copy_from_slice(&SKY);
        }

        let pipe = scene.obstacle;
        let (low, high) = scene.safe_band;
        self.fill(pipe.x, pipe.x + pipe.width, pipe.y, low, PIPE);
        self.fill(pipe.x, pipe.x + pipe.width, high, pipe.y + pipe.height, PIPE);

        let bird = scene.agent;
        self.fill(bird.x, bird.x + bird.width, bird.y, bird.y + bird.height, BIRD);
    }

    pub fn frame(&self) -> Frame {
        Frame {
            width: self.width,
            height: self.height,
            data: self.buffer.clone(),
        }
    }

    /// Fill world-space `[x0, x1) x [y0, y1)`, clipped to the screen.
    fn fill(&mut self, x0: i32, x1: i32, y0: i32, y1: i32, color: [u8; 4]) {
        let (w, h) = (self.width as i32, self.height as i32);
        let (x0, x1) = (x0.clamp(0, w), x1.clamp(0, w));
        // World y grows upward, buffer rows grow downward
        let (row0, row1) = ((h - y1).clamp(0, h), (h - y0).clamp(0, h));

        for row in row0..row1 {
            for col in x0..x1 {
                let idx = (row as usize * self.width as usize + col as usize) * 4;
                self.buffer[idx..idx + 4].copy_from_slice(&color);
            }
        }
    }
}

impl RenderAdapter for RasterRenderer {
    fn draw(&mut self, scene: &Scene, mode: RenderMode) -> Result<Option<Frame>> {
        self.rasterize(scene);
        match mode {
            RenderMode::Human => Ok(None),
            RenderMode::RgbArray => Ok(Some(self.frame())),
        }
    }

    fn close(&mut self) {
        self.buffer.clear();
        self.buffer.shrink_to_fit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> Scene {
        Scene {
            screen: ScreenSize::new(400, 400),
            agent: Rect::new(70, 200, 10, 10),
            obstacle: Rect::new(100, 0, 20, 400),
            safe_band: (150, 250),
        }
    }

    /// Buffer row for a world-space y.
    fn row(y: u32) -> u32 {
        400 - 1 - y
    }

    #[test]
    fn test_rgb_array_frame() {
        let mut renderer = RasterRenderer::new(ScreenSize::new(400, 400)).unwrap();
        let frame = renderer.draw(&scene(), RenderMode::RgbArray).unwrap().unwrap();
        assert_eq!(frame.width, 400);
        assert_eq!(frame.height, 400);
        assert_eq!(frame.data.len(), 400 * 400 * 4);

        assert_eq!(frame.pixel(75, row(205)), Some(BIRD));
        assert_eq!(frame.pixel(110, row(50)), Some(PIPE));
        assert_eq!(frame.pixel(110, row(300)), Some(PIPE));
        assert_eq!(frame.pixel(110, row(200)), Some(SKY));
        assert_eq!(frame.pixel(5, row(5)), Some(SKY));
        assert_eq!(frame.pixel(400, 0), None);
    }

    #[test]
    fn test_human_mode_returns_nothing() {
        let mut renderer = RasterRenderer::new(ScreenSize::new(400, 400)).unwrap();
        assert!(renderer.draw(&scene(), RenderMode::Human).unwrap().is_none());
        assert_eq!(&renderer.buffer()[..4], &SKY);
    }

    #[test]
    fn test_offscreen_geometry_is_clipped() {
        let mut renderer = RasterRenderer::new(ScreenSize::new(400, 400)).unwrap();
        let mut offscreen = scene();
        offscreen.obstacle = Rect::new(420, 0, 20, 400);
        offscreen.agent = Rect::new(70, 405, 10, 10);
        let frame = renderer.draw(&offscreen, RenderMode::RgbArray).unwrap().unwrap();
        assert!(frame.data.chunks_exact(4).all(|px| px == SKY));
    }

    #[test]
    fn test_rejects_unrepresentable_screens() {
        for screen in [
            ScreenSize::new(i32::MAX, i32::MAX),
            ScreenSize::new(i32::MAX, 400),
            ScreenSize::new(0, 400),
            ScreenSize::new(400, -3),
        ] {
            assert!(matches!(RasterRenderer::new(screen), Err(Error::Render(_))));
        }
    }

    #[test]
    fn test_largest_screen_indexes_last_pixel() {
        let side = MAX_SCREEN_DIMENSION;
        assert_eq!(buffer_len(ScreenSize::new(side, side)).unwrap(), (side as usize).pow(2) * 4);

        let frame = Frame {
            width: 2,
            height: 2,
            data: (0..16).collect(),
        };
        assert_eq!(frame.pixel(1, 1), Some([12, 13, 14, 15]));
        assert_eq!(frame.pixel(2, 1), None);
    }
}
