//! Coordinate scaling between screen space and screenshot space.
//!
//! Screenshots are not always captured at the logical screen resolution
//! (HiDPI scaling, server-side downscaling). An agent that picks a target
//! from a screenshot needs its coordinates mapped back to screen space
//! before issuing a click, and vice versa.

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Map screenshot-space coordinates to screen-space coordinates.
pub fn to_screen_coordinates(x: f64, y: f64, screen: Size, screenshot: Size) -> (f64, f64) {
    scale(x, y, screenshot, screen)
}

/// Map screen-space coordinates to screenshot-space coordinates.
pub fn to_screenshot_coordinates(x: f64, y: f64, screen: Size, screenshot: Size) -> (f64, f64) {
    scale(x, y, screen, screenshot)
}

fn scale(x: f64, y: f64, from: Size, to: Size) -> (f64, f64) {
    if from.width == 0 || from.height == 0 {
        return (x, y);
    }
    let sx = to.width as f64 / from.width as f64;
    let sy = to.height as f64 / from.height as f64;
    (x * sx, y * sy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_when_sizes_match() {
        let s = Size::new(1920, 1080);
        assert_eq!(to_screen_coordinates(100.0, 200.0, s, s), (100.0, 200.0));
    }

    #[test]
    fn hidpi_screenshot_downscales_to_screen() {
        // Retina-style: screenshot captured at 2x.
        let screen = Size::new(1440, 900);
        let shot = Size::new(2880, 1800);
        assert_eq!(
            to_screen_coordinates(2880.0, 1800.0, screen, shot),
            (1440.0, 900.0)
        );
        assert_eq!(
            to_screenshot_coordinates(720.0, 450.0, screen, shot),
            (1440.0, 900.0)
        );
    }

    #[test]
    fn roundtrip_is_stable() {
        let screen = Size::new(1920, 1080);
        let shot = Size::new(1280, 720);
        let (sx, sy) = to_screenshot_coordinates(333.0, 444.0, screen, shot);
        let (x, y) = to_screen_coordinates(sx, sy, screen, shot);
        assert!((x - 333.0).abs() < 1e-9);
        assert!((y - 444.0).abs() < 1e-9);
    }

    #[test]
    fn zero_size_is_passthrough() {
        let screen = Size::new(1920, 1080);
        let degenerate = Size::new(0, 0);
        assert_eq!(
            to_screen_coordinates(10.0, 20.0, screen, degenerate),
            (10.0, 20.0)
        );
    }
}
