/// Straight RGBA color, 0-255 per channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Linear blend towards `other`, `t` in 0..=1.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }
}

/// A 2D surface addressed in device pixels, origin top-left, y down.
///
/// Implementations only need flat primitives; gradients and dashes are
/// decomposed by the renderer before they reach the surface.
pub trait Canvas {
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgba);

    fn line(&mut self, from: (f64, f64), to: (f64, f64), thickness: f64, color: Rgba);

    fn fill_circle(&mut self, center: (f64, f64), radius: f64, color: Rgba);

    fn stroke_circle(&mut self, center: (f64, f64), radius: f64, thickness: f64, color: Rgba);

    /// `baseline` is the left end of the text baseline. `rotated` draws the
    /// text running bottom-to-top, as used for a vertical axis label.
    fn text(&mut self, text: &str, baseline: (f64, f64), size_px: f64, rotated: bool, color: Rgba);
}


#[cfg(test)]
mod tests {
    use super::Rgba;

    #[test]
    fn lerp_hits_both_ends_and_midpoint() {
        let a = Rgba::opaque(0, 100, 200);
        let b = Rgba::opaque(200, 100, 0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Rgba::opaque(100, 100, 100));
    }
}
