use crate::core::canvas::Rgba;

const BYTES_PER_PIXEL: usize = 4;
const HEADROOM_RATIO: f64 = 0.9;

/// Row-major RGBA8 pixels, ready to upload as a texture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            data: vec![0; width * height * BYTES_PER_PIXEL],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * BYTES_PER_PIXEL;
        Some(Rgba::new(self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]))
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Moves every row `dx` pixels to the left. The right `dx` columns keep
    /// stale content until cleared.
    pub fn shift_left(&mut self, dx: usize) {
        if dx == 0 {
            return;
        }
        if dx >= self.width {
            self.clear();
            return;
        }
        let row_len = self.width * BYTES_PER_PIXEL;
        let shift = dx * BYTES_PER_PIXEL;
        for row in self.data.chunks_exact_mut(row_len) {
            row.copy_within(shift.., 0);
        }
    }

    /// Zeroes columns `from..width`.
    pub fn clear_columns_from(&mut self, from: usize) {
        if from >= self.width {
            return;
        }
        let row_len = self.width * BYTES_PER_PIXEL;
        let start = from * BYTES_PER_PIXEL;
        for row in self.data.chunks_exact_mut(row_len) {
            row[start..].fill(0);
        }
    }

    /// Fills the clipped rectangle `[x, x+w) × [y, y+h)`.
    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: Rgba) {
        let x_end = (x + w).min(self.width);
        let y_end = (y + h).min(self.height);
        for row in y..y_end {
            for col in x..x_end {
                let i = (row * self.width + col) * BYTES_PER_PIXEL;
                self.data[i..i + BYTES_PER_PIXEL].copy_from_slice(&[color.r, color.g, color.b, color.a]);
            }
        }
    }
}

/// Scrolling kinetic-energy trace. Old pixels are kept and slid left each
/// sample; only the freshly exposed column is touched.
pub struct StripChart {
    buffer: PixelBuffer,
    step_px: usize,
    color: Rgba,
    full_scale_j: f64,
}

impl StripChart {
    pub const TRACE_COLOR: Rgba = Rgba::opaque(106, 166, 255);

    pub fn new(width: usize, height: usize, step_px: usize) -> Self {
        Self {
            buffer: PixelBuffer::new(width, height),
            step_px: step_px.max(1),
            color: Self::TRACE_COLOR,
            full_scale_j: 1.0,
        }
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn step_px(&self) -> usize {
        self.step_px
    }

    /// Sets the energy that maps to near the top of the chart. Called at
    /// launch with the launch energy, which no-drag flight never exceeds.
    pub fn set_full_scale(&mut self, energy_j: f64) {
        self.full_scale_j = if energy_j.is_finite() && energy_j > 0.0 {
            energy_j
        } else {
            1.0
        };
    }

    /// Row (from the top) where `energy_j` lands.
    pub fn row_for(&self, energy_j: f64) -> usize {
        let h = self.buffer.height();
        let usable = (h as f64 * HEADROOM_RATIO).max(1.0);
        let level = (energy_j.max(0.0) / self.full_scale_j * usable).min(h as f64);
        let top = (h as f64 - level).floor().max(0.0) as usize;
        top.min(h.saturating_sub(self.step_px))
    }

    pub fn push(&mut self, energy_j: f64) {
        if !energy_j.is_finite() {
            return;
        }
        let width = self.buffer.width();
        let column = width.saturating_sub(self.step_px);
        self.buffer.shift_left(self.step_px);
        self.buffer.clear_columns_from(column);
        let row = self.row_for(energy_j);
        self.buffer.fill_rect(column, row, self.step_px, self.step_px, self.color);
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
