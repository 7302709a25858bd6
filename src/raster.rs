use clap::ValueEnum;

pub(crate) const ROW_STRIDE: usize = 80; // 79 visible columns + '\n'
pub(crate) const ROWS: usize = 22;
pub(crate) const VISIBLE_COLS: usize = ROW_STRIDE - 1;
pub(crate) const BUFFER_LEN: usize = ROW_STRIDE * ROWS;

const YAW_STEP: f64 = 0.07;
const ROLL_STEP: f64 = 0.03;

// Sweep density. Coarser steps leave holes in the surface.
const THETA_STEP: f64 = 0.07;
const PHI_STEP: f64 = 0.02;
const SWEEP_END: f64 = 6.28;

const MAJOR_RADIUS: f64 = 2.0;
const CAMERA_DISTANCE: f64 = 5.0;
const SCALE_X: f64 = 30.0;
const SCALE_Y: f64 = 15.0;
const OFFSET_X: f64 = 40.0;
const OFFSET_Y: f64 = 12.0;
const LUMA_SCALE: f64 = 8.0;

const ASCII_RAMP: [char; Ramp::LEN] = ['.', ',', '-', '~', ':', ';', '=', '!', '*', '#', '$', '@'];
const SYMBOL_RAMP: [char; Ramp::LEN] = ['∙', '◦', '▪', '●', '☼', '◊', '≠', '≡', '☺', '♦', '☻', '◙'];

#[inline]
pub(crate) fn index(row: usize, col: usize) -> usize {
    row * ROW_STRIDE + col
}

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub(crate) enum Ramp {
    /// `.,-~:;=!*#$@`
    #[default]
    Ascii,
    /// `∙◦▪●☼◊≠≡☺♦☻◙`
    Symbols,
}

impl Ramp {
    pub(crate) const LEN: usize = 12;

    pub(crate) fn glyphs(self) -> &'static [char; Self::LEN] {
        match self {
            Ramp::Ascii => &ASCII_RAMP,
            Ramp::Symbols => &SYMBOL_RAMP,
        }
    }

    pub(crate) fn glyph(self, luma: usize) -> char {
        self.glyphs()[luma.min(Self::LEN - 1)]
    }
}

/// Maps raw luminance (normal · light) to a ramp index.
///
/// The light vector has length √2 and the normal is a unit vector, so the
/// scaled value never exceeds 8·√2 ≈ 11.3. The upper clamp only guards
/// against that bound being violated by rounding.
pub(crate) fn ramp_index(raw: f64) -> usize {
    let n = (LUMA_SCALE * raw) as i32;
    n.clamp(0, Ramp::LEN as i32 - 1) as usize
}

/// Accumulated yaw and roll, in radians. Never wrapped.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Rotation {
    pub(crate) yaw: f64,
    pub(crate) roll: f64,
}

impl Rotation {
    pub(crate) fn new(yaw: f64, roll: f64) -> Self {
        Self { yaw, roll }
    }

    pub(crate) fn advance(&mut self) {
        self.yaw += YAW_STEP;
        self.roll += ROLL_STEP;
    }
}

pub(crate) struct CharBuffer {
    pub(crate) cells: Vec<char>,
}

impl CharBuffer {
    pub(crate) fn new() -> Self {
        let mut b = Self {
            cells: vec![' '; BUFFER_LEN],
        };
        b.clear();
        b
    }

    pub(crate) fn clear(&mut self) {
        for (k, c) in self.cells.iter_mut().enumerate() {
            *c = if k % ROW_STRIDE == VISIBLE_COLS { '\n' } else { ' ' };
        }
    }

    #[cfg(test)]
    pub(crate) fn get(&self, row: usize, col: usize) -> char {
        self.cells[index(row, col)]
    }

    /// Writes `text` into `row` starting at `col`, stopping before the
    /// row's newline.
    pub(crate) fn splice(&mut self, row: usize, col: usize, text: &str) {
        if row >= ROWS {
            return;
        }
        for (i, ch) in text.chars().enumerate() {
            let c = col + i;
            if c >= VISIBLE_COLS {
                break;
            }
            self.cells[index(row, c)] = ch;
        }
    }

    pub(crate) fn to_text(&self) -> String {
        self.cells.iter().collect()
    }
}

pub(crate) struct DepthBuffer {
    pub(crate) z: Vec<f64>,
}

impl DepthBuffer {
    pub(crate) fn new() -> Self {
        Self {
            z: vec![0.0; BUFFER_LEN],
        }
    }

    pub(crate) fn clear(&mut self) {
        self.z.fill(0.0);
    }
}

/// One projected point of the torus surface. `x`/`y` may fall outside the
/// screen.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Sample {
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) depth: f64,
    pub(crate) luma: f64,
}

impl Sample {
    /// Flat buffer offset, if the sample lands in the visible window.
    pub(crate) fn offset(&self) -> Option<usize> {
        if self.x < 0 || self.y < 0 {
            return None;
        }
        let (col, row) = (self.x as usize, self.y as usize);
        if col >= VISIBLE_COLS || row >= ROWS {
            return None;
        }
        Some(index(row, col))
    }
}

/// Visits every surface sample of the torus for the given orientation.
pub(crate) fn sweep(rot: Rotation, mut visit: impl FnMut(Sample)) {
    let (sa, ca) = rot.yaw.sin_cos();
    let (sb, cb) = rot.roll.sin_cos();

    // theta walks the tube cross-section, phi walks around the ring
    let mut theta = 0.0_f64;
    while theta < SWEEP_END {
        let (st, ct) = theta.sin_cos();
        let h = ct + MAJOR_RADIUS;

        let mut phi = 0.0_f64;
        while phi < SWEEP_END {
            let (sp, cp) = phi.sin_cos();

            let depth = 1.0 / (sp * h * sa + st * ca + CAMERA_DISTANCE);
            let t = sp * h * ca - st * sa;

            let x = (OFFSET_X + SCALE_X * depth * (cp * h * cb - t * sb)) as i32;
            let y = (OFFSET_Y + SCALE_Y * depth * (cp * h * sb + t * cb)) as i32;

            let luma = (st * sa - sp * ct * ca) * cb - sp * ct * sa - st * ca - cp * ct * sb;

            visit(Sample { x, y, depth, luma });
            phi += PHI_STEP;
        }
        theta += THETA_STEP;
    }
}

/// Advances the rotation one tick and draws the torus into `buf`.
pub(crate) fn rasterize(
    buf: &mut CharBuffer,
    depth: &mut DepthBuffer,
    rot: &mut Rotation,
    ramp: Ramp,
) {
    rot.advance();

    buf.clear();
    depth.clear();

    sweep(*rot, |s| {
        let Some(o) = s.offset() else {
            return;
        };
        if s.depth > depth.z[o] {
            depth.z[o] = s.depth;
            buf.cells[o] = ramp.glyph(ramp_index(s.luma));
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drawn(rot: Rotation) -> (CharBuffer, DepthBuffer, Rotation) {
        let mut buf = CharBuffer::new();
        let mut depth = DepthBuffer::new();
        let mut rot = rot;
        rasterize(&mut buf, &mut depth, &mut rot, Ramp::Ascii);
        (buf, depth, rot)
    }

    #[test]
    fn test_index_uses_row_stride() {
        assert_eq!(index(0, 0), 0);
        assert_eq!(index(0, 79), 79);
        assert_eq!(index(1, 0), ROW_STRIDE);
        assert_eq!(index(ROWS - 1, VISIBLE_COLS), BUFFER_LEN - 1);
    }

    #[test]
    fn test_clear_puts_newline_at_row_end() {
        let mut buf = CharBuffer::new();
        buf.cells.fill('x');
        buf.clear();
        for row in 0..ROWS {
            for col in 0..VISIBLE_COLS {
                assert_eq!(buf.get(row, col), ' ');
            }
            assert_eq!(buf.get(row, VISIBLE_COLS), '\n');
        }
    }

    #[test]
    fn test_depth_clear_zeroes_everything() {
        let (_, mut depth, _) = drawn(Rotation::default());
        assert!(depth.z.iter().any(|&d| d > 0.0));
        depth.clear();
        assert!(depth.z.iter().all(|&d| d == 0.0));
    }

    #[test]
    fn test_rasterize_clears_stale_depth() {
        let mut buf = CharBuffer::new();
        let mut depth = DepthBuffer::new();
        depth.z.fill(1.0e9);
        let mut rot = Rotation::default();
        rasterize(&mut buf, &mut depth, &mut rot, Ramp::Ascii);
        // stale values would have blocked every write
        assert!(buf.cells.iter().any(|&c| c != ' ' && c != '\n'));
        assert!(depth.z.iter().all(|&d| d < 1.0));
    }

    #[test]
    fn test_rasterize_advances_rotation() {
        let (_, _, rot) = drawn(Rotation::new(1.0, -1.0));
        assert!((rot.yaw - 1.07).abs() < 1e-12);
        assert!((rot.roll - (-0.97)).abs() < 1e-12);
    }

    #[test]
    fn test_depth_is_max_of_samples_per_pixel() {
        let (buf, depth, rot) = drawn(Rotation::default());

        let mut expected = vec![0.0_f64; BUFFER_LEN];
        sweep(rot, |s| {
            if let Some(o) = s.offset() {
                expected[o] = expected[o].max(s.depth);
            }
        });

        for (o, (&got, &want)) in depth.z.iter().zip(expected.iter()).enumerate() {
            assert_eq!(got, want, "pixel {o}");
            if want == 0.0 {
                assert!(buf.cells[o] == ' ' || buf.cells[o] == '\n');
            }
        }
    }

    #[test]
    fn test_newlines_survive_rasterize() {
        let (buf, _, _) = drawn(Rotation::new(0.4, 1.3));
        for row in 0..ROWS {
            assert_eq!(buf.get(row, VISIBLE_COLS), '\n');
        }
        assert_eq!(buf.cells.iter().filter(|&&c| c == '\n').count(), ROWS);
    }

    #[test]
    fn test_glyph_matches_luma_of_winning_sample() {
        let (buf, depth, rot) = drawn(Rotation::new(2.0, 0.5));
        let mut winners: Vec<Option<Sample>> = vec![None; BUFFER_LEN];
        sweep(rot, |s| {
            if let Some(o) = s.offset() {
                if s.depth > winners[o].map_or(0.0, |w| w.depth) {
                    winners[o] = Some(s);
                }
            }
        });
        for (o, w) in winners.iter().enumerate() {
            if let Some(w) = w {
                assert_eq!(depth.z[o], w.depth);
                assert_eq!(buf.cells[o], Ramp::Ascii.glyph(ramp_index(w.luma)));
            }
        }
    }

    #[test]
    fn test_negative_luma_maps_to_dimmest() {
        assert_eq!(ramp_index(-0.9), 0);
        assert_eq!(ramp_index(-10.0), 0);
        assert_eq!(Ramp::Ascii.glyph(ramp_index(-0.5)), '.');
    }

    #[test]
    fn test_ramp_index_bounds() {
        assert_eq!(ramp_index(0.0), 0);
        assert_eq!(ramp_index(0.125), 1);
        assert_eq!(ramp_index(std::f64::consts::SQRT_2), 11);
        assert_eq!(ramp_index(5.0), 11);
        assert_eq!(Ramp::Ascii.glyph(ramp_index(5.0)), '@');
    }

    #[test]
    fn test_luma_stays_under_analytic_bound() {
        for &(yaw, roll) in &[(0.0, 0.0), (0.7, 0.3), (3.1, 2.2), (10.0, -4.0)] {
            sweep(Rotation::new(yaw, roll), |s| {
                assert!(s.luma.abs() <= std::f64::consts::SQRT_2 + 1e-9);
                assert!(((LUMA_SCALE * s.luma) as i32) < Ramp::LEN as i32);
            });
        }
    }

    #[test]
    fn test_out_of_window_samples_have_no_offset() {
        let s = |x, y| Sample {
            x,
            y,
            depth: 1.0,
            luma: 0.0,
        };
        assert_eq!(s(-1, 0).offset(), None);
        assert_eq!(s(0, -1).offset(), None);
        assert_eq!(s(79, 0).offset(), None);
        assert_eq!(s(0, 22).offset(), None);
        assert_eq!(s(78, 21).offset(), Some(index(21, 78)));
    }

    #[test]
    fn test_splice_stops_before_newline() {
        let mut buf = CharBuffer::new();
        buf.splice(2, 75, "abcdefgh");
        assert_eq!(buf.get(2, 75), 'a');
        assert_eq!(buf.get(2, 78), 'd');
        assert_eq!(buf.get(2, VISIBLE_COLS), '\n');
        assert_eq!(buf.get(3, 0), ' ');
    }

    #[test]
    fn test_splice_counts_chars_not_bytes() {
        let mut buf = CharBuffer::new();
        buf.splice(0, 10, "│ ˚x");
        assert_eq!(buf.get(0, 10), '│');
        assert_eq!(buf.get(0, 12), '˚');
        assert_eq!(buf.get(0, 13), 'x');
    }

    #[test]
    fn test_symbol_ramp_has_twelve_glyphs() {
        assert_eq!(Ramp::Symbols.glyph(0), '∙');
        assert_eq!(Ramp::Symbols.glyph(11), '◙');
        assert_eq!(Ramp::Symbols.glyph(40), '◙');
    }
}
