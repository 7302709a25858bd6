use crate::raster::{CharBuffer, Rotation};
use std::fmt;
use std::time::Duration;

const TOP: &str = "┌——————————————————————————————————————————————————————————————┬———————————————┐";
const BOTTOM: &str = "└——————————————————————————————————————————————————————————————————————————————┘";
const SIDE: char = '│';
const PANEL_JOIN: char = '┤';
const PANEL_CLOSE: &str = "└———————————————";

pub(crate) const FRAME_WIDTH: usize = 80;
const PANEL_ROW: usize = 4;
const PANEL_RIGHT: usize = 77;

/// A fully formatted, bordered picture. Read-only once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Frame(String);

impl Frame {
    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Stats {
    pub(crate) frames: u64,
    pub(crate) elapsed: Duration,
}

impl Stats {
    pub(crate) fn fps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.frames as f64 / secs
        } else {
            0.0
        }
    }
}

/// Radians to degrees in `[0, 360)`, rounded to the panel's one decimal.
pub(crate) fn display_degrees(radians: f64) -> f64 {
    let d = (radians.to_degrees().rem_euclid(360.0) * 10.0).round() / 10.0;
    // 359.95 and up round to 360.0, as does rem_euclid on tiny negatives
    if d >= 360.0 {
        0.0
    } else {
        d
    }
}

fn fit_width(line: &str, width: usize) -> Vec<char> {
    let mut chars: Vec<char> = line.chars().take(width).collect();
    chars.resize(width, ' ');
    chars
}

fn border_line(line: &str, row: usize) -> String {
    let mut chars = fit_width(line, FRAME_WIDTH);
    chars[0] = SIDE;
    chars[FRAME_WIDTH - 1] = SIDE;
    if row == PANEL_ROW {
        chars[FRAME_WIDTH - 1] = PANEL_JOIN;
    }
    chars.into_iter().collect()
}

/// Writes the stats panel into the top-right corner of `buf`.
pub(crate) fn overlay_stats(buf: &mut CharBuffer, stats: &Stats, rot: &Rotation) {
    let frame = format!("{SIDE} Frame: {:>5}", stats.frames);
    let rate = format!("{SIDE}   FPS: {:>5.1}", stats.fps());
    let roll = format!("{SIDE}  Roll: {:>5.1}˚", display_degrees(rot.roll));
    let yaw = format!("{SIDE}   Yaw: {:>5.1}˚", display_degrees(rot.yaw));

    let offs = PANEL_RIGHT.saturating_sub(frame.chars().count());
    for (row, line) in [frame, rate, roll, yaw].iter().enumerate() {
        buf.splice(row, offs, line);
    }
    buf.splice(PANEL_ROW, offs, PANEL_CLOSE);
}

/// Borders raw buffer text into a frame.
pub(crate) fn frame_text(text: &str) -> Frame {
    let mut out = String::new();
    out.push_str(TOP);
    for (row, line) in text.split('\n').enumerate() {
        out.push('\n');
        out.push_str(&border_line(line, row));
    }
    out.push('\n');
    out.push_str(BOTTOM);
    Frame(out)
}

pub(crate) fn format(buf: &mut CharBuffer, stats: &Stats, rot: &Rotation) -> Frame {
    overlay_stats(buf, stats, rot);
    frame_text(&buf.to_text())
}
