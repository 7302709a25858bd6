use crate::raster::{Ramp, Rotation};
use clap::Parser;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "donut")]
#[command(about = "Spinning ASCII torus for the terminal", long_about = None)]
pub(crate) struct Args {
    /// How long to run before exiting (e.g. 5s, 1500ms, 1m30s)
    #[arg(short = 'd', long, default_value = "5s", value_parser = parse_duration)]
    duration: Duration,

    /// Shading glyphs, dim to bright
    #[arg(long, value_enum, default_value_t = Ramp::Ascii)]
    ramp: Ramp,

    /// Starting yaw in radians
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    yaw: f64,

    /// Starting roll in radians
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    roll: f64,

    /// Pause after each displayed frame, in milliseconds
    #[arg(long, default_value_t = 30)]
    frame_delay: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Settings {
    pub(crate) run_for: Duration,
    pub(crate) ramp: Ramp,
    pub(crate) start: Rotation,
    pub(crate) frame_delay: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            run_for: Duration::from_secs(5),
            ramp: Ramp::Ascii,
            start: Rotation::default(),
            frame_delay: Duration::from_millis(30),
        }
    }
}

impl From<Args> for Settings {
    fn from(a: Args) -> Self {
        Self {
            run_for: a.duration,
            ramp: a.ramp,
            start: Rotation::new(a.yaw, a.roll),
            frame_delay: Duration::from_millis(a.frame_delay),
        }
    }
}

pub(crate) fn load() -> Settings {
    Args::parse().into()
}

/// Parses durations like `300ms`, `1.5s` or `1h2m3s`. Units: ns, us/µs, ms,
/// s, m, h. A bare `0` is accepted.
pub(crate) fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    if s.is_empty() {
        return Err("empty duration".to_string());
    }
    if s.starts_with('-') {
        return Err(format!("negative duration: {s}"));
    }

    let mut total_ns: u128 = 0;
    let mut rest = s.strip_prefix('+').unwrap_or(s);
    while !rest.is_empty() {
        let num_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (num, tail) = rest.split_at(num_end);
        let (whole, frac) = num.split_once('.').unwrap_or((num, ""));
        if (whole.is_empty() && frac.is_empty()) || frac.contains('.') {
            return Err(format!("invalid duration: {s}"));
        }

        let unit_end = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_end);
        let unit_ns: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60_000_000_000,
            "h" => 3_600_000_000_000,
            "" => return Err(format!("missing unit in duration {s}")),
            other => return Err(format!("unknown unit {other:?} in duration {s}")),
        };

        let overflow = || format!("duration {s} is too large");
        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| overflow())?
        };
        let mut part = whole.checked_mul(unit_ns).ok_or_else(overflow)?;
        // fractional digits beyond nanosecond precision are dropped
        let mut scale = unit_ns;
        for d in frac.bytes() {
            scale /= 10;
            if scale == 0 {
                break;
            }
            part += u128::from(d - b'0') * scale;
        }
        total_ns = total_ns.checked_add(part).ok_or_else(overflow)?;
        rest = next;
    }

    let secs = u64::try_from(total_ns / 1_000_000_000)
        .map_err(|_| format!("duration {s} is too large"))?;
    Ok(Duration::new(secs, (total_ns % 1_000_000_000) as u32))
}
