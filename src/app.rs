use crate::config::Settings;
use crate::frame::Frame;
use crate::producer::{MonotonicClock, Producer, ProducerHandle};
use crossbeam_channel::{after, select, Receiver};
use crossterm::{
    cursor, execute, queue,
    style::Print,
    terminal::{Clear, ClearType},
};
use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};

pub(crate) fn run(settings: Settings) -> anyhow::Result<()> {
    log::info!(
        "running for {:?} ({:?} ramp, start {:?})",
        settings.run_for,
        settings.ramp,
        settings.start
    );

    let producer = Producer::new(&settings, MonotonicClock::start());
    let handle = ProducerHandle::spawn(producer)?;

    let shown = show_for(&mut io::stdout(), &handle, &settings);

    let produced = handle.produced();
    handle.join();
    log::info!("displayed {shown} of {produced} frames");
    Ok(())
}

/// Hides the cursor, shows frames for the configured run time, then restores
/// the cursor. Terminal write failures are logged, never fatal.
fn show_for<W: Write>(out: &mut W, handle: &ProducerHandle, settings: &Settings) -> u64 {
    if let Err(e) = execute!(out, cursor::Hide) {
        log::debug!("could not hide cursor: {e}");
    }

    let shown = display_loop(
        out,
        handle.frames(),
        &after(settings.run_for),
        settings.frame_delay,
    );

    if let Err(e) = execute!(out, cursor::Show) {
        log::debug!("could not show cursor: {e}");
    }
    shown
}

/// Shows frames until `timeout` fires or the producer goes away. Returns the
/// number of frames shown.
pub(crate) fn display_loop<W: Write>(
    out: &mut W,
    frames: &Receiver<Frame>,
    timeout: &Receiver<Instant>,
    delay: Duration,
) -> u64 {
    let mut shown = 0u64;
    loop {
        let next = select! {
            recv(timeout) -> _ => None,
            recv(frames) -> msg => match msg {
                Ok(frame) => Some(frame),
                Err(_) => {
                    log::warn!("frame producer disconnected");
                    None
                }
            },
        };
        let Some(frame) = next else {
            break;
        };

        if let Err(e) = present(out, &frame) {
            log::debug!("frame write failed: {e}");
        }
        shown += 1;
        thread::sleep(delay);
    }
    shown
}

pub(crate) fn present<W: Write>(out: &mut W, frame: &Frame) -> io::Result<()> {
    queue!(
        out,
        Clear(ClearType::All),
        cursor::MoveTo(0, 0),
        Print(frame),
        Print('\n')
    )?;
    out.flush()
}
