//! Frame producer: owns the render buffers and feeds finished frames through
//! a single-slot channel.

use crate::config::Settings;
use crate::frame::{self, Frame, Stats};
use crate::raster::{rasterize, CharBuffer, DepthBuffer, Ramp, Rotation};
use anyhow::{Context, Result};
use crossbeam_channel::{bounded, Receiver, SendTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How often a producer blocked on a full slot re-checks for shutdown.
const SHUTDOWN_POLL: Duration = Duration::from_millis(10);

/// Time source for the FPS readout.
pub(crate) trait Clock: Send {
    /// Time since the clock was started.
    fn elapsed(&self) -> Duration;
}

pub(crate) struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub(crate) fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

pub(crate) struct Producer<C: Clock> {
    buffers: [CharBuffer; 2],
    depth: DepthBuffer,
    rotation: Rotation,
    ramp: Ramp,
    frames: u64,
    clock: C,
}

impl<C: Clock> Producer<C> {
    pub(crate) fn new(settings: &Settings, clock: C) -> Self {
        Self {
            buffers: [CharBuffer::new(), CharBuffer::new()],
            depth: DepthBuffer::new(),
            rotation: settings.start,
            ramp: settings.ramp,
            frames: 0,
            clock,
        }
    }

    pub(crate) fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Renders and formats one frame.
    pub(crate) fn tick(&mut self) -> Frame {
        let buf = &mut self.buffers[(self.frames % 2) as usize];
        rasterize(buf, &mut self.depth, &mut self.rotation, self.ramp);

        self.frames += 1;
        let stats = Stats {
            frames: self.frames,
            elapsed: self.clock.elapsed(),
        };
        frame::format(buf, &stats, &self.rotation)
    }
}

/// Background producer thread plus the receiving end of its frame slot.
pub(crate) struct ProducerHandle {
    handle: Option<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
    produced: Arc<AtomicU64>,
    frames: Receiver<Frame>,
}

impl ProducerHandle {
    pub(crate) fn spawn<C: Clock + 'static>(producer: Producer<C>) -> Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let produced = Arc::new(AtomicU64::new(0));

        // one finished frame may wait while the next is drawn
        let (tx, rx) = bounded(1);

        let handle = {
            let shutdown = shutdown.clone();
            let produced = produced.clone();
            thread::Builder::new()
                .name("donut-producer".to_string())
                .spawn(move || run_loop(producer, &tx, &shutdown, &produced))
                .context("could not spawn producer thread")?
        };

        Ok(Self {
            handle: Some(handle),
            shutdown,
            produced,
            frames: rx,
        })
    }

    pub(crate) fn frames(&self) -> &Receiver<Frame> {
        &self.frames
    }

    /// Number of ticks the producer has completed.
    pub(crate) fn produced(&self) -> u64 {
        self.produced.load(Ordering::Acquire)
    }

    pub(crate) fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    /// Stops the producer and waits for its thread to exit.
    pub(crate) fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("producer thread panicked");
            }
        }
    }
}

impl Drop for ProducerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_loop<C: Clock>(
    mut producer: Producer<C>,
    tx: &Sender<Frame>,
    shutdown: &AtomicBool,
    produced: &AtomicU64,
) {
    log::debug!("producer started at {:?}", producer.rotation());

    'ticks: while !shutdown.load(Ordering::Acquire) {
        let mut frame = producer.tick();
        produced.fetch_add(1, Ordering::AcqRel);

        loop {
            match tx.send_timeout(frame, SHUTDOWN_POLL) {
                Ok(()) => break,
                Err(SendTimeoutError::Timeout(f)) => {
                    if shutdown.load(Ordering::Acquire) {
                        break 'ticks;
                    }
                    frame = f;
                }
                Err(SendTimeoutError::Disconnected(_)) => break 'ticks,
            }
        }
    }

    log::debug!(
        "producer stopped after {} ticks",
        produced.load(Ordering::Acquire)
    );
}
