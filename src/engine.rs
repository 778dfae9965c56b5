//! Fixed-rate simulation loop
//!
//! The engine owns a dedicated OS thread that calls `Stage::update` once per
//! tick and then hands the finished frame to every registered [`FrameHook`]
//! (bots, renderers, audio). Pacing sleeps for whatever is left of the frame
//! budget; an overrunning frame starts the next one immediately.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::panic_message;
use crate::sim::{Stage, TickReport};

/// Per-frame callback run on the simulation thread after each update
pub trait FrameHook: Send {
    fn on_frame(&mut self, stage: &Stage, report: &TickReport);
}

impl<F> FrameHook for F
where
    F: FnMut(&Stage, &TickReport) + Send,
{
    fn on_frame(&mut self, stage: &Stage, report: &TickReport) {
        self(stage, report)
    }
}

pub struct Engine {
    stage: Arc<Stage>,
    tick_rate: u32,
    /// Stop on its own after this many ticks
    max_ticks: Option<u64>,
    hooks: Vec<Box<dyn FrameHook>>,
}

impl Engine {
    pub fn new(stage: Arc<Stage>, tick_rate: u32) -> Self {
        Self {
            stage,
            tick_rate: tick_rate.max(1),
            max_ticks: None,
            hooks: Vec::new(),
        }
    }

    pub fn with_max_ticks(mut self, ticks: u64) -> Self {
        self.max_ticks = Some(ticks);
        self
    }

    pub fn add_hook(&mut self, hook: impl FrameHook + 'static) {
        self.hooks.push(Box::new(hook));
    }

    pub fn stage(&self) -> &Arc<Stage> {
        &self.stage
    }

    pub fn frame_budget(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate as f64)
    }

    /// Run one tick and its hooks
    ///
    /// A hook that panics is logged and counted in the returned report's
    /// `failures`; the remaining hooks still run and the loop keeps going.
    pub fn step(&mut self) -> TickReport {
        let mut report = self.stage.update();
        let stage = &self.stage;
        let mut failed = 0;
        for (index, hook) in self.hooks.iter_mut().enumerate() {
            let outcome = catch_unwind(AssertUnwindSafe(|| hook.on_frame(stage, &report)));
            if let Err(payload) = outcome {
                log::error!(
                    "frame hook {index} failed at tick {}: {}",
                    report.tick,
                    panic_message(&*payload)
                );
                failed += 1;
            }
        }
        report.failures += failed;
        report
    }

    /// Run `ticks` frames back to back without pacing
    pub fn run_ticks(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.step();
        }
    }

    /// Start the loop on its own thread
    pub fn spawn(mut self) -> std::io::Result<EngineHandle> {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let thread = thread::Builder::new()
            .name("simulation".into())
            .spawn(move || self.run(&flag))?;
        Ok(EngineHandle {
            running,
            thread: Some(thread),
        })
    }

    fn run(&mut self, running: &AtomicBool) -> u64 {
        let budget = self.frame_budget();
        let mut ticks = 0u64;
        log::info!("engine started at {} Hz", self.tick_rate);

        while running.load(Ordering::Acquire) {
            if self.max_ticks.is_some_and(|max| ticks >= max) {
                break;
            }
            let started = Instant::now();
            let report = self.step();
            ticks += 1;

            if !report.removed.is_empty() {
                log::debug!("tick {}: removed {:?}", report.tick, report.removed);
            }
            let elapsed = started.elapsed();
            match budget.checked_sub(elapsed) {
                Some(rest) => thread::sleep(rest),
                None => log::debug!("tick {} overran its budget by {:?}", report.tick, elapsed - budget),
            }
        }

        log::info!("engine stopped after {ticks} ticks");
        ticks
    }
}

/// Owner handle for a running engine thread
pub struct EngineHandle {
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<u64>>,
}

impl EngineHandle {
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Ask the loop to stop and wait for it; returns the number of ticks run
    pub fn stop(mut self) -> u64 {
        self.running.store(false, Ordering::Release);
        self.join_thread()
    }

    /// Wait for a loop started with a tick limit to finish on its own
    pub fn join(mut self) -> u64 {
        self.join_thread()
    }

    fn join_thread(&mut self) -> u64 {
        match self.thread.take().map(JoinHandle::join) {
            Some(Ok(ticks)) => ticks,
            Some(Err(_)) => {
                log::error!("simulation thread panicked");
                0
            }
            None => 0,
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
        self.join_thread();
    }
}
