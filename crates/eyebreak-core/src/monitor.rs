use crate::{
    clock::Clock,
    config::{MonitorConfig, MonitorSettings},
    debounce::{DebounceFilter, DebounceStep, PendingChange},
    error::ConfigError,
    event_log::{DedupLog, EventSink},
    frame_source::FrameSource,
    scheduler::{BreakEvent, BreakScheduler, BreakState},
};
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::time::{interval, MissedTickBehavior};

/// The tick timer fires this many times per frame interval, so that the
/// strict rate limit in [`EyeMonitor::tick_at`] is checked often enough
const POLLS_PER_FRAME: i32 = 10;

/// Result of one tick of the monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A frame was read but less than one frame interval has passed since
    /// the last evaluation, so it was dropped
    Skipped,
    /// A frame was sampled and evaluated
    Sampled {
        eyes_in_frame: bool,
        event: Option<BreakEvent>,
    },
    /// The frame source has no more frames
    Exhausted,
}

/// Snapshot of the monitor state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonitorStatus {
    pub eyes_present: bool,
    pub state: BreakState,
    pub needs_break: bool,
    pub in_break: bool,
    pub seconds_since_last_break: i64,
    pub pending: Option<PendingChange>,
    pub frames_read: u64,
    pub frames_sampled: u64,
}

/// Owns the debounce filter, the break scheduler and the event log, and
/// feeds them one detector verdict per tick
pub struct EyeMonitor<S> {
    settings: MonitorSettings,
    clock: Box<dyn Clock>,
    frames: Box<dyn FrameSource>,
    filter: DebounceFilter,
    scheduler: BreakScheduler,
    events: DedupLog<S>,
    last_sample: Option<DateTime<Utc>>,
    frames_read: u64,
    frames_sampled: u64,
}

impl<S: EventSink> EyeMonitor<S> {
    pub fn new(
        settings: MonitorSettings,
        clock: Box<dyn Clock>,
        frames: Box<dyn FrameSource>,
        sink: S,
    ) -> Self {
        let started_at = clock.now();
        log::debug!(
            "Monitor configured: confirmation {}ms, break after {}s, break length {}s, frame interval {}ms",
            settings.confirmation_window.num_milliseconds(),
            settings.time_before_break.num_seconds(),
            settings.break_time.num_seconds(),
            settings.frame_interval.num_milliseconds()
        );

        Self {
            filter: DebounceFilter::new(settings.confirmation_window),
            scheduler: BreakScheduler::new(
                settings.time_before_break,
                settings.break_time,
                started_at,
            ),
            events: DedupLog::new(sink, settings.debug),
            settings,
            clock,
            frames,
            last_sample: None,
            frames_read: 0,
            frames_sampled: 0,
        }
    }

    /// Validate `config` and build a monitor from it
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid.
    pub fn from_config(
        config: &MonitorConfig,
        clock: Box<dyn Clock>,
        frames: Box<dyn FrameSource>,
        sink: S,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(config.validate()?, clock, frames, sink))
    }

    #[must_use]
    pub const fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    #[must_use]
    pub const fn scheduler(&self) -> &BreakScheduler {
        &self.scheduler
    }

    #[must_use]
    pub const fn filter(&self) -> &DebounceFilter {
        &self.filter
    }

    #[must_use]
    pub const fn events(&self) -> &DedupLog<S> {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut DedupLog<S> {
        &mut self.events
    }

    #[must_use]
    pub fn status(&self, now: DateTime<Utc>) -> MonitorStatus {
        let state = self.scheduler.state();
        MonitorStatus {
            eyes_present: self.filter.is_visible(),
            state,
            needs_break: state.need_break(),
            in_break: state.in_break(),
            seconds_since_last_break: (now - self.scheduler.last_break()).num_seconds().max(0),
            pending: self.filter.pending(),
            frames_read: self.frames_read,
            frames_sampled: self.frames_sampled,
        }
    }

    /// Read a frame and evaluate it, timestamped with the monitor's clock
    /// once the frame has arrived
    ///
    /// # Errors
    ///
    /// Returns an error if the frame source fails.
    pub async fn tick(&mut self) -> Result<TickOutcome> {
        let Some(eyes_in_frame) = self.read_frame().await? else {
            return Ok(TickOutcome::Exhausted);
        };
        let now = self.clock.now();
        Ok(self.sample(eyes_in_frame, now))
    }

    /// Read a frame and evaluate it at `now`
    ///
    /// # Errors
    ///
    /// Returns an error if the frame source fails.
    pub async fn tick_at(&mut self, now: DateTime<Utc>) -> Result<TickOutcome> {
        let Some(eyes_in_frame) = self.read_frame().await? else {
            return Ok(TickOutcome::Exhausted);
        };
        Ok(self.sample(eyes_in_frame, now))
    }

    /// Every tick consumes a frame, so skipped ticks still keep up with the
    /// detector; only the evaluation is rate limited
    async fn read_frame(&mut self) -> Result<Option<bool>> {
        let frame = self.frames.next_frame().await?;
        if frame.is_some() {
            self.frames_read += 1;
        }
        Ok(frame)
    }

    /// Evaluate a frame that has been read, unless the previous evaluation
    /// happened no more than one frame interval before `now`
    pub fn sample(&mut self, eyes_in_frame: bool, now: DateTime<Utc>) -> TickOutcome {
        if let Some(previous) = self.last_sample {
            if now - previous <= self.settings.frame_interval {
                return TickOutcome::Skipped;
            }
        }
        self.last_sample = Some(now);

        let event = self.process(eyes_in_frame, now);
        TickOutcome::Sampled {
            eyes_in_frame,
            event,
        }
    }

    /// Run one verdict through the filter and the scheduler, bypassing the
    /// frame source and the rate limit
    pub fn process(&mut self, eyes_in_frame: bool, now: DateTime<Utc>) -> Option<BreakEvent> {
        self.frames_sampled += 1;

        let step = self.filter.update(eyes_in_frame, now);
        self.log_step(step, eyes_in_frame);

        let event = self.scheduler.evaluate(now, step.transition());
        if let Some(event) = event {
            self.events.log(&event.to_string());
        }
        event
    }

    fn log_step(&mut self, step: DebounceStep, eyes_in_frame: bool) {
        match step {
            DebounceStep::Steady => {}
            DebounceStep::PendingStarted => self.events.log("Starting pending change"),
            DebounceStep::PendingWaiting => self.events.log(&format!(
                "Eyes might have changed visibility to {eyes_in_frame}, waiting for confirmation..."
            )),
            DebounceStep::PendingCancelled => self.events.log(&format!(
                "Confirmation failed, keeping eye status = {}",
                self.filter.is_visible()
            )),
            DebounceStep::Confirmed(transition) => self.events.log(&format!(
                "Eye visibility changed to {}",
                transition.visible
            )),
        }
    }

    /// Tick on a timer until Ctrl-C or until the frame source is exhausted
    ///
    /// # Errors
    ///
    /// Returns an error if the frame interval cannot be used as a timer period.
    pub async fn run_with_signals(&mut self) -> Result<()> {
        let poll = (self.settings.frame_interval / POLLS_PER_FRAME).max(Duration::milliseconds(1));
        let mut interval = interval(poll.to_std()?);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        log::info!("Eye monitor started");

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = &mut shutdown => {
                    log::info!("Received Ctrl-C, shutting down...");
                    break;
                }
            }

            tokio::select! {
                result = self.tick() => match result {
                    Ok(TickOutcome::Exhausted) => {
                        log::info!("Frame source exhausted, stopping");
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => log::error!("Monitor tick failed: {e}"),
                },
                _ = &mut shutdown => {
                    log::info!("Received Ctrl-C, shutting down...");
                    break;
                }
            }
        }

        log::info!(
            "Eye monitor stopped after {} frames, {} evaluated ({})",
            self.frames_read,
            self.frames_sampled,
            self.scheduler.state().description()
        );
        Ok(())
    }
}
