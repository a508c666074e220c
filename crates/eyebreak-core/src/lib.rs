pub mod clock;
pub mod config;
pub mod debounce;
pub mod error;
pub mod event_log;
pub mod frame_source;
pub mod monitor;
pub mod scheduler;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{MonitorConfig, MonitorSettings};
pub use debounce::{ConfirmedTransition, DebounceFilter};
pub use error::ConfigError;
pub use event_log::{DedupLog, EventSink, LogSink, MemorySink};
pub use frame_source::{FrameSource, LineFrameSource, ScriptedFrameSource};
pub use monitor::{EyeMonitor, MonitorStatus, TickOutcome};
pub use scheduler::{BreakEvent, BreakScheduler, BreakState};
