//! Terminal progress indicators.
//!
//! [`ProgressBar`] draws a single status line; [`TerminalProgress`] adapts
//! it to the library's [`ProgressSink`] so sessions can drive it directly.
//!
//! # Examples
//!
//! ```
//! use pdfmerger::output::progress::{ProgressBar, ProgressStyle};
//!
//! let mut progress = ProgressBar::new(10, ProgressStyle::Bar);
//! progress.set_message("Merging");
//!
//! for i in 0..=10 {
//!     progress.update(i);
//! }
//!
//! progress.finish();
//! ```

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::progress::{Progress, ProgressSink};

/// Style of progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStyle {
    /// Classic progress bar: [=====>    ]
    Bar,
    /// Spinner indicator: ⠋ ⠙ ⠹ ⠸ ⠼ ⠴ ⠦ ⠧ ⠇ ⠏
    Spinner,
    /// Simple counter: 3/8
    Counter,
}

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const BAR_WIDTH: usize = 40;

/// Single-line progress display.
pub struct ProgressBar {
    total: usize,
    current: usize,
    style: ProgressStyle,
    message: Option<String>,
    start_time: Instant,
    /// Last render (for rate limiting).
    last_update: Instant,
    update_interval: Duration,
    enabled: bool,
    spinner_frame: usize,
}

impl ProgressBar {
    /// Create a new progress bar.
    ///
    /// Output is only drawn when stdout is a terminal.
    pub fn new(total: usize, style: ProgressStyle) -> Self {
        Self {
            total,
            current: 0,
            style,
            message: None,
            start_time: Instant::now(),
            last_update: Instant::now(),
            update_interval: Duration::from_millis(100),
            enabled: Self::is_terminal(),
            spinner_frame: 0,
        }
    }

    /// Create a progress bar with automatic style selection.
    ///
    /// Uses Bar style for determinate progress, Spinner for indeterminate.
    pub fn auto(total: usize) -> Self {
        let style = if total > 0 {
            ProgressStyle::Bar
        } else {
            ProgressStyle::Spinner
        };
        Self::new(total, style)
    }

    /// Create a disabled progress bar (no output).
    pub fn disabled() -> Self {
        let mut pb = Self::new(0, ProgressStyle::Counter);
        pb.enabled = false;
        pb
    }

    fn is_terminal() -> bool {
        use std::io::IsTerminal;
        io::stdout().is_terminal()
    }

    /// Whether anything is drawn.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Set the message to display with the progress bar.
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    /// Change the total, e.g. when a new operation starts.
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        if self.style == ProgressStyle::Spinner && total > 0 {
            self.style = ProgressStyle::Bar;
        }
    }

    /// Update the progress bar to a specific value.
    pub fn update(&mut self, current: usize) {
        self.current = if self.total > 0 {
            current.min(self.total)
        } else {
            current
        };

        // Rate limit updates
        if self.last_update.elapsed() < self.update_interval && current < self.total {
            return;
        }

        self.last_update = Instant::now();
        self.render();
    }

    /// Increment the progress bar by one.
    pub fn increment(&mut self) {
        self.update(self.current + 1);
    }

    /// Mark the progress bar as finished.
    pub fn finish(&mut self) {
        self.current = self.total;
        if self.enabled {
            self.render();
            println!();
        }
    }

    /// Erase the line and start counting again from zero.
    pub fn restart(&mut self) {
        self.clear();
        self.current = 0;
        self.start_time = Instant::now();
        self.last_update = self.start_time;
    }

    /// Clear the progress bar from the terminal.
    pub fn clear(&self) {
        if self.enabled {
            print!("\r\x1b[K");
            io::stdout().flush().ok();
        }
    }

    fn render(&mut self) {
        if !self.enabled {
            return;
        }

        let output = match self.style {
            ProgressStyle::Bar => self.render_bar(),
            ProgressStyle::Spinner => self.render_spinner(),
            ProgressStyle::Counter => self.render_counter(),
        };

        print!("\r\x1b[K{output}");
        io::stdout().flush().ok();
    }

    fn render_bar(&self) -> String {
        let filled = (BAR_WIDTH * self.current) / self.total.max(1);
        let filled = filled.min(BAR_WIDTH);
        let empty = BAR_WIDTH - filled;

        let bar = format!(
            "[{}{}]",
            "=".repeat(filled.saturating_sub(1)) + if filled > 0 { ">" } else { "" },
            " ".repeat(empty)
        );

        let mut parts = vec![
            bar,
            format!("{:.0}%", self.percent()),
            format!("{}/{}", self.current, self.total),
            format_duration(self.start_time.elapsed()),
        ];

        if let Some(eta) = self.eta() {
            parts.push(format!("eta {}", format_duration(eta)));
        }

        if let Some(ref msg) = self.message {
            parts.insert(0, msg.clone());
        }

        parts.join(" ")
    }

    fn render_spinner(&mut self) -> String {
        let frame = SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()];
        self.spinner_frame += 1;

        let mut parts = vec![
            frame.to_string(),
            format_duration(self.start_time.elapsed()),
        ];

        if let Some(ref msg) = self.message {
            parts.insert(1, msg.clone());
        }

        parts.join(" ")
    }

    fn render_counter(&self) -> String {
        let mut parts = vec![
            format!("{}/{}", self.current, self.total),
            format_duration(self.start_time.elapsed()),
        ];

        if let Some(ref msg) = self.message {
            parts.insert(0, msg.clone());
        }

        parts.join(" ")
    }

    /// Get the current progress percentage.
    pub fn percent(&self) -> f64 {
        Progress::new(self.current, self.total).percent()
    }

    /// Get the elapsed time since start.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Estimate time remaining.
    pub fn eta(&self) -> Option<Duration> {
        if self.current == 0 || self.current >= self.total {
            return None;
        }

        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed <= 0.0 {
            return None;
        }
        let rate = self.current as f64 / elapsed;
        let remaining = self.total - self.current;

        Some(Duration::from_secs_f64(remaining as f64 / rate))
    }
}

/// [`ProgressSink`] drawing to the terminal.
///
/// The bar follows whatever total the current operation reports and is
/// erased when the operation ends.
pub struct TerminalProgress {
    bar: Mutex<ProgressBar>,
}

impl TerminalProgress {
    /// Wrap a progress bar.
    pub fn new(bar: ProgressBar) -> Self {
        Self {
            bar: Mutex::new(bar),
        }
    }

    /// A sink that draws nothing.
    pub fn disabled() -> Self {
        Self::new(ProgressBar::disabled())
    }

    /// Set the label shown in front of the bar.
    pub fn set_message(&self, message: impl Into<String>) {
        self.bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set_message(message);
    }
}

impl ProgressSink for TerminalProgress {
    fn report(&self, progress: Progress) {
        let mut bar = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        if bar.total != progress.total {
            bar.set_total(progress.total);
        }
        bar.update(progress.completed);
    }

    fn reset(&self) {
        self.bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .restart();
    }
}

/// Format a duration as a human-readable string.
fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}
