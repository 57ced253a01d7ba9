/// Format seconds as a timer readout.
///
/// `MM:SS` below one hour, `HH:MM:SS` from one hour on.
pub fn format_timer_display(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

/// Format seconds as a short duration (`1h 23m`, `45m`).
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Time display information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeDisplay {
    /// Elapsed time (seconds)
    pub elapsed: u64,
    /// Total time (seconds)
    pub total: u64,
    /// Percentage (0-100)
    pub percentage: u8,
}

impl TimeDisplay {
    pub fn new(elapsed: u64, total: u64) -> Self {
        let percentage = if total > 0 {
            let p = elapsed.saturating_mul(100) / total;
            p.min(100) as u8
        } else {
            0
        };
        Self {
            elapsed,
            total,
            percentage,
        }
    }

    pub fn format(&self) -> String {
        format!(
            "{}/{} ({}%)",
            format_timer_display(self.elapsed),
            format_timer_display(self.total),
            self.percentage
        )
    }
}
