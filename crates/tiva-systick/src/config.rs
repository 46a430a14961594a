//! Fixed hardware constants and the duration translator.

/// System clock feeding the counter. Hard-wired for this part; the service
/// does not discover it at runtime.
pub const SYS_CLOCK_HZ: u32 = 16_000_000;

/// Width of the hardware down-counter.
pub const COUNTER_BITS: u32 = 24;

/// Ticks consumed by one full traversal of the counter's range.
pub const WRAP_PERIOD_TICKS: u32 = 1 << COUNTER_BITS;

/// Largest value the reload register can hold.
pub const RELOAD_MAX: u32 = WRAP_PERIOD_TICKS - 1;

/// Hardware ticks per millisecond at [`SYS_CLOCK_HZ`].
pub const TICKS_PER_MS: u32 = SYS_CLOCK_HZ / 1000;

// Control-register bits.
pub const CTRL_ENABLE: u32 = 1 << 0;
pub const CTRL_TICKINT: u32 = 1 << 1;
pub const CTRL_CLKSRC: u32 = 1 << 2;
/// Read-only wrap flag; consumed by a control-register read and cleared by
/// any write to the current-count register.
pub const CTRL_COUNTFLAG: u32 = 1 << 16;

/// A requested period, translated into counter terms: `wrap_target` full
/// counter wraps followed by one partial count of `reload_remainder` ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickConfig {
    /// Number of full counter wraps in the period.
    pub wrap_target: u32,
    /// Counter value loaded for the final partial period. Always below
    /// [`WRAP_PERIOD_TICKS`] by construction.
    pub reload_remainder: u32,
}

impl TickConfig {
    /// Translates a millisecond duration into counter terms.
    ///
    /// The derivation is exact integer arithmetic:
    /// `wrap_target * WRAP_PERIOD_TICKS + reload_remainder` equals the
    /// requested duration in ticks with no rounding error. Both the
    /// interrupt-driven and busy-wait paths share this one derivation.
    ///
    /// A zero duration yields `{0, 0}`: a degenerate configuration that arms
    /// nothing (a zeroed reload register stops the hardware counter).
    pub fn from_millis(ms: u16) -> Self {
        let total_ticks = u64::from(ms) * u64::from(TICKS_PER_MS);
        Self {
            wrap_target: (total_ticks / u64::from(WRAP_PERIOD_TICKS)) as u32,
            reload_remainder: (total_ticks % u64::from(WRAP_PERIOD_TICKS)) as u32,
        }
    }

    /// The requested period, in hardware ticks.
    pub fn total_ticks(&self) -> u64 {
        u64::from(self.wrap_target) * u64::from(WRAP_PERIOD_TICKS)
            + u64::from(self.reload_remainder)
    }

    /// True for the effectively-disabled zero-duration configuration.
    pub fn is_degenerate(&self) -> bool {
        self.wrap_target == 0 && self.reload_remainder == 0
    }
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            wrap_target: 0,
            reload_remainder: 0,
        }
    }
}
