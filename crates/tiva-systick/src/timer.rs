//! The periodic timer service: lifecycle, wrap counting, completion.

use std::fmt;

use tiva_interrupts::{Exception, InterruptController};

use crate::config::{
    TickConfig, CTRL_CLKSRC, CTRL_COUNTFLAG, CTRL_ENABLE, CTRL_TICKINT,
};
use crate::regs::SysTickRegs;

/// Zero-argument completion callback, invoked from the wrap handler — that
/// is, from interrupt context. Keep it short and non-blocking.
pub type WrapCallback = Box<dyn FnMut() + Send>;

/// Holds at most one completion callback.
///
/// The empty state is explicit: completion with an empty slot produces no
/// side effect beyond the counter/state reset. Assigning replaces (and
/// drops) any previous callback.
#[derive(Default)]
pub struct CallbackSlot(Option<WrapCallback>);

impl CallbackSlot {
    pub fn set(&mut self, callback: Option<WrapCallback>) {
        self.0 = callback;
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }

    pub fn invoke(&mut self) {
        if let Some(callback) = self.0.as_mut() {
            callback();
        }
    }
}

impl fmt::Debug for CallbackSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CallbackSlot")
            .field(&if self.is_set() { "set" } else { "empty" })
            .finish()
    }
}

/// Static configuration of the timer service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SysTickConfig {
    /// Priority registered for the wrap-completion exception line on `init`.
    pub wrap_priority: u8,
}

impl Default for SysTickConfig {
    fn default() -> Self {
        Self { wrap_priority: 3 }
    }
}

/// Snapshot of the timer's software state.
///
/// The callback slot is a runtime handshake with the caller and is not part
/// of the snapshot; register contents belong to the register block. Callers
/// restoring a snapshot re-set the callback and re-arm the hardware
/// themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SysTickState {
    pub ticks: TickConfig,
    pub elapsed_wraps: u32,
    pub running: bool,
}

/// The timer service over a register block `R`.
///
/// One value owns the whole of the service's mutable state — derived tick
/// configuration, elapsed-wrap count, running flag, callback slot — so
/// independent instances and deterministic tests need no process-wide
/// storage. The wrap-event entry point is [`handle_wrap`], to be called from
/// the counter's interrupt vector.
///
/// Foreground calls and the wrap handler share this state without a lock;
/// the execution model is a single core with a single wrap interrupt source,
/// and callers must not reconfigure a timer that is armed and running.
///
/// [`handle_wrap`]: SysTick::handle_wrap
#[derive(Debug)]
pub struct SysTick<R: SysTickRegs> {
    regs: R,
    config: SysTickConfig,
    ticks: TickConfig,
    elapsed_wraps: u32,
    running: bool,
    callback: CallbackSlot,
}

impl<R: SysTickRegs> SysTick<R> {
    pub fn new(regs: R, config: SysTickConfig) -> Self {
        Self {
            regs,
            config,
            ticks: TickConfig::default(),
            elapsed_wraps: 0,
            running: false,
            callback: CallbackSlot::default(),
        }
    }

    pub fn new_default(regs: R) -> Self {
        Self::new(regs, SysTickConfig::default())
    }

    /// Arms the counter for a periodic interval of `ms` milliseconds with
    /// the wrap interrupt enabled.
    ///
    /// Re-invocable at any time; each call replaces the previous
    /// configuration. The elapsed-wrap count deliberately persists across
    /// re-initialization — only [`deinit`] resets it. The completion
    /// exception line is registered with the interrupt controller (its
    /// priority comes from [`SysTickConfig::wrap_priority`]).
    ///
    /// A zero duration produces the degenerate `{0, 0}` configuration: the
    /// hardware counter ignores a zeroed reload value, so no wrap ever
    /// fires.
    ///
    /// [`deinit`]: SysTick::deinit
    pub fn init(&mut self, ms: u16, intc: &mut impl InterruptController) {
        self.regs.write_ctrl(0);

        self.ticks = TickConfig::from_millis(ms);
        if self.ticks.is_degenerate() {
            tracing::trace!(ms, "degenerate zero-duration configuration");
        }

        self.regs.write_reload(self.ticks.reload_remainder);
        self.regs.write_current(0);

        intc.enable_exception(Exception::SysTick);
        intc.set_exception_priority(Exception::SysTick, self.config.wrap_priority);

        self.regs
            .write_ctrl(CTRL_CLKSRC | CTRL_TICKINT | CTRL_ENABLE);
        self.running = true;
    }

    /// Wrap-event entry point; call once per wrap interrupt.
    ///
    /// Counts wraps until the configured target is reached, then clears the
    /// counter, rewrites the reload register for the next period, resets the
    /// wrap count and invokes the callback (if any). The timer stays armed:
    /// the interval is periodic, not one-shot. Reentrancy is excluded by the
    /// hardware masking its single interrupt source while the handler runs,
    /// not by a software lock.
    pub fn handle_wrap(&mut self) {
        self.elapsed_wraps += 1;
        if self.elapsed_wraps == self.ticks.wrap_target + 1 {
            self.regs.write_current(0);
            self.regs.write_reload(self.ticks.reload_remainder);
            self.elapsed_wraps = 0;
            self.callback.invoke();
        }
    }

    /// Synchronous variant: arms the counter with interrupts disabled and
    /// polls the wrap flag in place until the requested duration has
    /// elapsed, then disables the timer entirely and returns.
    ///
    /// Blocks the calling context for the whole duration; there is no
    /// cancellation short of a hardware reset. Runtime state and the
    /// callback slot are untouched. A zero duration is degenerate here too:
    /// hardware never raises a wrap flag for a zeroed reload value, so this
    /// call would not return — pass a nonzero duration.
    pub fn start_busy_wait(&mut self, ms: u16) {
        self.regs.write_ctrl(0);

        let ticks = TickConfig::from_millis(ms);
        if ticks.is_degenerate() {
            tracing::trace!(ms, "degenerate zero-duration busy-wait");
        }
        self.ticks = ticks;

        self.regs.write_reload(ticks.reload_remainder);
        self.regs.write_current(0);
        self.regs.write_ctrl(CTRL_CLKSRC | CTRL_ENABLE);

        let target = ticks.wrap_target + 1;
        let mut observed = 0u32;
        while observed != target {
            if self.regs.read_ctrl() & CTRL_COUNTFLAG != 0 {
                observed += 1;
            }
        }

        self.regs.write_ctrl(0);
    }

    /// Resumes counting. Configuration and elapsed-wrap count are wherever
    /// [`stop`] left them; no reconfiguration occurs.
    ///
    /// [`stop`]: SysTick::stop
    pub fn start(&mut self) {
        let ctrl = self.regs.read_ctrl();
        self.regs.write_ctrl(ctrl | CTRL_ENABLE);
        self.running = true;
    }

    /// Pauses counting by clearing the enable bit only.
    pub fn stop(&mut self) {
        let ctrl = self.regs.read_ctrl();
        self.regs.write_ctrl(ctrl & !CTRL_ENABLE);
        self.running = false;
    }

    /// Replaces the completion callback; `None` clears the slot.
    ///
    /// Atomic with respect to the wrap handler by virtue of single-threaded
    /// assignment: the handler cannot preempt half an assignment on this
    /// execution model.
    pub fn set_callback(&mut self, callback: Option<WrapCallback>) {
        self.callback.set(callback);
    }

    /// Fully disarms the service: counter disabled and cleared, callback
    /// slot emptied, completion line deregistered, wrap count reset.
    ///
    /// After `deinit`, simulated or real wrap events reaching
    /// [`handle_wrap`] can no longer invoke a callback until one is set
    /// again.
    ///
    /// [`handle_wrap`]: SysTick::handle_wrap
    pub fn deinit(&mut self, intc: &mut impl InterruptController) {
        self.regs.write_ctrl(0);
        self.regs.write_current(0);
        self.callback.clear();
        intc.disable_exception(Exception::SysTick);
        self.ticks = TickConfig::default();
        self.elapsed_wraps = 0;
        self.running = false;
    }

    pub fn tick_config(&self) -> TickConfig {
        self.ticks
    }

    pub fn elapsed_wraps(&self) -> u32 {
        self.elapsed_wraps
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn callback_is_set(&self) -> bool {
        self.callback.is_set()
    }

    pub fn regs(&self) -> &R {
        &self.regs
    }

    pub fn regs_mut(&mut self) -> &mut R {
        &mut self.regs
    }

    pub fn save_state(&self) -> SysTickState {
        SysTickState {
            ticks: self.ticks,
            elapsed_wraps: self.elapsed_wraps,
            running: self.running,
        }
    }

    pub fn restore_state(&mut self, state: SysTickState) {
        self.ticks = state.ticks;
        self.elapsed_wraps = state.elapsed_wraps;
        self.running = state.running;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimSysTickRegs;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use tiva_interrupts::Nvic;

    fn counting_callback() -> (WrapCallback, Arc<AtomicU32>) {
        let fired = Arc::new(AtomicU32::new(0));
        let handle = fired.clone();
        let callback = Box::new(move || {
            handle.fetch_add(1, Ordering::Relaxed);
        });
        (callback, fired)
    }

    #[test]
    fn init_programs_the_register_block() {
        let mut nvic = Nvic::new();
        let mut timer = SysTick::new_default(SimSysTickRegs::new());

        timer.init(2000, &mut nvic);

        assert_eq!(timer.tick_config().wrap_target, 1);
        assert_eq!(timer.regs().read_reload(), 15_222_784);
        assert_eq!(timer.regs().read_current(), 0);
        assert!(timer.regs().is_enabled());
        assert!(timer.regs().interrupt_enabled());
        assert!(timer.is_running());
    }

    #[test]
    fn completion_fires_once_per_period_and_resets_state() {
        let mut nvic = Nvic::new();
        let mut timer = SysTick::new_default(SimSysTickRegs::new());
        let (callback, fired) = counting_callback();

        timer.init(2000, &mut nvic);
        timer.set_callback(Some(callback));

        // wrap_target is 1: the first wrap only accumulates.
        timer.handle_wrap();
        assert_eq!(fired.load(Ordering::Relaxed), 0);
        assert_eq!(timer.elapsed_wraps(), 1);

        timer.handle_wrap();
        assert_eq!(fired.load(Ordering::Relaxed), 1);
        assert_eq!(timer.elapsed_wraps(), 0);
        assert_eq!(timer.regs().read_reload(), 15_222_784);
        assert_eq!(timer.regs().read_current(), 0);
    }

    #[test]
    fn timer_is_periodic_not_one_shot() {
        let mut nvic = Nvic::new();
        let mut timer = SysTick::new_default(SimSysTickRegs::new());
        let (callback, fired) = counting_callback();

        timer.init(3000, &mut nvic);
        timer.set_callback(Some(callback));

        let target = timer.tick_config().wrap_target + 1;
        for _ in 0..target * 3 {
            timer.handle_wrap();
        }
        assert_eq!(fired.load(Ordering::Relaxed), 3);
        assert_eq!(timer.elapsed_wraps(), 0);
    }

    #[test]
    fn completion_with_empty_slot_only_resets_state() {
        let mut nvic = Nvic::new();
        let mut timer = SysTick::new_default(SimSysTickRegs::new());

        timer.init(1000, &mut nvic);
        timer.handle_wrap();
        assert_eq!(timer.elapsed_wraps(), 0);
        assert_eq!(timer.regs().read_reload(), 16_000_000);
    }

    #[test]
    fn stop_start_preserves_configuration_and_progress() {
        let mut nvic = Nvic::new();
        let mut timer = SysTick::new_default(SimSysTickRegs::new());

        timer.init(3000, &mut nvic);
        timer.handle_wrap();
        let reload = timer.regs().read_reload();

        timer.stop();
        assert!(!timer.regs().is_enabled());
        assert!(!timer.is_running());
        assert_eq!(timer.elapsed_wraps(), 1);

        timer.start();
        assert!(timer.regs().is_enabled());
        assert_eq!(timer.elapsed_wraps(), 1);
        assert_eq!(timer.regs().read_reload(), reload);
    }

    #[test]
    fn reinit_replaces_configuration_but_keeps_wrap_count() {
        let mut nvic = Nvic::new();
        let mut timer = SysTick::new_default(SimSysTickRegs::new());

        timer.init(3000, &mut nvic);
        timer.handle_wrap();
        timer.init(2000, &mut nvic);

        assert_eq!(timer.tick_config(), TickConfig::from_millis(2000));
        assert_eq!(timer.elapsed_wraps(), 1);
    }

    #[test]
    fn deinit_silences_later_wrap_events() {
        let mut nvic = Nvic::new();
        let mut timer = SysTick::new_default(SimSysTickRegs::new());
        let (callback, fired) = counting_callback();

        timer.init(1000, &mut nvic);
        timer.set_callback(Some(callback));
        timer.deinit(&mut nvic);

        assert!(!timer.callback_is_set());
        assert!(!timer.regs().is_enabled());
        assert_eq!(timer.elapsed_wraps(), 0);

        for _ in 0..4 {
            timer.handle_wrap();
        }
        assert_eq!(fired.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn set_callback_none_clears_the_slot() {
        let mut timer = SysTick::new_default(SimSysTickRegs::new());
        let (callback, _fired) = counting_callback();

        timer.set_callback(Some(callback));
        assert!(timer.callback_is_set());
        timer.set_callback(None);
        assert!(!timer.callback_is_set());
    }

    #[test]
    fn snapshot_round_trip_excludes_the_callback() {
        let mut nvic = Nvic::new();
        let mut timer = SysTick::new_default(SimSysTickRegs::new());
        let (callback, _fired) = counting_callback();

        timer.init(2000, &mut nvic);
        timer.set_callback(Some(callback));
        timer.handle_wrap();

        let state = timer.save_state();
        assert_eq!(
            state,
            SysTickState {
                ticks: TickConfig::from_millis(2000),
                elapsed_wraps: 1,
                running: true,
            }
        );

        let mut restored = SysTick::new_default(SimSysTickRegs::new());
        restored.restore_state(state);
        assert_eq!(restored.save_state(), state);
        assert!(!restored.callback_is_set());
    }
}
