//! Software model of the 24-bit down-counter, for deterministic tests.

use crate::config::{CTRL_CLKSRC, CTRL_COUNTFLAG, CTRL_ENABLE, CTRL_TICKINT, RELOAD_MAX};
use crate::regs::SysTickRegs;

/// A register block whose counter is advanced by [`advance`] instead of a
/// real clock.
///
/// The model follows the hardware's counting rules: while enabled, the
/// counter decrements once per tick; a cleared or just-wrapped counter loads
/// the reload value on the next tick; reaching zero latches the wrap flag.
/// The flag is sticky until consumed by a control-register read or a write to
/// the current-count register.
///
/// [`set_auto_step`] makes every control-register read advance the counter by
/// a fixed number of ticks, so a polling loop observes wrap flags without any
/// real time passing.
///
/// [`advance`]: SimSysTickRegs::advance
/// [`set_auto_step`]: SimSysTickRegs::set_auto_step
#[derive(Debug, Default)]
pub struct SimSysTickRegs {
    ctrl: u32,
    reload: u32,
    current: u32,
    countflag: bool,
    auto_step: u64,
    wraps: u64,
}

impl SimSysTickRegs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks advanced automatically on every control-register read. Zero
    /// (the default) disables auto-stepping.
    pub fn set_auto_step(&mut self, ticks: u64) {
        self.auto_step = ticks;
    }

    /// Advances the counter by `ticks` clock pulses. A disabled counter does
    /// not move.
    pub fn advance(&mut self, ticks: u64) {
        if self.ctrl & CTRL_ENABLE == 0 {
            return;
        }
        let mut remaining = ticks;
        while remaining > 0 {
            if self.current == 0 {
                // Load the reload value on the next pulse; a zeroed reload
                // wraps the counter on every pulse.
                self.current = self.reload;
                remaining -= 1;
                if self.current == 0 {
                    self.countflag = true;
                    self.wraps += 1;
                }
                continue;
            }
            let step = remaining.min(u64::from(self.current));
            self.current -= step as u32;
            remaining -= step;
            if self.current == 0 {
                self.countflag = true;
                self.wraps += 1;
            }
        }
    }

    /// Total wraps since construction, for assertions.
    pub fn wraps(&self) -> u64 {
        self.wraps
    }

    /// Peeks at the wrap flag without consuming it.
    pub fn wrap_flag(&self) -> bool {
        self.countflag
    }

    pub fn is_enabled(&self) -> bool {
        self.ctrl & CTRL_ENABLE != 0
    }

    pub fn interrupt_enabled(&self) -> bool {
        self.ctrl & CTRL_TICKINT != 0
    }
}

impl SysTickRegs for SimSysTickRegs {
    fn read_ctrl(&mut self) -> u32 {
        if self.auto_step > 0 {
            self.advance(self.auto_step);
        }
        let mut value = self.ctrl;
        if self.countflag {
            value |= CTRL_COUNTFLAG;
        }
        self.countflag = false;
        value
    }

    fn write_ctrl(&mut self, value: u32) {
        self.ctrl = value & (CTRL_ENABLE | CTRL_TICKINT | CTRL_CLKSRC);
    }

    fn read_reload(&self) -> u32 {
        self.reload
    }

    fn write_reload(&mut self, value: u32) {
        self.reload = value & RELOAD_MAX;
    }

    fn read_current(&self) -> u32 {
        self.current
    }

    fn write_current(&mut self, _value: u32) {
        self.current = 0;
        self.countflag = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_does_not_move_while_disabled() {
        let mut sim = SimSysTickRegs::new();
        sim.write_reload(100);
        sim.advance(1_000);
        assert_eq!(sim.wraps(), 0);
        assert_eq!(sim.read_current(), 0);
    }

    #[test]
    fn wrap_latches_the_flag_after_reload_plus_one_ticks() {
        let mut sim = SimSysTickRegs::new();
        sim.write_reload(10);
        sim.write_current(0);
        sim.write_ctrl(CTRL_CLKSRC | CTRL_ENABLE);

        // One pulse to load, ten to count down.
        sim.advance(10);
        assert!(!sim.wrap_flag());
        sim.advance(1);
        assert!(sim.wrap_flag());
        assert_eq!(sim.wraps(), 1);
    }

    #[test]
    fn control_read_consumes_the_flag() {
        let mut sim = SimSysTickRegs::new();
        sim.write_reload(1);
        sim.write_ctrl(CTRL_CLKSRC | CTRL_ENABLE);
        sim.advance(2);
        assert!(sim.read_ctrl() & CTRL_COUNTFLAG != 0);
        assert!(sim.read_ctrl() & CTRL_COUNTFLAG == 0);
    }

    #[test]
    fn current_write_clears_counter_and_flag() {
        let mut sim = SimSysTickRegs::new();
        sim.write_reload(5);
        sim.write_ctrl(CTRL_CLKSRC | CTRL_ENABLE);
        sim.advance(6);
        assert!(sim.wrap_flag());

        sim.write_current(0xDEAD);
        assert_eq!(sim.read_current(), 0);
        assert!(!sim.wrap_flag());
    }

    #[test]
    fn reload_register_is_masked_to_24_bits() {
        let mut sim = SimSysTickRegs::new();
        sim.write_reload(0xFFFF_FFFF);
        assert_eq!(sim.read_reload(), RELOAD_MAX);
    }

    #[test]
    fn auto_step_advances_on_control_reads() {
        let mut sim = SimSysTickRegs::new();
        sim.write_reload(10);
        sim.write_ctrl(CTRL_CLKSRC | CTRL_ENABLE);
        sim.set_auto_step(11);

        assert!(sim.read_ctrl() & CTRL_COUNTFLAG != 0);
        assert!(sim.read_ctrl() & CTRL_COUNTFLAG != 0);
        assert_eq!(sim.wraps(), 2);
    }
}
