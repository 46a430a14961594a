//! The counter's register seam.

/// Access to the counter's three registers.
///
/// The driver is written entirely against this trait so the hardware can be
/// swapped for a software model in tests. A board support crate binds it to
/// the real memory-mapped block; that binding (and the vector-table glue that
/// routes the wrap interrupt to [`SysTick::handle_wrap`]) lives outside this
/// crate.
///
/// Hardware side effects are part of the contract:
///
/// - Reading the control register consumes the wrap flag
///   ([`CTRL_COUNTFLAG`]), which is why [`read_ctrl`] takes `&mut self`.
/// - Bit 16 of the control register is read-only; writes ignore it.
/// - Writing any value to the current-count register clears the counter to 0
///   and clears the wrap flag.
///
/// [`SysTick::handle_wrap`]: crate::timer::SysTick::handle_wrap
/// [`CTRL_COUNTFLAG`]: crate::config::CTRL_COUNTFLAG
/// [`read_ctrl`]: SysTickRegs::read_ctrl
pub trait SysTickRegs {
    fn read_ctrl(&mut self) -> u32;
    fn write_ctrl(&mut self, value: u32);

    /// Reload register: 24-bit value the counter restarts from on wrap.
    fn read_reload(&self) -> u32;
    fn write_reload(&mut self, value: u32);

    /// Current-count register.
    fn read_current(&self) -> u32;
    fn write_current(&mut self, value: u32);
}
