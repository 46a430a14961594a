#![forbid(unsafe_code)]

//! Software-defined periodic intervals over the 24-bit SysTick down-counter.
//!
//! The hardware counter wraps roughly once a second at the fixed 16 MHz
//! system clock, so millisecond periods beyond one wrap are synthesized in
//! software: a requested duration is translated into a number of full counter
//! wraps plus a sub-wrap reload remainder ([`TickConfig`]), a wrap-counting
//! state machine fires a completion callback once per period from the wrap
//! interrupt ([`SysTick::handle_wrap`]), and a synchronous variant polls the
//! wrap flag with interrupts disabled ([`SysTick::start_busy_wait`]).
//!
//! All register traffic goes through the [`SysTickRegs`] seam; tests drive
//! the driver against the [`SimSysTickRegs`] counter model instead of real
//! time. The completion exception line is registered through the
//! `InterruptController` capability from `tiva-interrupts` — this crate never
//! writes controller registers itself.

pub mod config;
pub mod regs;
pub mod sim;
pub mod timer;

pub use config::TickConfig;
pub use regs::SysTickRegs;
pub use sim::SimSysTickRegs;
pub use timer::{CallbackSlot, SysTick, SysTickConfig, SysTickState, WrapCallback};
