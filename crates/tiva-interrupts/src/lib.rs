#![forbid(unsafe_code)]

//! Interrupt-controller service for the Cortex-M4 NVIC and system control
//! block.
//!
//! The controller is modelled as a plain register file ([`Nvic`]) advanced
//! only by the operations of the [`InterruptController`] capability trait:
//! enable/disable a numbered interrupt line, set its priority, and the same
//! for the fixed set of processor [`Exception`] kinds. Devices that own an
//! interrupt line take `&mut impl InterruptController` and never touch the
//! registers themselves.

pub mod exception;
pub mod nvic;

pub use exception::Exception;
pub use nvic::{InterruptController, Nvic, IRQ_LINE_MAX, PRIORITY_MAX};
