//! Processor exception kinds and their control-register mapping.

/// The ten processor exception kinds on the Cortex-M4 vector table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exception {
    Reset,
    Nmi,
    HardFault,
    MemFault,
    BusFault,
    UsageFault,
    Svc,
    DebugMonitor,
    PendSv,
    SysTick,
}

/// Location of an exception's 3-bit priority field: index into the
/// SYSPRI1..SYSPRI3 block and the bit position of the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PriorityField {
    pub reg: usize,
    pub pos: u32,
}

/// What of an exception is software-controllable.
///
/// `enable` is the SYSHNDCTRL gate mask, present only for the three
/// configurable faults. `priority` is absent for the kinds whose priority the
/// architecture fixes (reset, NMI, hard fault). Operations on an absent
/// capability are accepted and write nothing.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ExceptionControl {
    pub enable: Option<u32>,
    pub priority: Option<PriorityField>,
}

// SYSHNDCTRL gate bits.
const MEM_FAULT_ENABLE: u32 = 1 << 16;
const BUS_FAULT_ENABLE: u32 = 1 << 17;
const USAGE_FAULT_ENABLE: u32 = 1 << 18;

const fn field(reg: usize, pos: u32) -> Option<PriorityField> {
    Some(PriorityField { reg, pos })
}

impl Exception {
    /// Lookup-table dispatch from kind to its control-register slots.
    pub(crate) const fn control(self) -> ExceptionControl {
        let (enable, priority) = match self {
            Exception::Reset => (None, None),
            Exception::Nmi => (None, None),
            Exception::HardFault => (None, None),
            Exception::MemFault => (Some(MEM_FAULT_ENABLE), field(0, 5)),
            Exception::BusFault => (Some(BUS_FAULT_ENABLE), field(0, 13)),
            Exception::UsageFault => (Some(USAGE_FAULT_ENABLE), field(0, 21)),
            Exception::Svc => (None, field(1, 29)),
            Exception::DebugMonitor => (None, field(2, 5)),
            Exception::PendSv => (None, field(2, 21)),
            Exception::SysTick => (None, field(2, 29)),
        };
        ExceptionControl { enable, priority }
    }
}
