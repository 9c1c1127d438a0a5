//! Interrupt and reset pin binding
//!
//! The driver does not take exclusive ownership of its GPIO lines. Binding
//! checks that both lines are usable, maps the interrupt pin to an IRQ
//! number and records the result in a [`PinBinding`]. The binding lives
//! inside [`ResourceBinder`] until it is released; nothing else can create
//! one.

use crate::error::Result;
use alloc::boxed::Box;
use core::fmt;

/// Platform interrupt number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IrqNumber(pub u32);

impl fmt::Display for IrqNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Record of a successful pin binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinBinding {
    interrupt_pin: u32,
    reset_pin: u32,
    irq: IrqNumber,
}

impl PinBinding {
    /// Interrupt pin
    pub fn interrupt_pin(&self) -> u32 {
        self.interrupt_pin
    }

    /// Reset pin
    pub fn reset_pin(&self) -> u32 {
        self.reset_pin
    }

    /// IRQ the interrupt pin maps to
    pub fn irq(&self) -> IrqNumber {
        self.irq
    }
}

/// GPIO lookup backend
pub trait PinResolver {
    /// Check that `pin` exists and is not held by another consumer
    ///
    /// Fails with [`crate::Error::ResourceUnavailable`].
    fn check_line(&mut self, pin: u32) -> Result<()>;

    /// Map `pin` to its interrupt number
    ///
    /// Fails with [`crate::Error::ResourceUnavailable`].
    fn irq_for_pin(&mut self, pin: u32) -> Result<IrqNumber>;

    /// Drop anything the backend keeps for `binding`
    fn release(&mut self, binding: &PinBinding) -> Result<()> {
        let _ = binding;
        Ok(())
    }
}

impl<P: PinResolver + ?Sized> PinResolver for Box<P> {
    fn check_line(&mut self, pin: u32) -> Result<()> {
        (**self).check_line(pin)
    }

    fn irq_for_pin(&mut self, pin: u32) -> Result<IrqNumber> {
        (**self).irq_for_pin(pin)
    }

    fn release(&mut self, binding: &PinBinding) -> Result<()> {
        (**self).release(binding)
    }
}

/// Binds and releases the interrupt/reset pin pair
#[derive(Debug)]
pub struct ResourceBinder<R> {
    resolver: R,
    binding: Option<PinBinding>,
}

impl<R: PinResolver> ResourceBinder<R> {
    /// Create an unbound binder on top of `resolver`
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            binding: None,
        }
    }

    /// Bind the pins and return the new binding
    ///
    /// # Panics
    ///
    /// Binding again without an intervening [`release`](Self::release) is
    /// a double bind and panics.
    pub fn bind(&mut self, interrupt_pin: u32, reset_pin: u32) -> Result<&PinBinding> {
        if let Some(prev) = &self.binding {
            panic!(
                "double bind: int {} / rst {} still bound (requested int {} / rst {})",
                prev.interrupt_pin, prev.reset_pin, interrupt_pin, reset_pin
            );
        }

        self.resolver.check_line(interrupt_pin)?;
        self.resolver.check_line(reset_pin)?;
        let irq = self.resolver.irq_for_pin(interrupt_pin)?;

        log::debug!(
            "{}: bound int {} (irq {}), rst {}",
            crate::DRV_NAME,
            interrupt_pin,
            irq,
            reset_pin
        );
        Ok(self.binding.insert(PinBinding {
            interrupt_pin,
            reset_pin,
            irq,
        }))
    }

    /// Release the current binding; a no-op if nothing is bound
    pub fn release(&mut self) {
        let Some(binding) = self.binding.take() else {
            return;
        };
        if let Err(e) = self.resolver.release(&binding) {
            log::warn!(
                "{}: releasing int {} / rst {}: {}",
                crate::DRV_NAME,
                binding.interrupt_pin,
                binding.reset_pin,
                e
            );
        }
    }

    /// Current binding, if any
    pub fn binding(&self) -> Option<&PinBinding> {
        self.binding.as_ref()
    }

    /// Whether pins are currently bound
    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// The resolver backend
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// The resolver backend, mutably
    pub fn resolver_mut(&mut self) -> &mut R {
        &mut self.resolver
    }
}
