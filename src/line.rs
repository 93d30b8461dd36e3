//! Bus line abstraction.
//!
//! The S-Link bus is a single open-collector wire pulled up to idle high.
//! The transmitter listens with the pin configured as an input and only
//! switches it to an output while it owns the bus.
//!
//! `embedded-hal` has no notion of changing a pin's direction at runtime, so
//! [`BusLine`] extends [`InputPin`] and [`OutputPin`] with the two direction
//! switches. HALs with a dynamic "flex" pin implement it directly; pins that
//! are already open-drain can be wrapped in [`OpenDrainLine`].

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

/// Direction of the bus line.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum LineMode {
    /// Released: the line floats high and can be sampled.
    #[default]
    Input,
    /// Driven by this transmitter.
    Output,
}

/// A digital line whose direction can be switched at runtime.
pub trait BusLine: InputPin + OutputPin {
    /// Releases the line and configures it for listening.
    fn set_input(&mut self) -> Result<(), Self::Error>;

    /// Configures the line to be driven.
    fn set_output(&mut self) -> Result<(), Self::Error>;

    /// Switches the line to `mode`.
    fn set_mode(&mut self, mode: LineMode) -> Result<(), Self::Error> {
        match mode {
            LineMode::Input => self.set_input(),
            LineMode::Output => self.set_output(),
        }
    }
}

/// Adapts an open-drain pin to [`BusLine`].
///
/// An open-drain output driven high is electrically released, which is what
/// input mode means on this bus; switching to output therefore needs no action.
#[derive(Debug)]
pub struct OpenDrainLine<P> {
    pin: P,
}

impl<P> OpenDrainLine<P>
where
    P: InputPin + OutputPin,
{
    /// Wraps an open-drain pin.
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Returns the wrapped pin.
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: ErrorType> ErrorType for OpenDrainLine<P> {
    type Error = P::Error;
}

impl<P: InputPin> InputPin for OpenDrainLine<P> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.pin.is_high()
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.pin.is_low()
    }
}

impl<P: OutputPin> OutputPin for OpenDrainLine<P> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.pin.set_low()
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.pin.set_high()
    }
}

impl<P> BusLine for OpenDrainLine<P>
where
    P: InputPin + OutputPin,
{
    fn set_input(&mut self) -> Result<(), Self::Error> {
        self.pin.set_high()
    }

    fn set_output(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
