//! Command/data bus abstractions
//!
//! Many small panel controllers (Epson S1D15G00, Philips PCF8833, ...)
//! take 9-bit SPI words where the first bit selects command or data.
//! This trait hides how the chip-specific HAL produces that framing
//! (bit-banged GPIO, 9-bit SPI peripheral, PIO program).

/// Command/data bus for a serial display controller
pub trait CommandBus {
    /// Error type for bus operations
    type Error;

    /// Send a command byte (D/C bit low)
    fn write_command(&mut self, command: u8) -> Result<(), Self::Error>;

    /// Send parameter or pixel bytes (D/C bit high)
    fn write_data(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Send a command followed by its parameter bytes
    fn command_with(&mut self, command: u8, params: &[u8]) -> Result<(), Self::Error> {
        self.write_command(command)?;
        if !params.is_empty() {
            self.write_data(params)?;
        }
        Ok(())
    }
}

impl<T: CommandBus + ?Sized> CommandBus for &mut T {
    type Error = T::Error;

    fn write_command(&mut self, command: u8) -> Result<(), Self::Error> {
        (**self).write_command(command)
    }

    fn write_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        (**self).write_data(data)
    }
}
