//! Epson S1D15G00 adapter
//!
//! Two capability profiles are available:
//!
//! - with orientation control: `Control + DrawPixel + FillArea +
//!   BlockTransfer`, every primitive addressed through its own window
//! - without: `Control + StreamWrite`, pixels streamed into a window
//!
//! The native format is RGB444. Unpacked pixels travel as two bytes
//! (`0000RRRR GGGGBBBB`); packed pixels as three bytes per pair.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use vitrine_hal::{
    AdapterError, ChannelLayout, CommandBus, Control, DisplayAdapter, DriverCapabilities,
    Orientation, Packer, PixelCodec, PixelFormat, PowerMode, Primitive, PrimitiveSet,
};

/// Visible width in pixels
pub const WIDTH: u16 = 130;
/// Visible height in pixels
pub const HEIGHT: u16 = 130;

/// Offset of the visible area in controller RAM
const COLUMN_OFFSET: u8 = 0;
const PAGE_OFFSET: u8 = 2;

/// Bytes staged per bus write while filling
const FILL_CHUNK: usize = 48;

/// S1D15G00 commands
#[allow(dead_code)]
mod cmd {
    pub const DISON: u8 = 0xAF;
    pub const DISOFF: u8 = 0xAE;
    pub const DISNOR: u8 = 0xA6;
    pub const DISINV: u8 = 0xA7;
    pub const COMSCN: u8 = 0xBB;
    pub const DISCTL: u8 = 0xCA;
    pub const SLPIN: u8 = 0x95;
    pub const SLPOUT: u8 = 0x94;
    pub const PASET: u8 = 0x75;
    pub const CASET: u8 = 0x15;
    pub const DATCTL: u8 = 0xBC;
    pub const RAMWR: u8 = 0x5C;
    pub const PWRCTR: u8 = 0x20;
    pub const VOLCTR: u8 = 0x81;
    pub const OSCON: u8 = 0xD1;
    pub const NOP: u8 = 0x25;
}

/// Panel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Ge8Config {
    /// Advertise orientation control and the windowed primitives
    pub orientation_control: bool,
    /// Pack two pixels into three bytes
    pub packed_pixels: bool,
    /// Let packed pixels run across line ends
    pub packed_lines: bool,
    /// Initial contrast (0-100%)
    pub contrast: u8,
}

impl Default for Ge8Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Ge8Config {
    /// Hardware primitives, unpacked RGB444, half contrast
    pub const DEFAULT: Self = Self {
        orientation_control: true,
        packed_pixels: false,
        packed_lines: false,
        contrast: 50,
    };

    /// Native pixel format for this configuration
    pub const fn format(&self) -> PixelFormat {
        PixelFormat::new(ChannelLayout::Rgb444)
            .with_packed_pixels(self.packed_pixels)
            .with_packed_lines(self.packed_lines)
    }

    /// Capability descriptor for this configuration
    pub const fn capabilities(&self) -> DriverCapabilities {
        let primitives = if self.orientation_control {
            PrimitiveSet::of(&[
                Primitive::Control,
                Primitive::DrawPixel,
                Primitive::FillArea,
                Primitive::BlockTransfer,
            ])
        } else {
            PrimitiveSet::of(&[Primitive::Control, Primitive::StreamWrite])
        };
        DriverCapabilities::new("Nokia6610GE8", self.format(), primitives)
    }
}

/// Nokia 6610 GE8 adapter
pub struct Ge8<BUS, RST> {
    bus: BUS,
    reset: RST,
    config: Ge8Config,
    caps: DriverCapabilities,
    codec: PixelCodec,
    orientation: Orientation,
    power: PowerMode,
    contrast: u8,
    streaming: bool,
}

impl<BUS, RST> Ge8<BUS, RST>
where
    BUS: CommandBus,
    RST: OutputPin,
{
    /// Create a new adapter; call [`Ge8::init`] before drawing
    pub fn new(bus: BUS, reset: RST, config: Ge8Config) -> Self {
        let caps = config.capabilities();
        Self {
            bus,
            reset,
            config,
            caps,
            codec: PixelCodec::new(caps.format),
            orientation: Orientation::Deg0,
            power: PowerMode::Off,
            contrast: config.contrast.min(100),
            streaming: false,
        }
    }

    /// Hardware reset and power-up sequence
    pub fn init<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), AdapterError> {
        self.reset.set_low().map_err(|_| AdapterError::Bus)?;
        delay.delay_ms(10);
        self.reset.set_high().map_err(|_| AdapterError::Bus)?;
        delay.delay_ms(10);

        // Clock divider, duty, inversion period
        self.command_with(cmd::DISCTL, &[0x00, 0x20, 0x00])?;
        self.command_with(cmd::COMSCN, &[0x01])?;
        self.command(cmd::OSCON)?;
        self.command(cmd::SLPOUT)?;
        self.command_with(cmd::VOLCTR, &[volume(self.contrast), 0x03])?;
        self.command_with(cmd::PWRCTR, &[0x0F])?;
        delay.delay_ms(100);

        self.command(cmd::DISNOR)?;
        self.send_datctl()?;
        self.command(cmd::NOP)?;
        self.command(cmd::DISON)?;

        self.power = PowerMode::On;
        info!(
            "ge8 ready, packed pixels={} packed lines={}",
            self.config.packed_pixels,
            self.config.packed_lines
        );
        Ok(())
    }

    /// Current orientation
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Current power mode
    pub fn power(&self) -> PowerMode {
        self.power
    }

    /// Current contrast (0-100%)
    pub fn contrast(&self) -> u8 {
        self.contrast
    }

    /// Release the bus and reset pin
    pub fn release(self) -> (BUS, RST) {
        (self.bus, self.reset)
    }

    fn command(&mut self, command: u8) -> Result<(), AdapterError> {
        self.bus.write_command(command).map_err(|_| AdapterError::Bus)
    }

    fn command_with(&mut self, command: u8, params: &[u8]) -> Result<(), AdapterError> {
        self.bus
            .command_with(command, params)
            .map_err(|_| AdapterError::Bus)
    }

    fn data(&mut self, data: &[u8]) -> Result<(), AdapterError> {
        self.bus.write_data(data).map_err(|_| AdapterError::Bus)
    }

    fn send_datctl(&mut self) -> Result<(), AdapterError> {
        let scan = match self.orientation {
            Orientation::Deg0 => 0x00,
            Orientation::Deg90 => 0x05,
            Orientation::Deg180 => 0x03,
            Orientation::Deg270 => 0x06,
        };
        let grayscale = if self.config.packed_pixels { 0x02 } else { 0x04 };
        self.command_with(cmd::DATCTL, &[scan, 0x00, grayscale])
    }

    /// Address a window in panel coordinates and start a RAM write
    fn open_window(&mut self, x: u16, y: u16, width: u16, height: u16) -> Result<(), AdapterError> {
        let (c0, c1, p0, p1) = physical_window(self.orientation, x, y, width, height)?;
        self.command_with(cmd::CASET, &[c0 + COLUMN_OFFSET, c1 + COLUMN_OFFSET])?;
        self.command_with(cmd::PASET, &[p0 + PAGE_OFFSET, p1 + PAGE_OFFSET])?;
        self.command(cmd::RAMWR)
    }
}

/// Map a logical rectangle to controller (column, page) ranges
fn physical_window(
    orientation: Orientation,
    x: u16,
    y: u16,
    width: u16,
    height: u16,
) -> Result<(u8, u8, u8, u8), AdapterError> {
    let fits = |start: u16, len: u16, limit: u16| len > 0 && start as u32 + len as u32 <= limit as u32;
    if !fits(x, width, WIDTH) || !fits(y, height, HEIGHT) {
        return Err(AdapterError::OutOfBounds);
    }
    let (x0, x1) = (x, x + width - 1);
    let (y0, y1) = (y, y + height - 1);
    let window = match orientation {
        Orientation::Deg0 => (x0, x1, y0, y1),
        Orientation::Deg90 => (y0, y1, WIDTH - 1 - x1, WIDTH - 1 - x0),
        Orientation::Deg180 => (WIDTH - 1 - x1, WIDTH - 1 - x0, HEIGHT - 1 - y1, HEIGHT - 1 - y0),
        Orientation::Deg270 => (HEIGHT - 1 - y1, HEIGHT - 1 - y0, x0, x1),
    };
    Ok((window.0 as u8, window.1 as u8, window.2 as u8, window.3 as u8))
}

/// Electronic volume register value for a contrast percentage
const fn volume(percent: u8) -> u8 {
    let percent = if percent > 100 { 100 } else { percent };
    (percent as u16 * 63 / 100) as u8
}

impl<BUS, RST> DisplayAdapter for Ge8<BUS, RST>
where
    BUS: CommandBus,
    RST: OutputPin,
{
    fn capabilities(&self) -> &DriverCapabilities {
        &self.caps
    }

    fn size(&self) -> (u16, u16) {
        (WIDTH, HEIGHT)
    }

    fn draw_pixel(&mut self, x: u16, y: u16, native: u32) -> Result<(), AdapterError> {
        self.open_window(x, y, 1, 1)?;
        let mut buf = [0u8; Packer::MAX_EMIT + 1];
        let mut packer = self.codec.packer();
        let mut len = packer.push(native, &mut buf);
        len += packer.finish(&mut buf[len..]);
        self.data(&buf[..len])
    }

    fn fill_area(&mut self, x: u16, y: u16, width: u16, height: u16, native: u32) -> Result<(), AdapterError> {
        self.open_window(x, y, width, height)?;
        let mut buf = [0u8; FILL_CHUNK];
        let mut packer = self.codec.packer();
        let mut len = 0;
        for _ in 0..height {
            for _ in 0..width {
                if FILL_CHUNK - len < Packer::MAX_EMIT {
                    self.data(&buf[..len])?;
                    len = 0;
                }
                len += packer.push(native, &mut buf[len..]);
            }
            if FILL_CHUNK - len < Packer::MAX_EMIT {
                self.data(&buf[..len])?;
                len = 0;
            }
            len += packer.end_line(&mut buf[len..]);
        }
        len += packer.finish(&mut buf[len..]);
        if len > 0 {
            self.data(&buf[..len])?;
        }
        Ok(())
    }

    fn block_transfer(&mut self, x: u16, y: u16, width: u16, height: u16, data: &[u8]) -> Result<(), AdapterError> {
        if data.len() != self.caps.format.block_bytes(width as usize, height as usize) {
            return Err(AdapterError::DataLength);
        }
        self.open_window(x, y, width, height)?;
        self.data(data)
    }

    fn stream_start(&mut self, x: u16, y: u16, width: u16, height: u16) -> Result<(), AdapterError> {
        self.open_window(x, y, width, height)?;
        self.streaming = true;
        Ok(())
    }

    fn stream_write(&mut self, data: &[u8]) -> Result<(), AdapterError> {
        if !self.streaming {
            return Err(AdapterError::OutOfBounds);
        }
        self.data(data)
    }

    fn stream_stop(&mut self) -> Result<(), AdapterError> {
        self.streaming = false;
        self.command(cmd::NOP)
    }

    fn control(&mut self, request: Control) -> Result<(), AdapterError> {
        match request {
            Control::Power(mode) => {
                match mode {
                    PowerMode::Off => {
                        self.command(cmd::DISOFF)?;
                        self.command_with(cmd::PWRCTR, &[0x00])?;
                    }
                    PowerMode::Sleep => {
                        self.command(cmd::DISOFF)?;
                        self.command(cmd::SLPIN)?;
                    }
                    PowerMode::On => {
                        self.command(cmd::SLPOUT)?;
                        self.command_with(cmd::PWRCTR, &[0x0F])?;
                        self.command(cmd::DISON)?;
                    }
                }
                debug!("ge8 power {}", mode);
                self.power = mode;
            }
            Control::Orientation(orientation) => {
                if !self.config.orientation_control {
                    return Err(AdapterError::Unsupported);
                }
                let previous = self.orientation;
                self.orientation = orientation;
                if let Err(e) = self.send_datctl() {
                    self.orientation = previous;
                    return Err(e);
                }
            }
            Control::Contrast(percent) => {
                let percent = percent.min(100);
                self.command_with(cmd::VOLCTR, &[volume(percent), 0x03])?;
                self.contrast = percent;
            }
            Control::Invert(on) => {
                self.command(if on { cmd::DISINV } else { cmd::DISNOR })?;
            }
        }
        Ok(())
    }
}
