// src/color.rs

//! Pixel formats and the codec that packs 8-bit RGB triples into them.
//!
//! Every format is described by a [`FormatDescriptor`]: how many bytes one
//! pixel occupies and, for each channel, its bit width and bit offset inside
//! the packed integer. Packing and unpacking are generic over that table, so
//! adding a layout means adding one table row.
//!
//! | Format      | Bytes | Red    | Green  | Blue   | Memory order (LE) |
//! |-------------|-------|--------|--------|--------|-------------------|
//! | `Rgb565`    | 2     | 5 @ 11 | 6 @ 5  | 5 @ 0  | low byte first    |
//! | `Xrgb1555`  | 2     | 5 @ 10 | 5 @ 5  | 5 @ 0  | low byte first    |
//! | `Bgr24`     | 3     | 8 @ 16 | 8 @ 8  | 8 @ 0  | B, G, R           |
//! | `Xrgb8888`  | 4     | 8 @ 16 | 8 @ 8  | 8 @ 0  | B, G, R, X        |

use serde::{Deserialize, Serialize};

use crate::error::{RasterError, Result};

/// An 8-bit-per-channel RGB color, independent of any pixel format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const RED: Self = Self::new(255, 0, 0);
    pub const GREEN: Self = Self::new(0, 255, 0);
    pub const BLUE: Self = Self::new(0, 0, 255);
    pub const YELLOW: Self = Self::new(255, 255, 0);
    pub const MAGENTA: Self = Self::new(255, 0, 255);
    pub const CYAN: Self = Self::new(0, 255, 255);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels scaled to `[0, 1]`.
    #[inline]
    pub fn to_unit(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }

    /// Builds a color from `[0, 1]` channels: each is clamped, then scaled
    /// with `round(c * 255)`.
    #[inline]
    pub fn from_unit(color: [f32; 3]) -> Self {
        #[inline(always)]
        fn quantize(c: f32) -> u8 {
            // NaN falls through `clamp` unchanged and saturates to 0 on the cast.
            (c.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        Self::new(quantize(color[0]), quantize(color[1]), quantize(color[2]))
    }
}

impl From<(u8, u8, u8)> for Rgb {
    #[inline]
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

impl From<Rgb> for (u8, u8, u8) {
    #[inline]
    fn from(c: Rgb) -> Self {
        (c.r, c.g, c.b)
    }
}

/// Width and position of one channel inside a packed pixel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelMask {
    /// Number of bits the channel keeps (1..=8).
    pub bits: u8,
    /// Bit offset of the channel's least significant bit.
    pub shift: u8,
}

impl ChannelMask {
    const fn new(bits: u8, shift: u8) -> Self {
        Self { bits, shift }
    }

    /// The channel's bits in packed position.
    #[inline]
    pub const fn mask(self) -> u32 {
        ((1u32 << self.bits) - 1) << self.shift
    }

    /// Truncate an 8-bit channel and move it into place.
    #[inline(always)]
    fn place(self, channel: u8) -> u32 {
        ((channel >> (8 - self.bits)) as u32) << self.shift
    }

    /// The raw `bits`-wide channel value.
    #[inline(always)]
    fn extract(self, packed: u32) -> u32 {
        (packed >> self.shift) & ((1u32 << self.bits) - 1)
    }

    /// Raw channel moved into the high bits of a byte; the low bits stay zero.
    #[inline(always)]
    fn widen(self, packed: u32) -> u8 {
        (self.extract(packed) << (8 - self.bits)) as u8
    }

    /// Raw channel moved into the high bits of a byte with its most
    /// significant bits repeated into the vacated low bits.
    #[inline(always)]
    fn widen_replicated(self, packed: u32) -> u8 {
        let raw = self.extract(packed);
        let mut out = raw << (8 - self.bits);
        let mut filled = self.bits as u32;
        while filled < 8 {
            out |= out >> filled;
            filled *= 2;
        }
        out as u8
    }
}

/// Constant description of a pixel layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub bytes_per_pixel: usize,
    pub red: ChannelMask,
    pub green: ChannelMask,
    pub blue: ChannelMask,
}

const RGB565: FormatDescriptor = FormatDescriptor {
    bytes_per_pixel: 2,
    red: ChannelMask::new(5, 11),
    green: ChannelMask::new(6, 5),
    blue: ChannelMask::new(5, 0),
};

const XRGB1555: FormatDescriptor = FormatDescriptor {
    bytes_per_pixel: 2,
    red: ChannelMask::new(5, 10),
    green: ChannelMask::new(5, 5),
    blue: ChannelMask::new(5, 0),
};

const BGR24: FormatDescriptor = FormatDescriptor {
    bytes_per_pixel: 3,
    red: ChannelMask::new(8, 16),
    green: ChannelMask::new(8, 8),
    blue: ChannelMask::new(8, 0),
};

const XRGB8888: FormatDescriptor = FormatDescriptor {
    bytes_per_pixel: 4,
    red: ChannelMask::new(8, 16),
    green: ChannelMask::new(8, 8),
    blue: ChannelMask::new(8, 0),
};

/// The closed set of supported pixel layouts.
///
/// Discriminants are stable identifiers: byte 0 is bits per pixel, byte 1 the
/// storage type, byte 2 the channel layout and byte 3 the channel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum PixelFormat {
    /// 16-bit, 5-6-5.
    Rgb565 = 0x0102_0210,
    /// 16-bit, 1-5-5-5 with the top bit unused.
    Xrgb1555 = 0x0100_0210,
    /// 24-bit, 8-8-8 stored as B, G, R bytes.
    Bgr24 = 0x0200_0318,
    /// 32-bit, 8-8-8 with a zero padding byte.
    Xrgb8888 = 0x0101_0220,
}

impl Default for PixelFormat {
    fn default() -> Self {
        PixelFormat::Xrgb8888
    }
}

impl PixelFormat {
    /// Every supported format.
    pub const ALL: [PixelFormat; 4] = [
        PixelFormat::Rgb565,
        PixelFormat::Xrgb1555,
        PixelFormat::Bgr24,
        PixelFormat::Xrgb8888,
    ];

    /// Look up a format by its identifier.
    pub fn from_id(id: u32) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.id() == id)
            .ok_or(RasterError::InvalidFormat(id))
    }

    /// The stable identifier of this format.
    #[inline]
    pub const fn id(self) -> u32 {
        self as u32
    }

    /// Resolve a format from the channel masks a display server or bitmap
    /// header reports. Zero masks mean "none given" and select the default
    /// layout for that depth.
    pub fn from_masks(
        bits_per_pixel: u8,
        red_mask: u32,
        green_mask: u32,
        blue_mask: u32,
    ) -> Result<Self> {
        let have_masks = (red_mask | green_mask | blue_mask) != 0;
        let matches = |f: PixelFormat| {
            let d = f.descriptor();
            d.red.mask() == red_mask && d.green.mask() == green_mask && d.blue.mask() == blue_mask
        };
        let unknown = RasterError::InvalidFormat(
            ((bits_per_pixel as u32) << 24) | (red_mask ^ green_mask ^ blue_mask),
        );
        match bits_per_pixel {
            16 if matches(PixelFormat::Rgb565) => Ok(PixelFormat::Rgb565),
            16 if !have_masks || matches(PixelFormat::Xrgb1555) => Ok(PixelFormat::Xrgb1555),
            24 if !have_masks || matches(PixelFormat::Bgr24) => Ok(PixelFormat::Bgr24),
            32 if !have_masks || matches(PixelFormat::Xrgb8888) => Ok(PixelFormat::Xrgb8888),
            _ => Err(unknown),
        }
    }

    /// The layout table entry for this format.
    #[inline]
    pub const fn descriptor(self) -> &'static FormatDescriptor {
        match self {
            PixelFormat::Rgb565 => &RGB565,
            PixelFormat::Xrgb1555 => &XRGB1555,
            PixelFormat::Bgr24 => &BGR24,
            PixelFormat::Xrgb8888 => &XRGB8888,
        }
    }

    /// Bytes one pixel occupies in a buffer (2, 3 or 4).
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        self.descriptor().bytes_per_pixel
    }

    /// Bits per pixel of the storage unit.
    #[inline]
    pub const fn bits_per_pixel(self) -> u32 {
        (self.bytes_per_pixel() * 8) as u32
    }

    /// Row pitch for `width` pixels rounded up to a multiple of four bytes,
    /// the alignment DIB-style surfaces expect.
    #[inline]
    pub const fn aligned_stride(self, width: usize) -> usize {
        (width * self.bytes_per_pixel() + 3) & !3
    }

    /// Pack an 8-bit triple into this format. See [`pack`].
    #[inline]
    pub fn pack(self, color: Rgb) -> u32 {
        pack(self, color.r, color.g, color.b)
    }

    /// Unpack a value of this format. See [`unpack`].
    #[inline]
    pub fn unpack(self, packed: u32) -> Rgb {
        let (r, g, b) = unpack(self, packed);
        Rgb::new(r, g, b)
    }
}

impl TryFrom<u32> for PixelFormat {
    type Error = RasterError;

    fn try_from(id: u32) -> Result<Self> {
        PixelFormat::from_id(id)
    }
}

/// Pack an 8-bit RGB triple into `format`.
///
/// Each channel is truncated to its bit width with `channel >> (8 - bits)`
/// and shifted to its offset; padding bits are zero.
#[inline]
pub fn pack(format: PixelFormat, r: u8, g: u8, b: u8) -> u32 {
    let d = format.descriptor();
    d.red.place(r) | d.green.place(g) | d.blue.place(b)
}

/// Unpack a packed value into an 8-bit RGB triple.
///
/// Channels are moved back into the high bits, so
/// `unpack(Rgb565, 0xF800) == (248, 0, 0)`. Bits outside the channel masks
/// are ignored. The per-channel error of `unpack(pack(c))` is below
/// `2^(8 - bits)`.
#[inline]
pub fn unpack(format: PixelFormat, packed: u32) -> (u8, u8, u8) {
    let d = format.descriptor();
    (d.red.widen(packed), d.green.widen(packed), d.blue.widen(packed))
}

/// Unpack with most-significant-bit replication, so full-scale channels map
/// to 255 in every format (`unpack_expanded(Rgb565, 0xF800) == (255, 0, 0)`).
#[inline]
pub fn unpack_expanded(format: PixelFormat, packed: u32) -> (u8, u8, u8) {
    let d = format.descriptor();
    (
        d.red.widen_replicated(packed),
        d.green.widen_replicated(packed),
        d.blue.widen_replicated(packed),
    )
}

/// Bytes per pixel of `format`.
#[inline]
pub fn bytes_per_pixel(format: PixelFormat) -> usize {
    format.bytes_per_pixel()
}

/// Load one packed pixel from its little-endian byte representation.
///
/// `bytes` must hold at least `bytes_per_pixel(format)` bytes.
#[inline(always)]
pub fn read_packed(format: PixelFormat, bytes: &[u8]) -> u32 {
    match format.bytes_per_pixel() {
        2 => u16::from_le_bytes([bytes[0], bytes[1]]) as u32,
        3 => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0]),
        _ => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
    }
}

/// Store one packed pixel as little-endian bytes. Bits above the format's
/// storage width are dropped.
#[inline(always)]
pub fn write_packed(format: PixelFormat, bytes: &mut [u8], value: u32) {
    let le = value.to_le_bytes();
    let n = format.bytes_per_pixel();
    bytes[..n].copy_from_slice(&le[..n]);
}
