//! CRC-32 (ISO 3309) accumulator.
//!
//! GZIP uses CRC-32 twice: over the uncompressed payload of each member (the
//! footer checksum) and, optionally, over the header bytes themselves (the low
//! 16 bits form the FHCRC field).
//!
//! The table/SIMD work is delegated to [`crc32fast`], which picks the fastest
//! implementation available on the host at runtime.

/// CRC-32 calculator (ISO 3309).
///
/// This is the standard CRC-32 used by ZIP, GZIP, PNG, and many other formats.
///
/// - Polynomial: 0x04C11DB7 (reflected: 0xEDB88320)
/// - Initial value: 0xFFFFFFFF
/// - Final XOR: 0xFFFFFFFF
/// - Reflected input: Yes
/// - Reflected output: Yes
///
/// # Example
///
/// ```
/// use oxigz_core::crc::Crc32;
///
/// let mut crc = Crc32::new();
/// crc.update(b"Hello, ");
/// crc.update_byte(b'W');
/// crc.update(b"orld!");
/// assert_eq!(crc.value(), 0xEC4AC3D0);
/// ```
#[derive(Clone, Default)]
pub struct Crc32 {
    hasher: crc32fast::Hasher,
}

impl Crc32 {
    /// Create a new CRC-32 calculator.
    pub fn new() -> Self {
        Self {
            hasher: crc32fast::Hasher::new(),
        }
    }

    /// Reset the CRC to its initial state.
    pub fn reset(&mut self) {
        self.hasher.reset();
    }

    /// Update the CRC with more data.
    #[inline]
    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    /// Update the CRC with a single byte.
    #[inline]
    pub fn update_byte(&mut self, byte: u8) {
        self.hasher.update(&[byte]);
    }

    /// Get the current CRC value without consuming the accumulator.
    #[inline]
    pub fn value(&self) -> u32 {
        self.hasher.clone().finalize()
    }

    /// Finalize and return the CRC value.
    #[inline]
    pub fn finalize(self) -> u32 {
        self.hasher.finalize()
    }

    /// Compute CRC-32 for a slice in one call.
    #[inline]
    pub fn compute(data: &[u8]) -> u32 {
        crc32fast::hash(data)
    }
}

impl std::fmt::Debug for Crc32 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crc32")
            .field("value", &format_args!("{:#010x}", self.value()))
            .finish()
    }
}
