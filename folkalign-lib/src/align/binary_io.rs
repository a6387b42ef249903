//! Little-endian primitive readers and writers for the cost-map binary layout.

use std::io::{self, Read, Write};

use anyhow::{ensure, Result};

pub(crate) trait BinaryWrite: Write {
    fn write_u32(&mut self, value: u32) -> Result<()> {
        self.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    fn write_f32(&mut self, value: f32) -> Result<()> {
        self.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    /// Writes a single symbol as a length-prefixed key of one byte.
    fn write_symbol(&mut self, symbol: u8) -> Result<()> {
        self.write_u32(1)?;
        self.write_all(&[symbol])?;
        Ok(())
    }
}

pub(crate) trait BinaryRead: Read {
    fn read_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    fn read_f32(&mut self) -> Result<f32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(f32::from_le_bytes(buf))
    }

    /// Reads a length-prefixed key and returns its first byte.  Keys are expected to be a single
    /// byte long; any trailing bytes are consumed and ignored.
    fn read_symbol(&mut self) -> Result<u8> {
        let len = u64::from(self.read_u32()?);
        ensure!(len > 0, "Found an empty symbol key");
        let mut first = [0u8; 1];
        self.read_exact(&mut first)?;
        let skipped = io::copy(&mut (&mut *self).take(len - 1), &mut io::sink())?;
        ensure!(
            skipped == len - 1,
            "Symbol key truncated: expected {} bytes, found {}",
            len,
            skipped + 1
        );
        Ok(first[0])
    }
}

impl<W: Write + ?Sized> BinaryWrite for W {}
impl<R: Read + ?Sized> BinaryRead for R {}
