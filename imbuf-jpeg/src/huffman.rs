//! Huffman decoding of entropy coded data

#![forbid(
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap
)]

use crate::{Dht, Error, UNZIGZAG};

/// Largest DC difference category for 8 bit samples
const MAX_DC_CATEGORY: u8 = 11;

/// Decoding tables derived from a [`Dht`]
///
/// Entries are indexed by code length minus one.
#[derive(Debug, Clone)]
pub struct HuffmanTable {
    /// Largest code of each length, -1 if there is no code of that length
    maxcode: [i32; 16],
    /// Smallest code of each length
    mincode: [i32; 16],
    /// Index into `huffval` of the first value with a code of each length
    valptr: [i32; 16],
    huffval: Vec<u8>,
}

impl HuffmanTable {
    pub fn new(dht: &Dht) -> Result<Self, Error> {
        let mut maxcode = [-1; 16];
        let mut mincode = [0; 16];
        let mut valptr = [0; 16];

        let mut code = 0_i32;
        let mut k = 0_i32;
        // Number of codes available at the current length
        let mut capacity = 2_i32;
        for (i, count) in dht.bits.iter().enumerate() {
            let count = i32::from(*count);
            if count > 0 {
                valptr[i] = k;
                mincode[i] = code;
                code = code.checked_add(count).ok_or(Error::InvalidHuffmanTable)?;
                k = k.checked_add(count).ok_or(Error::InvalidHuffmanTable)?;
                maxcode[i] = code.checked_sub(1).ok_or(Error::InvalidHuffmanTable)?;
            }

            if code > capacity {
                return Err(Error::InvalidHuffmanTable);
            }
            code = code.checked_mul(2).ok_or(Error::InvalidHuffmanTable)?;
            capacity = capacity.checked_mul(2).ok_or(Error::InvalidHuffmanTable)?;
        }

        if usize::try_from(k).ok() != Some(dht.huffval.len()) {
            return Err(Error::InvalidHuffmanTable);
        }

        Ok(Self {
            maxcode,
            mincode,
            valptr,
            huffval: dht.huffval.clone(),
        })
    }

    pub(crate) fn decode(&self, reader: &mut BitReader) -> Result<u8, Error> {
        let mut code = i32::from(reader.read_bit());
        for ((maxcode, mincode), valptr) in self.maxcode.iter().zip(&self.mincode).zip(&self.valptr)
        {
            if code <= *maxcode {
                return code
                    .checked_sub(*mincode)
                    .and_then(|offset| valptr.checked_add(offset))
                    .and_then(|index| usize::try_from(index).ok())
                    .and_then(|i| self.huffval.get(i))
                    .copied()
                    .ok_or(Error::InvalidHuffmanCode);
            }
            // At most 17 bits
            code = (code << 1) | i32::from(reader.read_bit());
        }

        Err(Error::InvalidHuffmanCode)
    }
}

/// Decodes one block into dequantized coefficients in natural order
///
/// `q` is the quantization table in zig-zag order. The DC prediction is
/// updated with the decoded difference.
pub(crate) fn decode_block(
    reader: &mut BitReader,
    dc: &HuffmanTable,
    ac: &HuffmanTable,
    q: &[u16; 64],
    dc_pred: &mut i32,
    out: &mut [i32; 64],
) -> Result<(), Error> {
    let t = dc.decode(reader)?;
    if t > MAX_DC_CATEGORY {
        return Err(Error::InvalidHuffmanCode);
    }
    *dc_pred = dc_pred
        .checked_add(reader.receive_extend(t)?)
        .ok_or(Error::CoefficientOverflow)?;
    out[0] = dc_pred
        .checked_mul(i32::from(q[0]))
        .ok_or(Error::CoefficientOverflow)?;

    let mut k = 1_usize;
    while k < 64 {
        let rs = ac.decode(reader)?;
        let r = usize::from(rs >> 4);
        let s = rs & 0b1111;

        if s == 0 {
            if r == 15 {
                // Run of 16 zeros
                k = k.saturating_add(16);
                continue;
            }
            // End of block
            break;
        }

        k = k.saturating_add(r);
        let (Some(position), Some(quant)) = (UNZIGZAG.get(k), q.get(k)) else {
            return Err(Error::CoefficientOutOfRange);
        };
        out[*position] = reader
            .receive_extend(s)?
            .checked_mul(i32::from(*quant))
            .ok_or(Error::CoefficientOverflow)?;
        k = k.saturating_add(1);
    }

    Ok(())
}

/// Reads bits from entropy coded data
///
/// Stuffed zero bytes are skipped. Markers and the end of the data are
/// treated as an infinite sequence of zero bits until [`BitReader::restart`]
/// is called.
#[derive(Debug)]
pub(crate) struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    /// Buffered bits, aligned to the most significant bit
    acc: u32,
    bits: u8,
    at_marker: bool,
    padded: bool,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            acc: 0,
            bits: 0,
            at_marker: false,
            padded: false,
        }
    }

    /// Fills the buffer to more than 24 bits
    fn fill(&mut self) {
        while self.bits <= 24 {
            let mut byte = 0;
            if !self.at_marker {
                match self.data.get(self.pos..).unwrap_or_default() {
                    [0xFF, 0x00, ..] => {
                        byte = 0xFF;
                        self.pos = self.pos.saturating_add(2);
                    }
                    [0xFF, ..] | [] => self.at_marker = true,
                    [b, ..] => {
                        byte = *b;
                        self.pos = self.pos.saturating_add(1);
                    }
                }
            }

            if self.at_marker && !self.padded {
                tracing::trace!("Entropy coded data padded with zeros");
                self.padded = true;
            }

            self.acc |= u32::from(byte) << 24_u8.saturating_sub(self.bits);
            self.bits = self.bits.saturating_add(8);
        }
    }

    pub fn read_bit(&mut self) -> u8 {
        if self.bits == 0 {
            self.fill();
        }
        let bit = u8::from(self.acc & (1 << 31) != 0);
        self.acc <<= 1;
        self.bits = self.bits.saturating_sub(1);
        bit
    }

    /// Reads `n` bits, `n` must not exceed 16
    pub fn read_bits(&mut self, n: u8) -> Result<u16, Error> {
        if n == 0 {
            return Ok(0);
        }
        if n > 16 {
            return Err(Error::InvalidHuffmanCode);
        }
        if self.bits < n {
            self.fill();
        }

        let [high, low, ..] = self.acc.to_be_bytes();
        let v = u16::from_be_bytes([high, low]) >> 16_u8.saturating_sub(n);
        self.acc <<= n;
        self.bits = self.bits.saturating_sub(n);
        Ok(v)
    }

    /// Reads `s` additional bits and extends them to a signed value
    pub fn receive_extend(&mut self, s: u8) -> Result<i32, Error> {
        if s == 0 {
            return Ok(0);
        }
        let v = i32::from(self.read_bits(s)?);
        // `s` is at most 16
        let half = 1_i32 << s.saturating_sub(1);
        if v < half {
            Ok(v.saturating_add(1).saturating_sub(half).saturating_sub(half))
        } else {
            Ok(v)
        }
    }

    /// Discards buffered bits and skips the next restart marker
    pub fn restart(&mut self) {
        self.acc = 0;
        self.bits = 0;
        self.at_marker = false;
        self.padded = false;

        let next_marker = self.data.get(self.pos..).and_then(|x| {
            x.windows(2)
                .position(|w| w[0] == 0xFF && (0xD0..=0xD7).contains(&w[1]))
        });

        if let Some(pos) = next_marker {
            self.pos = self.pos.saturating_add(pos).saturating_add(2);
        } else {
            tracing::debug!("Restart marker missing in entropy coded data");
            self.pos = self.data.len();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> HuffmanTable {
        // Codes: 0 -> 0b0, 1 -> 0b10, 2 -> 0b110, 3 -> 0b111
        let mut bits = [0; 16];
        bits[0] = 1;
        bits[1] = 1;
        bits[2] = 2;
        HuffmanTable::new(&Dht {
            tc: 0,
            th: 0,
            bits,
            huffval: vec![0, 1, 2, 3],
        })
        .unwrap()
    }

    #[test]
    fn decode_codes() {
        let table = table();
        // 0 10 110 111 + padding
        let mut reader = BitReader::new(&[0b0101_1011, 0b1000_0000]);
        assert_eq!(table.decode(&mut reader).unwrap(), 0);
        assert_eq!(table.decode(&mut reader).unwrap(), 1);
        assert_eq!(table.decode(&mut reader).unwrap(), 2);
        assert_eq!(table.decode(&mut reader).unwrap(), 3);
    }

    #[test]
    fn stuffed_bytes_and_restart() {
        let mut reader = BitReader::new(&[0xFF, 0x00, 0xAB, 0xFF, 0xD0, 0xCD]);
        assert_eq!(reader.read_bits(8).unwrap(), 0xFF);
        assert_eq!(reader.read_bits(8).unwrap(), 0xAB);
        // Marker reads as zeros
        assert_eq!(reader.read_bits(8).unwrap(), 0x00);
        reader.restart();
        assert_eq!(reader.read_bits(8).unwrap(), 0xCD);
    }

    #[test]
    fn extend() {
        // Three bits: 0b010 is -5, 0b101 is 5
        let mut reader = BitReader::new(&[0b0101_0100]);
        assert_eq!(reader.receive_extend(3).unwrap(), -5);
        assert_eq!(reader.receive_extend(3).unwrap(), 5);
    }

    #[test]
    fn long_reads_are_rejected() {
        let mut reader = BitReader::new(&[0xAA; 8]);
        assert_eq!(reader.read_bits(16).unwrap(), 0xAAAA);
        assert!(matches!(reader.read_bits(17), Err(Error::InvalidHuffmanCode)));
        assert!(matches!(
            reader.receive_extend(40),
            Err(Error::InvalidHuffmanCode)
        ));
    }

    #[test]
    fn oversubscribed_table() {
        let mut bits = [0; 16];
        bits[0] = 3;
        let dht = Dht {
            tc: 0,
            th: 0,
            bits,
            huffval: vec![0, 1, 2],
        };
        assert!(matches!(
            HuffmanTable::new(&dht),
            Err(Error::InvalidHuffmanTable)
        ));
    }
}
