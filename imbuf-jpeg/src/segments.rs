#![forbid(
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap
)]

use std::io::Cursor;

use imbuf_common::math::ToU64;
use imbuf_common::read::ReadExt;

use crate::Error;

/// Position in a block for each index in zig-zag order
pub const UNZIGZAG: [usize; 64] = [
    0, 1, 8, 16, 9, 2, 3, 10, 17, 24, 32, 25, 18, 11, 4, 5, 12, 19, 26, 33, 40, 48, 41, 34, 27,
    20, 13, 6, 7, 14, 21, 28, 35, 42, 49, 56, 57, 50, 43, 36, 29, 22, 15, 23, 30, 37, 44, 51, 58,
    59, 52, 45, 38, 31, 39, 46, 53, 60, 61, 54, 47, 55, 62, 63,
];

fn eof<E>(_: E) -> Error {
    Error::UnexpectedEof
}

/// Quantization table
#[derive(Debug, Clone)]
pub struct Dqt {
    /// Quantization table destination identifier
    pub tq: u8,
    /// Quantization table elements in zig-zag order
    ///
    /// Tables with 8 bit precision are stored unscaled.
    pub qk: [u16; 64],
}

impl Dqt {
    /// Tables of a DQT segment, a segment can define several tables
    pub fn from_data(data: &[u8]) -> Result<Vec<Self>, Error> {
        let mut cur = Cursor::new(data);
        let mut dqts = Vec::new();

        while cur.position() < data.len().u64()? {
            let pq_tq = cur.read_byte().map_err(eof)?;
            let pq = pq_tq >> 4;
            let tq = pq_tq & 0b1111;

            tracing::debug!("Loading DQT entry with Pq={pq}, Tq={tq}");

            let mut qk = [0; 64];
            for q in qk.iter_mut() {
                *q = match pq {
                    0 => u16::from(cur.read_byte().map_err(eof)?),
                    1 => cur.read_be_u16().map_err(eof)?,
                    unknown_pq => return Err(Error::UnknownPq(unknown_pq)),
                };
            }

            dqts.push(Self { tq, qk });
        }

        Ok(dqts)
    }

    /// Quantization table in natural row by row order
    pub fn qk_ordered(&self) -> [u16; 64] {
        let mut qk_ordered = [0; 64];
        for (k, q) in self.qk.iter().enumerate() {
            qk_ordered[UNZIGZAG[k]] = *q;
        }
        qk_ordered
    }
}

/// Huffman table specification as stored in a DHT segment
#[derive(Debug, Clone)]
pub struct Dht {
    /// Table class, 0 for DC and 1 for AC tables
    pub tc: u8,
    /// Huffman table destination identifier
    pub th: u8,
    /// Number of codes of each length from 1 to 16
    pub bits: [u8; 16],
    /// Values in order of increasing code length
    pub huffval: Vec<u8>,
}

impl Dht {
    pub fn from_data(data: &[u8]) -> Result<Vec<Self>, Error> {
        let mut cur = Cursor::new(data);
        let mut dhts = Vec::new();

        while cur.position() < data.len().u64()? {
            let tc_th = cur.read_byte().map_err(eof)?;
            let bits = cur.read_array::<16>().map_err(eof)?;
            let count = bits.iter().map(|x| usize::from(*x)).sum::<usize>();

            let mut huffval = vec![0; count];
            std::io::Read::read_exact(&mut cur, &mut huffval).map_err(eof)?;

            dhts.push(Self {
                tc: tc_th >> 4,
                th: tc_th & 0b1111,
                bits,
                huffval,
            });
        }

        Ok(dhts)
    }
}

/// Frame Header / Start of Frame
#[derive(Debug, Clone)]
pub struct Sof {
    /// Sample precision
    pub p: u8,
    /// Number of lines
    pub y: u16,
    /// Number of samples per line
    pub x: u16,
    /// Component specification parameters
    pub parameters: Vec<ComponentSpecificationParameters>,
}

impl Sof {
    pub fn from_data(data: &[u8]) -> Result<Self, Error> {
        let mut cur = Cursor::new(data);
        let p = cur.read_byte().map_err(eof)?;
        let y = cur.read_be_u16().map_err(eof)?;
        let x = cur.read_be_u16().map_err(eof)?;
        let nf = cur.read_byte().map_err(eof)?;

        let parameters = (0..nf)
            .map(|_| {
                let [c, h_v, tq] = cur.read_array::<3>().map_err(eof)?;
                Ok::<_, Error>(ComponentSpecificationParameters {
                    c,
                    h: h_v >> 4,
                    v: h_v & 0b1111,
                    tq,
                })
            })
            .collect::<Result<_, Error>>()?;

        Ok(Self {
            p,
            y,
            x,
            parameters,
        })
    }

    /// Largest horizontal and vertical sampling factor
    pub fn max_sampling(&self) -> (u8, u8) {
        let h = self.parameters.iter().map(|x| x.h).max().unwrap_or(1);
        let v = self.parameters.iter().map(|x| x.v).max().unwrap_or(1);
        (h, v)
    }
}

/// Component specification parameters
#[derive(Debug, Clone, Copy)]
pub struct ComponentSpecificationParameters {
    /// Component identifier
    pub c: u8,
    /// Horizontal sampling factor
    pub h: u8,
    /// Vertical sampling factor
    pub v: u8,
    /// Quantization table destination selector
    pub tq: u8,
}

/// Scan Header / Start of Scan
#[derive(Debug, Clone)]
pub struct Sos {
    /// List of components (channels)
    pub components_specifications: Vec<ComponentSpecification>,
    /// Start of spectral or predictor selection
    pub ss: u8,
    /// End of spectral selection
    pub se: u8,
    /// Successive approximation bit position high
    pub ah: u8,
    /// Successive approximation bit position low or point transform
    pub al: u8,
}

impl Sos {
    pub fn from_data(data: &[u8]) -> Result<Self, Error> {
        let mut cur = Cursor::new(data);
        let ns = cur.read_byte().map_err(eof)?;

        let components_specifications = (0..ns)
            .map(|_| {
                let [cs, td_ta] = cur.read_array::<2>().map_err(eof)?;
                Ok::<_, Error>(ComponentSpecification {
                    cs,
                    td: td_ta >> 4,
                    ta: td_ta & 0b1111,
                })
            })
            .collect::<Result<_, Error>>()?;

        let ss = cur.read_byte().map_err(eof)?;
        let se = cur.read_byte().map_err(eof)?;
        let ah_al = cur.read_byte().map_err(eof)?;

        Ok(Self {
            components_specifications,
            ss,
            se,
            ah: ah_al >> 4,
            al: ah_al & 0b1111,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ComponentSpecification {
    /// Scan component selector
    ///
    /// References a [`c` value](ComponentSpecificationParameters::c) of the
    /// frame.
    pub cs: u8,
    /// DC entropy coding table
    pub td: u8,
    /// AC entropy coding table
    pub ta: u8,
}

/// Restart interval in MCUs, 0 disables restart markers
pub fn dri_from_data(data: &[u8]) -> Result<u16, Error> {
    Cursor::new(data).read_be_u16().map_err(eof)
}
