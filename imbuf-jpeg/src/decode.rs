use imbuf_common::image::{ImageBuffer, Thumbnail};
use imbuf_common::math::*;

use crate::context::{self, Tables};
use crate::huffman::{self, BitReader, HuffmanTable};
use crate::*;

/// Decodes a baseline or extended sequential JPEG
///
/// Grayscale images are returned with one channel, all other images as RGB.
pub fn decode(data: &[u8]) -> Result<ImageBuffer, Error> {
    let jpeg = Jpeg::new(data)?;
    let mut frame = Frame::new(&jpeg)?;
    frame.decode_scans(&jpeg)?;
    frame.to_image(&context::tables(), Resolution::Full)
}

/// Decodes a reduced size version of the image
///
/// If an eighth of the image still covers `max_size`, only the DC
/// coefficients are used which skips the inverse DCT. Otherwise the image is
/// decoded completely. The result is scaled down to fit `max_size` in both
/// cases.
pub fn thumbnail(data: &[u8], max_size: u32) -> Result<Thumbnail, Error> {
    let jpeg = Jpeg::new(data)?;
    let mut frame = Frame::new(&jpeg)?;
    frame.decode_scans(&jpeg)?;

    let full_width = u32::from(frame.width);
    let full_height = u32::from(frame.height);
    let longest_dc_side = full_width.max(full_height).div_ceil(8);

    let image = if longest_dc_side >= max_size {
        tracing::debug!("Using DC coefficients for {max_size}px thumbnail");
        frame.to_image(&context::tables(), Resolution::Dc)?
    } else {
        frame.to_image(&context::tables(), Resolution::Full)?
    };

    let image = image.scaled_to_fit(max_size).into_owned();

    Ok(Thumbnail {
        image,
        full_width,
        full_height,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Full,
    /// One pixel per block
    Dc,
}

#[derive(Debug)]
struct Component {
    id: u8,
    h: u8,
    v: u8,
    tq: u8,
    /// Blocks per line including MCU padding
    blocks_per_line: usize,
    /// Block rows including MCU padding
    block_rows: usize,
    /// Dequantized coefficients of each block in natural order
    coefficients: Vec<[i32; 64]>,
    dc_pred: i32,
}

#[derive(Debug)]
struct Frame {
    width: u16,
    height: u16,
    hmax: u8,
    vmax: u8,
    mcux: usize,
    mcuy: usize,
    rgb: bool,
    components: Vec<Component>,
}

/// Every block takes at least two bits, one for the DC difference and one
/// for the end of block
const MAX_BLOCKS_PER_BYTE: usize = 4;

impl Frame {
    #[forbid(
        clippy::arithmetic_side_effects,
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap
    )]
    fn new(jpeg: &Jpeg) -> Result<Self, Error> {
        let (marker, sof) = jpeg.sof()?;

        if !matches!(marker, Marker::SOF0 | Marker::SOF1) {
            return Err(Error::UnsupportedProcess(marker));
        }

        if sof.p != 8 {
            return Err(Error::UnsupportedPrecision(sof.p));
        }

        if sof.x == 0 || sof.y == 0 {
            return Err(Error::InvalidDimensions {
                width: sof.x,
                height: sof.y,
            });
        }

        if !matches!(sof.parameters.len(), 1 | 3) {
            return Err(Error::UnsupportedComponentCount(sof.parameters.len()));
        }

        for p in &sof.parameters {
            if !(1..=4).contains(&p.h) || !(1..=4).contains(&p.v) {
                return Err(Error::InvalidSamplingFactor { h: p.h, v: p.v });
            }
        }

        let (hmax, vmax) = sof.max_sampling();
        let mcux = usize::from(sof.x).div_ceil(usize::from(hmax).safe_mul(8)?);
        let mcuy = usize::from(sof.y).div_ceil(usize::from(vmax).safe_mul(8)?);

        // Checked before allocating coefficients since the dimensions alone
        // can demand gigabytes
        let mut blocks = 0_usize;
        for p in &sof.parameters {
            let per_mcu = usize::from(p.h).safe_mul(usize::from(p.v))?;
            blocks = blocks.safe_add(mcux.safe_mul(mcuy)?.safe_mul(per_mcu)?)?;
        }
        let len = jpeg
            .segments_marker(Marker::SOS)
            .map(|x| x.entropy_coded_data().len())
            .fold(0_usize, usize::saturating_add);
        if blocks > len.saturating_add(1).saturating_mul(MAX_BLOCKS_PER_BYTE) {
            return Err(Error::InsufficientData { blocks, len });
        }

        let components = sof
            .parameters
            .iter()
            .map(|p| {
                let blocks_per_line = mcux.safe_mul(usize::from(p.h))?;
                let block_rows = mcuy.safe_mul(usize::from(p.v))?;
                let blocks = blocks_per_line.safe_mul(block_rows)?;

                Ok::<_, Error>(Component {
                    id: p.c,
                    h: p.h,
                    v: p.v,
                    tq: p.tq,
                    blocks_per_line,
                    block_rows,
                    coefficients: vec![[0; 64]; blocks],
                    dc_pred: 0,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let rgb = components.len() == 3 && jpeg.is_rgb(&sof);

        tracing::debug!(
            "JPEG frame {}x{} with {} components, sampling {hmax}x{vmax}",
            sof.x,
            sof.y,
            components.len()
        );

        Ok(Self {
            width: sof.x,
            height: sof.y,
            hmax,
            vmax,
            mcux,
            mcuy,
            rgb,
            components,
        })
    }

    /// Processes table definitions and scans in file order
    fn decode_scans(&mut self, jpeg: &Jpeg) -> Result<(), Error> {
        let mut qtables: [Option<[u16; 64]>; 4] = [None; 4];
        let mut dc_tables: [Option<HuffmanTable>; 4] = Default::default();
        let mut ac_tables: [Option<HuffmanTable>; 4] = Default::default();
        let mut restart_interval = 0;
        let mut scans = 0;

        for segment in jpeg.segments() {
            match segment.marker() {
                Marker::DQT => {
                    for dqt in Dqt::from_data(segment.data())? {
                        let slot = qtables
                            .get_mut(usize::from(dqt.tq))
                            .ok_or(Error::MissingQuantizationTable(dqt.tq))?;
                        *slot = Some(dqt.qk);
                    }
                }
                Marker::DHT => {
                    for dht in Dht::from_data(segment.data())? {
                        let tables = if dht.tc == 0 {
                            &mut dc_tables
                        } else {
                            &mut ac_tables
                        };
                        let slot = tables.get_mut(usize::from(dht.th)).ok_or(
                            Error::MissingHuffmanTable {
                                class: dht.tc,
                                id: dht.th,
                            },
                        )?;
                        *slot = Some(HuffmanTable::new(&dht)?);
                    }
                }
                Marker::DRI => restart_interval = dri_from_data(segment.data())?,
                Marker::SOS => {
                    let sos = Sos::from_data(segment.data())?;
                    let scan = Scan::new(self, &sos, &qtables, &dc_tables, &ac_tables)?;
                    self.decode_scan(
                        &scan,
                        segment.entropy_coded_data(),
                        restart_interval,
                    )?;
                    scans += 1;
                }
                _ => {}
            }
        }

        if scans == 0 {
            return Err(Error::NoSos);
        }

        Ok(())
    }

    fn decode_scan(
        &mut self,
        scan: &Scan,
        data: &[u8],
        restart_interval: u16,
    ) -> Result<(), Error> {
        let mut reader = BitReader::new(data);
        let restart_interval = usize::from(restart_interval);

        for component in scan.components.iter() {
            self.components[component.index].dc_pred = 0;
        }

        // A scan with a single component has one block per MCU
        let single = match scan.components.as_slice() {
            [single] => Some(single),
            _ => None,
        };

        let (mcus_per_line, mcu_rows) = if let Some(single) = single {
            let c = &self.components[single.index];
            let width = (usize::from(self.width) * usize::from(c.h)).div_ceil(usize::from(self.hmax));
            let height =
                (usize::from(self.height) * usize::from(c.v)).div_ceil(usize::from(self.vmax));
            (width.div_ceil(8), height.div_ceil(8))
        } else {
            (self.mcux, self.mcuy)
        };

        for mcu in 0..mcus_per_line.safe_mul(mcu_rows)? {
            if restart_interval > 0 && mcu > 0 && mcu % restart_interval == 0 {
                reader.restart();
                for component in scan.components.iter() {
                    self.components[component.index].dc_pred = 0;
                }
            }

            let mx = mcu % mcus_per_line;
            let my = mcu / mcus_per_line;

            if let Some(single) = single {
                let c = &mut self.components[single.index];
                let block = my * c.blocks_per_line + mx;
                single.decode_block(&mut reader, &mut c.dc_pred, &mut c.coefficients[block])?;
                continue;
            }

            for sc in scan.components.iter() {
                let c = &mut self.components[sc.index];
                for v in 0..usize::from(c.v) {
                    for h in 0..usize::from(c.h) {
                        let row = my * usize::from(c.v) + v;
                        let col = mx * usize::from(c.h) + h;
                        let block = row * c.blocks_per_line + col;
                        sc.decode_block(&mut reader, &mut c.dc_pred, &mut c.coefficients[block])?;
                    }
                }
            }
        }

        Ok(())
    }

    fn to_image(&self, tables: &Tables, resolution: Resolution) -> Result<ImageBuffer, Error> {
        let planes = self
            .components
            .iter()
            .map(|c| Plane::new(c, tables, resolution))
            .collect::<Vec<_>>();

        let (width, height) = match resolution {
            Resolution::Full => (usize::from(self.width), usize::from(self.height)),
            Resolution::Dc => (
                usize::from(self.width).div_ceil(8),
                usize::from(self.height).div_ceil(8),
            ),
        };

        let channels = if planes.len() == 1 { 1 } else { 3 };
        let mut out = Vec::with_capacity(width.safe_mul(height)?.safe_mul(channels)?);

        let hmax = usize::from(self.hmax);
        let vmax = usize::from(self.vmax);

        for y in 0..height {
            for x in 0..width {
                let mut samples = [0; 3];
                for ((plane, c), sample) in planes.iter().zip(&self.components).zip(&mut samples) {
                    let px = x * usize::from(c.h) / hmax;
                    let py = y * usize::from(c.v) / vmax;
                    *sample = plane.data[py * plane.width + px];
                }

                match planes.len() {
                    1 => out.push(samples[0]),
                    _ if self.rgb => out.extend_from_slice(&samples),
                    _ => out.extend_from_slice(&tables.ycbcr_to_rgb(
                        samples[0], samples[1], samples[2],
                    )),
                }
            }
        }

        Ok(ImageBuffer::from_bytes(
            width.u32()?,
            height.u32()?,
            channels.u8()?,
            out,
        )?)
    }
}

/// Tables referenced by one scan component
struct ScanComponent<'a> {
    /// Index into frame components
    index: usize,
    dc: &'a HuffmanTable,
    ac: &'a HuffmanTable,
    /// Quantization table in zig-zag order
    q: [u16; 64],
}

impl ScanComponent<'_> {
    fn decode_block(
        &self,
        reader: &mut BitReader,
        dc_pred: &mut i32,
        out: &mut [i32; 64],
    ) -> Result<(), Error> {
        huffman::decode_block(reader, self.dc, self.ac, &self.q, dc_pred, out)
    }
}

struct Scan<'a> {
    components: Vec<ScanComponent<'a>>,
}

impl<'a> Scan<'a> {
    fn new(
        frame: &Frame,
        sos: &Sos,
        qtables: &[Option<[u16; 64]>; 4],
        dc_tables: &'a [Option<HuffmanTable>; 4],
        ac_tables: &'a [Option<HuffmanTable>; 4],
    ) -> Result<Self, Error> {
        if sos.ss != 0 || sos.se != 63 || sos.ah != 0 || sos.al != 0 {
            tracing::debug!(
                "Unexpected spectral selection {}..{} in sequential scan",
                sos.ss,
                sos.se
            );
        }

        let lookup = |tables: &'a [Option<HuffmanTable>; 4], class: u8, id: u8| {
            tables
                .get(usize::from(id))
                .and_then(Option::as_ref)
                .ok_or(Error::MissingHuffmanTable { class, id })
        };

        let components = sos
            .components_specifications
            .iter()
            .map(|spec| {
                let index = frame
                    .components
                    .iter()
                    .position(|c| c.id == spec.cs)
                    .ok_or(Error::UnknownComponent(spec.cs))?;
                let tq = frame.components[index].tq;
                let q = qtables
                    .get(usize::from(tq))
                    .copied()
                    .flatten()
                    .ok_or(Error::MissingQuantizationTable(tq))?;

                Ok::<_, Error>(ScanComponent {
                    index,
                    dc: lookup(dc_tables, 0, spec.td)?,
                    ac: lookup(ac_tables, 1, spec.ta)?,
                    q,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        if components.is_empty() {
            return Err(Error::NoSos);
        }

        Ok(Self { components })
    }
}

/// Decoded samples of one component
struct Plane {
    width: usize,
    data: Vec<u8>,
}

impl Plane {
    fn new(component: &Component, tables: &Tables, resolution: Resolution) -> Self {
        match resolution {
            Resolution::Dc => Self {
                width: component.blocks_per_line,
                data: component
                    .coefficients
                    .iter()
                    .map(|block| to_sample(block[0] as f32 / 8.))
                    .collect(),
            },
            Resolution::Full => {
                let width = component.blocks_per_line * 8;
                let mut data = vec![0; width * component.block_rows * 8];
                for (i, block) in component.coefficients.iter().enumerate() {
                    let bx = i % component.blocks_per_line;
                    let by = i / component.blocks_per_line;
                    let offset = by * 8 * width + bx * 8;
                    idct_block(block, &tables.idct, &mut data[offset..], width);
                }
                Self { width, data }
            }
        }
    }
}

/// Level shifted and clamped sample
fn to_sample(v: f32) -> u8 {
    (v + 128.).round().clamp(0., 255.) as u8
}

/// Separable inverse DCT of one block, written with `stride` between rows
fn idct_block(coefficients: &[i32; 64], t: &[[f32; 8]; 8], out: &mut [u8], stride: usize) {
    // Rows first: tmp[v][x] = sum over u of t[x][u] * F(v, u)
    let mut tmp = [[0_f32; 8]; 8];
    for (v, tmp_row) in tmp.iter_mut().enumerate() {
        let row = &coefficients[v * 8..v * 8 + 8];
        if row.iter().all(|x| *x == 0) {
            continue;
        }
        for (x, value) in tmp_row.iter_mut().enumerate() {
            *value = row
                .iter()
                .zip(&t[x])
                .map(|(f, c)| *f as f32 * c)
                .sum();
        }
    }

    for y in 0..8 {
        for x in 0..8 {
            let v = (0..8).map(|v| t[y][v] * tmp[v][x]).sum::<f32>();
            out[y * stride + x] = to_sample(v);
        }
    }
}
