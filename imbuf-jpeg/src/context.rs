//! Decoder tables shared between decode calls
//!
//! [`init`] computes the tables once, afterwards every decode uses the shared
//! copy. Without initialization each decode computes its own tables.

use std::f32::consts::PI;
use std::sync::{Arc, PoisonError, RwLock};

use crate::Error;

static SHARED: RwLock<Option<Arc<Tables>>> = RwLock::new(None);

#[derive(Debug)]
pub(crate) struct Tables {
    /// `idct[x][u]` is `C(u) * cos((2x + 1) * u * PI / 16) / 2`
    pub idct: [[f32; 8]; 8],
    /// Contribution of Cr to red, in 16.16 fixed point
    pub cr_r: [i32; 256],
    /// Contribution of Cb to blue
    pub cb_b: [i32; 256],
    /// Contribution of Cr to green
    pub cr_g: [i32; 256],
    /// Contribution of Cb to green
    pub cb_g: [i32; 256],
}

const FIXED_ONE: f32 = 65536.;

impl Tables {
    fn new() -> Self {
        let mut idct = [[0.; 8]; 8];
        for (x, row) in idct.iter_mut().enumerate() {
            for (u, v) in row.iter_mut().enumerate() {
                let c = if u == 0 { std::f32::consts::FRAC_1_SQRT_2 } else { 1. };
                *v = c * ((2 * x + 1) as f32 * u as f32 * PI / 16.).cos() / 2.;
            }
        }

        let fixed = |factor: f32, i: usize| ((i as f32 - 128.) * factor * FIXED_ONE).round() as i32;

        let mut cr_r = [0; 256];
        let mut cb_b = [0; 256];
        let mut cr_g = [0; 256];
        let mut cb_g = [0; 256];
        for i in 0..256 {
            cr_r[i] = fixed(1.402, i);
            cb_b[i] = fixed(1.772, i);
            cr_g[i] = fixed(-0.714_136, i);
            cb_g[i] = fixed(-0.344_136, i);
        }

        Self {
            idct,
            cr_r,
            cb_b,
            cr_g,
            cb_g,
        }
    }

    /// Converts a JFIF YCbCr sample to RGB
    pub fn ycbcr_to_rgb(&self, y: u8, cb: u8, cr: u8) -> [u8; 3] {
        let y = i32::from(y) << 16;
        let (cb, cr) = (usize::from(cb), usize::from(cr));
        let clamp = |v: i32| ((v + (1 << 15)) >> 16).clamp(0, 255) as u8;

        [
            clamp(y + self.cr_r[cr]),
            clamp(y + self.cb_g[cb] + self.cr_g[cr]),
            clamp(y + self.cb_b[cb]),
        ]
    }
}

/// Builds the shared decoder tables
pub fn init() -> Result<(), Error> {
    let mut shared = SHARED.write().unwrap_or_else(PoisonError::into_inner);
    if shared.is_none() {
        *shared = Some(Arc::new(Tables::new()));
        tracing::debug!("JPEG decoder tables initialized");
    }
    Ok(())
}

/// Releases the shared decoder tables
///
/// Decodes that are still running keep their reference to the tables.
pub fn exit() -> Result<(), Error> {
    let mut shared = SHARED.write().unwrap_or_else(PoisonError::into_inner);
    if shared.take().is_some() {
        tracing::debug!("JPEG decoder tables released");
    }
    Ok(())
}

/// Whether [`init`] was called without a following [`exit`]
pub fn is_initialized() -> bool {
    SHARED
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .is_some()
}

pub(crate) fn tables() -> Arc<Tables> {
    let shared = SHARED
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();

    shared.unwrap_or_else(|| Arc::new(Tables::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_conversion() {
        let tables = Tables::new();
        assert_eq!(tables.ycbcr_to_rgb(128, 128, 128), [128, 128, 128]);
        assert_eq!(tables.ycbcr_to_rgb(255, 128, 128), [255, 255, 255]);
        assert_eq!(tables.ycbcr_to_rgb(76, 85, 255), [254, 0, 0]);
    }

    #[test]
    fn idct_dc_basis() {
        let tables = Tables::new();
        // C(0)^2 / 4 = 1/8
        let dc = tables.idct[3][0] * tables.idct[5][0];
        assert!((dc - 0.125).abs() < 1e-6);
    }
}
