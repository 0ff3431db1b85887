/// Converts an RGBE pixel to linear float RGB
///
/// ```
/// # use imbuf_hdr::rgbe_to_float;
/// assert_eq!(rgbe_to_float([0, 0, 0, 0]), [0., 0., 0.]);
/// assert_eq!(rgbe_to_float([128, 64, 0, 129]), [1.00390625, 0.50390625, 0.00390625]);
/// ```
pub fn rgbe_to_float([r, g, b, e]: [u8; 4]) -> [f32; 3] {
    if e == 0 {
        return [0.; 3];
    }

    let f = 2_f32.powi(i32::from(e) - (128 + 8));
    [
        (f32::from(r) + 0.5) * f,
        (f32::from(g) + 0.5) * f,
        (f32::from(b) + 0.5) * f,
    ]
}

/// Converts linear float RGB to an RGBE pixel
///
/// ```
/// # use imbuf_hdr::float_to_rgbe;
/// assert_eq!(float_to_rgbe([1., 0.5, 0.]), [128, 64, 0, 129]);
/// assert_eq!(float_to_rgbe([0., -1., 0.]), [0, 0, 0, 0]);
/// ```
pub fn float_to_rgbe(rgb: [f32; 3]) -> [u8; 4] {
    let [r, g, b] = rgb.map(|x| if x.is_finite() { x.max(0.) } else { 0. });
    let v = r.max(g).max(b);

    if v < 1e-32 {
        return [0; 4];
    }

    let (mantissa, exponent) = frexp(v);
    let scale = mantissa * 256. / v;
    let e = exponent + 128;
    if !(1..=255).contains(&e) {
        return if e > 255 { [255, 255, 255, 255] } else { [0; 4] };
    }

    [
        (r * scale) as u8,
        (g * scale) as u8,
        (b * scale) as u8,
        e as u8,
    ]
}

/// Splits `v` into a mantissa in `0.5..1.0` and an exponent
fn frexp(v: f32) -> (f32, i32) {
    let mut exponent = v.log2().floor() as i32 + 1;
    let mut mantissa = v / 2_f32.powi(exponent);

    // Rounding in log2
    if mantissa >= 1. {
        mantissa /= 2.;
        exponent += 1;
    } else if mantissa < 0.5 {
        mantissa *= 2.;
        exponent -= 1;
    }

    (mantissa, exponent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frexp_range() {
        for v in [1e-20, 0.3, 0.5, 1., 3., 1000.5, 65504.] {
            let (m, e) = frexp(v);
            assert!((0.5..1.).contains(&m), "{v}: {m}");
            assert!((m * 2_f32.powi(e) - v).abs() <= v * 1e-6);
        }
    }

    #[test]
    fn precision() {
        for v in [0.001, 0.2, 1.7, 42., 9000.] {
            let back = rgbe_to_float(float_to_rgbe([v, v / 2., v / 4.]));
            assert!((back[0] - v).abs() <= v / 128., "{v} {back:?}");
        }
    }
}
