//! Scanline filters

use crate::Error;

imbuf_common::utils::maybe_convertible_enum!(
    #[repr(u8)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum FilterType {
        None = 0,
        Sub = 1,
        Up = 2,
        Average = 3,
        Paeth = 4,
    }
);

impl FilterType {
    pub const ALL: [Self; 5] = [Self::None, Self::Sub, Self::Up, Self::Average, Self::Paeth];
}

fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let (ia, ib, ic) = (i16::from(a), i16::from(b), i16::from(c));
    let p = ia + ib - ic;
    let pa = (p - ia).abs();
    let pb = (p - ib).abs();
    let pc = (p - ic).abs();

    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

/// Reverses the filter on `row` in place
///
/// `prev` is the already unfiltered previous row, or all zeros for the first
/// row of a pass. `bpp` is the byte distance to the previous pixel.
pub(crate) fn unfilter_row(
    filter_type: u8,
    row: &mut [u8],
    prev: &[u8],
    bpp: usize,
) -> Result<(), Error> {
    let filter_type =
        FilterType::try_from(filter_type).map_err(|err| Error::UnknownFilterType(err.0))?;

    match filter_type {
        FilterType::None => {}
        FilterType::Sub => {
            for i in bpp..row.len() {
                row[i] = row[i].wrapping_add(row[i - bpp]);
            }
        }
        FilterType::Up => {
            for (x, b) in row.iter_mut().zip(prev) {
                *x = x.wrapping_add(*b);
            }
        }
        FilterType::Average => {
            for i in 0..row.len() {
                let a = if i >= bpp { u16::from(row[i - bpp]) } else { 0 };
                let b = u16::from(prev[i]);
                row[i] = row[i].wrapping_add(((a + b) / 2) as u8);
            }
        }
        FilterType::Paeth => {
            for i in 0..row.len() {
                let (a, c) = if i >= bpp {
                    (row[i - bpp], prev[i - bpp])
                } else {
                    (0, 0)
                };
                row[i] = row[i].wrapping_add(paeth(a, prev[i], c));
            }
        }
    }

    Ok(())
}

/// Applies `filter_type` to `row` and appends the result to `out`
pub(crate) fn filter_row(
    filter_type: FilterType,
    row: &[u8],
    prev: &[u8],
    bpp: usize,
    out: &mut Vec<u8>,
) {
    let left = |i: usize| if i >= bpp { row[i - bpp] } else { 0 };
    let upper_left = |i: usize| if i >= bpp { prev[i - bpp] } else { 0 };

    out.push(filter_type.into());
    match filter_type {
        FilterType::None => out.extend_from_slice(row),
        FilterType::Sub => out.extend((0..row.len()).map(|i| row[i].wrapping_sub(left(i)))),
        FilterType::Up => out.extend(row.iter().zip(prev).map(|(x, b)| x.wrapping_sub(*b))),
        FilterType::Average => out.extend((0..row.len()).map(|i| {
            let avg = (u16::from(left(i)) + u16::from(prev[i])) / 2;
            row[i].wrapping_sub(avg as u8)
        })),
        FilterType::Paeth => out.extend(
            (0..row.len()).map(|i| row[i].wrapping_sub(paeth(left(i), prev[i], upper_left(i)))),
        ),
    }
}

/// Picks the filter with the minimum sum of absolute differences
///
/// Appends the filter type byte and the filtered row to `out`.
pub(crate) fn filter_row_adaptive(row: &[u8], prev: &[u8], bpp: usize, out: &mut Vec<u8>) {
    let mut best: Option<(u64, Vec<u8>)> = None;
    let mut candidate = Vec::with_capacity(row.len() + 1);

    for filter_type in FilterType::ALL {
        candidate.clear();
        filter_row(filter_type, row, prev, bpp, &mut candidate);
        let cost = candidate[1..]
            .iter()
            .map(|x| u64::from((*x as i8).unsigned_abs()))
            .sum::<u64>();

        if best.as_ref().map_or(true, |(best_cost, _)| cost < *best_cost) {
            best = Some((cost, candidate.clone()));
        }
    }

    if let Some((_, filtered)) = best {
        out.extend_from_slice(&filtered);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_are_reversible() {
        let prev = [3, 200, 17, 80, 1, 255];
        let row = [10, 20, 30, 250, 0, 128];

        for filter_type in FilterType::ALL {
            let mut out = Vec::new();
            filter_row(filter_type, &row, &prev, 2, &mut out);
            assert_eq!(out[0], u8::from(filter_type));

            let mut unfiltered = out[1..].to_vec();
            unfilter_row(out[0], &mut unfiltered, &prev, 2).unwrap();
            assert_eq!(unfiltered, row, "{filter_type:?}");
        }
    }

    #[test]
    fn unknown_filter_type() {
        let mut row = [0; 3];
        assert!(matches!(
            unfilter_row(5, &mut row, &[0; 3], 1),
            Err(Error::UnknownFilterType(5))
        ));
    }

    #[test]
    fn paeth_predictor() {
        assert_eq!(paeth(10, 20, 10), 20);
        assert_eq!(paeth(20, 10, 10), 20);
        assert_eq!(paeth(5, 5, 5), 5);
    }
}
