#![forbid(unsafe_code)]

use crate::error::{FrameError, FrameResult};
use crate::frame::Frame;
use crate::types::Value;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

/// How many rows [`Frame::sample`] draws.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SampleSize {
    /// An exact row count; must be positive.
    Count(usize),
    /// A share of the frame in `(0, 1]`, rounded to the nearest row count.
    Fraction(f64),
}

impl From<usize> for SampleSize {
    fn from(n: usize) -> Self {
        SampleSize::Count(n)
    }
}

impl From<f64> for SampleSize {
    fn from(fraction: f64) -> Self {
        SampleSize::Fraction(fraction)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SampleOptions {
    /// Fixes the pseudo-random sequence; identical seeds and inputs give identical indices.
    pub seed: Option<u64>,
    /// Draw independently with repetition allowed.
    pub replace: bool,
}

impl SampleOptions {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn with_replacement(mut self) -> Self {
        self.replace = true;
        self
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StratifiedOptions {
    pub seed: Option<u64>,
}

impl StratifiedOptions {
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }
}

fn rng_for(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn check_fraction(fraction: f64) -> FrameResult<f64> {
    if fraction > 0.0 && fraction <= 1.0 {
        Ok(fraction)
    } else {
        Err(FrameError::InvalidArgument(format!(
            "sample fraction must be in (0, 1], got {fraction}"
        )))
    }
}

impl Frame {
    /// Uniform random sample of rows.
    pub fn sample(&self, size: impl Into<SampleSize>, options: SampleOptions) -> FrameResult<Frame> {
        let mut rng = rng_for(options.seed);
        log::debug!(
            "sampling {} rows ({})",
            self.row_count(),
            if options.seed.is_some() { "seeded" } else { "entropy" }
        );
        self.sample_with_rng(size, options.replace, &mut rng)
    }

    /// [`Frame::sample`] driven by a caller-supplied random source.
    pub fn sample_with_rng<R: Rng + ?Sized>(
        &self,
        size: impl Into<SampleSize>,
        replace: bool,
        rng: &mut R,
    ) -> FrameResult<Frame> {
        let indices = self.sample_indices(size.into(), replace, rng)?;
        self.select_rows(&indices)
    }

    fn sample_indices<R: Rng + ?Sized>(
        &self,
        size: SampleSize,
        replace: bool,
        rng: &mut R,
    ) -> FrameResult<Vec<usize>> {
        let rows = self.row_count();
        let n = match size {
            SampleSize::Count(0) => {
                return Err(FrameError::InvalidArgument(
                    "sample size must be a positive integer".to_string(),
                ))
            }
            SampleSize::Count(n) => n,
            SampleSize::Fraction(fraction) => {
                (rows as f64 * check_fraction(fraction)?).round() as usize
            }
        };

        if replace {
            if rows == 0 && n > 0 {
                return Err(FrameError::InvalidArgument(
                    "cannot sample with replacement from an empty frame".to_string(),
                ));
            }
            log::debug!("drawing {n} of {rows} rows with replacement");
            return Ok((0..n).map(|_| rng.gen_range(0..rows)).collect());
        }

        if n > rows {
            return Err(FrameError::InvalidArgument(format!(
                "sample size {n} exceeds row count {rows} without replacement"
            )));
        }
        log::debug!("drawing {n} of {rows} rows without replacement");
        let mut all: Vec<usize> = (0..rows).collect();
        let (chosen, _) = all.partial_shuffle(rng, n);
        Ok(chosen.to_vec())
    }

    /// Sample `fraction` of each stratum of `column`.
    ///
    /// Each stratum contributes `round(size * fraction)` rows, at least one and at most the
    /// whole stratum. Output rows are grouped by stratum in first-occurrence order.
    pub fn stratified_sample(
        &self,
        column: &str,
        fraction: f64,
        options: StratifiedOptions,
    ) -> FrameResult<Frame> {
        let column = self.column(column)?;
        let fraction = check_fraction(fraction)?;
        let mut rng = rng_for(options.seed);

        let mut strata: Vec<Vec<usize>> = Vec::new();
        let mut lookup: HashMap<Value, usize> = HashMap::new();
        for (idx, value) in column.iter().enumerate() {
            let slot = *lookup.entry(value).or_insert_with(|| {
                strata.push(Vec::new());
                strata.len() - 1
            });
            strata[slot].push(idx);
        }
        log::debug!(
            "stratified sample over {} strata at fraction {fraction}",
            strata.len()
        );

        let mut indices = Vec::new();
        for mut stratum in strata {
            let size = stratum.len();
            let take = ((size as f64 * fraction).round() as usize).clamp(1, size);
            let (chosen, _) = stratum.partial_shuffle(&mut rng, take);
            indices.extend_from_slice(chosen);
        }
        self.select_rows(&indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(n: i32) -> Frame {
        Frame::from_columns(vec![("n", (0..n).map(Value::Int).collect())]).unwrap()
    }

    #[test]
    fn partial_shuffle_draw_is_a_permutation_prefix() {
        let frame = numbers(10);
        let mut rng = StdRng::seed_from_u64(7);
        let mut idx = frame
            .sample_indices(SampleSize::Count(10), false, &mut rng)
            .unwrap();
        idx.sort_unstable();
        assert_eq!(idx, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn fraction_rounds_to_nearest() {
        let frame = numbers(10);
        let mut rng = StdRng::seed_from_u64(7);
        let idx = frame
            .sample_indices(SampleSize::Fraction(0.25), false, &mut rng)
            .unwrap();
        // 2.5 rounds away from zero.
        assert_eq!(idx.len(), 3);
    }

    #[test]
    fn nan_fraction_is_rejected() {
        assert!(check_fraction(f64::NAN).is_err());
        assert!(check_fraction(0.0).is_err());
        assert!(check_fraction(1.5).is_err());
        assert_eq!(check_fraction(1.0).unwrap(), 1.0);
    }
}
