//! Random problem selection from the configured factor pool.

use crate::problem::Problem;
use crate::settings::PracticeSettings;
use rand::Rng;

/// The factors a problem may be drawn from.
///
/// Ranges are never expanded, so a pool over billions of factors costs no
/// more than one over a handful.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactorPool {
    Listed(Vec<u32>),
    /// `lo..=hi` without `skip`, which is sorted and lies inside the range.
    Range { lo: u32, hi: u32, skip: Vec<u32> },
}

impl FactorPool {
    pub fn len(&self) -> u64 {
        match self {
            FactorPool::Listed(factors) => factors.len() as u64,
            FactorPool::Range { lo, hi, skip } => u64::from(hi - lo) + 1 - skip.len() as u64,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `index`-th factor in ascending order.
    pub fn nth(&self, index: u64) -> Option<u32> {
        match self {
            FactorPool::Listed(factors) => factors.get(usize::try_from(index).ok()?).copied(),
            FactorPool::Range { lo, skip, .. } => {
                if index >= self.len() {
                    return None;
                }
                let mut value = u64::from(*lo) + index;
                for &excluded in skip {
                    if u64::from(excluded) > value {
                        break;
                    }
                    value += 1;
                }
                u32::try_from(value).ok()
            }
        }
    }

    pub fn contains(&self, factor: u32) -> bool {
        match self {
            FactorPool::Listed(factors) => factors.contains(&factor),
            FactorPool::Range { lo, hi, skip } => {
                (*lo..=*hi).contains(&factor) && skip.binary_search(&factor).is_err()
            }
        }
    }

    /// Uniform pick, `None` only for an empty pool.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<u32> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        self.nth(rng.gen_range(0..len))
    }
}

/// Factors a problem may be drawn from. Never empty.
///
/// An inclusion list wins outright. Otherwise the pool is the configured
/// range minus exclusions, and if that leaves nothing the whole range is used.
/// Bounds given in the wrong order are read low-to-high for the fallback.
pub fn candidate_factors(settings: &PracticeSettings) -> FactorPool {
    if !settings.included_buckets.is_empty() {
        return FactorPool::Listed(settings.included_buckets.iter().copied().collect());
    }

    let (min, max) = (settings.min_number, settings.max_number);
    if min <= max {
        let skip: Vec<u32> = settings.excluded_buckets.range(min..=max).copied().collect();
        let pool = FactorPool::Range { lo: min, hi: max, skip };
        if !pool.is_empty() {
            return pool;
        }
    }

    FactorPool::Range {
        lo: min.min(max),
        hi: min.max(max),
        skip: Vec::new(),
    }
}

/// Draws both factors independently, with replacement. Squares are allowed.
pub fn generate<R: Rng + ?Sized>(settings: &PracticeSettings, rng: &mut R) -> Problem {
    let pool = candidate_factors(settings);
    let a = pool.choose(rng).unwrap_or(settings.min_number);
    let b = pool.choose(rng).unwrap_or(settings.min_number);
    Problem::new(a, b)
}
