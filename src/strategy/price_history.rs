use crate::models::PriceSample;
use std::collections::VecDeque;

/// Rolling window of price samples for a single symbol
///
/// Oldest samples are evicted once the window reaches capacity.
#[derive(Debug, Clone)]
pub struct PriceHistory {
    samples: VecDeque<PriceSample>,
    capacity: usize,
}

impl PriceHistory {
    /// Create an empty history
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of samples to keep
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest if the window is full
    pub fn push(&mut self, sample: PriceSample) {
        self.samples.push_back(sample);

        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&PriceSample> {
        self.samples.back()
    }

    /// Samples oldest first
    pub fn samples(&self) -> impl DoubleEndedIterator<Item = &PriceSample> + ExactSizeIterator {
        self.samples.iter()
    }

    /// Prices oldest first
    pub fn prices(&self) -> impl DoubleEndedIterator<Item = f64> + ExactSizeIterator + '_ {
        self.samples.iter().map(|s| s.price)
    }

    /// The N most recent samples, oldest first
    pub fn recent(&self, n: usize) -> Vec<PriceSample> {
        let skip = self.samples.len().saturating_sub(n);
        self.samples.iter().skip(skip).copied().collect()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
