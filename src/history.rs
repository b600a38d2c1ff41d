//! Rolling per-channel access point counts used for the utilization view.

use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet, VecDeque},
};

use crate::parse::AccessPointRecord;

/// Number of access points seen per channel label in one sample.
pub type ChannelCount = BTreeMap<String, usize>;

/// Build the channel histogram of a single sample. Records without a channel are not counted.
pub fn count_channels(access_points: &[AccessPointRecord]) -> ChannelCount {
    let mut counts = ChannelCount::new();
    for ap in access_points.iter().filter(|ap| !ap.channel.is_empty()) {
        *counts.entry(ap.channel.clone()).or_default() += 1;
    }
    counts
}

/// Order channel labels numerically, with non-numeric labels after all numeric ones.
pub fn compare_channels(a: &str, b: &str) -> Ordering {
    match (a.parse::<u32>(), b.parse::<u32>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// A fixed capacity FIFO of [ChannelCount] samples, oldest first.
#[derive(Debug, Clone)]
pub struct ChannelHistory {
    capacity: usize,
    samples: VecDeque<ChannelCount>,
}

impl ChannelHistory {
    /// Create an empty history. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    /// Count the channels of a sample and append it, returning the evicted oldest entry if the
    /// history was full.
    pub fn record(&mut self, access_points: &[AccessPointRecord]) -> Option<ChannelCount> {
        self.push(count_channels(access_points))
    }

    pub fn push(&mut self, counts: ChannelCount) -> Option<ChannelCount> {
        let evicted = if self.samples.len() == self.capacity {
            self.samples.pop_front()
        } else {
            None
        };
        self.samples.push_back(counts);
        evicted
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<&ChannelCount> {
        self.samples.back()
    }

    /// Every channel label seen in the retained history, in display order.
    pub fn channels(&self) -> Vec<String> {
        let set: BTreeSet<&String> = self.samples.iter().flat_map(|s| s.keys()).collect();
        let mut channels: Vec<String> = set.into_iter().cloned().collect();
        channels.sort_by(|a, b| compare_channels(a, b));
        channels
    }

    /// The count of a channel for every retained sample, oldest first. Samples in which the
    /// channel was not seen count as zero.
    pub fn series(&self, channel: &str) -> Vec<usize> {
        self.samples
            .iter()
            .map(|s| s.get(channel).copied().unwrap_or(0))
            .collect()
    }

    /// Highest single count in the history.
    pub fn peak(&self) -> usize {
        self.samples
            .iter()
            .flat_map(|s| s.values().copied())
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ap(channel: &str) -> AccessPointRecord {
        AccessPointRecord {
            bssid: "aa:bb".into(),
            channel: channel.into(),
            ssid: String::new(),
            power: String::new(),
        }
    }

    fn counts(pairs: &[(&str, usize)]) -> ChannelCount {
        pairs.iter().map(|(c, n)| (c.to_string(), *n)).collect()
    }

    #[test]
    fn counts_skip_empty_channels() {
        let c = count_channels(&[ap("6"), ap(""), ap("6"), ap("11")]);
        assert_eq!(c, counts(&[("6", 2), ("11", 1)]));
    }

    #[test]
    fn evicts_oldest_when_full() {
        let mut history = ChannelHistory::new(2);
        assert_eq!(history.push(counts(&[("1", 1)])), None);
        assert_eq!(history.push(counts(&[("2", 1)])), None);
        assert_eq!(history.push(counts(&[("3", 1)])), Some(counts(&[("1", 1)])));
        assert_eq!(history.len(), 2);
        assert_eq!(history.latest(), Some(&counts(&[("3", 1)])));
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut history = ChannelHistory::new(3);
        for _ in 0..10 {
            history.record(&[ap("1")]);
            assert!(history.len() <= history.capacity());
        }
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn zero_capacity_is_raised() {
        let mut history = ChannelHistory::new(0);
        history.record(&[ap("1")]);
        history.record(&[ap("2")]);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn channels_sort_numeric_then_other() {
        let mut history = ChannelHistory::new(5);
        history.push(counts(&[("11", 1), ("6", 2)]));
        history.push(counts(&[("-1", 1), ("100", 1), ("2", 1)]));
        history.push(counts(&[("x", 1)]));

        assert_eq!(history.channels(), ["2", "6", "11", "100", "-1", "x"]);
    }

    #[test]
    fn series_aligns_with_samples() {
        let mut history = ChannelHistory::new(5);
        history.push(counts(&[("6", 2)]));
        history.push(counts(&[("1", 1)]));
        history.push(counts(&[("6", 3), ("1", 1)]));

        assert_eq!(history.series("6"), [2, 0, 3]);
        assert_eq!(history.series("1"), [0, 1, 1]);
        assert_eq!(history.peak(), 3);
    }
}
