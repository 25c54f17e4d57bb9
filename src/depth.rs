use log::info;

/// Histogram of the depths at which absent-child positions sit in the
/// [`RbTree`], collected by [`RbTree::validate`]. For a valid tree of `n`
/// items there are `n + 1` such positions and none is deeper than
/// `2 * log2(n + 1)`.
///
/// [`RbTree`]: crate::RbTree
/// [`RbTree::validate`]: crate::RbTree::validate
#[derive(Clone, Debug, Default)]
pub struct Depth {
    // positions[d] is the number of absent children found at depth d.
    positions: Vec<usize>,
    n_positions: usize,
    depth_sum: usize,
}

impl Depth {
    pub(crate) fn new() -> Depth {
        Default::default()
    }

    pub(crate) fn record(&mut self, depth: usize) {
        if self.positions.len() <= depth {
            self.positions.resize(depth + 1, 0);
        }
        self.positions[depth] += 1;
        self.n_positions += 1;
        self.depth_sum += depth;
    }

    /// Return number of absent-child positions recorded.
    pub fn samples(&self) -> usize {
        self.n_positions
    }

    /// Return the shallowest absent-child position.
    pub fn min(&self) -> usize {
        self.positions.iter().position(|n| *n > 0).unwrap_or(0)
    }

    /// Return the deepest absent-child position.
    pub fn max(&self) -> usize {
        self.positions.len().saturating_sub(1)
    }

    /// Return the average depth, rounded down.
    pub fn mean(&self) -> usize {
        match self.n_positions {
            0 => 0,
            n => self.depth_sum / n,
        }
    }

    /// Return the smallest depth that covers at least `perc` percent of
    /// the absent-child positions.
    pub fn percentile(&self, perc: u8) -> usize {
        let want = self.n_positions * usize::from(perc.min(100));
        let mut covered = 0;
        for (depth, n) in self.positions.iter().enumerate() {
            covered += n;
            if covered * 100 >= want {
                return depth;
            }
        }
        self.max()
    }

    /// Return (percentile, depth) pairs for the 90th to 100th percentile.
    /// Percentiles landing on the same depth collapse into the highest.
    pub fn percentiles(&self) -> Vec<(u8, usize)> {
        let mut acc: Vec<(u8, usize)> = vec![];
        for perc in 90..=100 {
            let depth = self.percentile(perc);
            match acc.last_mut() {
                Some(last) if last.1 == depth => last.0 = perc,
                _ => acc.push((perc, depth)),
            }
        }
        acc
    }

    /// Emit the histogram summary at info level.
    pub fn log_summary(&self, prefix: &str) {
        info!(
            "{}depth (min, avg, max): ({}, {}, {}) over {} positions",
            prefix,
            self.min(),
            self.mean(),
            self.max(),
            self.n_positions
        );
        for (perc, depth) in self.percentiles() {
            info!("{}  {}th percentile at depth {}", prefix, perc, depth);
        }
    }

    /// Render the summary as a JSON object, useful for plotting.
    pub fn json(&self) -> String {
        let percs = self
            .percentiles()
            .iter()
            .map(|(perc, depth)| format!("\"{}\": {}", perc, depth))
            .collect::<Vec<String>>()
            .join(", ");
        format!(
            "{{ \"min\": {}, \"mean\": {}, \"max\": {}, \"percentiles\": {{ {} }} }}",
            self.min(),
            self.mean(),
            self.max(),
            percs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth() {
        let mut depth = Depth::new();
        assert_eq!((depth.samples(), depth.min(), depth.max()), (0, 0, 0));
        assert_eq!(depth.mean(), 0);

        for d in [5, 3, 4, 9, 5, 6, 3, 5, 7, 6].iter() {
            depth.record(*d);
        }
        assert_eq!(depth.samples(), 10);
        assert_eq!(depth.min(), 3);
        assert_eq!(depth.max(), 9);
        assert_eq!(depth.mean(), 5);
        assert_eq!(depth.percentile(50), 5);
        assert_eq!(depth.percentile(90), 7);
        assert_eq!(depth.percentiles(), vec![(90, 7), (100, 9)]);
        assert_eq!(
            depth.json(),
            "{ \"min\": 3, \"mean\": 5, \"max\": 9, \
             \"percentiles\": { \"90\": 7, \"100\": 9 } }"
        );
    }
}
