/// Composition of an interpolator table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableStats {
    /// Entries blending source neighbours.
    pub neighbors: usize,
    /// Constant black entries in front of the first sample.
    pub near_field: usize,
    /// Entries left at the background.
    pub background: usize,
}

impl TableStats {
    /// Tally for one table row of `width` entries.
    pub fn row(width: usize, neighbors: usize, near_field: usize) -> Self {
        Self {
            neighbors,
            near_field,
            background: width.saturating_sub(neighbors + near_field),
        }
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            neighbors: self.neighbors + other.neighbors,
            near_field: self.near_field + other.near_field,
            background: self.background + other.background,
        }
    }

    pub fn total(&self) -> usize {
        self.neighbors + self.near_field + self.background
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_merge_into_table_totals() {
        let stats = TableStats::row(10, 4, 1).merge(TableStats::row(10, 0, 0));
        assert_eq!(
            stats,
            TableStats {
                neighbors: 4,
                near_field: 1,
                background: 15,
            }
        );
        assert_eq!(stats.total(), 20);
    }
}
