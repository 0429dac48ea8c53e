use anyhow::{Result, anyhow};

/// Classic fifteen-rung ladder.
pub const DEFAULT_PRIZES: [u32; 15] = [
    100, 200, 300, 500, 1_000, 2_000, 4_000, 8_000, 16_000, 32_000, 64_000, 125_000, 250_000,
    500_000, 1_000_000,
];

/// Fireproof rungs, as counts of answered questions.
pub const DEFAULT_CHECKPOINTS: [u32; 2] = [5, 10];

/// Prize ladder plus its fireproof checkpoints.
///
/// Amounts are indexed by the number of questions answered: answering `n` questions
/// is worth `prizes[n - 1]`, answering none is worth 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrizeTable {
    prizes: Vec<u32>,
    checkpoints: Vec<u32>,
}

impl Default for PrizeTable {
    fn default() -> Self {
        Self {
            prizes: DEFAULT_PRIZES.to_vec(),
            checkpoints: DEFAULT_CHECKPOINTS.to_vec(),
        }
    }
}

impl PrizeTable {
    pub fn new(prizes: Vec<u32>, mut checkpoints: Vec<u32>) -> Result<Self> {
        if prizes.is_empty() {
            return Err(anyhow!("Prize ladder must have at least one level"));
        }
        if prizes.len() > usize::from(u8::MAX) {
            return Err(anyhow!(
                "Prize ladder has {} levels, at most {} are supported",
                prizes.len(),
                u8::MAX
            ));
        }
        if prizes.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(anyhow!("Prize ladder must be strictly increasing"));
        }

        checkpoints.sort_unstable();
        checkpoints.dedup();
        if let Some(bad) = checkpoints
            .iter()
            .find(|&&level| level == 0 || level as usize > prizes.len())
        {
            return Err(anyhow!(
                "Checkpoint {} is outside the ladder (1..={})",
                bad,
                prizes.len()
            ));
        }

        Ok(Self { prizes, checkpoints })
    }

    /// Number of questions in a full game.
    pub fn levels(&self) -> u32 {
        self.prizes.len() as u32
    }

    /// Question levels of a full game, `0..levels()`.
    pub fn level_indices(&self) -> Vec<u8> {
        (0..=u8::MAX).take(self.prizes.len()).collect()
    }

    pub fn prizes(&self) -> &[u32] {
        &self.prizes
    }

    pub fn checkpoints(&self) -> &[u32] {
        &self.checkpoints
    }

    /// Prize for `answered` correctly answered questions.
    pub fn prize_for(&self, answered: u32) -> u32 {
        match answered {
            0 => 0,
            n => self.prizes[(n as usize).min(self.prizes.len()) - 1],
        }
    }

    pub fn top_prize(&self) -> u32 {
        self.prize_for(self.levels())
    }

    /// Prize kept after failing with `answered` questions behind the player:
    /// the highest checkpoint already passed, or nothing.
    pub fn checkpoint_prize(&self, answered: u32) -> u32 {
        self.checkpoints
            .iter()
            .rev()
            .find(|&&checkpoint| checkpoint <= answered)
            .map(|&checkpoint| self.prize_for(checkpoint))
            .unwrap_or(0)
    }

    pub fn is_checkpoint(&self, answered: u32) -> bool {
        self.checkpoints.contains(&answered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ladder() {
        let table = PrizeTable::default();
        assert_eq!(table.levels(), 15);
        assert_eq!(table.prize_for(0), 0);
        assert_eq!(table.prize_for(2), 200);
        assert_eq!(table.top_prize(), 1_000_000);
    }

    #[test]
    fn test_checkpoint_prize() {
        let table = PrizeTable::default();
        assert_eq!(table.checkpoint_prize(0), 0);
        assert_eq!(table.checkpoint_prize(4), 0);
        assert_eq!(table.checkpoint_prize(5), 1_000);
        assert_eq!(table.checkpoint_prize(9), 1_000);
        assert_eq!(table.checkpoint_prize(10), 32_000);
        assert_eq!(table.checkpoint_prize(14), 32_000);
        assert!(table.is_checkpoint(5));
        assert!(!table.is_checkpoint(6));
    }

    #[test]
    fn test_level_indices() {
        let table = PrizeTable::default();
        assert_eq!(table.level_indices(), (0..15).collect::<Vec<u8>>());

        let short = PrizeTable::new(vec![10, 20, 30], vec![2]).unwrap();
        assert_eq!(short.level_indices(), vec![0, 1, 2]);
    }

    #[test]
    fn test_rejects_ladder_longer_than_level_range() {
        let longest: Vec<u32> = (1..=255).collect();
        let table = PrizeTable::new(longest, vec![]).unwrap();
        assert_eq!(table.level_indices().len(), 255);
        assert_eq!(table.level_indices().last(), Some(&254));

        let too_long: Vec<u32> = (1..=256).collect();
        let err = PrizeTable::new(too_long, vec![]).unwrap_err();
        assert!(err.to_string().contains("at most 255"));
    }

    #[test]
    fn test_checkpoint_never_exceeds_reached_prize() {
        let table = PrizeTable::default();
        for answered in 0..=table.levels() {
            assert!(table.checkpoint_prize(answered) <= table.prize_for(answered));
        }
    }

    #[test]
    fn test_invalid_tables() {
        assert!(PrizeTable::new(vec![], vec![]).is_err());
        assert!(PrizeTable::new(vec![100, 100, 300], vec![]).is_err());
        assert!(PrizeTable::new(vec![100, 200, 300], vec![4]).is_err());
        assert!(PrizeTable::new(vec![100, 200, 300], vec![0]).is_err());

        let table = PrizeTable::new(vec![100, 200, 300], vec![2, 2]).unwrap();
        assert_eq!(table.checkpoints(), &[2]);
        assert_eq!(table.checkpoint_prize(3), 200);
    }
}
