use serde::Serialize;

/// Counters collected during one analysis run.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Serialize)]
pub struct AnalysisStats {
    /// Cards whose move set was computed (at most 52).
    pub cards_evaluated: u32,
    /// Lookups answered from the memo table.
    pub memo_hits: u32,
    /// Lookups cut short because the card was already on the current path.
    pub cycle_breaks: u32,
    /// Predecessor or destination lookups that found no card.
    pub missing_targets: u32,
    /// Deepest nesting of active evaluations.
    pub max_depth: u32,
}

impl AnalysisStats {
    pub fn record_evaluation(&mut self, depth: usize) {
        self.cards_evaluated += 1;
        self.max_depth = self.max_depth.max(depth as u32);
    }

    pub fn record_memo_hit(&mut self) {
        self.memo_hits += 1;
    }

    pub fn record_cycle_break(&mut self) {
        self.cycle_breaks += 1;
    }

    pub fn record_missing_target(&mut self) {
        self.missing_targets += 1;
    }

    /// Share of lookups served from the memo table.
    pub fn memo_hit_rate(&self) -> f64 {
        let lookups = self.memo_hits + self.cards_evaluated;
        if lookups == 0 {
            0.0
        } else {
            self.memo_hits as f64 / lookups as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluation_tracks_deepest_frame() {
        let mut stats = AnalysisStats::default();
        stats.record_evaluation(1);
        stats.record_evaluation(4);
        stats.record_evaluation(2);
        assert_eq!(stats.cards_evaluated, 3);
        assert_eq!(stats.max_depth, 4);
    }

    #[test]
    fn memo_hit_rate_handles_empty_run() {
        let mut stats = AnalysisStats::default();
        assert_eq!(stats.memo_hit_rate(), 0.0);
        stats.record_evaluation(1);
        stats.record_memo_hit();
        assert_eq!(stats.memo_hit_rate(), 0.5);
    }
}
