//! Ingestion counters.
//!
//! Plain counters, one per terminal outcome. They are diagnostics, not
//! control flow: nothing reads them to make decisions.

use crate::outcome::IngestOutcome;

/// Running totals over every frame the pipeline has seen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub received: u64,
    pub applied: u64,
    pub duplicates: u64,
    pub ignored: u64,
    pub malformed_frames: u64,
    pub auth_failures: u64,
    pub unknown_routes: u64,
    pub schema_errors: u64,
    pub handler_rejections: u64,
    pub invariant_violations: u64,
}

impl IngestStats {
    pub fn record(&mut self, outcome: &IngestOutcome) {
        self.received += 1;
        match outcome {
            IngestOutcome::Applied(_) => self.applied += 1,
            IngestOutcome::Duplicate => self.duplicates += 1,
            IngestOutcome::Ignored => self.ignored += 1,
            IngestOutcome::MalformedFrame(_) => self.malformed_frames += 1,
            IngestOutcome::AuthFailed(_) => self.auth_failures += 1,
            IngestOutcome::UnknownRoute { .. } => self.unknown_routes += 1,
            IngestOutcome::SchemaError(_) => self.schema_errors += 1,
            IngestOutcome::HandlerRejected(_) => self.handler_rejections += 1,
            IngestOutcome::InvariantViolation(_) => self.invariant_violations += 1,
        }
    }

    /// Frames that were discarded for any reason.
    pub fn discarded(&self) -> u64 {
        self.received - self.applied - self.duplicates - self.ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_outcome() {
        let mut stats = IngestStats::default();
        stats.record(&IngestOutcome::Applied(2));
        stats.record(&IngestOutcome::Duplicate);
        stats.record(&IngestOutcome::UnknownRoute {
            object: "consensus".into(),
            action: "elect".into(),
        });
        assert_eq!(stats.received, 3);
        assert_eq!(stats.applied, 1);
        assert_eq!(stats.duplicates, 1);
        assert_eq!(stats.unknown_routes, 1);
        assert_eq!(stats.discarded(), 1);
    }
}
