use std::time::Instant;

use crate::node::NodeId;

/// Where a step ended up during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StepStatus {
    /// Forward action succeeded.
    Executed,
    /// Forward action failed and started the rollback.
    Failed,
    /// Compensating action succeeded.
    Compensated,
    /// Compensating action failed and aborted the rollback.
    CompensationFailed,
}

impl StepStatus {
    fn symbol(self) -> &'static str {
        match self {
            Self::Executed => "✓",
            Self::Failed => "✗",
            Self::Compensated => "↩",
            Self::CompensationFailed => "⚠",
        }
    }
}

/// Record of a step's execution in the chain.
#[derive(Debug)]
pub struct StepRecord {
    /// Node that holds the step.
    pub node: NodeId,
    pub name: String,
    pub status: StepStatus,
    /// When the step started executing, or when its compensation started if
    /// the run never executed it.
    pub started_at: Instant,
    /// When the last action on the step finished.
    pub completed_at: Option<Instant>,
    /// Set once the forward action succeeds.
    pub compensation_description: Option<String>,
}

/// Audit log tracking all step executions and compensations of a run.
#[derive(Debug, Default)]
pub struct ChainAuditLog {
    records: Vec<StepRecord>,
}

impl ChainAuditLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_start(&mut self, node: NodeId, name: &str) {
        self.records.push(StepRecord {
            node,
            name: name.to_string(),
            status: StepStatus::Executed,
            started_at: Instant::now(),
            completed_at: None,
            compensation_description: None,
        });
    }

    pub(crate) fn record_failure(&mut self) {
        if let Some(record) = self.records.last_mut() {
            record.status = StepStatus::Failed;
            record.completed_at = Some(Instant::now());
        }
    }

    pub(crate) fn record_success(&mut self, compensation_description: String) {
        if let Some(record) = self.records.last_mut() {
            record.status = StepStatus::Executed;
            record.completed_at = Some(Instant::now());
            record.compensation_description = Some(compensation_description);
        }
    }

    pub(crate) fn record_compensated(&mut self, node: NodeId, name: &str) {
        self.update_or_insert(node, name, StepStatus::Compensated);
    }

    pub(crate) fn record_compensation_failed(&mut self, node: NodeId, name: &str) {
        self.update_or_insert(node, name, StepStatus::CompensationFailed);
    }

    // Nodes before the start of a mid-chain run are compensated without
    // having been executed, so they get a fresh record.
    fn update_or_insert(&mut self, node: NodeId, name: &str, status: StepStatus) {
        let now = Instant::now();
        if let Some(record) = self.records.iter_mut().find(|r| r.node == node) {
            record.status = status;
            record.completed_at = Some(now);
            return;
        }
        self.records.push(StepRecord {
            node,
            name: name.to_string(),
            status,
            started_at: now,
            completed_at: Some(now),
            compensation_description: None,
        });
    }

    /// Records in the order the run first touched each node.
    #[must_use]
    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    /// The record for `node`, if the run touched it.
    #[must_use]
    pub fn record(&self, node: NodeId) -> Option<&StepRecord> {
        self.records.iter().find(|r| r.node == node)
    }

    /// One `<symbol> <name>` line per record.
    #[must_use]
    pub fn summary(&self) -> String {
        let lines: Vec<String> = self
            .records
            .iter()
            .map(|record| format!("{} {}", record.status.symbol(), record.name))
            .collect();
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: NodeId = NodeId::new(0);
    const B: NodeId = NodeId::new(1);

    #[test]
    fn new_audit_log_is_empty() {
        let log = ChainAuditLog::new();
        assert!(log.records().is_empty());
        assert_eq!(log.summary(), "");
    }

    #[test]
    fn record_start_adds_step_with_executed_status() {
        let mut log = ChainAuditLog::new();
        log.record_start(A, "test_step");

        assert_eq!(log.records().len(), 1);
        assert_eq!(log.records()[0].name, "test_step");
        assert_eq!(log.records()[0].node, A);
        assert_eq!(log.records()[0].status, StepStatus::Executed);
        assert!(log.records()[0].completed_at.is_none());
    }

    #[test]
    fn record_failure_updates_last_step() {
        let mut log = ChainAuditLog::new();
        log.record_start(A, "step_1");
        log.record_failure();

        assert_eq!(log.records()[0].status, StepStatus::Failed);
        assert!(log.records()[0].completed_at.is_some());
    }

    #[test]
    fn record_success_updates_last_step_with_description() {
        let mut log = ChainAuditLog::new();
        log.record_start(A, "step_1");
        log.record_success("undo step_1".to_string());

        assert_eq!(log.records()[0].status, StepStatus::Executed);
        assert!(log.records()[0].completed_at.is_some());
        assert_eq!(
            log.records()[0].compensation_description,
            Some("undo step_1".to_string())
        );
    }

    #[test]
    fn record_compensated_updates_matching_node_only() {
        let mut log = ChainAuditLog::new();
        log.record_start(A, "same_name");
        log.record_success("undo".to_string());
        log.record_start(B, "same_name");
        log.record_success("undo".to_string());
        log.record_compensated(B, "same_name");

        assert_eq!(log.records()[0].status, StepStatus::Executed);
        assert_eq!(log.records()[1].status, StepStatus::Compensated);
    }

    #[test]
    fn compensating_unexecuted_node_adds_record() {
        let mut log = ChainAuditLog::new();
        log.record_start(B, "step_2");
        log.record_failure();
        log.record_compensated(B, "step_2");
        log.record_compensated(A, "step_1");

        assert_eq!(log.records().len(), 2);
        let record = log.record(A).expect("record for A");
        assert_eq!(record.status, StepStatus::Compensated);
        assert!(record.compensation_description.is_none());
    }

    #[test]
    fn record_compensation_failed_updates_matching_step() {
        let mut log = ChainAuditLog::new();
        log.record_start(A, "step_1");
        log.record_success("undo".to_string());
        log.record_compensation_failed(A, "step_1");

        assert_eq!(log.records()[0].status, StepStatus::CompensationFailed);
    }

    #[test]
    fn summary_formats_all_steps() {
        let mut log = ChainAuditLog::new();
        log.record_start(A, "executed_step");
        log.record_success("undo".to_string());
        log.record_start(B, "failed_step");
        log.record_failure();

        assert_eq!(log.summary(), "✓ executed_step\n✗ failed_step");
    }

    #[test]
    fn summary_shows_compensated_and_compensation_failed() {
        let mut log = ChainAuditLog::new();
        log.record_start(A, "compensated_step");
        log.record_success("undo".to_string());
        log.record_compensated(A, "compensated_step");

        log.record_start(B, "comp_failed_step");
        log.record_success("undo".to_string());
        log.record_compensation_failed(B, "comp_failed_step");

        let summary = log.summary();
        assert!(summary.contains("↩ compensated_step"));
        assert!(summary.contains("⚠ comp_failed_step"));
    }
}
