//! The scan controller: at most one extraction in flight, and only the
//! latest one may open a pending item.
//!
//! Each capture gets a [`ScanTicket`] with a sequence number. A result whose
//! ticket is no longer the outstanding one is discarded.

use std::time::{Duration, Instant};

use stockscan_core::{ItemDraft, StockError};
use tracing::{debug, info, warn};

use crate::workflow::ConfirmationWorkflow;

/// How long transient statuses stay on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanDelays {
    pub success: Duration,
    pub error: Duration,
}

impl Default for ScanDelays {
    fn default() -> Self {
        Self {
            success: Duration::from_millis(1500),
            error: Duration::from_millis(4000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanStatus {
    Ready,
    Analyzing { seq: u64 },
    Success { until: Instant },
    Error { message: String, until: Instant },
    /// The camera could not be acquired. Stays until cleared.
    DeviceError(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanTicket {
    seq: u64,
}

impl ScanTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug)]
pub enum ScanOutcome {
    /// A pending item was opened from the result.
    Opened,
    /// The extraction failed; the error is shown and the workflow is empty.
    Failed(StockError),
    /// The ticket was superseded or cancelled; nothing changed.
    Stale,
}

#[derive(Debug)]
pub struct ScanController {
    status: ScanStatus,
    last_seq: u64,
    outstanding: Option<u64>,
    delays: ScanDelays,
}

impl Default for ScanController {
    fn default() -> Self {
        Self::new(ScanDelays::default())
    }
}

impl ScanController {
    pub fn new(delays: ScanDelays) -> Self {
        Self {
            status: ScanStatus::Ready,
            last_seq: 0,
            outstanding: None,
            delays,
        }
    }

    pub fn delays(&self) -> ScanDelays {
        self.delays
    }

    /// Current status with expired success/error displays resolved to ready.
    pub fn status_at(&mut self, now: Instant) -> &ScanStatus {
        let expired = match &self.status {
            ScanStatus::Success { until } | ScanStatus::Error { until, .. } => now >= *until,
            _ => false,
        };
        if expired {
            self.status = ScanStatus::Ready;
        }
        &self.status
    }

    pub fn status(&mut self) -> &ScanStatus {
        self.status_at(Instant::now())
    }

    /// Start a capture. Refused while another extraction is in flight, while
    /// an item awaits confirmation, or while the camera is unavailable.
    pub fn begin(&mut self, workflow: &ConfirmationWorkflow) -> Result<ScanTicket, StockError> {
        match self.status() {
            ScanStatus::Analyzing { .. } => {
                return Err(StockError::Busy("an analysis is already running".into()));
            }
            ScanStatus::DeviceError(message) => {
                return Err(StockError::Busy(format!("camera unavailable: {message}")));
            }
            _ => {}
        }
        if workflow.is_pending() {
            return Err(StockError::Busy("an item is awaiting confirmation".into()));
        }

        self.last_seq += 1;
        let seq = self.last_seq;
        self.outstanding = Some(seq);
        self.status = ScanStatus::Analyzing { seq };
        debug!(seq, "Scan started");
        Ok(ScanTicket { seq })
    }

    /// Apply an extraction result. Results for anything but the outstanding
    /// ticket are dropped without touching status or workflow.
    pub fn complete(
        &mut self,
        ticket: ScanTicket,
        result: Result<ItemDraft, StockError>,
        workflow: &mut ConfirmationWorkflow,
    ) -> ScanOutcome {
        self.complete_at(ticket, result, workflow, Instant::now())
    }

    pub fn complete_at(
        &mut self,
        ticket: ScanTicket,
        result: Result<ItemDraft, StockError>,
        workflow: &mut ConfirmationWorkflow,
        now: Instant,
    ) -> ScanOutcome {
        if self.outstanding != Some(ticket.seq) {
            debug!(seq = ticket.seq, latest = self.last_seq, "Discarding stale scan result");
            return ScanOutcome::Stale;
        }
        self.outstanding = None;

        let opened = result.and_then(|draft| workflow.begin_new(draft.with_quantity(1)));
        match opened {
            Ok(()) => {
                info!(seq = ticket.seq, "Scan succeeded");
                self.status = ScanStatus::Success {
                    until: now + self.delays.success,
                };
                ScanOutcome::Opened
            }
            Err(e) => {
                warn!(seq = ticket.seq, error = %e, "Scan failed");
                self.status = ScanStatus::Error {
                    message: e.to_string(),
                    until: now + self.delays.error,
                };
                ScanOutcome::Failed(e)
            }
        }
    }

    /// Abandon the outstanding scan; its result will be stale.
    pub fn cancel(&mut self) {
        if let Some(seq) = self.outstanding.take() {
            debug!(seq, "Scan cancelled");
        }
        self.status = ScanStatus::Ready;
    }

    /// Record that the camera could not be acquired.
    pub fn device_failed(&mut self, error: &StockError) {
        warn!(error = %error, "Camera unavailable");
        self.outstanding = None;
        self.status = ScanStatus::DeviceError(error.to_string());
    }

    /// The user fixed the camera; scanning may resume.
    pub fn clear_device_error(&mut self) {
        if matches!(self.status, ScanStatus::DeviceError(_)) {
            self.status = ScanStatus::Ready;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::InventoryManager;
    use std::sync::Arc;
    use stockscan_core::EncodedFrame;
    use stockscan_extraction::{LabelExtractor, MockProvider};
    use stockscan_store::{MemoryKvStore, SnapshotStore};

    fn draft(brand: &str) -> ItemDraft {
        ItemDraft {
            brand: Some(brand.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_success_opens_pending_with_quantity_one() {
        let mut scanner = ScanController::default();
        let mut workflow = ConfirmationWorkflow::new();
        let now = Instant::now();

        let ticket = scanner.begin(&workflow).unwrap();
        assert_eq!(scanner.status_at(now), &ScanStatus::Analyzing { seq: ticket.seq() });

        let outcome = scanner.complete_at(ticket, Ok(draft("ACME").with_quantity(7)), &mut workflow, now);
        assert!(matches!(outcome, ScanOutcome::Opened));
        let pending = workflow.draft().unwrap();
        assert_eq!(pending.brand.as_deref(), Some("ACME"));
        assert_eq!(pending.quantity, Some(1));

        assert!(matches!(scanner.status_at(now), ScanStatus::Success { .. }));
        let later = now + Duration::from_millis(1500);
        assert_eq!(scanner.status_at(later), &ScanStatus::Ready);

        // Still blocked until the pending item is resolved.
        assert!(matches!(scanner.begin(&workflow), Err(StockError::Busy(_))));
        workflow.cancel();
        assert!(scanner.begin(&workflow).is_ok());
    }

    #[test]
    fn test_only_one_analysis_in_flight() {
        let mut scanner = ScanController::default();
        let workflow = ConfirmationWorkflow::new();
        scanner.begin(&workflow).unwrap();
        assert!(matches!(scanner.begin(&workflow), Err(StockError::Busy(_))));
    }

    #[test]
    fn test_stale_result_is_dropped() {
        let mut scanner = ScanController::default();
        let mut workflow = ConfirmationWorkflow::new();

        let first = scanner.begin(&workflow).unwrap();
        scanner.cancel();
        let second = scanner.begin(&workflow).unwrap();
        assert!(second.seq() > first.seq());

        let outcome = scanner.complete(first, Ok(draft("OLD")), &mut workflow);
        assert!(matches!(outcome, ScanOutcome::Stale));
        assert!(!workflow.is_pending());
        assert!(matches!(scanner.status(), ScanStatus::Analyzing { .. }));

        assert!(matches!(
            scanner.complete(second, Ok(draft("NEW")), &mut workflow),
            ScanOutcome::Opened
        ));
        assert_eq!(workflow.draft().unwrap().brand.as_deref(), Some("NEW"));

        // A ticket cannot be redeemed twice.
        assert!(matches!(
            scanner.complete(second, Ok(draft("AGAIN")), &mut workflow),
            ScanOutcome::Stale
        ));
    }

    #[test]
    fn test_cancel_resets_status_and_drops_result() {
        let mut scanner = ScanController::default();
        let mut workflow = ConfirmationWorkflow::new();
        let ticket = scanner.begin(&workflow).unwrap();
        scanner.cancel();
        assert_eq!(scanner.status(), &ScanStatus::Ready);
        assert!(matches!(
            scanner.complete(ticket, Ok(draft("LATE")), &mut workflow),
            ScanOutcome::Stale
        ));
        assert!(!workflow.is_pending());
    }

    #[test]
    fn test_device_error_is_persistent() {
        let mut scanner = ScanController::default();
        let workflow = ConfirmationWorkflow::new();
        scanner.device_failed(&StockError::Device("permission denied".into()));

        let far_future = Instant::now() + Duration::from_secs(3600);
        assert!(matches!(scanner.status_at(far_future), ScanStatus::DeviceError(_)));
        assert!(matches!(scanner.begin(&workflow), Err(StockError::Busy(_))));

        scanner.clear_device_error();
        assert!(scanner.begin(&workflow).is_ok());
    }

    #[tokio::test]
    async fn test_network_error_leaves_state_untouched() {
        let mut inventory =
            InventoryManager::load(SnapshotStore::new(Arc::new(MemoryKvStore::new()))).await;
        let mut workflow = ConfirmationWorkflow::new();
        let mut scanner = ScanController::default();
        let extractor = LabelExtractor::new(
            Arc::new(MockProvider::new("mock").failing("connection refused")),
            "mock",
        );

        let now = Instant::now();
        let ticket = scanner.begin(&workflow).unwrap();
        let result = extractor.extract(EncodedFrame::jpeg("AAAA", 1, 1)).await;
        let outcome = scanner.complete_at(ticket, result, &mut workflow, now);

        assert!(matches!(outcome, ScanOutcome::Failed(StockError::Network { .. })));
        assert!(matches!(scanner.status_at(now), ScanStatus::Error { .. }));
        assert!(!workflow.is_pending());
        assert!(inventory.is_empty());

        assert_eq!(
            scanner.status_at(now + Duration::from_millis(4000)),
            &ScanStatus::Ready
        );
        // Nothing to save either.
        assert!(workflow.save(&mut inventory).await.is_err());
    }
}
