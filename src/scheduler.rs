use std::sync::Arc;

use tokio::time::{ interval, Duration };

use crate::services::VipService;

/// Drives the daily-earnings pass on a fixed interval. A tight interval
/// is safe: the per-date guard in the earnings pass makes reruns within
/// the same day no-ops.
pub struct EarningsScheduler {
    vip_service: Arc<VipService>,
    interval_secs: u64,
}

impl EarningsScheduler {
    pub fn new(vip_service: Arc<VipService>, interval_secs: u64) -> Self {
        Self { vip_service, interval_secs }
    }

    pub async fn start(self) {
        let mut interval = interval(Duration::from_secs(self.interval_secs));

        loop {
            interval.tick().await;

            match self.vip_service.process_daily_earnings().await {
                Ok(report) => {
                    if report.paid > 0 || report.matured > 0 || report.failed > 0 {
                        tracing::info!(
                            paid = report.paid,
                            matured = report.matured,
                            skipped = report.skipped,
                            failed = report.failed,
                            "Daily earnings pass finished"
                        );
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Daily earnings pass failed");
                }
            }
        }
    }
}
