use crate::commands::{build_service, load_config, Service};
use crate::output::Output;
use color_eyre::Result;
use learn_sync_config::{default_scheduler_config, SchedulerConfig};
use std::sync::Arc;
use std::time::Instant;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

pub struct Scheduler {
    scheduler: JobScheduler,
    service: Arc<Service>,
    config: SchedulerConfig,
}

impl Scheduler {
    pub async fn new(service: Arc<Service>, config: SchedulerConfig) -> Result<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Failed to create job scheduler: {}", e))?;

        Ok(Self {
            scheduler,
            service,
            config,
        })
    }

    /// Register the cron job, optionally run once immediately, then block until Ctrl-C
    pub async fn start(&mut self) -> Result<()> {
        if self.config.run_on_startup {
            info!(operation = "scheduler_startup", "Running initial reconciliation on startup");
            run_pass(&self.service).await;
        }

        let service = Arc::clone(&self.service);
        let job = Job::new_async(self.config.schedule.as_str(), move |_uuid, _scheduler| {
            let service = Arc::clone(&service);
            Box::pin(async move {
                info!(operation = "scheduled_reconcile_start", "Starting scheduled reconciliation");
                run_pass(&service).await;
            })
        })
        .map_err(|e| color_eyre::eyre::eyre!("Invalid cron schedule '{}': {}", self.config.schedule, e))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Failed to register scheduled job: {}", e))?;
        self.scheduler
            .start()
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Failed to start scheduler: {}", e))?;

        info!(
            operation = "scheduler_started",
            schedule = %self.config.schedule,
            store = self.service.store().store_name(),
            "Scheduler started"
        );

        tokio::signal::ctrl_c().await?;
        info!(operation = "scheduler_shutdown", "Shutdown signal received");
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Failed to stop scheduler: {}", e))?;
        Ok(())
    }
}

/// One batch pass. Failures are logged and never stop the daemon.
async fn run_pass(service: &Service) {
    let start = Instant::now();
    match service.reconcile_all().await {
        Ok(items) => {
            let failed = items.iter().filter(|item| item.result.is_err()).count();
            let written = items
                .iter()
                .filter(|item| matches!(&item.result, Ok(report) if report.written))
                .count();
            if failed > 0 {
                warn!(operation = "scheduled_reconcile_partial", failed, "Some users could not be reconciled");
            }
            info!(
                operation = "scheduled_reconcile_complete",
                users = items.len(),
                written,
                failed,
                duration_ms = start.elapsed().as_millis() as u64,
                "Scheduled reconciliation completed"
            );
        }
        Err(e) => {
            error!(operation = "scheduled_reconcile_error", error = %e, "Scheduled reconciliation failed");
        }
    }
}

fn effective_scheduler_config(
    from_file: Option<&SchedulerConfig>,
    schedule_override: Option<String>,
    no_startup_run: bool,
) -> SchedulerConfig {
    let base = from_file.cloned().unwrap_or_else(default_scheduler_config);
    SchedulerConfig {
        schedule: schedule_override.unwrap_or(base.schedule),
        run_on_startup: base.run_on_startup && !no_startup_run,
    }
}

pub async fn run_daemon(schedule_override: Option<String>, no_startup_run: bool, output: &Output) -> Result<()> {
    let config = load_config()?;
    let scheduler_config = effective_scheduler_config(config.scheduler.as_ref(), schedule_override, no_startup_run);

    let service = Arc::new(build_service(&config, false)?);

    output.info(format!(
        "Reconciling on schedule '{}' (UTC), press Ctrl-C to stop",
        scheduler_config.schedule
    ));

    let mut scheduler = Scheduler::new(service, scheduler_config).await?;
    scheduler.start().await
}
