use anyhow::{Context, Result};
use ncx_config::{EngineConfig, validate_config};
use ncx_core::types::OutputFormat;
use ncx_core::{EnumerationOrder, ServiceSpec};
use ncx_scheduler::{AttemptOutcome, CredentialCatalog, ServiceScheduler, Target};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

pub(crate) struct PlanArgs {
    pub target: String,
    pub users: PathBuf,
    pub passwords: PathBuf,
    pub passwords_first: bool,
    pub limit: Option<u64>,
    pub parallelism: Option<u32>,
}

/// One attempt as the scheduler would hand it out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct PlannedAttempt {
    pub index: u64,
    pub wave: u64,
    pub user: String,
    pub pass: String,
    pub from_pool: bool,
}

pub(crate) fn handle_plan(
    mut config: EngineConfig,
    args: PlanArgs,
    format: OutputFormat,
) -> Result<()> {
    if args.passwords_first {
        config.engine.order = EnumerationOrder::PasswordsPerUser;
    }
    validate_config(&config)?;

    let spec = ServiceSpec::parse(&args.target)?;
    let catalog = CredentialCatalog::from_files(&args.users, &args.passwords)?;
    info!(
        target = %spec,
        pairs = catalog.pair_count(),
        order = %config.order(),
        "Planning credential walk"
    );

    let mut service = build_scheduler(&spec, Arc::new(catalog), Arc::new(config));
    if let Some(parallelism) = args.parallelism {
        service.set_ideal_parallelism(parallelism);
    }

    let plan = run_plan(&mut service, args.limit);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    render_plan(&mut out, &service, &plan, &format)?;
    out.flush().context("Failed to flush plan output")?;
    Ok(())
}

pub(crate) fn build_scheduler(
    spec: &ServiceSpec,
    catalog: Arc<CredentialCatalog>,
    config: Arc<EngineConfig>,
) -> ServiceScheduler {
    let mut options = config.options_for(&spec.service);
    // A dry run never sleeps between connections.
    options.connection_delay_ms = None;

    let mut service = ServiceScheduler::new(spec.service.clone(), catalog, config);
    service.transport = spec.transport;
    service.port = spec.port;
    service.apply_options(&options);
    service.bind_target(Arc::new(Target::new(&spec.host)));
    service
}

/// Drive the admission loop: open attempts up to the budget, then report
/// each as rejected, until the scheduler runs dry or `limit` is reached.
pub(crate) fn run_plan(service: &mut ServiceScheduler, limit: Option<u64>) -> Vec<PlannedAttempt> {
    let mut plan = Vec::new();
    let mut wave = 0;
    loop {
        wave += 1;
        let mut sessions = Vec::new();
        while limit.is_none_or(|limit| (plan.len() as u64) < limit) {
            let Some(session) = service.open_attempt() else {
                break;
            };
            if let Some(pair) = session.pair() {
                plan.push(PlannedAttempt {
                    index: plan.len() as u64 + 1,
                    wave,
                    user: pair.user.clone(),
                    pass: pair.pass.clone(),
                    from_pool: session.is_from_pool(),
                });
            }
            sessions.push(session);
        }
        if sessions.is_empty() {
            break;
        }
        debug!(wave, opened = sessions.len(), "Closing wave");
        for session in sessions {
            service.close_attempt(session, AttemptOutcome::Rejected);
        }
    }
    plan
}

pub(crate) fn render_plan<W: Write>(
    out: &mut W,
    service: &ServiceScheduler,
    plan: &[PlannedAttempt],
    format: &OutputFormat,
) -> Result<()> {
    let snapshot = service.snapshot();
    match format {
        OutputFormat::Json => {
            for attempt in plan {
                writeln!(out, "{}", serde_json::to_string(attempt)?)?;
            }
            writeln!(out, "{}", serde_json::to_string(&snapshot)?)?;
        }
        OutputFormat::Text => {
            for attempt in plan {
                let source = if attempt.from_pool { "pool" } else { "fresh" };
                writeln!(
                    out,
                    "{:>6}  w{:<4} {:<24} {:<24} [{}]",
                    attempt.index, attempt.wave, attempt.user, attempt.pass, source
                )?;
            }
            let host = snapshot.host.as_deref().unwrap_or("-");
            writeln!(
                out,
                "{}://{}:{} ({}) status={} attempts={} parallelism={}",
                snapshot.name,
                host,
                snapshot.port,
                snapshot.transport,
                snapshot.status,
                snapshot.counters.total_attempts,
                snapshot.effective_parallelism
            )?;
        }
    }
    Ok(())
}
