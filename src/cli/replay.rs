use super::config::{ReplayConfig, Step};
use super::duration_parse::parse_duration_to_secs;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use timelock::vault::mock::RecordingTarget;
use timelock::vault::{Call, ExternalTarget, ManualClock, TimelockError, TimelockVault, VaultEvent};

/// Outcome of one replay step
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub action: &'static str,
    pub ok: bool,
    pub detail: String,
    /// Error category for failed steps
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Final state of the recording target
#[derive(Debug, Clone, Serialize)]
pub struct TargetReport {
    pub address: String,
    pub balance: u128,
    pub call_count: u64,
    pub received_count: u64,
    pub message: String,
}

/// Full replay report
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub steps: Vec<StepReport>,
    pub events: Vec<VaultEvent>,
    pub target: TargetReport,
    pub ledger_time: u64,
}

/// Write a sample replay file
pub fn init(path: String, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = PathBuf::from(path);
    if path.exists() && !force {
        return Err(format!(
            "Replay file '{}' already exists (use --force to overwrite)",
            path.display()
        )
        .into());
    }

    ReplayConfig::create_default(&path)?;
    println!("Created: {}", path.display());
    Ok(())
}

/// Run a replay file
///
/// Step failures are part of the report, not errors: a replay that shows an
/// early `execute` failing with `NotReadyYet` is working as intended. Only
/// unreadable files and references to unknown labels abort the run.
pub fn execute(path: String, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = ReplayConfig::load(&PathBuf::from(&path))?;
    super::init_logging(&config.logging.level);

    let report = run(&config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

/// Run every step against a fresh vault
pub fn run(config: &ReplayConfig) -> Result<ReplayReport, Box<dyn std::error::Error>> {
    let clock = ManualClock::new(config.vault.start_time);
    let mut vault = TimelockVault::with_config(
        config.vault.owners.iter().copied(),
        Arc::new(clock.clone()),
        config.timelock_config()?,
    )?;
    let mut target = RecordingTarget::new(config.vault.target);
    let mut labelled: HashMap<String, Call> = HashMap::new();
    let mut steps = Vec::with_capacity(config.steps.len());

    for (index, step) in config.steps.iter().enumerate() {
        tracing::debug!(index, action = step.action(), "replay step");

        let outcome: Result<String, TimelockError> = match step {
            Step::Queue {
                label,
                caller,
                selector,
                payload,
                value,
                delay,
            } => {
                let eta = vault
                    .now()
                    .saturating_add(parse_duration_to_secs(delay)?);
                let call = Call::new(
                    config.vault.target,
                    selector.clone(),
                    payload.clone().into_bytes(),
                    *value,
                    eta,
                );
                let result = vault.add_to_queue(caller, call.clone());
                if result.is_ok() {
                    labelled.insert(label.clone(), call);
                }
                result.map(|id| format!("{} queued as {} (eta {})", label, id, eta))
            }
            Step::Confirm { caller, tx } => {
                let id = lookup(&labelled, tx)?.id()?;
                vault
                    .confirm(caller, &id)
                    .map(|count| format!("{} confirmed by {} ({} total)", tx, caller, count))
            }
            Step::Cancel { caller, tx } => {
                let id = lookup(&labelled, tx)?.id()?;
                vault
                    .cancel_confirmation(caller, &id)
                    .map(|count| format!("{} cancelled by {} ({} total)", tx, caller, count))
            }
            Step::Execute { caller, tx, value } => {
                let mut call = lookup(&labelled, tx)?.clone();
                if let Some(value) = value {
                    call.value = *value;
                }
                vault
                    .execute(caller, &mut target, &call)
                    .map(|id| format!("{} executed ({})", tx, id))
            }
            Step::Advance { by } => {
                let now = clock.advance(parse_duration_to_secs(by)?);
                Ok(format!("ledger time {}", now))
            }
        };

        steps.push(match outcome {
            Ok(detail) => StepReport {
                index,
                action: step.action(),
                ok: true,
                detail,
                kind: None,
            },
            Err(err) => StepReport {
                index,
                action: step.action(),
                ok: false,
                detail: err.to_string(),
                kind: Some(format!("{:?}", err.kind())),
            },
        });
    }

    Ok(ReplayReport {
        steps,
        events: vault.events().to_vec(),
        target: TargetReport {
            address: target.address().to_string(),
            balance: target.balance(),
            call_count: target.call_count(),
            received_count: target.received_count(),
            message: target.message().to_string(),
        },
        ledger_time: vault.now(),
    })
}

fn lookup<'a>(
    labelled: &'a HashMap<String, Call>,
    label: &str,
) -> Result<&'a Call, Box<dyn std::error::Error>> {
    labelled
        .get(label)
        .ok_or_else(|| format!("Unknown transaction label '{}'", label).into())
}

fn print_report(report: &ReplayReport) {
    for step in &report.steps {
        match &step.kind {
            None => println!("[{}] {:<8} ok     {}", step.index, step.action, step.detail),
            Some(kind) => println!(
                "[{}] {:<8} FAILED {} ({})",
                step.index, step.action, step.detail, kind
            ),
        }
    }

    println!();
    println!("Events:");
    for event in &report.events {
        match event {
            VaultEvent::Queue { id, .. } => println!("  Queue({})", id),
            VaultEvent::Confirm { id, owner } => println!("  Confirm({}, {})", id, owner),
            VaultEvent::CancelConfirmation { id, owner } => {
                println!("  CancelConfirmation({}, {})", id, owner)
            }
            VaultEvent::Execute { id, executed_at } => {
                println!("  Execute({}) at {}", id, executed_at)
            }
        }
    }

    println!();
    println!("Target {}:", report.target.address);
    println!("  balance:  {}", report.target.balance);
    println!("  calls:    {}", report.target.call_count);
    println!("  received: {}", report.target.received_count);
    println!("  message:  {:?}", report.target.message);
    println!("Ledger time: {}", report.ledger_time);
}
