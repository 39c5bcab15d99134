use chrono::Local;
use clap::Parser;
use deprovisioner::config::AppConfig;
use deprovisioner::directory::{DeprovisionMode, ZoomClient};
use deprovisioner::error::AppError;
use deprovisioner::telemetry;
use deprovisioner::workflows::deprovision::report::{format_duration, tier_projections};
use deprovisioner::workflows::deprovision::{
    run_stamp, ConfirmationGate, ConsolePrompter, CsvBackupWriter, DeprovisioningWorkflow,
    Disposition, Prompter, SystemClock, WorkflowOutcome,
};
use deprovisioner::workflows::import::{clean_prompted_path, IdentityImporter};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "zoom-deprovisioner",
    about = "Deprovision the Zoom users listed in an imported CSV file",
    long_about = "Compares an imported CSV of user e-mails (header in row 1, e-mails in column 1) \
                  with the live Zoom user listing, backs up every current user, and after a \
                  two-step confirmation deprovisions the users found in both. Zoom accepts at \
                  most 10 requests per second, so large lists take a while.",
    version
)]
struct Cli {
    /// Filepath for the CSV list of Zoom users to deprovision (prompted for when omitted)
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,
    /// JSON file with root_request_url, api_key, api_secret and data_type
    #[arg(long)]
    api_config: Option<PathBuf>,
    /// Directory for the run's log and backup files
    #[arg(long)]
    log_dir: Option<PathBuf>,
    /// Deprovisioning call to issue: delete (permanent) or deactivate
    #[arg(long, value_parser = parse_mode)]
    mode: Option<DeprovisionMode>,
}

fn main() {
    if let Err(err) = run_cli() {
        eprintln!("application error ({} phase): {err}", err.phase());
        std::process::exit(1);
    }
}

fn run_cli() -> Result<(), AppError> {
    let Cli {
        file,
        api_config,
        log_dir,
        mode,
    } = Cli::parse();

    let mut config = match api_config {
        Some(path) => AppConfig::load_with_api_file(&path)?,
        None => AppConfig::load()?,
    };
    if let Some(dir) = log_dir {
        config.run.log_dir = dir;
    }
    if let Some(mode) = mode {
        config.run.mode = mode;
    }

    let stamp = run_stamp(Local::now());
    let log_path = telemetry::log_file_path(&config.run.log_dir, &stamp);
    telemetry::init(&config.telemetry, Some(&log_path))?;
    info!(log = %log_path.display(), "welcome to Zoom user deprovisioner");

    let mut prompter = ConsolePrompter::stdio();
    let csv_path = match file {
        Some(path) => {
            info!("using provided file argument");
            path
        }
        None => {
            info!("did not detect file argument, asking for input instead");
            let answer = prompter
                .ask("Please enter a filepath for CSV Zoom users to deprovision list: ")?;
            clean_prompted_path(&answer)
        }
    };

    let targets = IdentityImporter::from_path(&csv_path)?;
    let client = ZoomClient::new(&config.zoom, config.run.mode)?;
    let backup = CsvBackupWriter::new(&config.run.log_dir, stamp);
    let gate = match config.run.confirmation_phrase.as_deref() {
        Some(phrase) => ConfirmationGate::new(phrase),
        None => ConfirmationGate::with_random_phrase(),
    };

    let workflow =
        DeprovisioningWorkflow::new(&client, &backup, SystemClock, config.run.rate_limit());
    let outcome = workflow.run(&targets, gate, &mut prompter)?;

    render_outcome(&outcome, targets.len(), config.run.mode);
    Ok(())
}

fn parse_mode(raw: &str) -> Result<DeprovisionMode, String> {
    DeprovisionMode::parse(raw)
        .ok_or_else(|| format!("unknown mode '{raw}' (expected 'delete' or 'deactivate')"))
}

fn render_outcome(outcome: &WorkflowOutcome, imported: usize, mode: DeprovisionMode) {
    let reconciliation = &outcome.reconciliation;

    println!("\nZoom user deprovisioning");
    println!("Backup of current users: {}", outcome.backup_location);
    println!(
        "Imported identities: {} ({} matched, {} without a Zoom account)",
        imported,
        reconciliation.matched_accounts.len(),
        reconciliation.unmatched_identifiers.len()
    );

    println!("\nAccounts by tier");
    for row in tier_projections(reconciliation) {
        println!(
            "- {}: {} now, {} after deprovisioning",
            row.tier_label, row.before, row.after
        );
    }
    println!(
        "- Total: {} now, {} after deprovisioning",
        reconciliation.total_before(),
        reconciliation.total_after()
    );

    match &outcome.disposition {
        Disposition::NothingToDeprovision => {
            println!("\nNo imported users were found in Zoom. Nothing to do.");
        }
        Disposition::Aborted => {
            println!("\nDeprovisioning was not confirmed. No users were changed.");
        }
        Disposition::Completed(summary) => {
            println!(
                "\nDeprovisioning ({}) finished in {}",
                mode.label(),
                format_duration(summary.elapsed)
            );
            println!(
                "Attempted {}, succeeded {}, failed {}",
                summary.attempted, summary.succeeded, summary.failed
            );
            for failure in summary.failures() {
                println!("- failed: {} ({})", failure.email, failure.account_id);
            }
            println!(
                "Recommended: confirm the new user counts and keep the backup listing file."
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn file_argument_is_optional() {
        let cli = Cli::try_parse_from(["zoom-deprovisioner"]).expect("parses");
        assert!(cli.file.is_none());
        assert!(cli.mode.is_none());

        let cli = Cli::try_parse_from(["zoom-deprovisioner", "-f", "users.csv"]).expect("parses");
        assert_eq!(cli.file, Some(PathBuf::from("users.csv")));
    }

    #[test]
    fn mode_argument_is_validated() {
        let cli = Cli::try_parse_from(["zoom-deprovisioner", "--mode", "deactivate"])
            .expect("parses");
        assert_eq!(cli.mode, Some(DeprovisionMode::Deactivate));

        assert!(Cli::try_parse_from(["zoom-deprovisioner", "--mode", "archive"]).is_err());
    }
}
