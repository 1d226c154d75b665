//! `dental-review` command line host
//!
//! - `simulate`: replay a scripted student or professional session
//! - `compare`: compare exported manual and AI readings

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use dcr_annotation::TableOracle;
use dcr_chart::{AiFinding, Condition, Dentition, Presence, ToothCode};
use dcr_compare::{chart_from_readings, ComparisonEngine, ToothReading};
use dcr_wizard::{
    Action, Collaborators, InMemoryImageStore, MemoryReportSink, Outcome, Payload, StaticCredentials,
    WizardConfig, WizardController,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Command::new("dental-review")
        .version(dcr_wizard::VERSION)
        .about("Dental chart review: manual vs AI annotation")
        .subcommand_required(true)
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Wizard configuration file (TOML)"),
        )
        .subcommand(
            Command::new("simulate")
                .about("Replay a scripted review session")
                .arg(
                    Arg::new("role")
                        .long("role")
                        .default_value("professional")
                        .value_parser(["student", "professional"])
                        .help("Session role"),
                ),
        )
        .subcommand(
            Command::new("compare")
                .about("Compare exported manual and AI readings")
                .arg(
                    Arg::new("manual")
                        .long("manual")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON map of tooth code to manual reading"),
                )
                .arg(
                    Arg::new("ai")
                        .long("ai")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON map of tooth code to AI reading"),
                )
                .arg(
                    Arg::new("dentition")
                        .long("dentition")
                        .default_value("permanent")
                        .value_parser(["permanent", "primary"])
                        .help("Dentition of the chart"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        );

    let matches = cli.get_matches();
    init_tracing(matches.get_flag("log-json"));

    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => WizardConfig::load(path)?,
        None => WizardConfig::default(),
    };

    match matches.subcommand() {
        Some(("simulate", args)) => simulate(config, args).await,
        Some(("compare", args)) => compare(args),
        _ => bail!("unknown command"),
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn simulate(config: WizardConfig, args: &ArgMatches) -> Result<()> {
    let role = args
        .get_one::<String>("role")
        .map_or("professional", String::as_str);

    let c47 = code("47")?;
    let oracle = TableOracle::new().with_entry(c47, AiFinding::present(Condition::Sound).with_confidence(0.93));
    let sink = Arc::new(MemoryReportSink::new());
    let collaborators = Collaborators {
        images: Arc::new(InMemoryImageStore::new()),
        auth: Arc::new(StaticCredentials::new().with_user("sarah", "password")?),
        oracle: Arc::new(oracle),
        sink: sink.clone(),
    };
    let mut wizard = WizardController::new(config, collaborators);

    let script = if role == "student" {
        vec![
            Action::LoginAsStudent,
            Action::Next,
            Action::Next,
            Action::SelectTooth { code: code("21")? },
            Action::Next,
        ]
    } else {
        let c16 = code("16")?;
        vec![
            Action::LoginAsProfessional {
                username: "sarah".to_string(),
                password: "password".to_string(),
            },
            Action::upload("case_1.jpeg", vec![0xFF, 0xD8, 0xFF]),
            Action::Next,
            Action::RecordPresence {
                code: c16,
                presence: Presence::Present,
            },
            Action::RecordCondition {
                code: c16,
                condition: Condition::DentalFilling,
            },
            Action::RecordCondition {
                code: c16,
                condition: Condition::RootCanalFilling,
            },
            Action::Submit { code: c16 },
            Action::Next,
            Action::SelectTooth { code: c47 },
            Action::SelectTooth { code: c47 },
            Action::Next,
            Action::Save,
        ]
    };

    let mut report = None;
    for action in script {
        let name = action.name();
        let outcome = wizard.dispatch(action).await;
        print_outcome(name, &outcome);
        if let Some(Payload::Report(r)) = outcome.payload {
            report = Some(r);
        }
    }

    println!();
    if let Some(report) = report {
        println!("{}", report.generate_text());
    }
    println!("Saved reports: {}", sink.len());

    let audit = wizard.take_audit();
    println!(
        "Audit entries: {} ({})",
        audit.len(),
        if audit.verify_integrity().is_ok() { "VALID" } else { "INVALID" }
    );
    Ok(())
}

fn print_outcome(action: &str, outcome: &Outcome) {
    let status = match outcome.error() {
        Some(err) => format!("error: {}", err.user_message()),
        None => "ok".to_string(),
    };
    println!("[{:<10}] {action}: {status}", outcome.page.title());
    for notice in &outcome.notices {
        println!("             {:?}: {}", notice.level, notice.message);
    }
}

fn compare(args: &ArgMatches) -> Result<()> {
    let manual_path = args
        .get_one::<PathBuf>("manual")
        .context("--manual is required")?;
    let ai_path = args.get_one::<PathBuf>("ai").context("--ai is required")?;
    let dentition = match args.get_one::<String>("dentition").map(String::as_str) {
        Some("primary") => Dentition::Primary,
        _ => Dentition::Permanent,
    };

    let manual = read_readings(manual_path)?;
    let ai = read_readings(ai_path)?;
    let chart = chart_from_readings(dentition, &manual, &ai).context("readings do not fit the chart")?;
    let report = ComparisonEngine::new().compare(&chart);

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.generate_text());
    }
    Ok(())
}

fn read_readings(path: &Path) -> Result<BTreeMap<ToothCode, ToothReading>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid readings in {}", path.display()))
}

fn code(raw: &str) -> Result<ToothCode> {
    raw.parse().with_context(|| format!("invalid tooth code {raw}"))
}
