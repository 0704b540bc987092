use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::builder::PossibleValuesParser;
use clap::{Args, Parser, Subcommand};
use log::info;

use riskscope::artifacts::{ArtifactStore, Verification};
use riskscope::encoding::{
    CategoryMap, CATEGORY_MAPS, CHECKING_STATUS, CREDIT_HISTORY, EMPLOYMENT, JOB, OTHER_DEBTORS,
    PERSONAL_STATUS, PROPERTY, SAVINGS_STATUS,
};
use riskscope::form::{
    AGE, CREDIT_AMOUNT, DURATION, INSTALLMENT_RATE, NUM_CREDITS, NUM_DEPENDENTS, RESIDENCE_SINCE,
};
use riskscope::{
    ApplicantForm, AssessError, Dashboard, DashboardConfig, NarrativeOrder, Purpose, SLIDERS,
};

#[derive(Parser)]
#[command(name = "riskscope", version, about = "Credit risk assessment with per-feature explanations")]
struct Cli {
    /// Configuration file (defaults to $RISKSCOPE_HOME/riskscope.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Assess one applicant and explain the prediction
    Assess(AssessArgs),
    /// List every form widget with its bounds, defaults and codes
    Form,
    /// Check the model and background data against the manifest
    Verify,
}

fn labels(map: &'static CategoryMap) -> PossibleValuesParser {
    PossibleValuesParser::new(map.labels())
}

#[derive(Args)]
struct AssessArgs {
    #[arg(long, default_value_t = DURATION.default,
          value_parser = clap::value_parser!(u32).range(DURATION.min as i64..=DURATION.max as i64))]
    duration: u32,
    #[arg(long, default_value_t = CREDIT_AMOUNT.default,
          value_parser = clap::value_parser!(u32).range(CREDIT_AMOUNT.min as i64..=CREDIT_AMOUNT.max as i64))]
    credit_amount: u32,
    #[arg(long, default_value_t = AGE.default,
          value_parser = clap::value_parser!(u32).range(AGE.min as i64..=AGE.max as i64))]
    age: u32,
    #[arg(long, default_value_t = INSTALLMENT_RATE.default,
          value_parser = clap::value_parser!(u32).range(INSTALLMENT_RATE.min as i64..=INSTALLMENT_RATE.max as i64))]
    installment_rate: u32,
    #[arg(long, default_value_t = RESIDENCE_SINCE.default,
          value_parser = clap::value_parser!(u32).range(RESIDENCE_SINCE.min as i64..=RESIDENCE_SINCE.max as i64))]
    residence_since: u32,
    #[arg(long, default_value_t = NUM_CREDITS.default,
          value_parser = clap::value_parser!(u32).range(NUM_CREDITS.min as i64..=NUM_CREDITS.max as i64))]
    num_credits: u32,
    #[arg(long, default_value_t = NUM_DEPENDENTS.default,
          value_parser = clap::value_parser!(u32).range(NUM_DEPENDENTS.min as i64..=NUM_DEPENDENTS.max as i64))]
    num_dependents: u32,

    #[arg(long, default_value = CHECKING_STATUS.default_label, value_parser = labels(&CHECKING_STATUS))]
    checking_status: String,
    #[arg(long, default_value = SAVINGS_STATUS.default_label, value_parser = labels(&SAVINGS_STATUS))]
    savings_status: String,
    #[arg(long, default_value = EMPLOYMENT.default_label, value_parser = labels(&EMPLOYMENT))]
    employment: String,
    #[arg(long, default_value = CREDIT_HISTORY.default_label, value_parser = labels(&CREDIT_HISTORY))]
    credit_history: String,
    #[arg(long, default_value = PERSONAL_STATUS.default_label, value_parser = labels(&PERSONAL_STATUS))]
    personal_status: String,
    #[arg(long, default_value = OTHER_DEBTORS.default_label, value_parser = labels(&OTHER_DEBTORS))]
    other_debtors: String,
    #[arg(long, default_value = PROPERTY.default_label, value_parser = labels(&PROPERTY))]
    property: String,
    #[arg(long, default_value = JOB.default_label, value_parser = labels(&JOB))]
    job: String,

    /// Has telephone
    #[arg(long)]
    telephone: bool,
    /// Foreign worker
    #[arg(long)]
    foreign_worker: bool,
    /// Loan purpose; repeat for several
    #[arg(long = "purpose", value_enum)]
    purposes: Vec<Purpose>,

    /// Order the explanation by contribution size instead of form order
    #[arg(long)]
    rank_by_magnitude: bool,
    /// Also write the waterfall chart as a Plotly JSON figure
    #[arg(long, value_name = "PATH")]
    chart_json: Option<PathBuf>,
}

impl AssessArgs {
    fn form(&self) -> ApplicantForm {
        ApplicantForm {
            duration: self.duration,
            credit_amount: self.credit_amount,
            age: self.age,
            installment_rate: self.installment_rate,
            residence_since: self.residence_since,
            num_credits: self.num_credits,
            num_dependents: self.num_dependents,
            checking_status: self.checking_status.clone(),
            savings_status: self.savings_status.clone(),
            employment: self.employment.clone(),
            credit_history: self.credit_history.clone(),
            personal_status: self.personal_status.clone(),
            other_debtors: self.other_debtors.clone(),
            property: self.property.clone(),
            job: self.job.clone(),
            telephone: self.telephone,
            foreign_worker: self.foreign_worker,
            purposes: self.purposes.clone(),
        }
    }

    fn order(&self) -> NarrativeOrder {
        if self.rank_by_magnitude {
            NarrativeOrder::Magnitude
        } else {
            NarrativeOrder::Schema
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = DashboardConfig::resolve(cli.config.as_deref()).context("Failed to load configuration")?;

    match &cli.command {
        Command::Assess(args) => assess(&config, args),
        Command::Form => {
            print_form();
            Ok(())
        }
        Command::Verify => verify(&config),
    }
}

fn assess(config: &DashboardConfig, args: &AssessArgs) -> Result<()> {
    let start = Instant::now();
    info!("=== Loading dashboard from {:?} ===", config.artifact_dir());
    let dashboard = Dashboard::load(config).context("Failed to load dashboard artifacts")?;
    info!("Dashboard loaded in {:.2?}", start.elapsed());

    let form = args.form();
    let assess_start = Instant::now();
    let report = match dashboard.submit(&form, args.order()) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("\n{}", e);
            if matches!(e, AssessError::Inference(_)) {
                eprintln!("\nSubmitted form:");
                print_submitted(&form);
            }
            return Err(e.into());
        }
    };
    info!("Assessment took {:.2?}", assess_start.elapsed());

    println!("{}", report);

    if let Some(path) = &args.chart_json {
        let figure = serde_json::to_string_pretty(&report.chart.to_plotly())?;
        fs::write(path, figure).with_context(|| format!("Failed to write chart to {:?}", path))?;
        info!("Wrote chart figure to {:?}", path);
    }
    Ok(())
}

fn print_submitted(form: &ApplicantForm) {
    for (slider, value) in form.slider_values() {
        eprintln!("  {:<32} {}", slider.caption, value);
    }
    for ((_, label), map) in form.selections().iter().zip(CATEGORY_MAPS.iter()) {
        eprintln!("  {:<32} {}", map.caption, label);
    }
    eprintln!("  {:<32} {}", "Has Telephone", form.telephone);
    eprintln!("  {:<32} {}", "Foreign Worker", form.foreign_worker);
    for purpose in Purpose::ALL {
        eprintln!("  {:<32} {}", purpose.caption(), form.has_purpose(purpose));
    }
}

fn print_form() {
    println!("Sliders:");
    for slider in SLIDERS {
        println!(
            "  --{:<18} {:<32} [{}, {}] default {}",
            slider.field.replace('_', "-"),
            slider.caption,
            slider.min,
            slider.max,
            slider.default
        );
    }

    println!("\nSelects:");
    for map in CATEGORY_MAPS {
        println!("  --{:<18} {} (default \"{}\")", map.field.replace('_', "-"), map.caption, map.default_label);
        for label in map.labels() {
            if let Ok(code) = map.encode(label) {
                println!("      {:<30} -> {}", label, code);
            }
        }
    }

    println!("\nCheckboxes:");
    println!("  --{:<18} Has Telephone", "telephone");
    println!("  --{:<18} Foreign Worker", "foreign-worker");
    for purpose in Purpose::ALL {
        let name = purpose.field().trim_start_matches("purpose_");
        println!("  --purpose {:<9} {}", name, purpose.caption());
    }
}

fn verify(config: &DashboardConfig) -> Result<()> {
    let store = ArtifactStore::new(config);
    println!("Model:      {:?}", store.model_path());
    println!("Background: {:?}", store.background_path());
    match store.verify().context("Artifact verification failed")? {
        Verification::Verified => println!("Artifacts match {:?}", store.manifest_path()),
        Verification::Unchecked => println!("No manifest at {:?}; digests not checked", store.manifest_path()),
    }
    Ok(())
}
