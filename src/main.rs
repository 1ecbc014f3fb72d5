use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use startup_profit::{Query, ServiceConfig, ServiceError, Session, Similar};

#[derive(Parser, Debug)]
#[command(version, about = "Startup profit prediction", long_about = None)]
struct Args {
    /// JSON config file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dataset CSV path
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Model artifact path
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Number of similar records to show
    #[arg(short, long)]
    neighbors: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dataset overview: headline figures, input ranges, preview rows
    Info,
    /// Predict the profit of a startup and list similar ones
    Predict {
        /// R&D Spend
        #[arg(long)]
        rd: f64,
        /// Administration
        #[arg(long)]
        admin: f64,
        /// Marketing Spend
        #[arg(long)]
        marketing: f64,
        /// State label, e.g. "New York"
        #[arg(long)]
        state: String,
    },
    /// Replace the model artifact with the given file
    UploadModel { file: PathBuf },
    /// Write the dataset as CSV (UTF-8 with BOM)
    Export { out: PathBuf },
}

impl Args {
    fn service_config(&self) -> Result<ServiceConfig> {
        let mut config = match &self.config {
            Some(path) => ServiceConfig::from_file(path)?,
            None => ServiceConfig::default(),
        };
        if let Some(data) = &self.data {
            config.data_path = data.clone();
        }
        if let Some(model) = &self.model {
            config.model_path = model.clone();
        }
        if let Some(n) = self.neighbors {
            config.neighbors = n;
        }
        Ok(config)
    }
}

fn main() -> Result<ExitCode> {
    env_logger::init();

    let args = Args::parse();
    let mut session = Session::open(args.service_config()?)?;

    let outcome = match args.command {
        Command::Info => info(&session),
        Command::Predict {
            rd,
            admin,
            marketing,
            state,
        } => predict(&mut session, &Query::new(rd, admin, marketing, state)),
        Command::UploadModel { file } => {
            let bytes =
                std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            session.upload_model(&bytes).map(|()| {
                println!("Model stored. Run a prediction again to use it.");
            })
        }
        Command::Export { out } => {
            let bytes = session.export()?;
            std::fs::write(&out, bytes).with_context(|| format!("writing {}", out.display()))?;
            println!("Wrote {} records to {}", session.dataset().len(), out.display());
            Ok(())
        }
    };

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            log::error!("{e}");
            eprintln!("{}", e.user_message());
            if e.needs_upload() {
                eprintln!("Hint: startup-profit upload-model <file>");
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn info(session: &Session) -> Result<(), ServiceError> {
    let dataset = session.require_dataset()?;

    if let Some(summary) = dataset.profit_summary() {
        println!("Samples:        {}", summary.samples);
        println!("Mean profit:    {:.0}", summary.mean_profit);
        println!("Median profit:  {:.0}", summary.median_profit);
    }

    println!();
    println!("Records per state:");
    for (state, count) in dataset.state_counts() {
        println!("  {state:<12} {count}");
    }

    let bounds = session.input_bounds()?;
    println!();
    println!("{:<16} {:>12} {:>12} {:>12}", "Input", "min", "median", "max");
    for (name, b) in [
        ("R&D Spend", bounds.rd_spend),
        ("Administration", bounds.administration),
        ("Marketing Spend", bounds.marketing_spend),
    ] {
        println!("{name:<16} {:>12.0} {:>12.0} {:>12.0}", b.min, b.median, b.max);
    }

    println!();
    print_header();
    for record in dataset.head(session.config().sample_rows) {
        println!("{record}");
    }
    Ok(())
}

fn predict(session: &mut Session, query: &Query) -> Result<(), ServiceError> {
    let evaluation = session.evaluate(query)?;
    println!("Predicted profit: {:.0}", evaluation.prediction);
    println!();

    match evaluation.similar {
        Similar::Nearest(found) => {
            println!("Most similar startups:");
            print_header();
            for n in found {
                println!("{}   (distance {:.1})", n.record, n.distance);
            }
        }
        Similar::Sample(rows) => {
            println!("Similar startups unavailable; random sample:");
            print_header();
            for record in rows {
                println!("{record}");
            }
        }
    }
    Ok(())
}

fn print_header() {
    println!(
        "{:>12} {:>14} {:>15}  {:<12} {:>12}",
        "R&D Spend", "Administration", "Marketing Spend", "State", "Profit"
    );
}
