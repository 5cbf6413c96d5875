//! `roster seed` command - Fill the backend with generated demo data

use console::style;
use miette::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::cli::helpers::{connect, load_config};
use crate::cli::GlobalOpts;
use crate::core::seed::{self, SeedReport, MAX_EMPLOYEES, MAX_QUALIFICATIONS};

#[derive(clap::Args, Debug)]
pub struct SeedArgs {
    /// Number of qualifications to generate (1-20)
    #[arg(long, short = 'q', default_value_t = 10)]
    pub qualifications: usize,

    /// Number of employees to generate (1-10000)
    #[arg(long, short = 'e', default_value_t = 10)]
    pub employees: usize,

    /// Seed for reproducible data
    #[arg(long)]
    pub seed: Option<u64>,
}

pub async fn run(args: SeedArgs, global: &GlobalOpts) -> Result<()> {
    if args.qualifications > MAX_QUALIFICATIONS || args.employees > MAX_EMPLOYEES {
        eprintln!(
            "{} Counts are capped at {} qualifications and {} employees",
            style("!").yellow(),
            MAX_QUALIFICATIONS,
            MAX_EMPLOYEES
        );
    }

    let config = load_config(global);
    let coordinator = connect(global, &config, true)?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let report = seed::seed(&coordinator, &mut rng, args.qualifications, args.employees).await?;
    print_report(&report);

    if report.employees_created == 0 && report.qualifications_created == 0 {
        return Err(miette::miette!("Nothing was created"));
    }
    Ok(())
}

fn print_report(report: &SeedReport) {
    println!();
    println!("{}", style("Seeding Summary").bold());
    println!("{}", style("─".repeat(40)).dim());
    println!(
        "Qualifications: {} created, {} already present, {} failed",
        style(report.qualifications_created).green(),
        report.qualifications_skipped,
        report.qualifications_failed
    );
    println!(
        "Employees:      {} created, {} failed",
        style(report.employees_created).green(),
        report.employees_failed
    );
}
