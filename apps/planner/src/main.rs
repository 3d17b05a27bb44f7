use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use planner_core::{
    DropEvent, DropOutcome, FixedClock, PlannerPage, RestPlanningBackend, SemesterClock,
    SystemClock,
};
use shared::domain::{Bucket, Module, ModuleId, Semester};
use tracing_subscriber::EnvFilter;

mod config;

use config::load_settings;

#[derive(Parser, Debug)]
#[command(name = "planner", about = "Plan upcoming semesters of a study program")]
struct Args {
    /// Base URL of the planning REST API.
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    student_id: Option<i64>,
    /// Semester label treated as "now", e.g. 2024W.
    #[arg(long)]
    reference_semester: Option<Semester>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Timeline with completed, booked and planned modules per semester.
    Overview,
    /// Open proposals whose title contains the term.
    Search { term: String },
    /// Drag a module from one list into another.
    Move {
        #[arg(long)]
        module: i64,
        #[arg(long)]
        from: Bucket,
        #[arg(long)]
        to: Bucket,
        #[arg(long)]
        semester: Semester,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(api_url) = args.api_url {
        settings.api_url = api_url;
    }
    if let Some(student_id) = args.student_id {
        settings.student_id = student_id;
    }
    if args.reference_semester.is_some() {
        settings.reference_semester = args.reference_semester;
    }

    let backend = RestPlanningBackend::new(
        &settings.api_url,
        settings.endpoints.clone(),
        settings.rest_options(),
    )?;
    let clock: Box<dyn SemesterClock> = match settings.reference_semester {
        Some(semester) => Box::new(FixedClock(semester)),
        None => Box::new(SystemClock),
    };
    let mut page = PlannerPage::new(Arc::new(backend), settings.session(), clock.as_ref());
    page.load().await?;

    match args.command {
        Command::Overview => print_overview(&page),
        Command::Search { term } => {
            page.set_search(term);
            for module in page.filtered_proposals() {
                println!("{}", describe(module));
            }
        }
        Command::Move {
            module,
            from,
            to,
            semester,
        } => {
            let outcome = page
                .handle_drop(DropEvent {
                    origin: from,
                    destination: to,
                    module_id: ModuleId(module),
                    semester,
                })
                .await?;
            match outcome {
                DropOutcome::PlanningCreated(id) => println!("planned module {module} (planning {id})"),
                DropOutcome::PlanningDeleted(id) => println!("removed planning {id}"),
                DropOutcome::PlanningUpdated(id) => {
                    println!("moved planning {id} to {semester}")
                }
                DropOutcome::LocalOnly => println!("nothing to synchronise for module {module}"),
            }
        }
    }

    Ok(())
}

fn describe(module: &Module) -> String {
    format!("#{:<5} {} ({} ECTS)", module.id.0, module.title, module.ects)
}

fn print_overview(page: &PlannerPage) {
    println!(
        "upcoming semester {}, after next {}",
        page.upcoming_semester(),
        page.after_next_semester()
    );
    for semester in page.ordered_semesters() {
        println!("\n{semester}  [{} ECTS]", page.semester_ects(&semester));
        for bucket in [Bucket::Completions, Bucket::Bookings, Bucket::Plannings] {
            for module in page.modules_in(bucket, &semester) {
                println!("  {:<12} {}", bucket, describe(module));
            }
        }
    }
    println!(
        "\n{} open proposals, {} ECTS completed, booked or planned",
        page.buckets().get(Bucket::Proposals).len(),
        page.total_ects()
    );
}
