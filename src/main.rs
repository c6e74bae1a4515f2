use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;

mod config;
mod db;
mod eligibility;
mod graph;
mod models;
mod recommend;
mod report;
mod risk;
mod schedule;
mod score;

use config::PlannerConfig;
use graph::CourseGraph;
use models::PlanOutcome;

#[derive(Parser)]
#[command(name = "degree-planner")]
#[command(about = "Graduation pathway optimizer over a course prerequisite graph", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load a realistic sample curriculum and students
    Seed,
    /// Import a course catalog from a CSV file
    ImportCourses {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Import student enrollment rows from a CSV file
    ImportEnrollments {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Compute the full multi-term graduation plan for a student
    Plan {
        #[arg(long)]
        email: String,
        /// JSON file overriding any subset of the planner configuration
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Rank next-term course suggestions for a student
    Recommend {
        #[arg(long)]
        email: String,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Rank peers with a similar learning style and course history
    Similar {
        #[arg(long)]
        email: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Write a markdown pathway report
    Report {
        #[arg(long)]
        email: String,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value = "pathway.md")]
        out: PathBuf,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<PlannerConfig> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse config {}", path.display()))
        }
        None => Ok(PlannerConfig::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::ImportCourses { csv } => {
            let inserted = db::import_courses_csv(&pool, &csv).await?;
            println!("Imported {inserted} courses from {}.", csv.display());
        }
        Commands::ImportEnrollments { csv } => {
            let inserted = db::import_enrollments_csv(&pool, &csv).await?;
            println!("Imported {inserted} enrollment rows from {}.", csv.display());
        }
        Commands::Plan {
            email,
            config,
            json,
        } => {
            let config = load_config(config.as_deref())?;
            let catalog = db::fetch_course_catalog(&pool).await?;
            let graph = CourseGraph::load(catalog)
                .context("course catalog failed prerequisite validation")?;
            let (student, _records) = db::fetch_student(&pool, &email).await?;
            let plan = schedule::optimize(&graph, &student, &config);

            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
                return Ok(());
            }

            match &plan.outcome {
                PlanOutcome::Complete if plan.terms.is_empty() => {
                    println!("All degree requirements are already satisfied.");
                }
                PlanOutcome::Complete => {
                    println!(
                        "Plan complete: {} terms, {} total credits.",
                        plan.terms.len(),
                        plan.total_credits()
                    );
                }
                PlanOutcome::Stalled { unresolved } => {
                    println!(
                        "Plan stalled after {} terms; {} requirements cannot be scheduled.",
                        plan.terms.len(),
                        unresolved.len()
                    );
                }
            }
            for term in &plan.terms {
                let courses: Vec<&str> =
                    term.courses.iter().map(|c| c.course_id.as_str()).collect();
                println!(
                    "Term {} ({}): {} [{} credits, {} risk]",
                    term.number,
                    term.term_type.as_tag(),
                    courses.join(", "),
                    term.total_credits,
                    term.risk_level.as_tag()
                );
            }
            for factor in &plan.risk_factors {
                println!(
                    "- [{}] {}: {}",
                    factor.severity.as_tag(),
                    factor.category.as_tag(),
                    factor.description
                );
            }
        }
        Commands::Recommend {
            email,
            config,
            limit,
        } => {
            let mut config = load_config(config.as_deref())?;
            config.recommendation_limit = limit;
            let catalog = db::fetch_course_catalog(&pool).await?;
            let graph = CourseGraph::load(catalog)
                .context("course catalog failed prerequisite validation")?;
            let (student, _records) = db::fetch_student(&pool, &email).await?;
            let recommendations = recommend::recommend_next_term(&graph, &student, &config);

            if recommendations.is_empty() {
                println!("No eligible courses for next term.");
                return Ok(());
            }
            println!("Recommended for next term:");
            for course in &recommendations {
                println!(
                    "- {} {} (score {:.2}, directly unlocks {} courses, success rate {:.0}%)",
                    course.course_id,
                    course.name,
                    course.score,
                    graph.direct_dependents_of(&course.course_id).len(),
                    course.success_rate * 100.0
                );
            }
        }
        Commands::Similar { email, limit } => {
            let config = PlannerConfig::default();
            let (student, _records) = db::fetch_student(&pool, &email).await?;
            let students = db::fetch_all_students(&pool).await?;
            let peers = recommend::similar_students(&students, &student, &config);

            if peers.is_empty() {
                println!("No other students to compare against.");
                return Ok(());
            }
            println!("Students most similar to {}:", student.name);
            for peer in peers.iter().take(limit) {
                println!(
                    "- {} ({}) similarity {:.2}, {} shared of {} completed courses",
                    peer.name,
                    peer.learning_style.as_tag(),
                    peer.similarity,
                    peer.shared_courses,
                    peer.completed_count
                );
            }
        }
        Commands::Report { email, config, out } => {
            let config = load_config(config.as_deref())?;
            let catalog = db::fetch_course_catalog(&pool).await?;
            let graph = CourseGraph::load(catalog)
                .context("course catalog failed prerequisite validation")?;
            let (student, records) = db::fetch_student(&pool, &email).await?;
            let plan = schedule::optimize(&graph, &student, &config);
            let report =
                report::build_report(&student, &records, &plan, &graph, Utc::now().date_naive());
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
