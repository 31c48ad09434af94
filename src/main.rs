use dotenvy::dotenv;
use homeroom::{
    School,
    config::{database, settings},
    display,
    errors::{Error, Result},
};
use std::env;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: homeroom dashboard | homeroom assign <student> <classroom> <actor>";

/// Sub-commands of the `homeroom` binary.
enum Command {
    Dashboard,
    Assign {
        student_id: i64,
        classroom_id: i64,
        actor_id: i64,
    },
}

fn parse_id(value: &str, what: &str) -> Result<i64> {
    value.parse().map_err(|e| Error::Validation {
        message: format!("Invalid {what} ID '{value}': {e}"),
    })
}

fn parse_command(args: &[String]) -> Result<Command> {
    match args {
        [] => Ok(Command::Dashboard),
        [cmd] if cmd == "dashboard" => Ok(Command::Dashboard),
        [cmd, student, classroom, actor] if cmd == "assign" => Ok(Command::Assign {
            student_id: parse_id(student, "student")?,
            classroom_id: parse_id(classroom, "classroom")?,
            actor_id: parse_id(actor, "actor")?,
        }),
        _ => Err(Error::Validation {
            message: USAGE.to_string(),
        }),
    }
}

async fn run(school: &School, command: Command) -> Result<()> {
    match command {
        Command::Dashboard => match school.dashboard().await {
            Ok(dashboard) => {
                println!("{}", display::format_dashboard(&dashboard));
                Ok(())
            }
            Err(Error::NoActiveYear) => {
                warn!("Dashboard requested but no academic year is active");
                println!("No academic year is active.");
                Ok(())
            }
            Err(e) => Err(e),
        },
        Command::Assign {
            student_id,
            classroom_id,
            actor_id,
        } => {
            let assignment = school
                .assign_student(student_id, classroom_id, actor_id)
                .await
                .inspect_err(|e| {
                    if e.is_retryable() {
                        warn!("Assignment of student {student_id} hit a busy database: {e}");
                    } else {
                        error!("Assignment of student {student_id} to classroom {classroom_id} failed: {e}");
                    }
                })?;

            info!(
                student_id,
                classroom_id,
                academic_year_id = assignment.academic_year_id,
                actor_id,
                "Student assigned"
            );
            println!(
                "Assigned student {student_id} to classroom {classroom_id} for academic year {}",
                assignment.academic_year_id
            );
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load .env file (as early as possible)
    let dotenv_loaded = dotenv().is_ok(); // Non-fatal, env vars can be set externally

    // 2. Load settings (the log level fallback lives there)
    let settings = settings::load_default_settings()?;

    // 3. Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .init();
    info!(dotenv_loaded, "Settings loaded.");

    // 4. Connect and make sure the schema exists
    let db = database::create_connection(&settings.database)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Dispatch the sub-command
    let args: Vec<String> = env::args().skip(1).collect();
    let command = parse_command(&args).inspect_err(|e| error!("{}", e))?;

    let school = School::new(db);
    run(&school, command).await
}
