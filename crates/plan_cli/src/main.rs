use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use plan_control::{DeselectOutcome, JsonFileStore, PlanSession};
use plan_core::{InstanceId, ModuleCode, ProgramId, SelectMode, SelectionStatus, Semester};
use plan_world::{validate_catalog, ContentDir};
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "plan_cli", about = "Curriculum module planner")]
struct Cli {
    #[arg(long, global = true, default_value = "./content")]
    content_dir: String,
    /// Where the selection is saved between runs.
    #[arg(long, global = true, default_value = "./plan.json")]
    plan_file: String,
    /// Restrict the catalog to one program and track its credit requirements.
    #[arg(long, global = true)]
    program: Option<String>,
    /// Seed for instance ids. Random if omitted.
    #[arg(long, global = true)]
    seed: Option<u64>,
    /// Log at debug level. `RUST_LOG` overrides.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List offered modules with their selection status.
    Modules {
        #[arg(long)]
        semester: Option<Semester>,
    },
    /// Select a module in a semester.
    Select {
        code: String,
        semester: Semester,
        /// Move the module here if it is already selected elsewhere.
        #[arg(long = "move")]
        move_existing: bool,
    },
    /// Deselect a module and everything that depends on it.
    Deselect {
        code: String,
        /// Remove dependents without asking.
        #[arg(long)]
        yes: bool,
    },
    /// Credits per category against the program's requirements.
    Progress,
    /// The current plan, semester by semester.
    Show,
    /// Drop every selection.
    Clear,
    /// Check the content directory for authoring problems.
    Validate,
}

// ---------------------------------------------------------------------------
// Session setup
// ---------------------------------------------------------------------------

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn open_session(cli: &Cli) -> Result<PlanSession<JsonFileStore>> {
    let content = ContentDir::new(&cli.content_dir);
    let config = content
        .config()
        .with_context(|| format!("loading config from {}", cli.content_dir))?;
    let seed = cli.seed.unwrap_or_else(rand::random);
    let mut session = PlanSession::new(config, JsonFileStore::new(&cli.plan_file), seed);

    let program = cli.program.clone().map(ProgramId);
    session.load_catalog(&content, program.as_ref())?;
    if let Some(program) = &program {
        session.load_requirements(&content, program)?;
    }
    Ok(session)
}

/// The instance of `code` in `semester`, or any instance of `code` so the
/// engine can report where it is actually offered.
fn resolve_instance(
    session: &PlanSession<JsonFileStore>,
    code: &ModuleCode,
    semester: Semester,
) -> Result<InstanceId> {
    let catalog = session.catalog().context("no catalog loaded")?;
    catalog
        .instance_at(code, semester)
        .or_else(|| catalog.instances_of(code).next())
        .map(|inst| inst.id)
        .with_context(|| format!("unknown module {code}"))
}

fn describe(session: &PlanSession<JsonFileStore>, id: &InstanceId) -> String {
    session
        .catalog()
        .and_then(|catalog| catalog.instance(id))
        .map_or_else(
            || id.to_string(),
            |inst| format!("{} (semester {})", inst.code, inst.semester),
        )
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn status_marker(status: SelectionStatus) -> &'static str {
    match status {
        SelectionStatus::Selected => "[x]",
        SelectionStatus::Available => "[ ]",
        SelectionStatus::AvailableElsewhere => "[~]",
        SelectionStatus::Unavailable => "[-]",
    }
}

fn list_modules(session: &PlanSession<JsonFileStore>, only: Option<Semester>) {
    let config = session.config();
    for semester in config.semesters().filter(|s| only.map_or(true, |o| o == *s)) {
        println!("Semester {semester} ({:?})", config.term_of(semester));
        for (inst, def, status) in session.offerings_in(semester) {
            let mut line = format!(
                "  {} {:<8} {:<40} {:>2} ECTS",
                status_marker(status),
                inst.code,
                def.name,
                def.ects
            );
            if !def.prerequisite_codes.is_empty() {
                let prereqs: Vec<&str> =
                    def.prerequisite_codes.iter().map(|c| c.0.as_str()).collect();
                line.push_str(&format!("  requires {}", prereqs.join(", ")));
            }
            if !def.additional_prerequisites.is_empty() {
                line.push_str(&format!("  ({})", def.additional_prerequisites.join("; ")));
            }
            println!("{line}");
        }
    }
    println!("[x] selected  [ ] available  [~] selected in another semester  [-] prerequisites missing");
}

fn select(
    session: &mut PlanSession<JsonFileStore>,
    code: &ModuleCode,
    semester: Semester,
    move_existing: bool,
) -> Result<()> {
    let id = resolve_instance(session, code, semester)?;
    let mode = if move_existing {
        SelectMode::Move
    } else {
        SelectMode::Add
    };
    let outcome = session.select(&id, semester, mode)?;

    println!("Selected {code} in semester {semester}.");
    if let Some(replaced) = &outcome.replaced {
        println!("  replaced {}", describe(session, replaced));
    }
    for dropped in &outcome.invalidated {
        println!("  removed {}: prerequisites no longer met", describe(session, dropped));
    }
    Ok(())
}

fn deselect(session: &mut PlanSession<JsonFileStore>, code: &ModuleCode, yes: bool) -> Result<()> {
    let id = session
        .selected_instance_of(code)
        .map(|inst| inst.id)
        .with_context(|| format!("{code} is not selected"))?;

    match session.deselect(&id, yes)? {
        DeselectOutcome::Removed(removed) => {
            for id in &removed {
                println!("Deselected {}", describe(session, id));
            }
        }
        DeselectOutcome::NeedsConfirmation(plan) => {
            println!("Deselecting {code} also removes modules that depend on it:");
            for id in &plan.dependents {
                println!("  {}", describe(session, id));
            }
            println!("Run again with --yes to remove them all.");
        }
    }
    Ok(())
}

fn show(session: &PlanSession<JsonFileStore>) {
    let Some(catalog) = session.catalog() else {
        return;
    };
    let config = session.config();
    for load in session.semester_loads() {
        let flag = if load.overloaded { "  over cap" } else { "" };
        println!(
            "Semester {} ({:?}): {} ECTS in {} modules{flag}",
            load.semester,
            config.term_of(load.semester),
            load.ects,
            load.module_count
        );
        for id in session.selection().bucket(load.semester) {
            let Some(def) = catalog.instance(id).and_then(|inst| catalog.def(&inst.code)) else {
                continue;
            };
            println!("  {:<8} {:<40} {:>2} ECTS", def.code, def.name, def.ects);
        }
    }
    println!("Total: {} ECTS", session.total_ects());
}

fn progress(session: &PlanSession<JsonFileStore>) {
    let progress = session.progress();
    if progress.is_empty() {
        println!("No requirements loaded; pass --program to track a program.");
    }
    for category in &progress {
        let note = if category.credits > category.max_credits {
            "  over maximum".to_string()
        } else if category.remaining() > 0 {
            format!("  {} more needed", category.remaining())
        } else {
            String::new()
        };
        println!(
            "{:<24} {:>3} / {}..={}{note}",
            category.category, category.credits, category.min_credits, category.max_credits
        );
    }
    for (area, credits) in session.totals() {
        if !progress.iter().any(|c| c.category == area) {
            println!("{area:<24} {credits:>3}  (no requirement)");
        }
    }
    println!("Total: {} ECTS", session.total_ects());
}

fn validate(content_dir: &str) -> Result<()> {
    let content = ContentDir::new(content_dir);
    let config = content.config()?;
    let snapshot = content.snapshot()?;
    let programs = content.programs()?;
    let issues = validate_catalog(&snapshot, &programs, &config);
    for issue in &issues {
        println!("{issue}");
    }
    if !issues.is_empty() {
        bail!("{} content issue(s) in {content_dir}", issues.len());
    }
    println!(
        "{content_dir}: {} modules, {} programs, content_version {}: ok",
        snapshot.modules.len(),
        programs.len(),
        snapshot.content_version
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Modules { semester } => list_modules(&open_session(&cli)?, *semester),
        Commands::Select {
            code,
            semester,
            move_existing,
        } => select(
            &mut open_session(&cli)?,
            &ModuleCode(code.clone()),
            *semester,
            *move_existing,
        )?,
        Commands::Deselect { code, yes } => {
            deselect(&mut open_session(&cli)?, &ModuleCode(code.clone()), *yes)?;
        }
        Commands::Progress => progress(&open_session(&cli)?),
        Commands::Show => show(&open_session(&cli)?),
        Commands::Clear => {
            open_session(&cli)?.clear();
            println!("Plan cleared.");
        }
        Commands::Validate => validate(&cli.content_dir)?,
    }
    Ok(())
}
