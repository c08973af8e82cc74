use crate::cli::{ImportJob, Job, PlaceJob};
use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use unrealcv_bridge_core::editor::ImportPlan;
use unrealcv_bridge_core::ops::console::{self, ConsoleExit};
use unrealcv_bridge_core::ops::probe;
use unrealcv_bridge_core::ops::spawn::{self, SpawnStrategy};
use unrealcv_bridge_core::types::{ProbeReport, SpawnOutcome};
use unrealcv_bridge_core::{Session, UnrealCvClient};

pub async fn run(job: Job) -> Result<()> {
    let mut input = BufReader::new(tokio::io::stdin());

    match job {
        Job::Import(import) => run_import(&import).map(|_| ()),
        Job::Place(place) => run_place(&place, &mut input).await,
        Job::Full { import, place } => {
            let plan = run_import(&import)?;
            println!("After the import completes, the blueprint is at {}", plan.blueprint_path());

            let question = format!(
                "\nDo you want to attempt runtime placement now with path {}? (y/n): ",
                plan.blueprint_path()
            );
            if confirm(&question, &mut input).await? {
                run_place(&place, &mut input).await
            } else {
                println!(
                    "Run again later with: mesh-placer --action place --blueprint-path {} --location {}",
                    plan.blueprint_path(),
                    place.request.location
                );
                Ok(())
            }
        }
        Job::Probe(job) => run_probe(&job).await,
    }
}

fn run_import(job: &ImportJob) -> Result<ImportPlan> {
    let plan = ImportPlan::new(&job.obj_path, &job.asset_path, &job.blueprint_name)
        .context("Error importing mesh")?;
    let script = plan.render_editor_script();

    match &job.script_out {
        Some(path) => {
            std::fs::write(path, &script)
                .with_context(|| format!("Failed to write editor script to {}", path.display()))?;
            println!("Editor script written to {}", path.display());
            println!("Run it from the Unreal Editor's Python console to import the mesh.");
        }
        None => {
            println!("Run the following in the Unreal Editor's Python console:");
            println!("\n{}", "=".repeat(50));
            print!("{script}");
            println!("{}\n", "=".repeat(50));
        }
    }

    println!("Source:     {}", plan.source().display());
    println!("Mesh asset: {}", plan.mesh_asset_path());
    println!("Blueprint:  {}", plan.blueprint_path());
    Ok(plan)
}

async fn run_place<R>(job: &PlaceJob, input: &mut R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let Some(mut session) = open_session(job).await? else {
        return Ok(());
    };

    let result = place_and_interact(&mut session, job, input).await;

    session.disconnect().await;
    println!("Disconnected from UnrealCV");
    result
}

async fn place_and_interact<R>(
    session: &mut Session<UnrealCvClient>,
    job: &PlaceJob,
    input: &mut R,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    println!("Spawning blueprint: {}", job.request.blueprint_path);

    let strategy = SpawnStrategy::legacy();
    let outcome = tokio::select! {
        biased;
        _ = shutdown_signal() => {
            println!("\nExiting...");
            return Ok(());
        }
        outcome = spawn::spawn(&mut *session, &job.request, &strategy) => {
            outcome.context("Error spawning object")?
        }
    };

    print_outcome(&outcome, job.json)?;

    let mut stdout = tokio::io::stdout();
    let exit = console::run(&mut *session, &mut *input, &mut stdout, shutdown_signal()).await?;
    if exit == ConsoleExit::Interrupted {
        println!("\nExiting...");
    }
    Ok(())
}

async fn run_probe(job: &PlaceJob) -> Result<()> {
    let Some(mut session) = open_session(job).await? else {
        return Ok(());
    };

    let strategy = SpawnStrategy::legacy();
    let result = tokio::select! {
        biased;
        _ = shutdown_signal() => {
            println!("\nExiting...");
            Ok(())
        }
        report = probe::probe(&mut session, &job.request, &strategy) => {
            print_report(&report, job.json)
        }
    };

    session.disconnect().await;
    println!("Disconnected from UnrealCV");
    result
}

/// Connects with retries. `None` when the user interrupts the wait.
async fn open_session(job: &PlaceJob) -> Result<Option<Session<UnrealCvClient>>> {
    println!("Attempting to connect to UnrealCV at {}...", job.bridge.endpoint());

    let client = UnrealCvClient::new(&job.bridge);
    tokio::select! {
        biased;
        _ = shutdown_signal() => {
            println!("\nExiting...");
            Ok(None)
        }
        session = Session::connect(client, &job.bridge) => {
            let session = session.context(
                "Failed to connect to UnrealCV. Make sure your game is running with UnrealCV enabled",
            )?;
            println!("Connected to UnrealCV!");
            Ok(Some(session))
        }
    }
}

fn print_outcome(outcome: &SpawnOutcome, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }

    println!("Object spawned with ID: {}", outcome.object_id);
    if outcome.attempts > 1 {
        println!("(accepted spelling: {} after {} attempts)", outcome.candidate, outcome.attempts);
    }
    if let Some(rotation) = &outcome.rotation {
        println!("Set rotation: {}", rotation.raw);
    }
    if let Some(scale) = &outcome.scale {
        println!("Set scale: {}", scale.raw);
    }

    println!("\nObject placed successfully!");
    println!("Commands available:");
    println!("  - Type 'exit' or press Ctrl+C to quit");
    println!("  - The object ID is: {}", outcome.object_id);
    println!("  - To move the object, you can use:");
    for hint in spawn::manipulation_hints(&outcome.object_id) {
        println!("    {hint}");
    }
    Ok(())
}

fn print_report(report: &ProbeReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("\n--- UNREALCV INFO ---");
    println!("Version: {}", report.version.raw);
    println!("Status: {}", report.status.raw);
    println!("Available commands: {}", report.help.raw);

    println!("\n--- SPAWN COMMANDS ---");
    for candidate in &report.candidates {
        let mark = if candidate.result.is_error { "failed" } else { "SUCCEEDED" };
        println!("{mark:>9}  {}", candidate.command);
        println!("           -> {}", candidate.result.raw);
    }

    println!("\n--- SCENE ---");
    println!("Objects: {}", report.objects.raw);
    println!("Camera location: {}", report.camera_location.raw);

    let working: Vec<&str> = report.working_candidates().map(|c| c.label.as_str()).collect();
    if working.is_empty() {
        println!("\nNo spawn spelling was accepted.");
    } else {
        println!("\nAccepted spawn spellings: {}", working.join(", "));
    }
    Ok(())
}

async fn confirm<R>(question: &str, input: &mut R) -> Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    let mut stdout = tokio::io::stdout();
    stdout.write_all(question.as_bytes()).await?;
    stdout.flush().await?;

    let mut answer = String::new();
    input.read_line(&mut answer).await?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

/// Resolves on Ctrl+C. Never resolves if the handler can't be installed.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Unable to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
