use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use generational_arena::Index;
use tracing::{debug, instrument};

use crate::arena::NodeTree;
use crate::builder::TreeBuilder;
use crate::capture;
use crate::cli::args::{Cli, Commands, ConfigCommands, SourceArgs};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::display::TreeNodeConvert;
use crate::emit::{emit, OutputFormat, SortOrder};
use crate::errors::CaptureError;
use crate::extract::extract;
use crate::flatten::flatten;
use crate::select::SelectionSet;
use crate::store::NodeStore;
use crate::survey::survey_file;

pub fn execute_command(cli: &Cli) -> Result<()> {
    let settings = Settings::load().context("failed to load settings")?;

    match &cli.command {
        Some(Commands::List { dir }) => _list(&capture_dir(dir, &settings)),
        Some(Commands::Steps { capture, dir }) => _steps(capture, &capture_dir(dir, &settings)),
        Some(Commands::Tree { source }) => _tree(source, &settings),
        Some(Commands::Export {
            source,
            out,
            format,
            sort,
            no_objectives,
            select,
            subtree,
        }) => _export(
            source,
            out.as_deref(),
            format.as_deref(),
            sort.as_deref(),
            *no_objectives,
            select,
            subtree.as_deref(),
            &settings,
        ),
        Some(Commands::Survey { file }) => _survey(file),
        Some(Commands::Config { command }) => _config(command, &settings),
        // Completion is handled in main before dispatch
        Some(Commands::Completion { .. }) | None => Ok(()),
    }
}

fn capture_dir(cli_dir: &Option<PathBuf>, settings: &Settings) -> PathBuf {
    cli_dir
        .clone()
        .unwrap_or_else(|| settings.capture_dir.clone())
}

/// Resolves the source arguments into a loaded store and a root id.
fn resolve_source(source: &SourceArgs, settings: &Settings) -> Result<(NodeStore, String)> {
    if let (Some(items), Some(root)) = (&source.items, &source.root) {
        let store = NodeStore::load(items)?;
        return Ok((store, root.clone()));
    }

    let epoch = source
        .capture
        .as_deref()
        .ok_or_else(|| anyhow!("either --capture or --items/--root must be given"))?;
    let dir = capture_dir(&source.dir, settings);
    let captures = capture::discover(&dir)?;
    let cap = captures
        .get(epoch)
        .ok_or_else(|| CaptureError::UnknownCapture(epoch.to_string()))?;

    let store = cap.load_store()?;
    let steps = cap.load_steps()?;
    let step = source.step.unwrap_or(0);
    let root_id = steps
        .root_id(step)
        .ok_or(CaptureError::UnknownStep(step))?
        .to_string();
    Ok((store, root_id))
}

fn subtree_index(tree: &NodeTree, subtree: Option<&str>) -> Result<Index> {
    match subtree {
        Some(id) => tree
            .find_by_id(id)
            .ok_or_else(|| anyhow!("subtree id not found in tree: {id}")),
        None => tree.root().ok_or_else(|| anyhow!("tree is empty")),
    }
}

#[instrument]
fn _list(dir: &Path) -> Result<()> {
    let captures = capture::discover(dir)?;
    if captures.is_empty() {
        output::info("No captures found");
        return Ok(());
    }
    output::header("Captures");
    for (epoch, cap) in captures.iter() {
        output::detail(&format!(
            "{epoch}  {}  curriculum {}",
            cap.timestamp_local(),
            if cap.curriculum_uuid.is_empty() {
                "<unknown>"
            } else {
                &cap.curriculum_uuid
            }
        ));
    }
    Ok(())
}

#[instrument]
fn _steps(epoch: &str, dir: &Path) -> Result<()> {
    let captures = capture::discover(dir)?;
    let cap = captures
        .get(epoch)
        .ok_or_else(|| CaptureError::UnknownCapture(epoch.to_string()))?;
    let steps = cap.load_steps()?;
    if steps.is_empty() {
        output::info("No steps in this capture");
        return Ok(());
    }
    output::header(&format!("Steps of capture {epoch}"));
    for (i, step) in steps.iter().enumerate() {
        let title = if step.title.is_empty() {
            "<untitled>"
        } else {
            &step.title
        };
        output::detail(&format!("{i}: {title} (root {})", step.root));
    }
    Ok(())
}

#[instrument(skip_all)]
fn _tree(source: &SourceArgs, settings: &Settings) -> Result<()> {
    let (store, root_id) = resolve_source(source, settings)?;
    let tree = TreeBuilder::new().build(&store, &root_id)?;
    debug!(nodes = tree.node_count(), "rendering tree");
    println!("{}", tree.to_tree_string());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
#[instrument(skip_all)]
fn _export(
    source: &SourceArgs,
    out: Option<&Path>,
    format: Option<&str>,
    sort: Option<&str>,
    no_objectives: bool,
    select: &[String],
    subtree: Option<&str>,
    settings: &Settings,
) -> Result<()> {
    let (store, root_id) = resolve_source(source, settings)?;
    let tree = TreeBuilder::new().build(&store, &root_id)?;
    let subtree_idx = subtree_index(&tree, subtree)?;

    // Snapshot the selection before extraction starts.
    let selection: Option<SelectionSet> = if select.is_empty() {
        None
    } else {
        Some(select.iter().map(String::as_str).collect())
    };

    let include_aux = !no_objectives;
    let (paths, display_name) = extract(&tree, subtree_idx, include_aux, selection.as_ref());
    let flattened = flatten(&tree, &paths);

    let sort = SortOrder::from_directive(sort.unwrap_or(&settings.sort));
    let format = OutputFormat::from_directive(format.unwrap_or(&settings.format));
    let out_dir = out.unwrap_or(&settings.output_dir);

    let artifact = emit(
        out_dir,
        &display_name,
        &flattened,
        sort,
        include_aux,
        format,
    )?;
    output::success(&format!(
        "Exported {} unique paths to {}",
        paths.len(),
        artifact.display()
    ));
    Ok(())
}

#[instrument]
fn _survey(file: &Path) -> Result<()> {
    let survey = survey_file(file)?;
    for (path, values) in &survey {
        output::header(&path.join("."));
        for value in values {
            output::detail(value);
        }
    }
    Ok(())
}

fn _config(command: &ConfigCommands, settings: &Settings) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&settings.template());
        }
        ConfigCommands::Init => {
            output::info(&Settings::default().template());
        }
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::info(&path.display()),
            None => output::warning("no config directory available"),
        },
    }
    Ok(())
}
