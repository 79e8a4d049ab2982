use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use lookbook_contracts::assets::extension_for_mime;
use lookbook_contracts::events::{EventWriter, SessionEvent};
use lookbook_contracts::gallery::{write_manifest, Gallery, GalleryEntry, ManifestRow};
use lookbook_contracts::presets::{PresetCatalog, PresetCategory};
use lookbook_contracts::studio::{parse_command, ClearTarget, StudioCommand, STUDIO_HELP_COMMANDS};
use lookbook_engine::{
    load_image_asset, CredentialSource, EnvCredentials, GeminiBackend, GenerationOrchestrator,
    GenerationResult, SessionCredentials, Studio, StudioConfig,
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(
    name = "lookbook",
    version,
    about = "Virtual fashion photo shoots from a model photo and a product photo"
)]
struct Cli {
    /// Debug-level logging unless RUST_LOG is set.
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Presets(PresetsArgs),
    Generate(GenerateArgs),
    Studio(StudioArgs),
}

#[derive(Debug, Parser)]
struct PresetsArgs {
    #[arg(long)]
    category: Option<String>,
}

#[derive(Debug, Parser)]
struct GenerateArgs {
    #[arg(long)]
    model_image: PathBuf,
    #[arg(long)]
    product_image: PathBuf,
    #[arg(long, conflicts_with = "style", required_unless_present = "style")]
    preset: Option<String>,
    #[arg(long)]
    style: Option<String>,
    #[arg(long)]
    out: PathBuf,
    #[arg(long)]
    events: Option<PathBuf>,
    #[arg(long)]
    image_model: Option<String>,
}

#[derive(Debug, Parser)]
struct StudioArgs {
    #[arg(long)]
    out: PathBuf,
    #[arg(long)]
    events: Option<PathBuf>,
    #[arg(long)]
    image_model: Option<String>,
}

const EXIT_REFUSED: i32 = 2;
const MANIFEST_FILE: &str = "gallery.json";

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("lookbook error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Command::Presets(args) => {
            run_presets(args)?;
            Ok(0)
        }
        Command::Generate(args) => run_generate(args),
        Command::Studio(args) => {
            run_studio(args)?;
            Ok(0)
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(io::stderr)
        .init();
}

fn run_presets(args: PresetsArgs) -> Result<()> {
    let catalog = PresetCatalog::default();
    let category = parse_category(args.category.as_deref())?;
    print!("{}", render_presets(&catalog, category));
    Ok(())
}

fn run_generate(args: GenerateArgs) -> Result<i32> {
    let credentials = Arc::new(SessionCredentials::new(EnvCredentials::default()));
    let mut studio = build_studio(
        &args.out,
        args.events.as_deref(),
        args.image_model.clone(),
        credentials,
    )?;
    studio.set_model_image(load_image_asset(&args.model_image)?);
    studio.set_product_image(load_image_asset(&args.product_image)?);

    let result = match (args.preset.as_deref(), args.style.as_deref()) {
        (Some(preset_id), _) => studio.generate_preset(preset_id)?,
        (None, Some(style)) => studio.generate_style(style),
        (None, None) => return Err(anyhow!("either --preset or --style is required")),
    };

    match &result {
        GenerationResult::Success { .. } => {
            let written = export_gallery(studio.gallery(), &args.out, &session_id(&studio))?;
            for path in written {
                println!("{}", path.display());
            }
            Ok(0)
        }
        GenerationResult::Refusal { .. } => {
            eprintln!("{}", result.user_message().unwrap_or_default());
            Ok(EXIT_REFUSED)
        }
        GenerationResult::Failure { kind, .. } => {
            eprintln!(
                "Generation failed ({kind}): {}",
                result.user_message().unwrap_or_default()
            );
            Ok(1)
        }
    }
}

fn run_studio(args: StudioArgs) -> Result<()> {
    let credentials = Arc::new(
        SessionCredentials::new(EnvCredentials::default()).with_prompt(Box::new(prompt_for_key)),
    );
    let mut studio = build_studio(
        &args.out,
        args.events.as_deref(),
        args.image_model.clone(),
        credentials.clone(),
    )?;

    let stdin = io::stdin();
    let mut line = String::new();

    println!("Lookbook studio started. Type /help for commands.");
    if !credentials.has_active_credential() {
        println!("No API key found in GEMINI_API_KEY or GOOGLE_API_KEY. Use /key to enter one.");
    }

    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        let read = match stdin.read_line(&mut line) {
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        if read == 0 {
            break;
        }

        match parse_command(line.trim_end_matches(['\n', '\r'])) {
            StudioCommand::Noop => continue,
            StudioCommand::Help => {
                println!("Commands: {}", STUDIO_HELP_COMMANDS.join(" "));
                println!("Any other text is used as a custom style description.");
            }
            StudioCommand::Quit => break,
            StudioCommand::SetModelImage(path) => match load_image_asset(Path::new(&path)) {
                Ok(image) => {
                    println!(
                        "Model image set: {path} ({}, {} bytes)",
                        image.mime_type(),
                        image.len()
                    );
                    studio.set_model_image(image);
                }
                Err(err) => println!("Model image not set: {err:#}"),
            },
            StudioCommand::SetProductImage(path) => match load_image_asset(Path::new(&path)) {
                Ok(image) => {
                    println!(
                        "Product image set: {path} ({}, {} bytes)",
                        image.mime_type(),
                        image.len()
                    );
                    studio.set_product_image(image);
                }
                Err(err) => println!("Product image not set: {err:#}"),
            },
            StudioCommand::Clear(ClearTarget::Model) => {
                studio.clear_model_image();
                println!("Model image cleared.");
            }
            StudioCommand::Clear(ClearTarget::Product) => {
                studio.clear_product_image();
                println!("Product image cleared.");
            }
            StudioCommand::Clear(ClearTarget::Gallery) => {
                studio.clear_gallery();
                println!("Gallery cleared.");
            }
            StudioCommand::ListPresets(filter) => match parse_category(filter.as_deref()) {
                Ok(category) => print!("{}", render_presets(studio.presets(), category)),
                Err(err) => println!("{err}"),
            },
            StudioCommand::GeneratePreset(preset_id) => match studio.generate_preset(&preset_id) {
                Ok(result) => report_result(&studio, &result),
                Err(err) => println!("{err:#}. Type /presets to list ids."),
            },
            StudioCommand::GenerateStyle(style) => {
                let result = studio.generate_style(&style);
                report_result(&studio, &result);
            }
            StudioCommand::ShowGallery => print!("{}", render_gallery(studio.gallery())),
            StudioCommand::Remove(target) => {
                let removed = resolve_entry_id(studio.gallery(), &target)
                    .and_then(|id| studio.remove(&id));
                match removed {
                    Some(entry) => println!("Removed {}.", entry.id),
                    None => println!("No gallery entry matches {target}."),
                }
            }
            StudioCommand::Export(dir) => {
                let dir = dir.map(PathBuf::from).unwrap_or_else(|| args.out.clone());
                if studio.gallery().is_empty() {
                    println!("Gallery is empty, nothing to export.");
                    continue;
                }
                match export_gallery(studio.gallery(), &dir, &session_id(&studio)) {
                    Ok(written) => {
                        for path in written {
                            println!("Wrote {}", path.display());
                        }
                    }
                    Err(err) => println!("Export failed: {err:#}"),
                }
            }
            StudioCommand::SelectKey => match credentials.select_credential() {
                Ok(()) if credentials.has_active_credential() => println!("API key selected."),
                Ok(()) => println!("No API key entered."),
                Err(err) => println!("Key selection failed: {err:#}"),
            },
            StudioCommand::Invalid(usage) => println!("{usage}"),
            StudioCommand::Unknown { command, .. } => {
                println!("Unknown command: /{command}. Type /help for commands.");
            }
        }
    }

    Ok(())
}

fn build_studio(
    out: &Path,
    events: Option<&Path>,
    image_model: Option<String>,
    credentials: Arc<SessionCredentials>,
) -> Result<Studio> {
    fs::create_dir_all(out).with_context(|| format!("failed creating {}", out.display()))?;
    let config = StudioConfig::from_env().with_image_model(image_model);
    let events_path = events
        .map(Path::to_path_buf)
        .unwrap_or_else(|| out.join("events.jsonl"));
    let events = EventWriter::create(events_path, Uuid::new_v4().to_string())?;
    events.emit(&SessionEvent::SessionStarted {
        image_model: config.image_model.clone(),
        max_dimension: config.max_dimension,
        out_dir: out.display().to_string(),
    })?;
    info!(
        image_model = %config.image_model,
        max_dimension = config.max_dimension,
        "studio session started"
    );

    let max_dimension = config.max_dimension;
    let backend = GeminiBackend::new(config, credentials);
    let orchestrator = GenerationOrchestrator::new(Arc::new(backend))
        .with_max_dimension(max_dimension)
        .with_events(Some(events));
    Ok(Studio::new(orchestrator))
}

fn prompt_for_key() -> Result<Option<String>> {
    print!("Gemini API key: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let key = line.trim();
    Ok((!key.is_empty()).then(|| key.to_string()))
}

fn report_result(studio: &Studio, result: &GenerationResult) {
    match result.user_message() {
        None => {
            let gallery = studio.gallery();
            println!(
                "Look added to gallery ({}/{}). /export to save.",
                gallery.len(),
                gallery.capacity()
            );
        }
        Some(message) => println!("{message}"),
    }
}

fn session_id(studio: &Studio) -> String {
    studio
        .orchestrator()
        .events()
        .map(|events| events.session_id().to_string())
        .unwrap_or_default()
}

fn parse_category(raw: Option<&str>) -> Result<Option<PresetCategory>> {
    raw.map(|value| value.parse::<PresetCategory>().map_err(|err| anyhow!(err)))
        .transpose()
}

fn render_presets(catalog: &PresetCatalog, category: Option<PresetCategory>) -> String {
    let presets = catalog.filter(category);
    let mut out = String::new();
    let mut current: Option<PresetCategory> = None;
    for preset in presets {
        if current != Some(preset.category) {
            out.push_str(&format!("[{}]\n", preset.category));
            current = Some(preset.category);
        }
        out.push_str(&format!("  {:>3}  {}\n", preset.id, preset.label));
    }
    out
}

fn render_gallery(gallery: &Gallery) -> String {
    if gallery.is_empty() {
        return format!("Gallery is empty (0/{}).\n", gallery.capacity());
    }
    let mut out = String::new();
    for (idx, entry) in gallery.entries().iter().enumerate() {
        out.push_str(&format!(
            "{}. {}  {}\n   {}\n",
            idx + 1,
            entry.id,
            entry.created_at.format("%H:%M:%S"),
            entry.style_text
        ));
    }
    out.push_str(&format!("{}/{} slots used.\n", gallery.len(), gallery.capacity()));
    out
}

/// Accepts a 1-based slot number or an entry id.
fn resolve_entry_id(gallery: &Gallery, target: &str) -> Option<String> {
    let target = target.trim();
    if let Ok(slot) = target.parse::<usize>() {
        return slot
            .checked_sub(1)
            .and_then(|idx| gallery.entries().get(idx))
            .map(|entry| entry.id.clone());
    }
    gallery.get(target).map(|entry| entry.id.clone())
}

fn entry_file_name(slot: usize, entry: &GalleryEntry) -> String {
    format!(
        "look-{slot}-{}.{}",
        entry.id,
        extension_for_mime(entry.image.mime_type())
    )
}

fn export_gallery(gallery: &Gallery, dir: &Path, session_id: &str) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("failed creating {}", dir.display()))?;
    let mut written = Vec::new();
    let mut rows = Vec::new();
    for (idx, entry) in gallery.entries().iter().enumerate() {
        let slot = idx + 1;
        let file = entry_file_name(slot, entry);
        let path = dir.join(&file);
        fs::write(&path, entry.image.bytes())
            .with_context(|| format!("failed writing {}", path.display()))?;
        rows.push(ManifestRow::from_entry(slot as u64, entry, file));
        written.push(path);
    }
    let manifest = dir.join(MANIFEST_FILE);
    write_manifest(&manifest, session_id, &rows, None)?;
    written.push(manifest);
    Ok(written)
}
