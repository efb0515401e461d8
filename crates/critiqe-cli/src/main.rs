use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use critiqe_contracts::catalog::Catalog;
use critiqe_contracts::chat::{parse_intent, Intent, CHAT_HELP_COMMANDS};
use critiqe_engine::logging::init_tracing;
use critiqe_engine::media::{extension_for_mime, MediaFile, MediaNormalizer};
use critiqe_engine::{
    CancelToken, ConversionPolicy, DisplayView, DryrunClient, EnhanceMode, GeminiClient, GenerationResult,
    ImageGenerator, PromptDrafter, Session, StudioConfig, StudioError, TextModel, ToolMode,
    WorkflowState,
};
use serde_json::Value;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "critiqe", version, about = "Critiqe Studio image generation CLI")]
struct Cli {
    /// JSON config file; environment variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Append session events to this JSONL file.
    #[arg(long, global = true)]
    events: Option<PathBuf>,
    /// Use the offline generator instead of the hosted models.
    #[arg(long, global = true)]
    dryrun: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List styles, modifiers, platforms and moods.
    Catalog,
    Style(StyleArgs),
    Enhance(EnhanceArgs),
    Social(SocialArgs),
    Chat(ChatArgs),
}

#[derive(Debug, Parser)]
struct StyleArgs {
    #[arg(long = "image", required = true)]
    images: Vec<PathBuf>,
    #[arg(long)]
    style: String,
    #[arg(long = "modifier")]
    modifiers: Vec<String>,
    /// Replaces the composed prompt.
    #[arg(long)]
    prompt: Option<String>,
    #[arg(long = "refine")]
    refinements: Vec<String>,
    #[arg(long)]
    out: PathBuf,
}

#[derive(Debug, Parser)]
struct EnhanceArgs {
    #[arg(long = "image", required = true)]
    images: Vec<PathBuf>,
    #[arg(long)]
    tweak: Option<String>,
    #[arg(long = "refine")]
    refinements: Vec<String>,
    #[arg(long)]
    out: PathBuf,
}

#[derive(Debug, Parser)]
struct SocialArgs {
    #[arg(long)]
    topic: String,
    #[arg(long)]
    platform: Option<String>,
    #[arg(long)]
    mood: Option<String>,
    #[arg(long = "image")]
    images: Vec<PathBuf>,
    /// Skip drafting and generate from this prompt.
    #[arg(long)]
    prompt: Option<String>,
    #[arg(long = "refine")]
    refinements: Vec<String>,
    #[arg(long)]
    out: PathBuf,
}

#[derive(Debug, Parser)]
struct ChatArgs {
    #[arg(long, value_enum, default_value_t = ChatMode::Style)]
    mode: ChatMode,
    #[arg(long)]
    out: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ChatMode {
    Style,
    Enhance,
    Social,
}

impl From<ChatMode> for ToolMode {
    fn from(mode: ChatMode) -> Self {
        match mode {
            ChatMode::Style => ToolMode::StyleEditor,
            ChatMode::Enhance => ToolMode::Enhancer,
            ChatMode::Social => ToolMode::SocialCreator,
        }
    }
}

enum Backend {
    Gemini(GeminiClient),
    Dryrun(DryrunClient),
}

impl Backend {
    fn images(&self) -> &dyn ImageGenerator {
        match self {
            Backend::Gemini(client) => client,
            Backend::Dryrun(client) => client,
        }
    }

    fn cancel_token(&self) -> Option<CancelToken> {
        match self {
            Backend::Gemini(client) => Some(client.cancel_token()),
            Backend::Dryrun(_) => None,
        }
    }

    fn text(&self) -> &dyn TextModel {
        match self {
            Backend::Gemini(client) => client,
            Backend::Dryrun(client) => client,
        }
    }
}

struct Studio {
    config: StudioConfig,
    catalog: Arc<Catalog>,
    normalizer: MediaNormalizer,
    backend: Backend,
    events: Option<PathBuf>,
}

impl Studio {
    fn new(config: StudioConfig, dryrun: bool, events: Option<PathBuf>) -> Result<Self> {
        let catalog = Arc::new(config.catalog().context("failed to load catalog")?);
        let normalizer = MediaNormalizer::from_config(&config);
        let backend = if dryrun {
            Backend::Dryrun(DryrunClient::new())
        } else {
            Backend::Gemini(GeminiClient::new(&config))
        };
        Ok(Self {
            config,
            catalog,
            normalizer,
            backend,
            events,
        })
    }

    fn session(&self, mode: ToolMode) -> Session {
        let mut session = Session::new(mode, self.catalog.clone());
        if let Some(token) = self.backend.cancel_token() {
            session = session.with_cancel_token(token);
        }
        match self.events.as_deref() {
            Some(path) => session.with_event_log(path),
            None => session,
        }
    }

    fn upload(&self, session: &mut Session, paths: &[PathBuf]) -> Result<usize> {
        let files = load_files(paths)?;
        let policy = upload_policy(&self.config, files.len());
        Ok(session.upload(&self.normalizer, files, policy)?)
    }

    fn generate_and_refine(
        &self,
        session: &mut Session,
        refinements: &[String],
    ) -> Result<GenerationResult> {
        let mut result = session
            .generate(self.backend.images())
            .map_err(user_facing)
            .context("generation failed")?;
        for (idx, instruction) in refinements.iter().enumerate() {
            result = session
                .refine(self.backend.images(), instruction)
                .map_err(user_facing)
                .with_context(|| format!("refinement {} failed", idx + 1))?;
        }
        Ok(result)
    }
}

fn main() {
    init_tracing();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("critiqe error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = StudioConfig::load(cli.config.as_deref())?;
    let studio = Studio::new(config, cli.dryrun, cli.events)?;
    match cli.command {
        Command::Catalog => {
            print!("{}", render_catalog(&studio.catalog));
            Ok(0)
        }
        Command::Style(args) => run_style(&studio, args),
        Command::Enhance(args) => run_enhance(&studio, args),
        Command::Social(args) => run_social(&studio, args),
        Command::Chat(args) => {
            run_chat(&studio, args)?;
            Ok(0)
        }
    }
}

fn run_style(studio: &Studio, args: StyleArgs) -> Result<i32> {
    let mut session = studio.session(ToolMode::StyleEditor);
    studio.upload(&mut session, &args.images)?;
    session.select_style(&args.style)?;
    for modifier in &args.modifiers {
        session.toggle_modifier(modifier)?;
    }
    if let Some(prompt) = args.prompt.as_deref() {
        session.edit_prompt(prompt)?;
    }
    let result = studio.generate_and_refine(&mut session, &args.refinements)?;
    save_result(&result, &args.out)?;
    Ok(0)
}

fn run_enhance(studio: &Studio, args: EnhanceArgs) -> Result<i32> {
    let mut session = studio.session(ToolMode::Enhancer);
    studio.upload(&mut session, &args.images)?;
    if let Some(tweak) = args.tweak {
        session.set_enhance_mode(EnhanceMode::Tweak(tweak))?;
    }
    let result = studio.generate_and_refine(&mut session, &args.refinements)?;
    save_result(&result, &args.out)?;
    Ok(0)
}

fn run_social(studio: &Studio, args: SocialArgs) -> Result<i32> {
    let mut session = studio.session(ToolMode::SocialCreator);
    if !args.images.is_empty() {
        studio.upload(&mut session, &args.images)?;
    }
    session.set_topic(&args.topic)?;
    if let Some(platform) = args.platform.as_deref() {
        session.select_platform(platform)?;
    }
    if let Some(mood) = args.mood.as_deref() {
        session.select_mood(mood)?;
    }
    match args.prompt.as_deref() {
        Some(prompt) => session.edit_prompt(prompt)?,
        None => {
            let drafter = PromptDrafter::new(studio.backend.text());
            let draft = session
                .draft_prompt(&drafter)
                .map_err(user_facing)
                .context("prompt draft failed")?;
            println!("Drafted prompt: {draft}");
        }
    }
    let result = studio.generate_and_refine(&mut session, &args.refinements)?;
    save_result(&result, &args.out)?;
    Ok(0)
}

fn run_chat(studio: &Studio, args: ChatArgs) -> Result<()> {
    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("failed to create {}", args.out.display()))?;
    let mut session = studio.session(args.mode.into());
    let stdin = io::stdin();
    let mut line = String::new();

    println!(
        "Critiqe {} started. Type /help for commands.",
        session.mode().label()
    );

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

        let intent = parse_intent(line.trim_end_matches(['\n', '\r']));
        if intent.action == "noop" {
            continue;
        }
        if let Err(err) = handle_intent(studio, &mut session, &intent, &args.out) {
            match err.downcast_ref::<StudioError>() {
                Some(studio_err) => println!("Error: {}", studio_err.user_message()),
                None => println!("Error: {err:#}"),
            }
        }
    }
    Ok(())
}

fn handle_intent(
    studio: &Studio,
    session: &mut Session,
    intent: &Intent,
    out_dir: &Path,
) -> Result<()> {
    let text = intent.text.as_deref().unwrap_or_default();
    match intent.action.as_str() {
        "help" => println!("Commands: {}", CHAT_HELP_COMMANDS.join(" ")),
        "catalog" => print!("{}", render_catalog(&studio.catalog)),
        "status" => print!("{}", render_status(session)),
        "upload" => {
            let paths: Vec<PathBuf> = string_args(intent, "paths")
                .into_iter()
                .map(PathBuf::from)
                .collect();
            if paths.is_empty() {
                bail!("/upload requires at least one path");
            }
            let count = studio.upload(session, &paths)?;
            println!("Uploaded {count} image(s).");
        }
        "select_style" => {
            session.select_style(&id_arg(intent)?)?;
            println!("Prompt: {}", session.instruction());
        }
        "toggle_modifier" => {
            let id = id_arg(intent)?;
            let on = session.toggle_modifier(&id)?;
            println!("{id} {}", if on { "on" } else { "off" });
            println!("Prompt: {}", session.instruction());
        }
        "select_platform" => {
            session.select_platform(&id_arg(intent)?)?;
        }
        "select_mood" => {
            session.select_mood(&id_arg(intent)?)?;
        }
        "set_prompt" => session.edit_prompt(text)?,
        "set_tweak" => session.set_enhance_mode(EnhanceMode::Tweak(text.to_string()))?,
        "set_enhance_auto" => session.set_enhance_mode(EnhanceMode::Auto)?,
        "set_topic" => session.set_topic(text)?,
        "draft" => {
            let drafter = PromptDrafter::new(studio.backend.text());
            let draft = session.draft_prompt(&drafter)?;
            println!("Drafted prompt (edit with /prompt): {draft}");
        }
        "generate" => {
            let result = session.generate(studio.backend.images())?;
            autosave(&result, out_dir)?;
        }
        "refine" => refine(studio, session, text, out_dir)?,
        "show_original" => {
            session.show_original()?;
            println!("Showing original upload(s); the next refinement uses them.");
        }
        "show_result" => {
            session.show_result()?;
            println!("Showing the latest result.");
        }
        "save" => {
            let Some(result) = session.result() else {
                bail!("nothing generated yet");
            };
            let path = string_args(intent, "path")
                .into_iter()
                .next()
                .map(PathBuf::from)
                .unwrap_or_else(|| out_dir.join(result_file_name(result)));
            save_result(result, &path)?;
        }
        "instruct" => {
            if session.result().is_some() {
                refine(studio, session, text, out_dir)?;
            } else if session.mode() == ToolMode::Enhancer {
                session.set_enhance_mode(EnhanceMode::Tweak(text.to_string()))?;
                println!("Tweak set. Use /generate to run it.");
            } else {
                session.edit_prompt(text)?;
                println!("Prompt updated.");
            }
        }
        "unknown" => {
            let command = string_args(intent, "command")
                .into_iter()
                .next()
                .unwrap_or_default();
            println!("Unknown command /{command}. Type /help for commands.");
        }
        other => println!("Unhandled action {other}"),
    }
    Ok(())
}

fn refine(studio: &Studio, session: &mut Session, text: &str, out_dir: &Path) -> Result<()> {
    let result = session.refine(studio.backend.images(), text)?;
    autosave(&result, out_dir)
}

fn autosave(result: &GenerationResult, out_dir: &Path) -> Result<()> {
    save_result(result, &out_dir.join(result_file_name(result)))
}

fn save_result(result: &GenerationResult, path: &Path) -> Result<()> {
    let image = result
        .handle
        .decode()
        .map_err(user_facing)
        .context("generated image could not be decoded")?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, &image.bytes)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), image = %result.handle, "result saved");
    println!("Saved {} ({})", path.display(), image.mime_type);
    Ok(())
}

fn result_file_name(result: &GenerationResult) -> String {
    let ext = extension_for_mime(result.handle.mime_type().unwrap_or("image/png"));
    format!("result-{:03}.{ext}", result.sequence)
}

fn load_files(paths: &[PathBuf]) -> Result<Vec<MediaFile>> {
    paths.iter().map(|path| MediaFile::from_path(path)).collect()
}

/// A single file takes the single-upload policy, more take the batch policy.
fn upload_policy(config: &StudioConfig, count: usize) -> ConversionPolicy {
    if count <= 1 {
        config.single_upload_policy
    } else {
        config.batch_upload_policy
    }
}

fn user_facing(err: StudioError) -> anyhow::Error {
    anyhow::anyhow!(err.user_message())
}

fn id_arg(intent: &Intent) -> Result<String> {
    match string_args(intent, "id").into_iter().next() {
        Some(id) if !id.is_empty() => Ok(id),
        _ => bail!("this command needs an id; see /catalog"),
    }
}

fn string_args(intent: &Intent, key: &str) -> Vec<String> {
    match intent.command_args.get(key) {
        Some(Value::String(value)) if !value.trim().is_empty() => vec![value.clone()],
        Some(Value::Array(values)) => values
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn render_catalog(catalog: &Catalog) -> String {
    let mut out = String::from("Styles:\n");
    for style in catalog.styles() {
        out.push_str(&format!("  {:<18} {}: {}\n", style.id, style.name, style.description));
    }
    out.push_str("Modifiers:\n");
    for modifier in catalog.modifiers() {
        out.push_str(&format!("  {:<18} {}\n", modifier.id, modifier.label));
    }
    out.push_str("Platforms:\n");
    for platform in catalog.platforms() {
        out.push_str(&format!(
            "  {:<18} {} ({})\n",
            platform.id, platform.name, platform.aspect_ratio
        ));
    }
    out.push_str("Moods:\n");
    for mood in catalog.moods() {
        out.push_str(&format!("  {:<18} {}\n", mood.id, mood.label));
    }
    out
}

fn render_status(session: &Session) -> String {
    let mut out = format!(
        "Mode: {}\nState: {}\nImages: {}\n",
        session.mode().label(),
        session.state(),
        session.references().len()
    );
    match session.mode() {
        ToolMode::StyleEditor => {
            out.push_str(&format!(
                "Style: {}\n",
                session.style_id().unwrap_or("(none)")
            ));
            if !session.modifiers().is_empty() {
                let ids: Vec<&str> = session.modifiers().iter().map(String::as_str).collect();
                out.push_str(&format!("Modifiers: {}\n", ids.join(", ")));
            }
        }
        ToolMode::SocialCreator => {
            out.push_str(&format!("Topic: {}\n", session.topic()));
            if let Some(platform) = session.platform() {
                out.push_str(&format!(
                    "Platform: {} ({})\n",
                    platform.name, platform.aspect_ratio
                ));
            }
            out.push_str(&format!("Mood: {}\n", session.mood_label().unwrap_or("(none)")));
        }
        ToolMode::Enhancer => {
            let mode = match session.enhance_mode() {
                EnhanceMode::Auto => "auto".to_string(),
                EnhanceMode::Tweak(text) => format!("tweak \"{text}\""),
            };
            out.push_str(&format!("Enhance: {mode}\n"));
        }
    }
    let prompt = session.instruction();
    if !prompt.is_empty() && session.mode() != ToolMode::Enhancer {
        out.push_str(&format!("Prompt: {prompt}\n"));
    }
    if let Some(result) = session.result() {
        let view = match session.view() {
            DisplayView::Result => "result",
            DisplayView::Original => "original",
        };
        out.push_str(&format!("Result: {} (viewing {view})\n", result.handle));
    }
    if matches!(session.state(), WorkflowState::Failed(_)) {
        out.push_str("Any action resumes the session.\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use critiqe_contracts::chat::parse_intent;
    use critiqe_engine::{ConversionPolicy, StudioConfig, ToolMode, WorkflowState};

    use super::{
        handle_intent, render_catalog, run_social, run_style, string_args, upload_policy,
        SocialArgs, StyleArgs, Studio,
    };

    fn dryrun_studio() -> anyhow::Result<Studio> {
        Studio::new(StudioConfig::default(), true, None)
    }

    #[test]
    fn upload_policy_depends_on_file_count() {
        let config = StudioConfig::default();
        assert_eq!(upload_policy(&config, 1), ConversionPolicy::FailFast);
        assert_eq!(upload_policy(&config, 3), ConversionPolicy::BestEffort);
    }

    #[test]
    fn catalog_listing_includes_every_section() -> anyhow::Result<()> {
        let studio = dryrun_studio()?;
        let listing = render_catalog(&studio.catalog);
        assert!(listing.contains("studio-headshot"));
        assert!(listing.contains("maintain-likeness"));
        assert!(listing.contains("instagram-story"));
        assert!(listing.contains("Minimalist"));
        Ok(())
    }

    #[test]
    fn style_command_writes_a_refined_png() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let image = temp.path().join("me.jpg");
        std::fs::write(&image, b"jpeg-bytes")?;
        let out = temp.path().join("out").join("portrait.png");

        let code = run_style(
            &dryrun_studio()?,
            StyleArgs {
                images: vec![image],
                style: "studio-headshot".to_string(),
                modifiers: vec!["improve-lighting".to_string()],
                prompt: None,
                refinements: vec!["Warmer background.".to_string()],
                out: out.clone(),
            },
        )?;
        assert_eq!(code, 0);
        let bytes = std::fs::read(&out)?;
        assert!(bytes.starts_with(b"\x89PNG"));
        Ok(())
    }

    #[test]
    fn style_command_rejects_unknown_style() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let image = temp.path().join("me.png");
        std::fs::write(&image, b"png-bytes")?;
        let err = run_style(
            &dryrun_studio()?,
            StyleArgs {
                images: vec![image],
                style: "vaporwave".to_string(),
                modifiers: Vec::new(),
                prompt: None,
                refinements: Vec::new(),
                out: temp.path().join("never.png"),
            },
        )
        .err();
        assert!(err.is_some());
        assert!(!temp.path().join("never.png").exists());
        Ok(())
    }

    #[test]
    fn social_command_drafts_then_generates_without_images() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let out = temp.path().join("post.png");
        run_social(
            &dryrun_studio()?,
            SocialArgs {
                topic: "Launching our spring menu".to_string(),
                platform: Some("tiktok".to_string()),
                mood: Some("humorous".to_string()),
                images: Vec::new(),
                prompt: None,
                refinements: Vec::new(),
                out: out.clone(),
            },
        )?;
        assert!(out.exists());
        Ok(())
    }

    #[test]
    fn chat_intents_drive_a_session() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let image = temp.path().join("me.jpg");
        std::fs::write(&image, b"jpeg-bytes")?;
        let studio = dryrun_studio()?;
        let mut session = studio.session(ToolMode::StyleEditor);

        for line in [
            format!("/upload {}", image.display()),
            "/style corporate".to_string(),
            "/generate".to_string(),
            "make the tie blue".to_string(),
            "/save".to_string(),
        ] {
            handle_intent(&studio, &mut session, &parse_intent(&line), temp.path())?;
        }

        assert_eq!(session.state(), &WorkflowState::ShowingResult);
        assert_eq!(session.result().map(|result| result.sequence), Some(2));
        assert!(temp.path().join("result-001.png").exists());
        assert!(temp.path().join("result-002.png").exists());
        Ok(())
    }

    #[test]
    fn string_args_reads_scalars_and_lists() {
        let intent = parse_intent("/upload a.jpg \"b c.png\"");
        let paths: Vec<PathBuf> = string_args(&intent, "paths")
            .into_iter()
            .map(PathBuf::from)
            .collect();
        assert_eq!(paths, vec![PathBuf::from("a.jpg"), PathBuf::from("b c.png")]);
        assert_eq!(string_args(&parse_intent("/style Anime"), "id"), vec!["anime"]);
    }
}
