use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context as _};
use clap::{Parser, Subcommand};

use splice_core::compiler::{ConversionPlan, PlanCompiler};
use splice_core::config::ConfigManager;
use splice_core::logging::{init_tracing, JobLogger, LogConfig, LogLevel};
use splice_core::models::{JobRequest, TrackEdit};
use splice_core::orchestrator::{FfmpegExecutor, PlanRunner};
use splice_core::probe::{FfprobeProbe, MediaProbe};

const CONFIG_FILE: &str = "reelsplice.toml";

#[derive(Parser, Debug)]
#[command(name = "reelsplice", version)]
struct Cli {
    /// Settings file (default: per-user config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Insert ads, overlay a banner and a moving logo, and render.
    Render(RenderArgs),
    /// Print what the planner sees in a media file.
    Probe(ProbeArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Main video.
    #[arg(required_unless_present = "job")]
    input: Option<PathBuf>,

    /// Output file.
    #[arg(required_unless_present = "job")]
    output: Option<PathBuf>,

    /// Ad insertion as TIMECODE=PATH, e.g. 12:30=ads/spot.mp4.
    #[arg(long = "ad", value_name = "TC=PATH")]
    ads: Vec<String>,

    /// Banner image or clip.
    #[arg(long)]
    banner: Option<PathBuf>,

    /// Original-timeline timecode at which the banner appears.
    #[arg(long = "banner-at", value_name = "TC")]
    banner_at: Vec<String>,

    /// Logo moving around the frame.
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Track edit as SPEC:FIELD=VALUE, e.g. a:0:language=eng or 0:s:1:title=Signs.
    #[arg(long = "edit", value_name = "SPEC:FIELD=VALUE")]
    edits: Vec<String>,

    /// Job description in JSON; flags add to it.
    #[arg(long)]
    job: Option<PathBuf>,

    /// Print the plan without running anything.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Keep intermediate files after a successful run.
    #[arg(long, default_value_t = false)]
    keep_temp: bool,
}

#[derive(Parser, Debug)]
struct ProbeArgs {
    file: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    });

    let mut config = ConfigManager::new(config_path(cli.config.as_deref()));
    config
        .load_or_create()
        .with_context(|| format!("load settings '{}'", config.path().display()))?;

    match cli.cmd {
        Command::Render(args) => cmd_render(args, &config, cli.verbose),
        Command::Probe(args) => cmd_probe(args, &config),
    }
}

fn config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    directories::ProjectDirs::from("", "", "reelsplice")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
}

fn build_job(args: &RenderArgs) -> anyhow::Result<JobRequest> {
    let mut job = match &args.job {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("read job '{}'", path.display()))?;
            serde_json::from_str::<JobRequest>(&text)
                .with_context(|| format!("parse job '{}'", path.display()))?
        }
        None => JobRequest::new(PathBuf::new(), PathBuf::new()),
    };
    if let Some(input) = &args.input {
        job.input = input.clone();
    }
    if let Some(output) = &args.output {
        job.output = output.clone();
    }

    for ad in &args.ads {
        let Some((timecode, path)) = ad.split_once('=') else {
            bail!("--ad expects TIMECODE=PATH, got '{}'", ad);
        };
        job = job.with_ad(timecode.trim(), path.trim());
    }

    if let Some(banner) = &args.banner {
        job = job.with_banner(banner, args.banner_at.iter().cloned());
    } else if !args.banner_at.is_empty() {
        bail!("--banner-at needs --banner");
    }

    if let Some(logo) = &args.logo {
        job = job.with_logo(logo);
    }

    for edit in &args.edits {
        let (spec, field, value) = parse_edit(edit)?;
        let entry = job.track_edits.entry(spec).or_insert_with(TrackEdit::default);
        match field.as_str() {
            "title" => entry.title = Some(value),
            "language" | "lang" => entry.language = Some(value),
            other => bail!("unknown edit field '{}' in '{}'", other, edit),
        }
    }

    if job.input.as_os_str().is_empty() || job.output.as_os_str().is_empty() {
        bail!("input and output are required");
    }
    Ok(job)
}

fn parse_edit(edit: &str) -> anyhow::Result<(String, String, String)> {
    let parsed = edit
        .split_once('=')
        .and_then(|(lhs, value)| lhs.rsplit_once(':').map(|(spec, field)| (spec, field, value)));
    match parsed {
        Some((spec, field, value)) if !spec.is_empty() => Ok((
            spec.to_string(),
            field.to_ascii_lowercase(),
            value.to_string(),
        )),
        _ => bail!("--edit expects SPEC:FIELD=VALUE, got '{}'", edit),
    }
}

fn cmd_render(args: RenderArgs, config: &ConfigManager, verbose: bool) -> anyhow::Result<()> {
    let settings = config.settings();
    let job = build_job(&args)?;

    let probe = FfprobeProbe::new(&settings.paths.ffprobe_path);
    let plan = PlanCompiler::new(&probe, settings)
        .compile(&job)
        .with_context(|| format!("plan '{}'", job.input.display()))?;
    tracing::debug!(
        "Planned {} step(s) for '{}' in {}",
        plan.steps.len(),
        plan.job_name,
        plan.work_dir.display()
    );

    if args.dry_run {
        print_plan(&plan, &settings.paths.ffmpeg_path);
        return Ok(());
    }

    let log_config = LogConfig {
        level: if verbose { LogLevel::Debug } else { LogLevel::Info },
        compact: settings.logging.compact,
        error_tail: settings.logging.error_tail as usize,
        show_timestamps: true,
        show_commands: settings.logging.show_commands,
    };
    let logger = JobLogger::new(
        job.name(),
        config.logs_folder(),
        log_config,
        Some(Box::new(|line: &str| eprintln!("{}", line))),
    )
    .context("create job log")?;
    let logger = Arc::new(logger);

    let executor = FfmpegExecutor::new(&settings.paths.ffmpeg_path)
        .with_tail_lines(settings.logging.error_tail as usize)
        .with_logger(Arc::clone(&logger));
    let runner = PlanRunner::new(executor)
        .keep_temp_files(args.keep_temp || settings.policy.keep_temp_files)
        .with_logger(Arc::clone(&logger));

    let summary = runner.run(&plan)?;
    eprintln!(
        "wrote {} ({} steps, log {})",
        summary.output.display(),
        summary.steps_completed.len(),
        logger.log_path().display()
    );
    Ok(())
}

fn print_plan(plan: &ConversionPlan, ffmpeg: &str) {
    for entry in plan.diagnostics.entries() {
        println!("[{}] {}", entry.level, entry.message);
    }
    for artifact in &plan.artifacts {
        println!("\n# {}", artifact.path.display());
        print!("{}", artifact.contents);
    }
    for (i, step) in plan.steps.iter().enumerate() {
        println!("\n# {}. {} ({})", i + 1, step.name, step.kind);
        println!("{}", step.command_line(ffmpeg));
    }
}

fn cmd_probe(args: ProbeArgs, config: &ConfigManager) -> anyhow::Result<()> {
    let probe = FfprobeProbe::new(&config.settings().paths.ffprobe_path);
    let report = probe
        .inspect(&args.file)
        .with_context(|| format!("probe '{}'", args.file.display()))?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_args(extra: &[&str]) -> RenderArgs {
        let mut argv = vec!["reelsplice", "render", "in.mkv", "out.mp4"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).cmd {
            Command::Render(args) => args,
            Command::Probe(_) => unreachable!(),
        }
    }

    #[test]
    fn flags_build_a_job() {
        let args = render_args(&[
            "--ad", "00:30=ads/a.mp4",
            "--ad", "01:00:00=ads/b.mp4",
            "--banner", "banner.png",
            "--banner-at", "00:10",
            "--logo", "logo.png",
            "--edit", "a:0:language=eng",
            "--edit", "a:0:title=Main audio",
        ]);
        let job = build_job(&args).unwrap();

        assert_eq!(job.ads.len(), 2);
        assert_eq!(job.ads[1].timecode, "01:00:00");
        assert_eq!(job.banner.as_ref().unwrap().timecodes, vec!["00:10"]);
        assert!(job.logo.is_some());
        let edit = &job.track_edits["a:0"];
        assert_eq!(edit.language.as_deref(), Some("eng"));
        assert_eq!(edit.title.as_deref(), Some("Main audio"));
    }

    #[test]
    fn malformed_flags_are_rejected() {
        assert!(build_job(&render_args(&["--ad", "00:30"])).is_err());
        assert!(build_job(&render_args(&["--banner-at", "00:10"])).is_err());
        assert!(build_job(&render_args(&["--edit", "a:0:codec=aac"])).is_err());
        assert!(build_job(&render_args(&["--edit", "title=x"])).is_err());
    }

    #[test]
    fn edit_spec_keeps_input_index() {
        let (spec, field, value) = parse_edit("1:s:2:Title=Signs & Songs").unwrap();
        assert_eq!(spec, "1:s:2");
        assert_eq!(field, "title");
        assert_eq!(value, "Signs & Songs");
    }
}
