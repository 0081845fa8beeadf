/// Replay recorded detections through the follow pipeline
///
/// Reads a replay document (per-frame detector output, optionally with the
/// frame images), re-identifies the followed person frame by frame and emits
/// one navigation goal per matched frame.
///
/// Usage:
///   cargo run --example follow_replay -- [--config node.json] [--out goals.jsonl] <detections.json>
///
/// Goals are written as JSON lines to `--out`, or logged when no output file
/// is given. Frames without an image use a blank frame of `frame_size`.
use anyhow::{bail, Context};
use follow_node::{
    CommandSink, FollowPipeline, ImageData, JsonLinesSink, LogSink, NodeConfig, ReplayDetector,
    ReplayDocument,
};
use std::env;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

const DEFAULT_FRAME_SIZE: (u32, u32) = (640, 480);

struct Args {
    config: Option<PathBuf>,
    out: Option<PathBuf>,
    detections: PathBuf,
}

fn parse_args() -> anyhow::Result<Args> {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut config = None;
    let mut out = None;
    let mut detections = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                config = Some(PathBuf::from(args.get(i).context("--config needs a path")?));
            }
            "--out" => {
                i += 1;
                out = Some(PathBuf::from(args.get(i).context("--out needs a path")?));
            }
            other if other.starts_with("--") => bail!("unknown option {}", other),
            other => detections = Some(PathBuf::from(other)),
        }
        i += 1;
    }

    let Some(detections) = detections else {
        bail!("usage: follow_replay [--config node.json] [--out goals.jsonl] <detections.json>");
    };
    Ok(Args {
        config,
        out,
        detections,
    })
}

fn run<S: CommandSink>(
    config: NodeConfig,
    document: ReplayDocument,
    base_dir: &Path,
    sink: S,
) -> anyhow::Result<()> {
    let (width, height) = document.frame_size.unwrap_or(DEFAULT_FRAME_SIZE);
    let format = config.pixel_format;
    let frames = document.frames.clone();
    let mut pipeline = FollowPipeline::new(config, ReplayDetector::new(document), sink)?;

    for frame in &frames {
        let image = match &frame.image {
            Some(path) => {
                let path = base_dir.join(path);
                ImageData::from_file(&path, format).with_context(|| {
                    format!("frame {}: loading {}", frame.frame_id, path.display())
                })?
            }
            None => ImageData::filled(width, height, [0, 0, 0], format),
        };

        if let Some(goal) = pipeline.process(&image) {
            log::debug!(
                "Frame {} -> forward={:.3}, yaw={:.3}",
                frame.frame_id,
                goal.position[0],
                goal.yaw()
            );
        }
    }

    let stats = pipeline.stats();
    eprintln!("Frames processed: {}", stats.frames);
    eprintln!("  matched:         {}", stats.matched);
    eprintln!("  cold starts:     {}", stats.cold_starts);
    eprintln!("  empty frames:    {}", stats.empty_frames);
    eprintln!("  losses:          {}", stats.losses);
    eprintln!("  invalid frames:  {}", stats.invalid_frames);
    eprintln!("  detector errors: {}", stats.detector_errors);
    eprintln!("  sink errors:     {}", stats.sink_errors);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => NodeConfig::from_file(path)?,
        None => NodeConfig::default(),
    };
    let document = ReplayDocument::from_file(&args.detections)
        .with_context(|| format!("reading {}", args.detections.display()))?;
    let base_dir = args
        .detections
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    log::info!(
        "follow-node {} replaying {} frames",
        follow_node::version(),
        document.frames.len()
    );

    match &args.out {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            run(config, document, &base_dir, JsonLinesSink::new(BufWriter::new(file)))
        }
        None => run(config, document, &base_dir, LogSink),
    }
}
