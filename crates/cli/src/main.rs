use anyhow::{bail, Context};
use luckydraw_core::{
    parse_list, DrawEngine, DrawError, DrawMode, DrawRequest, DrawResult, DrawSession,
    LadderEvent, LadderRun, ModeInfo, Pairing, RngState,
};
use luckydraw_data::{load_engine, load_fortune_table, load_ladder_config, load_request, read_list};
use serde::Serialize;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

mod logging;

const TICKS_PER_FRAME: u32 = 4;
const FRAME: Duration = Duration::from_millis(16);

const USAGE: &str = "usage: luckydraw <mode> [--list FILE] [--prizes FILE] [--count N] \
[--timer SECS] [--seed N] [--assets DIR] [--config FILE] [--fortunes FILE] \
[--request FILE] [--json] [--instant]\n       luckydraw --modes";

#[derive(Debug, Clone, Default, PartialEq)]
struct CliOptions {
    mode: Option<DrawMode>,
    list: Option<PathBuf>,
    prizes: Option<PathBuf>,
    count: Option<usize>,
    timer: Option<u32>,
    seed: Option<u64>,
    assets: Option<PathBuf>,
    config: Option<PathBuf>,
    fortunes: Option<PathBuf>,
    request: Option<PathBuf>,
    json: bool,
    instant: bool,
    modes: bool,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    mode: DrawMode,
    seed: u64,
    result: &'a DrawResult,
}

fn parse_cli_options(args: &[String]) -> anyhow::Result<CliOptions> {
    let mut options = CliOptions::default();
    let mut idx = 0usize;
    while idx < args.len() {
        let arg = args[idx].as_str();
        match arg {
            "--json" => options.json = true,
            "--instant" => options.instant = true,
            "--modes" => options.modes = true,
            "--list" | "-l" => options.list = Some(PathBuf::from(value_of(args, idx)?)),
            "--prizes" | "-p" => options.prizes = Some(PathBuf::from(value_of(args, idx)?)),
            "--assets" => options.assets = Some(PathBuf::from(value_of(args, idx)?)),
            "--config" => options.config = Some(PathBuf::from(value_of(args, idx)?)),
            "--fortunes" => options.fortunes = Some(PathBuf::from(value_of(args, idx)?)),
            "--request" => options.request = Some(PathBuf::from(value_of(args, idx)?)),
            "--count" | "-n" => {
                let value = value_of(args, idx)?;
                options.count = Some(value.parse().with_context(|| format!("count {value}"))?);
            }
            "--timer" => {
                let value = value_of(args, idx)?;
                options.timer = Some(value.parse().with_context(|| format!("timer {value}"))?);
            }
            "--seed" => {
                let value = value_of(args, idx)?;
                options.seed = Some(value.parse().with_context(|| format!("seed {value}"))?);
            }
            _ if arg.starts_with('-') => bail!("unknown option {arg}\n{USAGE}"),
            _ => {
                if options.mode.is_some() {
                    bail!("unexpected argument {arg}\n{USAGE}");
                }
                let mode = DrawMode::from_key(arg)
                    .with_context(|| format!("unknown mode {arg}, see --modes"))?;
                options.mode = Some(mode);
            }
        }
        if takes_value(arg) {
            idx += 1;
        }
        idx += 1;
    }
    Ok(options)
}

fn takes_value(arg: &str) -> bool {
    matches!(
        arg,
        "--list"
            | "-l"
            | "--prizes"
            | "-p"
            | "--assets"
            | "--config"
            | "--fortunes"
            | "--request"
            | "--count"
            | "-n"
            | "--timer"
            | "--seed"
    )
}

fn value_of(args: &[String], idx: usize) -> anyhow::Result<&str> {
    match args.get(idx + 1) {
        Some(value) => Ok(value.as_str()),
        None => bail!("{} needs a value", args[idx]),
    }
}

fn main() {
    logging::init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(err) = parse_cli_options(&args).and_then(|options| run(&options)) {
        eprintln!("luckydraw: {err:#}");
        std::process::exit(1);
    }
}

fn run(options: &CliOptions) -> anyhow::Result<()> {
    if options.modes {
        print_modes(&mut io::stdout().lock())?;
        return Ok(());
    }
    let engine = build_engine(options)?;
    let request = build_request(options)?;
    let mut rng = match options.seed {
        Some(seed) => RngState::from_seed(seed),
        None => RngState::from_entropy(),
    };
    debug!(seed = rng.seed(), mode = %request.mode, "draw seeded");

    if request.mode == DrawMode::Countdown && !options.instant {
        countdown(request.settings.countdown())?;
    }
    let result = match engine.start(&request, &mut rng)? {
        DrawSession::Resolved(result) => result,
        DrawSession::Ladder(run) => DrawResult::Pairs(drive_ladder(run, options.instant)?),
    };

    let mut out = io::stdout().lock();
    if options.json {
        let payload = JsonOutput {
            mode: request.mode,
            seed: rng.seed(),
            result: &result,
        };
        serde_json::to_writer_pretty(&mut out, &payload).context("write result")?;
        writeln!(out)?;
    } else {
        writeln!(out, "{result}")?;
    }
    Ok(())
}

fn build_engine(options: &CliOptions) -> anyhow::Result<DrawEngine> {
    let base = match options.assets.as_deref() {
        Some(dir) => load_engine(dir)?,
        None => DrawEngine::default(),
    };
    let ladder = match options.config.as_deref() {
        Some(path) => load_ladder_config(path)?,
        None => base.ladder_config().clone(),
    };
    let fortunes = match options.fortunes.as_deref() {
        Some(path) => load_fortune_table(path)?,
        None => base.fortunes().clone(),
    };
    Ok(DrawEngine::new(ladder, fortunes)?)
}

fn build_request(options: &CliOptions) -> anyhow::Result<DrawRequest> {
    let mut request = match (options.request.as_deref(), options.mode) {
        (Some(path), mode) => {
            let mut request = load_request(path)?;
            if let Some(mode) = mode {
                request.mode = mode;
            }
            request
        }
        (None, Some(mode)) => DrawRequest::new(mode),
        (None, None) => bail!("no mode given\n{USAGE}"),
    };
    if let Some(path) = options.list.as_deref() {
        request.candidates = read_list(path)?;
    } else if request.mode.uses_candidates() && request.candidates.is_empty() {
        request.candidates = read_stdin_list()?;
    }
    if let Some(path) = options.prizes.as_deref() {
        request.prizes = read_list(path)?;
    }
    if request.mode.info().requires_dual_input && request.prizes.is_empty() {
        bail!("{} needs a prize list (--prizes FILE)", request.mode);
    }
    if let Some(count) = options.count {
        request.settings.pick_count = count;
    }
    if let Some(timer) = options.timer {
        request.settings.timer_seconds = timer;
    }
    Ok(request)
}

fn read_stdin_list() -> anyhow::Result<Vec<String>> {
    let mut raw = String::new();
    io::stdin()
        .read_to_string(&mut raw)
        .context("read candidates from stdin")?;
    Ok(parse_list(&raw))
}

fn print_modes(out: &mut impl Write) -> io::Result<()> {
    for mode in DrawMode::ALL {
        let info = mode.info();
        writeln!(out, "{:<14} {}", info.key, info.title)?;
        writeln!(out, "{:<14} {}{}", "", info.description, mode_needs(&info))?;
    }
    Ok(())
}

fn mode_needs(info: &ModeInfo) -> String {
    if info.no_input {
        return String::new();
    }
    let mut needs = vec!["--list"];
    if info.requires_dual_input {
        needs.push("--prizes");
    }
    if info.requires_count {
        needs.push("--count");
    }
    if info.requires_timer {
        needs.push("--timer");
    }
    format!(" [{}]", needs.join(" "))
}

fn countdown(total: Duration) -> anyhow::Result<()> {
    let mut err = io::stderr().lock();
    for remaining in (1..=total.as_secs()).rev() {
        write!(err, "\r{remaining:>3}")?;
        err.flush()?;
        thread::sleep(Duration::from_secs(1));
    }
    writeln!(err, "\r   ")?;
    Ok(())
}

/// Drive the run frame by frame, echoing every crossing to stderr. With
/// `instant` the frames are not paced.
fn drive_ladder(mut run: LadderRun, instant: bool) -> anyhow::Result<Vec<Pairing>> {
    let budget = run.step_budget();
    info!(
        lanes = run.board().lane_count(),
        rungs = run.board().rungs().len(),
        budget,
        "ladder started"
    );
    let names = run.names().to_vec();
    let mut err = io::stderr().lock();
    loop {
        let progress = run.advance(TICKS_PER_FRAME);
        for event in run.drain_events() {
            if instant {
                continue;
            }
            match event {
                LadderEvent::Transferred { token, from, to, .. } => {
                    writeln!(err, "  {} crosses {from} -> {to}", names[token])?;
                }
                LadderEvent::Finished { token, lane } => {
                    writeln!(err, "  {} lands on lane {lane}", names[token])?;
                }
            }
        }
        if let Some(pairs) = progress.result {
            return Ok(pairs);
        }
        if run.budget_exhausted() {
            return Err(DrawError::SimulationStalled { steps: run.steps() }.into());
        }
        if !instant {
            thread::sleep(FRAME);
        }
    }
}
