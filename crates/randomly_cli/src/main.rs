use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, ensure, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};
use tracing::info;

use randomly_core::config::{parse_instant, parse_seed};
use randomly_core::replay::DEFAULT_REPLAY_PATH;
use randomly_core::{Locale, Randomly, ReplayLog, SeedContext, Settings};

#[derive(Parser, Debug)]
#[command(
    name = "randomly",
    about = "Draw reproducible samples for a scope and print them as NDJSON"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print `count` draws of one kind, one JSON object per line.
    Sample(SampleArgs),
    /// Print the replay line for a scope without drawing anything.
    ReplayInfo(InstanceArgs),
}

#[derive(Args, Debug)]
struct InstanceArgs {
    /// Scope label; omit for a fresh unscoped instance.
    #[arg(long)]
    scope: Option<String>,

    /// Root seed. Negative values are taken as their two's-complement bits.
    #[arg(long, value_name = "NUMBER", allow_hyphen_values = true)]
    seed: Option<String>,

    /// Locale tag such as `en` or `de-DE`.
    #[arg(long)]
    locale: Option<Locale>,

    /// Run start as an RFC 3339 instant.
    #[arg(long = "run-start", value_name = "INSTANT")]
    run_start: Option<String>,

    /// Absent probability for optional values, in `[0, 1]`.
    #[arg(long = "maybe-rate", value_name = "RATE")]
    maybe_rate: Option<f64>,

    /// JSON settings document; its values sit between flags and `RANDOMLY_*`
    /// variables.
    #[arg(long = "settings", value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Append a replay line for the instance to this file
    /// (`target/randomly-replay.txt` when given without a path).
    #[arg(
        long = "replay-log",
        value_name = "PATH",
        num_args = 0..=1,
        default_missing_value = DEFAULT_REPLAY_PATH
    )]
    replay_log: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SampleArgs {
    #[command(flatten)]
    instance: InstanceArgs,

    #[arg(long, value_enum)]
    kind: Kind,

    /// Number of draws.
    #[arg(long, default_value_t = 10)]
    count: usize,

    /// Inclusive lower bound for `int`, `long` and `double`.
    #[arg(long, allow_hyphen_values = true)]
    low: Option<String>,

    /// Upper bound (inclusive for integers, exclusive for `double`).
    #[arg(long, allow_hyphen_values = true)]
    high: Option<String>,

    /// Exclusive upper bound for `index`.
    #[arg(long)]
    bound: Option<usize>,

    /// Round `double` draws to this many decimal places.
    #[arg(long)]
    places: Option<u32>,

    /// Output NDJSON file path; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Kind {
    Int,
    Long,
    Double,
    Index,
    Uuid,
    Noun,
    Stock,
}

impl InstanceArgs {
    fn context(&self) -> Result<SeedContext> {
        let env = Settings::from_env().context("invalid RANDOMLY_* environment")?;
        let external = match &self.settings {
            Some(path) => Settings::load_from_path(path)
                .with_context(|| format!("failed to read settings {:?}", path))?
                .or(env),
            None => env,
        };
        let context = SeedContext::new(external);
        Ok(match &self.replay_log {
            Some(path) => context.with_replay_log(ReplayLog::new(path)),
            None => context,
        })
    }

    fn build(&self, context: &SeedContext) -> Result<Randomly> {
        let mut builder = context.builder();
        if let Some(scope) = &self.scope {
            builder = builder.with_scope(scope.as_str());
        }
        if let Some(seed) = &self.seed {
            builder = builder.with_seed(parse_seed(seed, "--seed")?);
        }
        if let Some(locale) = &self.locale {
            builder = builder.with_locale(locale.clone());
        }
        if let Some(maybe_rate) = self.maybe_rate {
            builder = builder.with_maybe_rate(maybe_rate);
        }
        if let Some(run_start) = &self.run_start {
            let instant: DateTime<Utc> = parse_instant(run_start, "--run-start")?;
            builder = builder.with_run_start_time(instant);
        }
        Ok(builder.build()?)
    }
}

fn parse_bound<T>(value: Option<&str>, flag: &str, kind: Kind) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let Some(text) = value else {
        bail!("--kind {kind:?} requires {flag}");
    };
    text.trim()
        .parse()
        .with_context(|| format!("invalid {flag} value {text:?} for --kind {kind:?}"))
}

fn draw(args: &SampleArgs, r: &mut Randomly) -> Result<Value> {
    let low = args.low.as_deref();
    let high = args.high.as_deref();
    Ok(match args.kind {
        Kind::Int => {
            let low: i32 = parse_bound(low, "--low", args.kind)?;
            let high: i32 = parse_bound(high, "--high", args.kind)?;
            json!(r.int_between(low, high)?)
        }
        Kind::Long => {
            let low: i64 = parse_bound(low, "--low", args.kind)?;
            let high: i64 = parse_bound(high, "--high", args.kind)?;
            json!(r.long_between(low, high)?)
        }
        Kind::Double => {
            let low: f64 = parse_bound(low, "--low", args.kind)?;
            let high: f64 = parse_bound(high, "--high", args.kind)?;
            match args.places {
                Some(places) => json!(r.double_between_rounded(places, low, high)?),
                None => json!(r.double_between(low, high)?),
            }
        }
        Kind::Index => {
            let Some(bound) = args.bound else {
                bail!("--kind index requires --bound");
            };
            json!(r.index(bound)?)
        }
        Kind::Uuid => json!(r.id().uuid()?.to_string()),
        Kind::Noun => json!(r.text().noun()?),
        Kind::Stock => serde_json::to_value(r.finance().stock()?)?,
    })
}

fn sample(args: &SampleArgs, r: &mut Randomly, out: &mut impl Write) -> Result<()> {
    ensure!(
        args.places.is_none() || args.kind == Kind::Double,
        "--places only applies to --kind double"
    );
    for i in 0..args.count {
        let line = json!({ "i": i, "value": draw(args, r)? });
        serde_json::to_writer(&mut *out, &line)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

fn run_sample(args: &SampleArgs) -> Result<()> {
    let context = args.instance.context()?;
    let mut randomly = args.instance.build(&context)?;
    info!(
        scope = randomly.scope_label(),
        kind = ?args.kind,
        count = args.count,
        "sampling"
    );

    match &args.out {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("failed to create {:?}", path))?;
            sample(args, &mut randomly, &mut BufWriter::new(file))
        }
        None => sample(args, &mut randomly, &mut io::stdout().lock()),
    }
}

fn run_replay_info(args: &InstanceArgs) -> Result<()> {
    let context = args.context()?;
    let randomly = args.build(&context)?;
    let mut stdout = io::stdout().lock();
    writeln!(
        stdout,
        "{} | instanceSeed={} | {}",
        randomly.scope_label(),
        randomly.instance_seed(),
        randomly.replay_info()
    )?;
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match Cli::parse().command {
        Command::Sample(args) => run_sample(&args),
        Command::ReplayInfo(args) => run_replay_info(&args),
    }
}
