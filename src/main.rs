use region_access::output::Output;
use region_access::store::{JsonFileRepository, UserRepository};
use region_access::{
    AccessGate, BoundaryCache, BoundarySource, Coordinate, LoaderConfig, UserAccess,
};
use serde::Serialize;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "region_access",
    about = "Check map coordinates against a user's permitted regions"
)]
struct Opt {
    /// JSON file with loader settings
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Timeout in seconds for remote boundary sources
    #[structopt(long)]
    timeout: Option<u64>,

    /// Log debug output (RUST_LOG takes precedence)
    #[structopt(short, long)]
    verbose: bool,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(Debug, StructOpt)]
struct AccessOpt {
    /// Grant everything
    #[structopt(long)]
    admin: bool,

    /// Grant the whole country
    #[structopt(long)]
    all_country: bool,

    /// Permitted region, can be repeated
    #[structopt(long = "region", number_of_values = 1)]
    regions: Vec<String>,

    /// Look the user's access up in the user store
    #[structopt(
        long,
        requires = "users",
        conflicts_with_all = &["admin", "all-country", "regions"]
    )]
    user: Option<String>,

    /// JSON user store
    #[structopt(long, parse(from_os_str))]
    users: Option<PathBuf>,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// List the regions of a boundary file or URL
    Regions {
        source: BoundarySource,
        /// Write a GeoJSON FeatureCollection instead of JSON lines
        #[structopt(long)]
        geojson: bool,
    },
    /// Check one coordinate, exit status 1 when not accessible
    Check {
        source: BoundarySource,
        #[structopt(flatten)]
        access: AccessOpt,
        #[structopt(allow_hyphen_values = true)]
        lat: f64,
        #[structopt(allow_hyphen_values = true)]
        lng: f64,
    },
    /// Check {"lat":..,"lng":..} JSON lines read from stdin
    Batch {
        source: BoundarySource,
        #[structopt(flatten)]
        access: AccessOpt,
    },
    /// Print the viewport framing the permitted regions
    Bounds {
        source: BoundarySource,
        #[structopt(flatten)]
        access: AccessOpt,
    },
}

#[derive(Serialize)]
struct BatchResult {
    #[serde(flatten)]
    coordinate: Coordinate,
    accessible: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();
}

fn loader_config(opt: &Opt) -> Result<LoaderConfig, Box<dyn Error>> {
    let mut config = match &opt.config {
        Some(path) => LoaderConfig::from_file(path)?,
        None => LoaderConfig::default(),
    };
    if let Some(timeout) = opt.timeout {
        config.timeout_secs = timeout;
    }
    Ok(config)
}

fn user_access(opt: &AccessOpt) -> Result<UserAccess, Box<dyn Error>> {
    if let Some(username) = &opt.user {
        let path = opt.users.as_ref().ok_or("--user needs --users")?;
        let repo = JsonFileRepository::open(path)?;
        let record = repo
            .get(username)?
            .ok_or_else(|| format!("unknown user {}", username))?;
        return Ok(UserAccess::from(&record));
    }
    Ok(UserAccess {
        is_admin: opt.admin,
        is_all_country: opt.all_country,
        region_ids: opt.regions.iter().cloned().collect(),
    })
}

fn open_gate(
    source: &BoundarySource,
    access: &AccessOpt,
    config: LoaderConfig,
) -> Result<AccessGate, Box<dyn Error>> {
    let cache = Arc::new(BoundaryCache::new(source.clone(), config));
    cache.load()?;
    Ok(AccessGate::new(cache, user_access(access)?))
}

fn batch(gate: &AccessGate) -> Result<(), Box<dyn Error>> {
    let stdin = io::stdin();
    let mut coordinates = vec![];
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let coordinate: Coordinate = serde_json::from_str(&line)?;
        coordinates.push(coordinate);
    }

    let decisions = gate.decide_many(&coordinates);
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    for (coordinate, decision) in coordinates.into_iter().zip(decisions) {
        let json = serde_json::to_string(&BatchResult {
            coordinate,
            accessible: decision.allows(),
        })?;
        writeln!(writer, "{}", json)?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let opt = Opt::from_args();
    init_logging(opt.verbose);
    let config = loader_config(&opt)?;

    match &opt.cmd {
        Command::Regions { source, geojson } => {
            let cache = BoundaryCache::new(source.clone(), config);
            let set = cache.load()?;
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            if *geojson {
                set.write_geojson(&mut writer)?;
            } else {
                set.write_json_lines(&mut writer)?;
            }
        }
        Command::Check {
            source,
            access,
            lat,
            lng,
        } => {
            let gate = open_gate(source, access, config)?;
            let allowed = gate.allows(Coordinate::new(*lat, *lng));
            println!("{}", allowed);
            if !allowed {
                process::exit(1);
            }
        }
        Command::Batch { source, access } => {
            let gate = open_gate(source, access, config)?;
            batch(&gate)?;
        }
        Command::Bounds { source, access } => {
            let gate = open_gate(source, access, config)?;
            println!("{}", serde_json::to_string(&gate.viewport())?);
        }
    }
    Ok(())
}
