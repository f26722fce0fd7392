use clap::{Parser, Subcommand, ValueEnum};
use keyrank::rank::{log2_rank, rank_all_weights, rank_for_key};
use keyrank::{DistinguishingTable, Key, RankError, SimulatedHwCpa, Transform, DEFAULT_LOG_BASE};
use log::info;
use std::fs;
use std::io::{self, Read};

#[derive(Parser)]
#[command(name = "keyrank")]
#[command(about = "Side-channel key rank calculator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank a known key against a file of distinguishing scores
    Rank {
        /// Known key as little-endian hex
        #[arg(short, long)]
        key: String,

        #[command(flatten)]
        table: TableArgs,

        /// Print log2(rank) instead of the full rank
        #[arg(long)]
        log: bool,
    },

    /// Rank every weight bound from --max-weight down to 1
    Weights {
        /// Largest weight bound to rank
        #[arg(short, long)]
        max_weight: u64,

        #[command(flatten)]
        table: TableArgs,
    },

    /// Rank the key recovered by simulated Hamming-weight CPA attacks on AES-128
    Simulate {
        /// AES-128 key as hex (random if omitted)
        #[arg(short, long)]
        key: Option<String>,

        /// Traces per attack
        #[arg(short, long, default_value_t = 30)]
        traces: usize,

        /// Signal-to-noise ratio of the leakage
        #[arg(short, long, default_value_t = 0.25)]
        snr: f64,

        /// Number of independent attacks
        #[arg(short, long, default_value_t = 1)]
        attacks: usize,

        /// RNG seed
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Bits of precision for weight conversion
        #[arg(short, long, default_value_t = 12)]
        precision: u32,
    },
}

#[derive(clap::Args)]
struct TableArgs {
    /// Bits of precision for weight conversion
    #[arg(short, long, default_value_t = 16)]
    precision: u32,

    /// Number of distinguishing vectors
    #[arg(long, default_value_t = 16)]
    vector_count: usize,

    /// Key bits targeted by each distinguishing vector
    #[arg(long, default_value_t = 8)]
    vector_size_bits: u32,

    /// Scores file, whitespace or comma separated (use - for stdin)
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Transforms applied to the scores, in order, before weight conversion
    #[arg(short, long, value_enum, value_delimiter = ',')]
    transform: Vec<TransformArg>,

    /// Base for the log transform
    #[arg(long, default_value_t = DEFAULT_LOG_BASE)]
    log_base: f64,
}

#[derive(Clone, Copy, ValueEnum)]
enum TransformArg {
    Abs,
    Translate,
    Normalise,
    Log,
    /// translate, normalise, log, abs
    Correlation,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read scores: {0}")]
    Io(#[from] io::Error),

    #[error("invalid score '{0}'")]
    Score(String),

    #[error(transparent)]
    Rank(#[from] RankError),
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Rank { key, table, log } => rank(&key, &table, log),
        Commands::Weights { max_weight, table } => weights(max_weight, &table),
        Commands::Simulate {
            key,
            traces,
            snr,
            attacks,
            seed,
            precision,
        } => simulate(key.as_deref(), traces, snr, attacks, seed, precision),
    };

    if let Err(e) = outcome {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn read_input(input: &str) -> io::Result<String> {
    if input == "-" {
        let mut data = String::new();
        io::stdin().read_to_string(&mut data)?;
        Ok(data)
    } else {
        fs::read_to_string(input)
    }
}

fn parse_scores(text: &str) -> Result<Vec<f64>, CliError> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|_| CliError::Score(token.to_string()))
        })
        .collect()
}

fn load_table(args: &TableArgs) -> Result<DistinguishingTable, CliError> {
    let scores = parse_scores(&read_input(&args.input)?)?;
    info!("read {} scores from {}", scores.len(), args.input);
    let mut table = DistinguishingTable::new(args.vector_count, args.vector_size_bits, scores)?;
    let mut transforms = Vec::new();
    for arg in &args.transform {
        match arg {
            TransformArg::Abs => transforms.push(Transform::Absolute),
            TransformArg::Translate => transforms.push(Transform::TranslateToPositive),
            TransformArg::Normalise => transforms.push(Transform::Normalise),
            TransformArg::Log => transforms.push(Transform::Logarithm(args.log_base)),
            TransformArg::Correlation => {
                transforms.extend(Transform::correlation_pipeline(args.log_base))
            }
        }
    }
    Transform::apply_all(&transforms, &mut table);
    Ok(table)
}

fn rank(key_hex: &str, args: &TableArgs, log: bool) -> Result<(), CliError> {
    let table = load_table(args)?;
    let key_bits = args.vector_count * args.vector_size_bits as usize;
    let key = Key::from_hex(key_bits, key_hex)?;
    let weights = table.map_to_weight(args.precision)?;
    let rank = rank_for_key(&key, &weights)?;

    if log {
        println!("{:.6}", log2_rank(&rank));
    } else {
        println!("{}", rank);
    }
    Ok(())
}

fn weights(max_weight: u64, args: &TableArgs) -> Result<(), CliError> {
    let table = load_table(args)?;
    let weights = table.map_to_weight(args.precision)?;
    let ranks = rank_all_weights(max_weight, &weights)?;
    for (offset, rank) in ranks.iter().enumerate() {
        println!("{}\t{}", max_weight - offset as u64, rank);
    }
    Ok(())
}

fn simulate(
    key_hex: Option<&str>,
    traces: usize,
    snr: f64,
    attacks: usize,
    seed: u64,
    precision: u32,
) -> Result<(), CliError> {
    let key = match key_hex {
        Some(hex_key) => Key::from_hex(128, hex_key)?,
        None => Key::new(128, rand::random::<[u8; 16]>().to_vec())?,
    };
    let mut key_bytes = [0u8; 16];
    key_bytes.copy_from_slice(key.as_bytes());

    let mut cpa = SimulatedHwCpa::new(key_bytes, traces, snr, seed);
    println!("Key: {}", cpa.key_hex());
    println!("Traces: {}, SNR: {}", traces, snr);

    for attack in 0..attacks {
        let mut table = cpa.next_attack()?;
        Transform::apply_all(&Transform::correlation_pipeline(DEFAULT_LOG_BASE), &mut table);
        let weights = table.map_to_weight(precision)?;
        let rank = rank_for_key(&key, &weights)?;
        println!(
            "Attack {}: rank at {} bits of precision = 2^{:.6} ({})",
            attack,
            precision,
            log2_rank(&rank),
            rank
        );
    }
    Ok(())
}
