// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! genodb-ring: placement and journal diagnostics
//!
//! ```text
//! genodb-ring layout  --network cluster.json
//! genodb-ring locate  --network cluster.json ACGTACGT TTGACCAT ...
//! genodb-ring inspect --journal genodb_data/index.journal --decode
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use genodb_cluster::{ContentHash, HashFunction, HashSpace, Partitioner, SimilarityHash};
use genodb_core::config::MAX_HASH_DEPTH;
use genodb_core::{
    Decode, JournalConfig, KmerPoint, MetadataRecord, NetworkConfig, RingConfig, RingPlacement,
};
use genodb_index::{ConcurrentVpTree, VpTree};
use genodb_storage::{scan_file, Journal};

#[derive(Parser)]
#[command(name = "genodb-ring")]
#[command(about = "Inspect GenoDB record placement and index journals")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Placement {
    Origin,
    Random,
}

impl From<Placement> for RingPlacement {
    fn from(p: Placement) -> Self {
        match p {
            Placement::Origin => RingPlacement::Origin,
            Placement::Random => RingPlacement::Random,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print every group and node with its ring position
    Layout {
        /// Network description (JSON)
        #[arg(short, long)]
        network: PathBuf,

        /// Hash space width in bits
        #[arg(short, long, default_value = "128")]
        bits: u32,

        /// First-entry placement on each ring
        #[arg(long, value_enum, default_value = "origin")]
        placement: Placement,
    },

    /// Resolve k-mers to their owning node
    Locate {
        /// Network description (JSON)
        #[arg(short, long)]
        network: PathBuf,

        /// Index journal to hash against; without one, the given k-mers
        /// form the index
        #[arg(short, long)]
        journal: Option<PathBuf>,

        /// Similarity hash depth
        #[arg(short, long, default_value = "8")]
        depth: u32,

        /// Leaf capacity when building the index from the k-mers
        #[arg(long, default_value = "16")]
        bin_size: usize,

        /// Place by content hash instead of tree descent
        #[arg(long)]
        content: bool,

        /// K-mers over ACGTN
        #[arg(required = true)]
        kmers: Vec<String>,
    },

    /// Walk a journal and report its records
    Inspect {
        /// Journal file
        #[arg(short, long)]
        journal: PathBuf,

        /// Decode the newest intact record as a k-mer index
        #[arg(long)]
        decode: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Layout {
            network,
            bits,
            placement,
        } => show_layout(network, bits, placement.into()),
        Commands::Locate {
            network,
            journal,
            depth,
            bin_size,
            content,
            kmers,
        } => locate_kmers(network, journal, depth, bin_size, content, kmers),
        Commands::Inspect { journal, decode } => inspect_journal(journal, decode),
    }
}

fn load_network(path: &PathBuf) -> Result<NetworkConfig> {
    NetworkConfig::from_file(path)
        .with_context(|| format!("Failed to load network description {:?}", path))
}

fn show_layout(network_path: PathBuf, bits: u32, placement: RingPlacement) -> Result<()> {
    let network = load_network(&network_path)?;
    let space = HashSpace::new(bits).context("Invalid hash space")?;
    let hash: Arc<dyn HashFunction<KmerPoint>> = Arc::new(ContentHash::new(space));
    let partitioner = Partitioner::build(&network, hash, &RingConfig { placement })
        .context("Failed to build partitioner")?;

    let width = (bits as usize + 3) / 4;
    println!(
        "{:<16} {:>w$}  {:<28} {:>w$}",
        "GROUP",
        "GROUP POS",
        "NODE",
        "NODE POS",
        w = width + 2
    );
    for row in partitioner.layout() {
        println!(
            "{:<16} {:>#0w$x}  {:<28} {:>#0w$x}",
            row.group,
            row.group_position,
            row.node.to_string(),
            row.node_position,
            w = width + 2
        );
    }

    println!();
    println!("Group shares:");
    for (position, gap) in partitioner.group_ring().gaps() {
        let share = gap as f64 / space.mask() as f64 * 100.0;
        let name = partitioner
            .group_ring()
            .get(position)
            .map(|g| g.name.as_str())
            .unwrap_or("?");
        println!("  {:<16} {:>6.2}%", name, share);
    }
    Ok(())
}

fn locate_kmers(
    network_path: PathBuf,
    journal: Option<PathBuf>,
    depth: u32,
    bin_size: usize,
    content: bool,
    kmers: Vec<String>,
) -> Result<()> {
    if depth > MAX_HASH_DEPTH {
        bail!("Depth {} exceeds the maximum of {}", depth, MAX_HASH_DEPTH);
    }
    let network = load_network(&network_path)?;
    let points = kmers
        .iter()
        .map(|k| KmerPoint::parse(k))
        .collect::<genodb_core::Result<Vec<_>>>()
        .context("Invalid k-mer")?;

    let tree = match journal {
        Some(path) => {
            let journal = Journal::open(JournalConfig::default().with_path(&path));
            let bytes = journal
                .recover()
                .with_context(|| format!("Failed to read journal {:?}", path))?
                .with_context(|| format!("Journal {:?} holds no intact index", path))?;
            VpTree::<KmerPoint>::from_bytes(&bytes).context("Failed to decode index")?
        }
        None => VpTree::build(points.clone(), bin_size),
    };
    info!(points = tree.size(), "index ready");
    let tree = Arc::new(ConcurrentVpTree::new(tree));

    let similarity = Arc::new(SimilarityHash::new(Arc::clone(&tree), depth, HashSpace::FULL)?);
    let hash: Arc<dyn HashFunction<KmerPoint>> = if content {
        Arc::new(ContentHash::default())
    } else {
        similarity.clone() as Arc<dyn HashFunction<KmerPoint>>
    };
    let partitioner = Partitioner::build(&network, Arc::clone(&hash), &RingConfig::default())
        .context("Failed to build partitioner")?;

    for (text, point) in kmers.iter().zip(points) {
        let path = similarity.path(&point);
        let record = MetadataRecord::new(text.as_str(), point);
        let position = hash.hash(&record);
        let placement = partitioner
            .locate_position(position)
            .with_context(|| format!("No owner for {}", text))?;
        println!(
            "{:<24} path={:<12} pos={:#034x}  group={:<12} node={}",
            text,
            path.to_string(),
            position,
            placement.group.name,
            placement.node
        );
    }
    Ok(())
}

fn inspect_journal(path: PathBuf, decode: bool) -> Result<()> {
    let scan = scan_file(&path).with_context(|| format!("Failed to scan journal {:?}", path))?;

    println!("Journal: {:?}", path);
    println!("  Size:    {} bytes", scan.file_len);
    println!("  Records: {}", scan.records.len());
    for (i, record) in scan.records.iter().enumerate() {
        println!(
            "  #{:<4} offset={:<10} length={:<10} crc={:#010x}",
            i, record.offset, record.length, record.checksum
        );
    }
    match &scan.stopped_at {
        Some(err) => println!("  Damage:  {}", err),
        None => println!("  Damage:  none"),
    }

    if decode {
        let Some(bytes) = scan.latest.as_deref() else {
            println!("  Index:   no intact record");
            return Ok(());
        };
        let tree = VpTree::<KmerPoint>::from_bytes(bytes).context("Failed to decode newest record")?;
        let stats = tree.stats();
        println!("  Index:");
        println!("    bin size:         {}", tree.bin_size());
        println!("    points:           {}", stats.size);
        println!("    leaves:           {}", stats.leaf_count);
        println!("    internal nodes:   {}", stats.internal_count);
        println!("    max depth:        {}", stats.max_depth);
        println!("    oversized leaves: {}", stats.oversized_leaves);
    }
    Ok(())
}
