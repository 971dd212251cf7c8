use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use threadheap::{DotOptions, Heap, to_dot};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// The values the original heap demo was built from
const DEMO_VALUES: [i64; 7] = [52, 10, 4, 22, 35, 46, 17];

#[derive(Parser, Debug)]
#[command(name = "heapdot", about = "Build a threaded max heap and drain it or render it as a Graphviz digraph")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Insert the values, then remove them one at a time, printing each maximum.
    Drain {
        #[arg(allow_negative_numbers = true)]
        values: Vec<i64>,
    },
    /// Insert the values and print the tree as a DOT graph (eg `heapdot dot 3 1 2 | dot -Tpng > heap.png`).
    Dot {
        #[arg(allow_negative_numbers = true)]
        values: Vec<i64>,
        /// Name of the emitted digraph.
        #[arg(long)]
        name: Option<String>,
        /// Leave out the invisible placeholders for missing children.
        #[arg(long)]
        no_null_leaves: bool,
        /// Drain the heap and insert everything again before printing.
        #[arg(long)]
        rebuild: bool,
    },
    /// Build the demo heap, drain it, rebuild it and print the result as a DOT graph.
    Demo,
}

fn build(values: &[i64]) -> Heap<i64> {
    let mut heap = Heap::new();
    for &x in values {
        heap.insert(x);
    }
    debug!(len = heap.len(), "built heap");
    heap
}

fn drain(heap: &mut Heap<i64>) -> Result<Vec<i64>> {
    let mut res = Vec::with_capacity(heap.len());
    while !heap.is_empty() {
        res.push(heap.remove().context("heap emptied while draining")?);
    }
    Ok(res)
}

fn rebuild(values: &[i64]) -> Result<Heap<i64>> {
    let mut heap = build(values);
    let drained = drain(&mut heap)?;
    debug!(?drained, "drained heap");
    for &x in values {
        heap.insert(x);
    }
    Ok(heap)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Drain { values } => {
            let mut heap = build(&values);
            for x in drain(&mut heap)? {
                println!("{}", x);
            }
        }
        Commands::Dot { values, name, no_null_leaves, rebuild: again } => {
            let heap = if again { rebuild(&values)? } else { build(&values) };
            let opts = DotOptions { graph_name: name, null_leaves: !no_null_leaves };
            print!("{}", to_dot(&heap, &opts).context("failed to render heap as dot")?);
        }
        Commands::Demo => {
            let heap = rebuild(&DEMO_VALUES)?;
            debug!(max = heap.peek()?, "rebuilt demo heap");
            print!("{}", to_dot(&heap, &DotOptions::default()).context("failed to render heap as dot")?);
        }
    }

    Ok(())
}
