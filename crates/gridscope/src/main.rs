use std::process;

use clap::{Parser, Subcommand};
use gridscope_core::descriptor::TypeDescriptor;
use gridscope_core::error::{GridscopeError, GridscopeResult};
use gridscope_core::index::{child_ref, name_to_index};
use gridscope_core::packed::PackedFlags;
use gridscope_core::registry::{Family, FAMILY_PATTERNS};
use gridscope_core::{DecodeOptions, Formatters, ResolvedShape, StorageOrder, SyntheticChildren, ValueHandle};
use gridscope_utils::{debug, LogFormat, LogLevel, LoggingConfig};

mod fixture;

use fixture::{build_value, FixtureLayout, FixtureRequest};

/// Recover and display the layout of numeric containers.
#[derive(Parser, Debug)]
#[command(name = "gridscope")]
#[command(version)]
#[command(about = "Recover and display the layout of numeric containers", long_about = None)]
struct Cli
{
    /// Log level (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,
    /// Log format: pretty or json (overrides GRIDSCOPE_LOG_FORMAT)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
    /// Scalar type names to try when the element type cannot be looked up (repeatable)
    #[arg(long = "scalar-fallback", global = true)]
    scalar_fallbacks: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// Parse a type name and print the recovered descriptor
    Parse
    {
        /// Canonical type name, e.g. "Eigen::Matrix<double, 3, 1, 0, 3, 1>"
        type_name: String,
    },
    /// Map a child name to its storage index and back
    Index
    {
        #[arg(long)]
        rows: u64,
        #[arg(long)]
        cols: u64,
        /// Elements are stored row by row
        #[arg(long, default_value_t = false)]
        row_major: bool,
        /// Child name: `[i]`, `i`, `[r, c]` or `r,c`
        name: String,
    },
    /// Decode a packed grid flags word (hex format: 0x1A or decimal)
    Flags
    {
        flags: String,
    },
    /// List the type patterns formatters are registered for
    Families,
    /// Lay out a container in memory and show what the formatters recover
    Inspect
    {
        /// Canonical type name of the container
        #[arg(long = "type")]
        type_name: String,
        /// Element values in storage order, comma separated
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        values: Vec<f64>,
        /// How elements are stored
        #[arg(long, value_enum, default_value_t = FixtureLayout::Inline)]
        layout: FixtureLayout,
        /// Runtime row count for dynamic axes
        #[arg(long)]
        rows: Option<u64>,
        /// Runtime column count for dynamic axes
        #[arg(long)]
        cols: Option<u64>,
    },
}

fn main()
{
    let cli = Cli::parse();

    let logging = LoggingConfig::from_env().map(|config| {
        let config = match cli.log_level {
            Some(level) => config.with_level(level),
            None => config,
        };
        match cli.log_format {
            Some(format) => config.with_format(format),
            None => config,
        }
    });
    let _guard = match logging.and_then(LoggingConfig::init) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run_command(cli: Cli) -> GridscopeResult<()>
{
    let mut options = DecodeOptions::from_env();
    if !cli.scalar_fallbacks.is_empty() {
        options = options.with_scalar_fallbacks(cli.scalar_fallbacks);
    }
    debug!(?options, "decode options");

    match cli.command {
        Commands::Parse { type_name } => {
            print_descriptor(&TypeDescriptor::parse(&type_name));
            Ok(())
        }
        Commands::Index {
            rows,
            cols,
            row_major,
            name,
        } => {
            let order = if row_major {
                StorageOrder::RowMajor
            } else {
                StorageOrder::ColumnMajor
            };
            print_index(&ResolvedShape::new(rows, cols, order), &name)
        }
        Commands::Flags { flags } => {
            print_flags(PackedFlags(parse_integer(&flags)?));
            Ok(())
        }
        Commands::Families => {
            print_families();
            Ok(())
        }
        Commands::Inspect {
            type_name,
            values,
            layout,
            rows,
            cols,
        } => {
            let request = FixtureRequest {
                type_name,
                layout,
                values,
                rows,
                cols,
            };
            inspect(&Formatters::new(options), &request)
        }
    }
}

/// Hex with a `0x` prefix, otherwise decimal
fn parse_integer(raw: &str) -> GridscopeResult<u64>
{
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => raw.parse::<u64>(),
    };
    parsed.map_err(|_| GridscopeError::InvalidArgument(format!("not a hex or decimal integer: {raw}")))
}

fn print_descriptor(descriptor: &TypeDescriptor)
{
    println!("Type: {}", descriptor.raw());
    println!("  Element type: {}", descriptor.element_type_name());
    println!("  Rows: {}", descriptor.rows());
    println!("  Cols: {}", descriptor.cols());
    println!("  Options flag: {}", descriptor.storage_flag());
    println!("  Storage order: {}", descriptor.order());
    println!("  Fixed size: {}", descriptor.is_fixed_size());
}

fn print_index(shape: &ResolvedShape, name: &str) -> GridscopeResult<()>
{
    let index = name_to_index(shape, name).ok_or_else(|| {
        GridscopeError::InvalidArgument(format!(
            "{name} is not a child of a {} x {} container",
            shape.rows, shape.cols
        ))
    })?;
    let child = child_ref(shape, index).map_err(|e| GridscopeError::InvalidArgument(e.to_string()))?;
    println!("{name} -> index {index}");
    println!("  Display name: {}", child.display_name);
    println!("  Row: {}, Col: {}", child.row, child.col);
    println!("  Order: {}", shape.order);
    Ok(())
}

fn print_flags(flags: PackedFlags)
{
    println!("Flags: 0x{:x}", flags.0);
    println!("  Depth bits: {}", flags.depth_bits());
    println!("  Depth: {} ({})", flags.depth_label(), flags.depth().type_name());
    println!("  Channels: {}", flags.channels());
}

fn print_families()
{
    for (family, pattern) in FAMILY_PATTERNS {
        let mut surfaces = Vec::new();
        if family.has_summary() {
            surfaces.push("summary");
        }
        if family.has_synthetic_children() {
            surfaces.push("children");
        }
        println!("{:<14} {:<28} {}", family.name(), pattern, surfaces.join(", "));
    }
}

fn inspect(formatters: &Formatters, request: &FixtureRequest) -> GridscopeResult<()>
{
    let value = build_value(request)?;
    let family = Family::of_value(&value).map_or("none", Family::name);
    println!("{} ({family})", value.canonical_type_name());
    if let Some(summary) = formatters.summary(&value) {
        println!("  Summary: {summary}");
    }

    let Some(children) = formatters.synthetic_children(&value) else {
        return Ok(());
    };
    println!("  Children: {}", children.num_children());
    for index in 0..children.num_children() {
        match children.child_at_index(index) {
            Some(child) => {
                let shown = child.value_string().unwrap_or_else(|| "<unreadable>".to_string());
                println!("    {} = {shown}", child.name());
            }
            None => println!("    [{index}] <unavailable>"),
        }
    }
    Ok(())
}
