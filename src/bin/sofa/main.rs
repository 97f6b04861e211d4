//! SOFA CLI - Tool for inspecting SOFA files.

use sofa::container::{Backend, OpenOptions};
use sofa::schema::Role;
use sofa::Sofa;
use std::env;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut level = "info";
    let mut options = OpenOptions::default();
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => level = "debug",
            "-vv" | "--trace" => level = "trace",
            "-q" | "--quiet" => level = "error",
            "--no-mmap" => options.use_mmap = false,
            "--json-backend" => options.backend = Backend::Json,
            "--hdf5-backend" => options.backend = Backend::Hdf5,
            "-V" | "--version" => {
                println!("sofa-cli {} (built {})", env!("CARGO_PKG_VERSION"), env!("SOFA_BUILD_DATE"));
                return;
            }
            _ => filtered_args.push(arg),
        }
    }
    init_logging(level);

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    match filtered_args[0] {
        // Info command - summary
        "info" | "i" => {
            let path = require_file(&filtered_args, "info <file>");
            cmd_info(path, &options);
        }

        // Dump command - every attribute and geometry field
        "dump" | "d" => {
            let path = require_file(&filtered_args, "dump <file> [--json]");
            let json_mode = filtered_args.iter().any(|&s| s == "--json" || s == "-j");
            cmd_dump(path, &options, json_mode);
        }

        // Check command - validate only
        "check" | "c" => {
            let path = require_file(&filtered_args, "check <file>");
            cmd_check(path, &options);
        }

        "help" | "h" | "-h" | "--help" => print_help(),

        // Default: if file exists, show info; otherwise error
        _ => {
            if Path::new(filtered_args[0]).exists() {
                cmd_info(filtered_args[0], &options);
            } else {
                eprintln!("Unknown command: {}", filtered_args[0]);
                eprintln!();
                print_help();
                std::process::exit(1);
            }
        }
    }
}

/// Install the fmt subscriber. `RUST_LOG` wins over the verbosity flags.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// First non-flag argument after the command.
fn file_arg<'a>(args: &[&'a str]) -> Option<&'a str> {
    args.iter().skip(1).find(|a| !a.starts_with('-')).copied()
}

fn require_file<'a>(args: &[&'a str], usage: &str) -> &'a str {
    match file_arg(args) {
        Some(path) => path,
        None => {
            eprintln!("Error: missing file argument");
            eprintln!("Usage: sofa-cli {}", usage);
            std::process::exit(1);
        }
    }
}

fn print_help() {
    println!("sofa-cli - SOFA file toolkit");
    println!();
    println!("USAGE:");
    println!("    sofa-cli [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    i, info   <file>              Show conventions, geometry counts and data shape");
    println!("    d, dump   <file> [--json]     Dump all attributes and geometry");
    println!("    c, check  <file>              Validate; exit status 1 on failure");
    println!("    h, help                       Show this help");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose      Show debug output");
    println!("    -vv, --trace       Show trace output (every field bind)");
    println!("    -q, --quiet        Only show errors");
    println!("    --no-mmap          Read files into memory instead of mapping them");
    println!("    --json-backend     Treat the file as a SOFA JSON dump");
    println!("    --hdf5-backend     Treat the file as netCDF-4/HDF5");
    println!("    -V, --version      Print version");
    println!();
    println!("NOTES:");
    println!("    - Passing a file directly is equivalent to 'info'");
    println!("    - RUST_LOG overrides the verbosity flags");
    println!("    - HDF5 files need a build with --features hdf5");
}

fn open_or_exit(path: &str, options: &OpenOptions) -> Sofa {
    match Sofa::open_with(path, options) {
        Ok(sofa) => sofa,
        Err(e) => {
            eprintln!("Failed to read {}: {}", path, e);
            std::process::exit(1);
        }
    }
}

fn cmd_info(path: &str, options: &OpenOptions) {
    let sofa = open_or_exit(path, options);
    let attrs = sofa.attributes();

    println!("File: {}", path);
    println!(
        "Conventions: {} {} ({} {})",
        attrs.sofa_conventions(),
        attrs.sofa_conventions_version(),
        attrs.conventions(),
        attrs.version()
    );
    println!("Title: {}", attrs.title());
    println!("Data type: {}", sofa.data_type());
    println!("Room type: {}", attrs.room_type());
    println!();

    println!("Geometry:");
    for role in Role::ALL {
        let g = sofa.geometry(role);
        println!(
            "  {:<9} {:>6} x {} [{}, {}]",
            role.name(),
            g.len(),
            g.position().shape(),
            g.position_type(),
            g.position_units()
        );
    }
    println!();

    if let Some(fir) = sofa.fir() {
        println!("FIR data:");
        println!("  Measurements: {}", fir.num_measurements());
        println!("  Receivers:    {}", fir.num_receivers());
        println!("  Samples:      {}", fir.num_samples());
        println!("  Sampling rate: {} {}", fir.sampling_rate(), fir.sampling_rate_units());
    }
}

fn cmd_dump(path: &str, options: &OpenOptions, json_mode: bool) {
    let sofa = open_or_exit(path, options);

    if json_mode {
        match serde_json::to_string_pretty(&sofa) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Failed to serialize {}: {}", path, e);
                std::process::exit(1);
            }
        }
        return;
    }

    println!("Attributes:");
    for (key, value) in sofa.attributes().iter() {
        match value {
            Some(v) => println!("  {:<24} {}", key, v),
            None => println!("  {:<24} <absent>", key),
        }
    }
    println!();

    for g in sofa.geometries() {
        println!("{}:", g.role());
        println!("  Position:    {} ({}, {})", g.position().shape(), g.position_type(), g.position_units());
        for (i, p) in g.positions().iter().take(8).enumerate() {
            println!("    [{}] {:>10.4} {:>10.4} {:>10.4}", i, p.x, p.y, p.z);
        }
        if g.len() > 8 {
            println!("    ... {} more", g.len() - 8);
        }
        println!("  Description: {}", g.description().unwrap_or("<absent>"));
        match g.view() {
            Some(v) => println!("  View:        {}", v.shape()),
            None => println!("  View:        <absent>"),
        }
        match g.up() {
            Some(v) => println!("  Up:          {}", v.shape()),
            None => println!("  Up:          <absent>"),
        }
    }
    println!();
    println!("Data: {}", sofa.payload());
}

fn cmd_check(path: &str, options: &OpenOptions) {
    match Sofa::open_with(path, options) {
        Ok(sofa) => {
            println!("{}: OK ({} {})", path, sofa.attributes().sofa_conventions(), sofa.data_type());
        }
        Err(e) => {
            eprintln!("{}: {}", path, e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_arg_after_flags() {
        assert_eq!(file_arg(&["dump", "--json", "hrtf.sofa"]), Some("hrtf.sofa"));
        assert_eq!(file_arg(&["dump", "hrtf.sofa", "-j"]), Some("hrtf.sofa"));
        assert_eq!(file_arg(&["info"]), None);
        assert_eq!(file_arg(&["check", "--json"]), None);
    }
}
