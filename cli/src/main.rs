use clap::Parser;
use clap::error::ErrorKind;
use pdf_font_audit::{
    AuditConfig, ClassificationResult, EXIT_DECODE_FAILURE, EXIT_USAGE, PageDecoder, Verdict,
};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pdf-font-audit", version)]
#[command(
    about = "Check that headings use Libertinus Sans and body text uses Libertinus Serif",
    long_about = "Inspects the first page of a PDF and exits with 0 when headings and body \
                  text use the expected fonts, 1 when headings do not, 2 when body text does \
                  not, 3 when neither does, and 4 when the PDF cannot be read."
)]
struct Args {
    /// PDF file to check
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Password for encrypted PDFs
    #[arg(short, long)]
    password: Option<String>,

    /// Print the fonts found and the usage of each role
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pdf_font_audit=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn join(names: &BTreeSet<String>) -> String {
    names.iter().cloned().collect::<Vec<_>>().join(", ")
}

fn print_role(result: &ClassificationResult) {
    println!("{} fonts: {}", result.role, join(&result.role_font_names));
    println!(
        "{} usage: {:.2}, total: {}",
        result.role, result.usage_percentage, result.total_classified
    );
}

fn print_report(file: &Path, verdict: &Verdict) {
    println!("{}", file.display());
    println!("All fonts: {}", join(&verdict.headings.all_font_names));
    if let Some(size) = verdict.headings.dominant_size {
        println!("Body font size: {:.2}", size);
    }
    print_role(&verdict.headings);
    print_role(&verdict.body);
    println!("{}", verdict);
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // --help and --version are not errors
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                let _ = e.print();
                process::exit(0);
            }
            let _ = e.print();
            process::exit(EXIT_USAGE);
        }
    };

    if args.verbose {
        init_logging();
    }

    let decoder = match args.password {
        Some(password) => PageDecoder::builder().password(password).build(),
        None => PageDecoder::default(),
    };
    let config = AuditConfig::default();

    let verdict = match pdf_font_audit::audit_path(&args.file, &decoder, &config) {
        Ok(verdict) => verdict,
        Err(e) => {
            eprintln!("Error reading {:?}: {}", args.file, e);
            process::exit(EXIT_DECODE_FAILURE);
        }
    };

    if args.verbose {
        print_report(&args.file, &verdict);
    }

    process::exit(verdict.exit_code());
}
