use convert_webp::args::Args;
use convert_webp::confirm;
use convert_webp::processor::Processor;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse()?;

    // Create processor (ensures the archive and output directories exist)
    let mut processor = Processor::new(&args)?;

    let prompt = format!(
        "Are you sure you want to process the directory {} with oldOutput folder '{}', output folder '{}', and quality {}? (yes/no): ",
        args.directory.display(),
        args.old_output_folder,
        args.output_folder,
        args.quality
    );

    if !confirm::ask(&prompt)? {
        println!("Operation cancelled.");
        return Ok(());
    }

    // Convert all candidate files
    processor.process()?;

    println!("Processing completed.");
    Ok(())
}
