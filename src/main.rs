//! polyseg command line: inspect saved annotations, probe images and run
//! the segmentation model for a single frame.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::{Path, PathBuf};
    use std::process::ExitCode;
    use std::time::Duration;

    use clap::{Parser, Subcommand, ValueEnum};
    use polyseg::producer::frame_number;
    use polyseg::{
        AnnotationProducer, EditorConfig, FileImageSource, FileRef, ImageAnnotations, ImageSource,
        JsonFolderStore, ProcessConfig, ProcessProducer, ProducerError,
    };

    type CliResult = Result<(), Box<dyn std::error::Error>>;

    #[derive(Parser, Debug)]
    #[command(name = "polyseg")]
    #[command(version)]
    #[command(about = "Inspect and produce polygon annotation documents", long_about = None)]
    struct Args {
        /// Configuration file (defaults to the per-user configuration)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Enable debug logging regardless of the configured level
        #[arg(short, long)]
        verbose: bool,

        #[command(subcommand)]
        command: Command,
    }

    #[derive(Subcommand, Debug)]
    enum Command {
        /// Print a saved document, or every document in a folder
        Show {
            #[arg(value_name = "PATH")]
            path: PathBuf,

            #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
            format: OutputFormat,
        },
        /// Print an image's natural size
        Probe {
            #[arg(value_name = "IMAGE")]
            image: PathBuf,
        },
        /// Segment one frame with the external model and print the result
        Model {
            /// Frame image, named like `frame_000002.jpg`
            #[arg(value_name = "IMAGE")]
            image: PathBuf,

            /// Model command
            #[arg(long)]
            program: String,

            /// Folder the model writes `frame_NNNNNN.json` into
            #[arg(long, value_name = "DIR")]
            output: PathBuf,

            /// Extra arguments passed before the frame number
            #[arg(last = true)]
            args: Vec<String>,
        },
        /// Print the effective configuration
        Config,
    }

    #[derive(Clone, Copy, Debug, ValueEnum)]
    enum OutputFormat {
        Text,
        Json,
    }

    pub fn main() -> ExitCode {
        let args = Args::parse();
        let (config, config_error) = load_config(args.config.as_deref());
        init_logging(&config, args.verbose);
        if let Some(e) = config_error {
            log::warn!("⚠️ Using default configuration: {}", e);
        }

        match run(args.command, &config) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                log::error!("❌ {}", e);
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        }
    }

    fn load_config(path: Option<&Path>) -> (EditorConfig, Option<String>) {
        match path {
            Some(path) => match EditorConfig::load(path) {
                Ok(config) => (config, None),
                Err(e) => (EditorConfig::default(), Some(e.to_string())),
            },
            None => (EditorConfig::load_from_default_path().unwrap_or_default(), None),
        }
    }

    fn init_logging(config: &EditorConfig, verbose: bool) {
        let level = if verbose {
            log::LevelFilter::Debug
        } else {
            config.log_level.to_level_filter()
        };
        env_logger::Builder::from_default_env()
            .filter_level(level)
            .format_timestamp(None)
            .init();
    }

    fn run(command: Command, config: &EditorConfig) -> CliResult {
        match command {
            Command::Show { path, format } => show(&path, format),
            Command::Probe { image } => probe(&image),
            Command::Model {
                image,
                program,
                output,
                args,
            } => model(&image, ProcessConfig::new(program, output).with_args(args)),
            Command::Config => {
                if let Some(path) = EditorConfig::default_path() {
                    log::info!("Default configuration path: {}", path.display());
                }
                println!("{}", config.to_json()?);
                Ok(())
            }
        }
    }

    fn print_document(document: &ImageAnnotations, format: OutputFormat) -> CliResult {
        match format {
            OutputFormat::Text => print!("{}", document.to_text()),
            OutputFormat::Json => println!("{}", document.to_json()?),
        }
        Ok(())
    }

    fn show(path: &Path, format: OutputFormat) -> CliResult {
        if !path.is_dir() {
            return print_document(&JsonFolderStore::read_document(path)?, format);
        }

        let store = JsonFolderStore::new(path)?;
        let documents = store.list()?;
        log::info!("📂 Found {} documents", documents.len());
        for document_path in documents {
            match JsonFolderStore::read_document(&document_path) {
                Ok(document) => print_document(&document, format)?,
                Err(e) => log::warn!("⚠️ Skipping {}: {}", document_path.display(), e),
            }
        }
        Ok(())
    }

    /// Split an image path into the folder a source probes and the file in it.
    fn file_ref(image: &Path) -> (PathBuf, FileRef) {
        let root = image
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let name = image
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        (root, FileRef::named(name))
    }

    fn probe(image: &Path) -> CliResult {
        let (root, file) = file_ref(image);
        let size = FileImageSource::new(root).image_size(&file)?;
        println!("{}: {}x{}", file.name, size.width, size.height);
        Ok(())
    }

    fn model(image: &Path, process: ProcessConfig) -> CliResult {
        let (_, file) = file_ref(image);
        let frame =
            frame_number(&file.name).ok_or_else(|| ProducerError::NotAFrame(file.name.clone()))?;

        let mut producer = ProcessProducer::spawn(process)?;
        producer.request(&file, frame)?;
        log::info!("🤖 Waiting for frame {}", frame);

        loop {
            let results = producer.take_results();
            if let Some(result) = results.into_iter().next() {
                return print_document(&result.outcome?, OutputFormat::Text);
            }
            std::thread::sleep(Duration::from_millis(50));
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    cli::main()
}

// No command line on the web.
#[cfg(target_arch = "wasm32")]
fn main() {}
