//! Build a site's stylesheets.

use std::{
   io::{BufReader, Write},
   path::PathBuf,
   process::ExitCode,
};

use clap::Parser;
use log::{error, info};
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use thiserror::Error;
use tokio::runtime::Runtime;

use cli::{Cli, Command};
use lx_sass::{build, config, error::Chain, sass, version, CompileOptions};

mod cli;

fn main() -> ExitCode {
   let cli = Cli::parse();

   if let Err(e) = TermLogger::init(
      cli.log_level(),
      simplelog::Config::default(),
      TerminalMode::Stderr,
      ColorChoice::Auto,
   ) {
      eprintln!("could not set up logging: {e}");
   }

   match run(&cli) {
      Ok(()) => ExitCode::SUCCESS,
      Err(e) => {
         error!("{}", Chain(&e));
         ExitCode::FAILURE
      }
   }
}

fn run(cli: &Cli) -> Result<(), Error> {
   let cwd = std::env::current_dir().map_err(|source| Error::Cwd { source })?;

   match &cli.command {
      Command::Build(site) => {
         let config = site.config(cwd)?;
         // Only the builds need a runtime, so `main` itself stays synchronous.
         let rt = Runtime::new().map_err(|source| Error::Runtime { source })?;
         let written = rt.block_on(build::build(&config))?;
         for path in written {
            info!("wrote {}", path.display());
         }
         Ok(())
      }

      Command::Compile { file_name, site } => {
         let config = site.config(cwd)?;
         sass::warn_unsupported_source_map(&CompileOptions::for_config(&config));
         let rt = Runtime::new().map_err(|source| Error::Runtime { source })?;
         let (_, css) = rt.block_on(sass::parse(&config, file_name))?;
         std::io::stdout()
            .write_all(css.as_bytes())
            .map_err(|source| Error::WriteFile {
               dest: "stdout".into(),
               source,
            })
      }

      Command::Convert {
         input,
         output,
         site,
      } => {
         let config = site.config(cwd)?;
         convert(input.as_ref(), output.as_ref(), &config)
      }

      Command::VersionCode(site) => {
         let config = site.config(cwd)?;
         let code = version::version_code(&config).ok_or(Error::NoVersionFile)?;
         print!("{code}");
         Ok(())
      }

      Command::Completions => cli.completions(),
   }
}

fn convert(
   input: Option<&PathBuf>,
   output: Option<&PathBuf>,
   config: &config::Config,
) -> Result<(), Error> {
   let syntax = input.map_or(grass::InputSyntax::Scss, |path| sass::input_syntax(path));

   let reader: Box<dyn std::io::Read> = match input {
      Some(path) => {
         let file = std::fs::File::open(path).map_err(|source| Error::CouldNotOpenFile {
            path: path.to_owned(),
            source,
         })?;
         Box::new(BufReader::new(file))
      }
      None => Box::new(BufReader::new(std::io::stdin())),
   };

   let writer: Box<dyn Write> = match output {
      Some(path) => {
         if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| Error::CreateDirectory {
               dir: dir.to_owned(),
               source,
            })?;
         }
         let file = std::fs::File::create(path).map_err(|source| Error::CouldNotOpenFile {
            path: path.to_owned(),
            source,
         })?;
         Box::new(file)
      }
      None => Box::new(std::io::stdout()),
   };

   let options = CompileOptions::for_config(config);
   sass::warn_unsupported_source_map(&options);
   sass::convert(reader, writer, syntax, &options)?;
   Ok(())
}

#[derive(Error, Debug)]
pub(crate) enum Error {
   #[error("Somehow you don't have a home dir. lolwut")]
   NoHomeDir,

   #[error(transparent)]
   Completions { source: std::io::Error },

   #[error("could not get the current directory")]
   Cwd { source: std::io::Error },

   #[error("could not start the async runtime")]
   Runtime { source: std::io::Error },

   #[error(transparent)]
   Config {
      #[from]
      source: config::Error,
   },

   #[error(transparent)]
   Build {
      #[from]
      source: build::Error,
   },

   #[error(transparent)]
   Sass {
      #[from]
      source: sass::Error,
   },

   #[error("no version file is configured (set `css.version_file`)")]
   NoVersionFile,

   #[error("could not open file at '{path}'")]
   CouldNotOpenFile {
      path: PathBuf,
      source: std::io::Error,
   },

   #[error("could not create directory '{dir}'")]
   CreateDirectory {
      dir: PathBuf,
      source: std::io::Error,
   },

   #[error("could not write to {dest}")]
   WriteFile { dest: String, source: std::io::Error },
}
