use std::path::PathBuf;

use clap::{crate_version, ArgAction, Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate_to, shells::Fish};
use log::LevelFilter;

use lx_sass::config::{self, Config, Mode, Overrides};

use crate::Error;

#[derive(Parser, Debug)]
#[clap(
   name = "lx-sass",
   about = "Build a site's Sass and SCSS the way lx does.",
   version = crate_version!()
)]
#[command(author, version, about, arg_required_else_help(true))]
pub struct Cli {
   #[command(subcommand)]
   pub command: Command,

   /// More output. Repeat for even more.
   #[arg(short, long, action = ArgAction::Count, global = true)]
   pub verbose: u8,
}

impl Cli {
   pub(crate) fn completions(&self) -> Result<(), Error> {
      let mut config_dir = dirs::home_dir().ok_or(Error::NoHomeDir)?;
      config_dir.extend([".config", "fish", "completions"]);

      generate_to(Fish, &mut Self::command(), "lx-sass", config_dir)
         .map(|_| ())
         .map_err(|source| Error::Completions { source })
   }

   pub(crate) fn log_level(&self) -> LevelFilter {
      match self.verbose {
         0 => LevelFilter::Warn,
         1 => LevelFilter::Info,
         2 => LevelFilter::Debug,
         _ => LevelFilter::Trace,
      }
   }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
   #[command(about = "🛠️ Compile every stylesheet into the output dir.")]
   Build(Site),

   #[command(about = "🎨 Compile one stylesheet and print the CSS.")]
   Compile {
      /// The stylesheet, relative to the site's stylesheet directory.
      file_name: String,

      #[command(flatten)]
      site: Site,
   },

   #[command(about = "Sass → CSS, for any file (or stdin).")]
   Convert {
      /// Path to the file to convert. Will use `stdin` if not supplied.
      input: Option<PathBuf>,
      /// Where to print the output. Will use `stdout` if not supplied.
      output: Option<PathBuf>,

      #[command(flatten)]
      site: Site,
   },

   #[command(about = "🔖 Print the version stylesheet.")]
   VersionCode(Site),

   /// Give me completions for my own dang tool.
   #[command(about = "🐟 Straight to the config.")]
   Completions,
}

#[derive(Args, Debug, Clone)]
pub struct Site {
   /// The root of the site (if different from the current directory).
   #[arg(short = 'C', long = "dir")]
   pub site_directory: Option<PathBuf>,

   /// Config file to use instead of `sass.lx.yaml` in the site directory.
   #[arg(long)]
   pub config: Option<PathBuf>,

   /// `development` gets source maps; anything else is production.
   #[arg(long)]
   pub mode: Option<Mode>,

   /// Never minify, whatever the config says.
   #[arg(long)]
   pub no_minify: bool,

   /// The app version to put in the version file.
   #[arg(long)]
   pub app_version: Option<String>,
}

impl Site {
   pub(crate) fn config(&self, cwd: PathBuf) -> Result<Config, config::Error> {
      let config = match &self.config {
         Some(path) => Config::from_file(path)?,
         None => Config::in_dir(self.site_directory.as_ref().unwrap_or(&cwd))?,
      };

      Ok(config.with_overrides(Overrides {
         mode: self.mode,
         minify: self.no_minify.then_some(false),
         version: self.app_version.clone(),
      }))
   }
}
