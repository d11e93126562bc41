use std::{
   ffi::OsStr,
   io::{Read, Write},
   path::{Path, PathBuf},
};

use grass::InputSyntax;
use log::{debug, trace, warn};
use thiserror::Error;
use tokio::task::{self, JoinError};

use crate::{config::Config, options::CompileOptions};

/// Compile `file_name` from the configured stylesheet directory.
///
/// Gives back the name the compiled file should have (`.scss` and `.sass`
/// become `.css`) along with the CSS itself. Compiler failures come back
/// exactly as the compiler reported them.
pub async fn parse(config: &Config, file_name: &str) -> Result<(String, String), Error> {
   let path = config.css.source_dir.join(file_name);
   trace!("compiling {}", path.display());

   let source = tokio::fs::read_to_string(&path)
      .await
      .map_err(|source| Error::Read {
         path: path.clone(),
         source,
      })?;

   let options = CompileOptions::for_config(config);
   let syntax = input_syntax(&path);

   // grass does all its work synchronously.
   let css = task::spawn_blocking(move || render(source, syntax, &options))
      .await
      .map_err(|source| Error::Task { path, source })??;

   Ok((css_file_name(file_name), css))
}

pub fn render(
   source: String,
   syntax: InputSyntax,
   options: &CompileOptions,
) -> Result<String, Box<grass::Error>> {
   let grass_options = grass::Options::default()
      .style(options.output_style.into())
      .load_paths(&options.include_paths)
      .quiet(options.quiet)
      .input_syntax(syntax);

   grass::from_string(source, &grass_options)
}

/// grass cannot generate source maps, so say so when the options ask for one.
/// Returns whether it warned.
pub fn warn_unsupported_source_map(options: &CompileOptions) -> bool {
   if !options.source_map.is_requested() {
      return false;
   }

   warn!("source maps were requested, but grass cannot generate them; building without");
   debug!("requested source map options: {:?}", options.source_map);
   true
}

/// Read a stylesheet from `input` and write the CSS to `output`.
pub fn convert(
   mut input: Box<dyn Read>,
   mut output: Box<dyn Write>,
   syntax: InputSyntax,
   options: &CompileOptions,
) -> Result<(), Error> {
   let mut src = String::new();
   input.read_to_string(&mut src)?;

   let css = render(src, syntax, options)?;

   output.write_all(css.as_bytes())?;
   output.flush()?;
   Ok(())
}

/// The syntax to parse a file with, by extension. SCSS unless it says
/// otherwise.
pub fn input_syntax(path: &Path) -> InputSyntax {
   match path.extension().and_then(OsStr::to_str) {
      Some("sass") => InputSyntax::Sass,
      Some("css") => InputSyntax::Css,
      _ => InputSyntax::Scss,
   }
}

pub fn css_file_name(file_name: &str) -> String {
   let path = Path::new(file_name);
   match path.extension().and_then(OsStr::to_str) {
      Some("scss") | Some("sass") => path.with_extension("css").to_string_lossy().into_owned(),
      _ => file_name.to_owned(),
   }
}

#[derive(Error, Debug)]
pub enum Error {
   #[error(transparent)]
   Compile(#[from] Box<grass::Error>),

   #[error("could not read stylesheet '{path}'")]
   Read {
      path: PathBuf,
      source: std::io::Error,
   },

   #[error("compiling '{path}' did not finish")]
   Task { path: PathBuf, source: JoinError },

   #[error(transparent)]
   IO(#[from] std::io::Error),
}
