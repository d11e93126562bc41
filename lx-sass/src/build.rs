use std::{
   path::{Path, PathBuf},
   sync::Arc,
};

use log::{debug, info, trace};
use thiserror::Error;
use tokio::task::{JoinError, JoinSet};

use crate::config::Config;
use crate::error::write_to_fmt;
use crate::options::CompileOptions;
use crate::{sass, version};

const STYLESHEET_EXTENSIONS: [&str; 3] = ["scss", "sass", "css"];

/// Compile every root stylesheet in the configured source dir into the
/// output dir, returning the paths of everything written.
///
/// Partials (files whose names start with `_`) are only there to be imported,
/// so they are not built on their own. Every stylesheet gets a chance to
/// build; if any fail, the error reports all of them.
pub async fn build(config: &Config) -> Result<Vec<PathBuf>, Error> {
   if let Some(path) = version::write_version_file(config).await? {
      debug!("wrote version file {}", path.display());
   }

   sass::warn_unsupported_source_map(&CompileOptions::for_config(config));

   let source_dir = &config.css.source_dir;
   let stylesheets = stylesheets_in(source_dir, &config.css.output_dir)?;
   debug!(
      "building {count} stylesheets from {dir}",
      count = stylesheets.len(),
      dir = source_dir.display()
   );

   let config = Arc::new(config.clone());
   let mut set = JoinSet::new();
   for relative_path in stylesheets {
      let config = Arc::clone(&config);
      set.spawn(async move {
         let result = build_one(&config, &relative_path).await;
         (relative_path, result)
      });
   }

   let mut written = Vec::new();
   let mut errors = Vec::new();
   while let Some(joined) = set.join_next().await {
      match joined? {
         (_, Ok(path)) => written.push(path),
         (relative_path, Err(e)) => errors.push((source_dir.join(relative_path), e)),
      }
   }

   if !errors.is_empty() {
      errors.sort_by(|(a, _), (b, _)| a.cmp(b));
      return Err(Error::Stylesheets(StylesheetErrors(errors)));
   }

   written.sort();
   info!("built {} stylesheets", written.len());
   Ok(written)
}

async fn build_one(config: &Config, relative_path: &Path) -> Result<PathBuf, StylesheetError> {
   let file_name = relative_path.to_string_lossy();
   let (css_name, css) = sass::parse(config, &file_name).await?;

   let path = config.css.output_dir.join(css_name);
   if let Some(containing_dir) = path.parent() {
      tokio::fs::create_dir_all(containing_dir)
         .await
         .map_err(|source| StylesheetError::CreateOutputDirectory {
            path: containing_dir.to_owned(),
            source,
         })?;
   }

   trace!("writing {}", path.display());
   tokio::fs::write(&path, css)
      .await
      .map_err(|source| StylesheetError::WriteFile {
         path: path.clone(),
         source,
      })?;

   Ok(path)
}

/// Paths of the buildable stylesheets under `dir`, relative to `dir`. Nothing
/// under `output_dir` counts, even if it is inside `dir`.
fn stylesheets_in(dir: &Path, output_dir: &Path) -> Result<Vec<PathBuf>, Error> {
   let root = glob::Pattern::escape(&dir.to_string_lossy());
   let glob_src = format!("{root}/**/*");

   let mut paths = glob::glob(&glob_src)
      .map_err(|source| Error::GlobPattern {
         pattern: glob_src.clone(),
         source,
      })?
      .try_fold(Vec::new(), |mut good, result| match result {
         Ok(path) => {
            if !path.starts_with(output_dir) && is_root_stylesheet(&path) {
               good.push(path);
            }
            Ok(good)
         }
         Err(source) => Err(Error::Glob { source }),
      })?
      .into_iter()
      .map(|path| {
         path
            .strip_prefix(dir)
            .map(Path::to_path_buf)
            .map_err(|_| Error::StripPrefix {
               prefix: dir.to_owned(),
               path: path.clone(),
            })
      })
      .collect::<Result<Vec<_>, _>>()?;

   paths.sort();
   Ok(paths)
}

fn is_root_stylesheet(path: &Path) -> bool {
   let is_partial = path
      .file_name()
      .and_then(|name| name.to_str())
      .map_or(true, |name| name.starts_with('_'));

   let is_stylesheet = path
      .extension()
      .and_then(|ext| ext.to_str())
      .is_some_and(|ext| STYLESHEET_EXTENSIONS.contains(&ext));

   !is_partial && is_stylesheet && path.is_file()
}

#[derive(Error, Debug)]
pub enum Error {
   #[error(transparent)]
   VersionFile {
      #[from]
      source: version::Error,
   },

   #[error("bad glob pattern: '{pattern}'")]
   GlobPattern {
      pattern: String,
      source: glob::PatternError,
   },

   #[error(transparent)]
   Glob { source: glob::GlobError },

   #[error("could not strip prefix '{prefix}' from path '{path}'")]
   StripPrefix { prefix: PathBuf, path: PathBuf },

   #[error("a stylesheet build task failed")]
   Task {
      #[from]
      source: JoinError,
   },

   #[error(transparent)]
   Stylesheets(StylesheetErrors),
}

#[derive(Error, Debug)]
pub enum StylesheetError {
   #[error(transparent)]
   Compile {
      #[from]
      source: sass::Error,
   },

   #[error("could not create output directory '{path}'")]
   CreateOutputDirectory {
      path: PathBuf,
      source: std::io::Error,
   },

   #[error("could not write to {path}")]
   WriteFile {
      path: PathBuf,
      source: std::io::Error,
   },
}

#[derive(Error, Debug)]
pub struct StylesheetErrors(Vec<(PathBuf, StylesheetError)>);

impl StylesheetErrors {
   pub fn iter(&self) -> impl Iterator<Item = &(PathBuf, StylesheetError)> {
      self.0.iter()
   }
}

impl std::fmt::Display for StylesheetErrors {
   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      let errors = &self.0;
      let count = errors.len();
      let noun = if count == 1 { "stylesheet" } else { "stylesheets" };
      writeln!(f, "could not build {count} {noun}")?;
      for (path, error) in errors {
         write!(f, "{}:\n\t", path.display())?;
         write_to_fmt(f, error)?;
      }

      Ok(())
   }
}
