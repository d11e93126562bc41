use std::{
   convert::Infallible,
   fmt::Display,
   path::{Path, PathBuf},
   str::FromStr,
};

use log::{debug, trace};
use normalize_path::NormalizePath as _;
use serde::Deserialize;
use thiserror::Error;

use crate::options::CompilerParams;

/// The name of the config file `lx-sass` looks for in a site directory.
pub const CONFIG_FILE_NAME: &str = "sass.lx.yaml";

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
   /// When `false`, output is always unminified no matter what the compiler
   /// params ask for.
   #[serde(default = "minify_by_default")]
   pub minify: bool,

   #[serde(default)]
   pub mode: Mode,

   /// The app's version, exposed to stylesheets via the version file.
   #[serde(default)]
   pub version: String,

   #[serde(default)]
   pub css: Css,
}

fn minify_by_default() -> bool {
   true
}

impl Default for Config {
   fn default() -> Self {
      Config {
         minify: minify_by_default(),
         mode: Mode::default(),
         version: String::new(),
         css: Css::default(),
      }
   }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Css {
   /// Where the stylesheets live. Also the root for `@use` and `@import`.
   pub source_dir: PathBuf,
   /// Where compiled CSS goes.
   pub output_dir: PathBuf,
   pub compiler: Compiler,
   pub version_file: Option<VersionFile>,
}

impl Default for Css {
   fn default() -> Self {
      Css {
         source_dir: PathBuf::from("statics/css"),
         output_dir: PathBuf::from("statics/.build/css"),
         compiler: Compiler::default(),
         version_file: None,
      }
   }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Compiler {
   /// Explicit options for the compiler. `null` and absent are the same.
   #[serde(default)]
   pub params: Option<CompilerParams>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct VersionFile {
   pub file_name: String,
   /// The Sass variable name, without the leading `$`.
   #[serde(deserialize_with = "de_var_name")]
   pub var_name: String,
}

fn de_var_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
   D: serde::Deserializer<'de>,
{
   let name = String::deserialize(deserializer)?;
   if is_sass_identifier(&name) {
      Ok(name)
   } else {
      Err(serde::de::Error::custom(format!(
         "'{name}' is not a valid Sass variable name (leave off the `$`)"
      )))
   }
}

fn is_sass_identifier(name: &str) -> bool {
   let is_name_char = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-' || !c.is_ascii();

   let mut chars = name.chars();
   match chars.next() {
      Some(first) if is_name_char(first) && !first.is_ascii_digit() => chars.all(is_name_char),
      _ => false,
   }
}

/// What kind of build this is.
///
/// Anything other than `development` (or `dev`) is treated as production.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(from = "String")]
pub enum Mode {
   Development,
   #[default]
   Production,
}

impl From<&str> for Mode {
   fn from(value: &str) -> Self {
      match value.trim().to_ascii_lowercase().as_str() {
         "development" | "dev" => Mode::Development,
         _ => Mode::Production,
      }
   }
}

impl From<String> for Mode {
   fn from(value: String) -> Self {
      Mode::from(value.as_str())
   }
}

impl FromStr for Mode {
   type Err = Infallible;

   fn from_str(s: &str) -> Result<Self, Self::Err> {
      Ok(Mode::from(s))
   }
}

impl Display for Mode {
   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      match self {
         Mode::Development => f.write_str("development"),
         Mode::Production => f.write_str("production"),
      }
   }
}

/// Values from the command line which win over the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
   pub mode: Option<Mode>,
   pub minify: Option<bool>,
   pub version: Option<String>,
}

impl Config {
   pub fn from_file(path: &Path) -> Result<Config, Error> {
      let data = std::fs::read_to_string(path).map_err(|source| Error::BadFile {
         path: path.to_owned(),
         source,
      })?;

      let root = path.parent().ok_or_else(|| Error::NoParent {
         path: path.to_owned(),
      })?;

      Config::parse(&data, root).map_err(|source| Error::YamlParseError {
         path: path.to_owned(),
         source,
      })
   }

   /// Load `sass.lx.yaml` from `dir`, falling back to the defaults (rooted at
   /// `dir`) if there isn't one.
   pub fn in_dir(dir: &Path) -> Result<Config, Error> {
      let config_path = dir.join(CONFIG_FILE_NAME);
      debug!("config path: {}", config_path.display());
      if config_path.is_file() {
         Config::from_file(&config_path)
      } else {
         debug!("no {CONFIG_FILE_NAME} in {}; using defaults", dir.display());
         Ok(Config::default().rooted_at(dir))
      }
   }

   pub(crate) fn parse(data: &str, root: &Path) -> Result<Config, serde_yaml::Error> {
      let config: Config = serde_yaml::from_str(data)?;
      Ok(config.rooted_at(root))
   }

   /// Resolve the relative stylesheet directories and include paths against
   /// `root`.
   pub fn rooted_at(mut self, root: &Path) -> Config {
      self.css.source_dir = root.join(&self.css.source_dir).normalize();
      self.css.output_dir = root.join(&self.css.output_dir).normalize();
      if let Some(params) = self.css.compiler.params.as_mut() {
         for include_path in params.include_paths.iter_mut() {
            *include_path = root.join(&*include_path).normalize();
         }
      }
      trace!(
         "css source dir: {}; css output dir: {}",
         self.css.source_dir.display(),
         self.css.output_dir.display()
      );
      self
   }

   pub fn with_overrides(mut self, overrides: Overrides) -> Config {
      if let Some(mode) = overrides.mode {
         self.mode = mode;
      }
      if let Some(minify) = overrides.minify {
         self.minify = minify;
      }
      if let Some(version) = overrides.version {
         self.version = version;
      }
      self
   }
}

#[derive(Error, Debug)]
pub enum Error {
   #[error("could not read file '{path}'")]
   BadFile {
      path: PathBuf,
      source: std::io::Error,
   },

   #[error("could not parse {path} as YAML")]
   YamlParseError {
      path: PathBuf,
      source: serde_yaml::Error,
   },

   #[error("config file at {path} has no parent dir")]
   NoParent { path: PathBuf },
}
