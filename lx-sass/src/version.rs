use std::path::{Path, PathBuf};

use grass::InputSyntax;
use log::debug;
use thiserror::Error;

use crate::{config::Config, sass};

/// One line of Sass declaring the configured variable as the app's version,
/// e.g. `$appVersion: '0.3.1';`. `None` if no version file is configured.
///
/// A `.sass` version file gets the indented syntax, which has no semicolons.
pub fn version_code(config: &Config) -> Option<String> {
   config.css.version_file.as_ref().map(|version_file| {
      let terminator = match sass::input_syntax(Path::new(&version_file.file_name)) {
         InputSyntax::Sass => "",
         _ => ";",
      };
      format!(
         "${}: '{}'{terminator}\n",
         version_file.var_name,
         escape(&config.version)
      )
   })
}

fn escape(value: &str) -> String {
   value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Write the version stylesheet into the stylesheet directory, so the other
/// stylesheets can import it. Returns where it went, if anywhere.
pub async fn write_version_file(config: &Config) -> Result<Option<PathBuf>, Error> {
   let (Some(version_file), Some(code)) =
      (config.css.version_file.as_ref(), version_code(config))
   else {
      return Ok(None);
   };

   let dir = &config.css.source_dir;
   tokio::fs::create_dir_all(dir)
      .await
      .map_err(|source| Error::CreateDirectory {
         path: dir.to_owned(),
         source,
      })?;

   let path = dir.join(&version_file.file_name);
   debug!("writing version {} to {}", config.version, path.display());
   tokio::fs::write(&path, code)
      .await
      .map_err(|source| Error::WriteFile {
         path: path.clone(),
         source,
      })?;

   Ok(Some(path))
}

#[derive(Error, Debug)]
pub enum Error {
   #[error("could not create directory '{path}' for the version file")]
   CreateDirectory {
      path: PathBuf,
      source: std::io::Error,
   },

   #[error("could not write version file to {path}")]
   WriteFile {
      path: PathBuf,
      source: std::io::Error,
   },
}

#[cfg(test)]
mod tests {
   use super::*;
   use crate::config::VersionFile;

   fn config_with_version_file() -> Config {
      let mut config = Config {
         version: "0.3.1".into(),
         ..Default::default()
      };
      config.css.version_file = Some(VersionFile {
         file_name: "_version.scss".into(),
         var_name: "appVersion".into(),
      });
      config
   }

   #[test]
   fn declares_the_variable() {
      assert_eq!(
         version_code(&config_with_version_file()),
         Some("$appVersion: '0.3.1';\n".into())
      );
   }

   #[test]
   fn indented_version_files_have_no_semicolon() {
      let mut config = config_with_version_file();
      if let Some(version_file) = config.css.version_file.as_mut() {
         version_file.file_name = "_version.sass".into();
      }
      assert_eq!(
         version_code(&config),
         Some("$appVersion: '0.3.1'\n".into())
      );
   }

   #[test]
   fn nothing_without_a_version_file() {
      let config = Config {
         version: "0.3.1".into(),
         ..Default::default()
      };
      assert_eq!(version_code(&config), None);
   }

   #[test]
   fn quotes_are_escaped() {
      let mut config = config_with_version_file();
      config.version = "it's 1.0".into();
      assert_eq!(
         version_code(&config),
         Some("$appVersion: 'it\\'s 1.0';\n".into())
      );
   }

   #[tokio::test]
   async fn writes_into_the_stylesheet_dir() {
      let dir = tempfile::tempdir().unwrap();
      let mut config = config_with_version_file();
      config.css.source_dir = dir.path().join("statics").join("css");

      let path = write_version_file(&config).await.unwrap().unwrap();
      assert_eq!(path, config.css.source_dir.join("_version.scss"));

      let contents = std::fs::read_to_string(&path).unwrap();
      assert_eq!(contents.split('\'').nth(1), Some("0.3.1"));
   }

   #[tokio::test]
   async fn writes_nothing_when_unconfigured() {
      let dir = tempfile::tempdir().unwrap();
      let mut config = Config::default();
      config.css.source_dir = dir.path().to_owned();

      assert_eq!(write_version_file(&config).await.unwrap(), None);
   }
}
