//! Turning a site's [`Config`] into the options the compiler actually runs
//! with.
//!
//! Two things about the build decide most of it:
//!
//! - Minification: if it is off, the output is always unminified, no matter
//!   what style the compiler params ask for.
//! - Mode: development builds get source maps (inline, with the sources
//!   embedded) unless the params say exactly how to make them; production
//!   builds never get them, no matter what the params say.

use std::path::PathBuf;

use log::trace;
use serde::Deserialize;

use crate::config::{Config, Mode};

/// The compiler options a site can set explicitly, under
/// `css.compiler.params`. Anything else in that table is ignored, so other
/// tools' settings can live alongside these.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct CompilerParams {
   pub output_style: Option<OutputStyle>,
   /// Extra directories to resolve `@use` and `@import` against, after the
   /// stylesheet directory itself.
   pub include_paths: Vec<PathBuf>,
   /// Silence `@warn` and `@debug` output.
   pub quiet: Option<bool>,
   pub source_map: Option<SourceMap>,
   pub out_file: Option<PathBuf>,
   pub source_map_embed: Option<bool>,
   pub source_map_contents: Option<bool>,
   pub omit_source_map_url: Option<bool>,
   pub source_map_root: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
   Nested,
   Expanded,
   Compact,
   Compressed,
}

impl From<OutputStyle> for grass::OutputStyle {
   fn from(style: OutputStyle) -> Self {
      match style {
         OutputStyle::Compressed => grass::OutputStyle::Compressed,
         OutputStyle::Nested | OutputStyle::Expanded | OutputStyle::Compact => {
            grass::OutputStyle::Expanded
         }
      }
   }
}

/// Either a plain on/off switch or the path the map should be written to.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum SourceMap {
   Enabled(bool),
   File(PathBuf),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMapOptions {
   pub source_map: Option<SourceMap>,
   pub out_file: Option<PathBuf>,
   pub embed: Option<bool>,
   pub contents: Option<bool>,
   pub omit_source_map_url: Option<bool>,
   pub root: Option<String>,
}

impl SourceMapOptions {
   /// Whatever the params say, or inline maps with their sources if they say
   /// nothing about source maps at all.
   fn development(params: &CompilerParams) -> SourceMapOptions {
      let explicit = SourceMapOptions {
         source_map: params.source_map.clone(),
         out_file: params.out_file.clone(),
         embed: params.source_map_embed,
         contents: params.source_map_contents,
         omit_source_map_url: params.omit_source_map_url,
         root: params.source_map_root.clone(),
      };

      if explicit.source_map.is_some() {
         return explicit;
      }

      SourceMapOptions {
         source_map: Some(SourceMap::Enabled(true)),
         embed: Some(true),
         contents: Some(true),
         ..explicit
      }
   }

   pub fn is_requested(&self) -> bool {
      match &self.source_map {
         Some(SourceMap::Enabled(enabled)) => *enabled,
         Some(SourceMap::File(_)) => true,
         None => false,
      }
   }
}

/// Everything the compiler needs besides the source itself.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileOptions {
   pub output_style: OutputStyle,
   pub include_paths: Vec<PathBuf>,
   pub quiet: bool,
   pub source_map: SourceMapOptions,
}

impl CompileOptions {
   pub fn for_config(config: &Config) -> CompileOptions {
      let default_params = CompilerParams::default();
      let params = config.css.compiler.params.as_ref().unwrap_or(&default_params);

      let output_style = if config.minify {
         params.output_style.unwrap_or(OutputStyle::Compressed)
      } else {
         OutputStyle::Nested
      };

      let include_paths = std::iter::once(config.css.source_dir.clone())
         .chain(params.include_paths.iter().cloned())
         .collect();

      let source_map = match config.mode {
         Mode::Development => SourceMapOptions::development(params),
         Mode::Production => SourceMapOptions::default(),
      };

      let options = CompileOptions {
         output_style,
         include_paths,
         quiet: params.quiet.unwrap_or(false),
         source_map,
      };
      trace!("compile options for {} build: {options:?}", config.mode);
      options
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   fn config_with(
      minify: bool,
      mode: Mode,
      params: Option<CompilerParams>,
   ) -> Config {
      let mut config = Config {
         minify,
         mode,
         ..Default::default()
      };
      config.css.source_dir = PathBuf::from("/site/statics/css");
      config.css.compiler.params = params;
      config
   }

   #[test]
   fn minified_defaults_to_compressed() {
      let options = CompileOptions::for_config(&config_with(true, Mode::Production, None));
      assert_eq!(options.output_style, OutputStyle::Compressed);
   }

   #[test]
   fn minified_respects_requested_style() {
      let params = CompilerParams {
         output_style: Some(OutputStyle::Expanded),
         ..Default::default()
      };
      let options =
         CompileOptions::for_config(&config_with(true, Mode::Production, Some(params)));
      assert_eq!(options.output_style, OutputStyle::Expanded);
   }

   #[test]
   fn no_minify_forces_nested() {
      let params = CompilerParams {
         output_style: Some(OutputStyle::Compressed),
         ..Default::default()
      };
      let options =
         CompileOptions::for_config(&config_with(false, Mode::Production, Some(params)));
      assert_eq!(options.output_style, OutputStyle::Nested);
   }

   #[test]
   fn stylesheet_dir_comes_first_in_include_paths() {
      let params = CompilerParams {
         include_paths: vec![PathBuf::from("/vendor/scss")],
         ..Default::default()
      };
      let options =
         CompileOptions::for_config(&config_with(true, Mode::Production, Some(params)));
      assert_eq!(
         options.include_paths,
         vec![PathBuf::from("/site/statics/css"), PathBuf::from("/vendor/scss")]
      );
   }

   #[test]
   fn development_enables_inline_maps() {
      let options = CompileOptions::for_config(&config_with(true, Mode::Development, None));
      assert_eq!(
         options.source_map,
         SourceMapOptions {
            source_map: Some(SourceMap::Enabled(true)),
            embed: Some(true),
            contents: Some(true),
            ..Default::default()
         }
      );
      assert!(options.source_map.is_requested());
   }

   #[test]
   fn development_passes_explicit_maps_through() {
      let params = CompilerParams {
         source_map: Some(SourceMap::File("site.css.map".into())),
         out_file: Some("site.css".into()),
         source_map_embed: Some(false),
         omit_source_map_url: Some(true),
         source_map_root: Some("/src".into()),
         ..Default::default()
      };
      let options =
         CompileOptions::for_config(&config_with(true, Mode::Development, Some(params)));
      assert_eq!(
         options.source_map,
         SourceMapOptions {
            source_map: Some(SourceMap::File("site.css.map".into())),
            out_file: Some("site.css".into()),
            embed: Some(false),
            contents: None,
            omit_source_map_url: Some(true),
            root: Some("/src".into()),
         }
      );
   }

   #[test]
   fn development_respects_maps_switched_off() {
      let params = CompilerParams {
         source_map: Some(SourceMap::Enabled(false)),
         ..Default::default()
      };
      let options =
         CompileOptions::for_config(&config_with(true, Mode::Development, Some(params)));
      assert!(!options.source_map.is_requested());
   }

   #[test]
   fn production_strips_all_map_options() {
      let params = CompilerParams {
         source_map: Some(SourceMap::Enabled(true)),
         out_file: Some("site.css".into()),
         source_map_embed: Some(true),
         source_map_contents: Some(true),
         omit_source_map_url: Some(false),
         source_map_root: Some("/src".into()),
         ..Default::default()
      };
      let options =
         CompileOptions::for_config(&config_with(true, Mode::Production, Some(params)));
      assert_eq!(options.source_map, SourceMapOptions::default());
      assert!(!options.source_map.is_requested());
   }

   #[test]
   fn unminified_styles_share_the_expanded_emitter() {
      for style in [OutputStyle::Nested, OutputStyle::Expanded, OutputStyle::Compact] {
         assert!(matches!(
            grass::OutputStyle::from(style),
            grass::OutputStyle::Expanded
         ));
      }
      assert!(matches!(
         grass::OutputStyle::from(OutputStyle::Compressed),
         grass::OutputStyle::Compressed
      ));
   }
}
