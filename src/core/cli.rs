//! Command line interface for scrawl
//!
//! Handles parsing command line arguments and provides
//! validation for user inputs. Settings resolve in a fixed order:
//! CLI argument, then ~/.config/scrawl/settings.json, then the built-in default.

use crate::core::config_file::{ConfigFile, EffectConfig};
use crate::jitter::Strength;
use crate::pipeline::RandomizationSettings;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Fonts directory used when neither the CLI nor the config file names one
pub const DEFAULT_FONTS_DIR: &str = "fonts";

/// Suffix added to the input file stem for the default output path
pub const OUTPUT_SUFFIX: &str = "_randomized";

/// Scrawl CLI arguments
///
/// Examples:
///   scrawl letter.json                          # Write letter_randomized.json
///   scrawl letter.json -o out.json -f ~/hands   # Custom output and fonts
///   scrawl letter.json --seed 42                # Reproducible output
///   scrawl letter.json --no-indent              # Skip random indentation
///   scrawl --list-fonts -f ~/hands              # Show loaded typefaces
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "scrawl",
    version,
    about = "Make typed documents look handwritten",
    long_about = "Scrawl rewrites a document one character at a time, giving each character a randomly chosen typeface that can render it. Optional effects add a drifting handwriting tilt, jittered character sizes, irregular line spacing and ragged paragraph indents."
)]
pub struct CliArgs {
    /// Document to convert
    #[clap(
        value_name = "INPUT",
        required_unless_present_any = ["new_config", "list_fonts"],
        help = "Document to convert"
    )]
    pub input: Option<PathBuf>,

    /// Where the converted document is written
    ///
    /// Defaults to <input stem>_randomized.<ext> next to the input.
    #[clap(
        long = "output",
        short = 'o',
        help = "Output document path",
        long_help = "Path of the converted document. Defaults to <input stem>_randomized.<ext> in the input's directory."
    )]
    pub output: Option<PathBuf>,

    #[clap(
        long = "fonts",
        short = 'f',
        value_name = "DIR",
        help = "Directory with .ttf/.otf typefaces (default: fonts)"
    )]
    pub fonts_dir: Option<PathBuf>,

    #[clap(long = "seed", help = "Random seed for reproducible output")]
    pub seed: Option<u64>,

    #[clap(long = "no-handwriting", help = "Disable the handwriting tilt effect")]
    pub no_handwriting: bool,

    #[clap(
        long = "handwriting-strength",
        value_name = "1-5",
        value_parser = parse_strength,
        help = "Handwriting tilt strength (5 is the most realistic)"
    )]
    pub handwriting_strength: Option<Strength>,

    #[clap(long = "no-line-spacing", help = "Disable random line spacing")]
    pub no_line_spacing: bool,

    #[clap(
        long = "line-spacing-strength",
        value_name = "1-5",
        value_parser = parse_strength,
        help = "Line spacing variation strength"
    )]
    pub line_spacing_strength: Option<Strength>,

    #[clap(long = "no-char-size", help = "Disable random character sizes")]
    pub no_char_size: bool,

    #[clap(
        long = "char-size-strength",
        value_name = "1-5",
        value_parser = parse_strength,
        help = "Character size variation strength"
    )]
    pub char_size_strength: Option<Strength>,

    #[clap(long = "no-indent", help = "Disable random paragraph indentation")]
    pub no_indent: bool,

    #[clap(
        long = "indent-strength",
        value_name = "1-5",
        value_parser = parse_strength,
        help = "Indentation variation strength"
    )]
    pub indent_strength: Option<Strength>,

    /// Write the conversion report as JSON
    #[clap(long = "report", value_name = "PATH", help = "Write a JSON conversion report")]
    pub report: Option<PathBuf>,

    /// Print the typefaces found in the fonts directory and exit
    #[clap(
        long = "list-fonts",
        help = "List loaded typefaces and exit",
        long_help = "Scan the fonts directory, print every usable typeface with the number of characters it covers, then exit without converting anything."
    )]
    pub list_fonts: bool,

    /// Initialize user configuration directory
    ///
    /// This creates the ~/.config/scrawl directory with:
    /// - settings.json: default effect settings and fonts directory
    /// - logs/: daily log files
    #[clap(
        long = "new-config",
        help = "Initialize user config directory with settings",
        long_help = "Initialize the ~/.config/scrawl directory with a settings.json file and a logs directory. Once it exists, every run also writes a daily log file there."
    )]
    pub new_config: bool,
}

fn parse_strength(value: &str) -> Result<Strength, String> {
    let raw: u8 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number between 1 and 5"))?;
    Strength::try_from(raw)
}

impl CliArgs {
    /// Validate the CLI arguments after parsing
    ///
    /// This ensures the input exists and the output won't overwrite it,
    /// providing clear error messages for common mistakes.
    pub fn validate(&self) -> Result<(), String> {
        let Some(input) = &self.input else {
            return Ok(());
        };

        if !input.exists() {
            return Err(format!(
                "Input document does not exist: {}\nMake sure the path is correct and the file exists.",
                input.display()
            ));
        }
        if !input.is_file() {
            return Err(format!(
                "Input is not a file: {}\nPass a document file, not a directory.",
                input.display()
            ));
        }

        if let Some(output) = self.output_path() {
            if same_path(&output, input) {
                return Err(format!(
                    "Output would overwrite the input: {}\nChoose a different --output path.",
                    output.display()
                ));
            }
        }

        Ok(())
    }

    /// The output path, from --output or derived from the input
    pub fn output_path(&self) -> Option<PathBuf> {
        self.output
            .clone()
            .or_else(|| self.input.as_deref().map(default_output_path))
    }

    /// Get the fonts directory from CLI args, config file, or default
    pub fn fonts_dir(&self, config: Option<&ConfigFile>) -> PathBuf {
        if let Some(dir) = &self.fonts_dir {
            debug!("Using fonts directory from CLI: {:?}", dir);
            return dir.clone();
        }
        if let Some(dir) = config.and_then(|config| config.fonts_dir.clone()) {
            debug!("Using fonts directory from config file: {:?}", dir);
            return dir;
        }
        PathBuf::from(DEFAULT_FONTS_DIR)
    }

    pub fn seed(&self, config: Option<&ConfigFile>) -> Option<u64> {
        self.seed.or_else(|| config.and_then(|config| config.seed))
    }

    /// Resolve the effect settings
    ///
    /// Priority order:
    /// 1. CLI argument (--no-*, --*-strength)
    /// 2. Config file setting (~/.config/scrawl/settings.json)
    /// 3. Built-in default (enabled, strength 3)
    pub fn settings(&self, config: Option<&ConfigFile>) -> RandomizationSettings {
        let effect = |pick: fn(&ConfigFile) -> Option<EffectConfig>| {
            config.and_then(pick).unwrap_or_default()
        };
        let resolve = |disabled: bool, strength: Option<Strength>, file: EffectConfig| {
            let enabled = !disabled && file.enabled.unwrap_or(true);
            let strength = strength.or(file.strength).unwrap_or_default();
            (enabled, strength)
        };

        let (handwriting_enabled, handwriting_strength) = resolve(
            self.no_handwriting,
            self.handwriting_strength,
            effect(|config| config.handwriting),
        );
        let (line_spacing_enabled, line_spacing_strength) = resolve(
            self.no_line_spacing,
            self.line_spacing_strength,
            effect(|config| config.line_spacing),
        );
        let (char_size_enabled, char_size_strength) = resolve(
            self.no_char_size,
            self.char_size_strength,
            effect(|config| config.char_size),
        );
        let (indent_enabled, indent_strength) = resolve(
            self.no_indent,
            self.indent_strength,
            effect(|config| config.indent),
        );

        RandomizationSettings {
            handwriting_enabled,
            handwriting_strength,
            line_spacing_enabled,
            line_spacing_strength,
            char_size_enabled,
            char_size_strength,
            indent_enabled,
            indent_strength,
        }
    }
}

/// `<dir>/<stem>_randomized.<ext>` for an input at `<dir>/<stem>.<ext>`
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match input.extension() {
        Some(ext) => format!("{stem}{OUTPUT_SUFFIX}.{}", ext.to_string_lossy()),
        None => format!("{stem}{OUTPUT_SUFFIX}"),
    };
    input.with_file_name(file_name)
}

fn same_path(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
