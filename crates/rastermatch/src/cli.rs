use std::path::PathBuf;

use clap::Parser;

use rastermatch::config::{self, DiffOverrides};

fn parse_threshold(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|e| format!("{e}"))?;
    config::validate_threshold(v)
}

fn parse_color(s: &str) -> Result<[u8; 3], String> {
    config::parse_color(s)
}

#[derive(Parser)]
#[command(
    name = "rastermatch",
    about = "Perceptual pixel comparison for visual regression testing"
)]
pub struct Cli {
    /// Reference image
    pub image1: PathBuf,

    /// Image to compare against the reference
    pub image2: PathBuf,

    /// Where to write the annotated diff image
    pub output: Option<PathBuf>,

    /// Matching threshold (0.0-1.0); smaller is more sensitive
    #[arg(long, short = 't', value_parser = parse_threshold)]
    pub threshold: Option<f64>,

    /// Count anti-aliased pixels as differences
    #[arg(long)]
    pub include_aa: bool,

    /// Opacity of unchanged pixels in the diff output
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Color for anti-aliased pixels (#rrggbb)
    #[arg(long, value_parser = parse_color)]
    pub aa_color: Option<[u8; 3]>,

    /// Color for differing pixels (#rrggbb)
    #[arg(long, value_parser = parse_color)]
    pub diff_color: Option<[u8; 3]>,

    /// Color for pixels that got darker (defaults to --diff-color)
    #[arg(long, value_parser = parse_color)]
    pub diff_color_alt: Option<[u8; 3]>,

    /// Paint only changed pixels onto a transparent canvas
    #[arg(long)]
    pub diff_mask: bool,

    /// Horizontal shift tolerance, in pixels
    #[arg(long)]
    pub h_shift: Option<u32>,

    /// Vertical shift tolerance, in pixels
    #[arg(long)]
    pub v_shift: Option<u32>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Config file (default: ./rastermatch.toml if present)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// CLI values that override config-file and built-in defaults.
    /// Bare flags only override when actually given.
    pub fn overrides(&self) -> DiffOverrides {
        DiffOverrides {
            threshold: self.threshold,
            include_aa: self.include_aa.then_some(true),
            alpha: self.alpha,
            aa_color: self.aa_color,
            diff_color: self.diff_color,
            diff_color_alt: self.diff_color_alt,
            diff_mask: self.diff_mask.then_some(true),
            h_shift: self.h_shift,
            v_shift: self.v_shift,
        }
    }
}
