use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use galaxy_gen::{GalaxyParams, Rgb};
use std::io;

/// Procedural spiral galaxy with a live parameter panel
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
  /// Number of particles
  #[arg(long, default_value_t = GalaxyParams::default().count)]
  count: u32,
  /// Point size
  #[arg(long, default_value_t = GalaxyParams::default().size)]
  size: f32,
  /// Galaxy radius
  #[arg(long, default_value_t = GalaxyParams::default().radius)]
  radius: f32,
  /// Number of spiral arms
  #[arg(long, default_value_t = GalaxyParams::default().branches)]
  branches: u32,
  /// Twist in radians per unit of radius
  #[arg(long, default_value_t = GalaxyParams::default().spin, allow_negative_numbers = true)]
  spin: f32,
  /// Scale of the positional jitter
  #[arg(long, default_value_t = GalaxyParams::default().randomness)]
  randomness: f32,
  /// Exponent pulling jitter towards zero
  #[arg(long, default_value_t = GalaxyParams::default().randomness_power)]
  randomness_power: f32,
  /// Color at the centre, as #rrggbb
  #[arg(long, default_value_t = GalaxyParams::default().inside_color)]
  inside_color: Rgb,
  /// Color at the rim, as #rrggbb
  #[arg(long, default_value_t = GalaxyParams::default().outside_color)]
  outside_color: Rgb,
  /// Seed for the particle layout; random when omitted
  #[arg(long)]
  seed: Option<u64>,
  /// Generate once and log a summary instead of opening a window
  #[arg(long, default_value_t = false)]
  headless: bool,
  #[command(subcommand)]
  command: Option<Commands>,
}

impl Args {
  fn params(&self) -> GalaxyParams {
    GalaxyParams {
      count: self.count,
      size: self.size,
      radius: self.radius,
      branches: self.branches,
      spin: self.spin,
      randomness: self.randomness,
      randomness_power: self.randomness_power,
      inside_color: self.inside_color,
      outside_color: self.outside_color,
    }
  }
}

#[derive(Subcommand, Debug)]
enum Commands {
  /// Generate shell completion scripts
  Completions {
    /// The shell to generate the script for
    #[arg(value_enum)]
    shell: Shell,
  },
}

fn main() {
  let args = Args::parse();

  if let Some(Commands::Completions { shell }) = args.command {
    let mut cmd = Args::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    return;
  }

  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

  if let Err(e) = galaxy_gen::state::run(args.params(), args.seed, args.headless) {
    log::error!("{e}");
    std::process::exit(1);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_cli_defaults_match_params() {
    let args = Args::try_parse_from(["galaxy-gen"]).unwrap();
    assert_eq!(args.params(), GalaxyParams::default());
    assert!(!args.headless);
  }

  #[test]
  fn test_cli_overrides() {
    let args = Args::try_parse_from([
      "galaxy-gen",
      "--count",
      "10",
      "--spin",
      "-2.5",
      "--inside-color",
      "#ffffff",
      "--seed",
      "9",
    ])
    .unwrap();
    let params = args.params();
    assert_eq!(params.count, 10);
    assert_eq!(params.spin, -2.5);
    assert_eq!(params.inside_color, Rgb::new(1.0, 1.0, 1.0));
    assert_eq!(args.seed, Some(9));
  }

  #[test]
  fn test_cli_rejects_bad_color() {
    assert!(Args::try_parse_from(["galaxy-gen", "--outside-color", "purple"]).is_err());
  }

  #[test]
  fn test_cli_verifies() {
    Args::command().debug_assert();
  }
}
