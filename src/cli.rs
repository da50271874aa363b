extern crate clap;
use clap::{value_t, App, Arg, ArgMatches};
use crate::{config::{BeltConfig, BeltPreset, SimParams}, output::OutputFrequency};

/// Settings of one headless run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub preset: BeltPreset,
    pub belt: BeltConfig,
    pub params: SimParams,
    pub frames: usize,
    pub seed: u64,
    pub frequency: OutputFrequency,
    pub shield: bool,
    pub laser: bool,
}

pub fn parse_command_line() -> ArgMatches<'static> {
    app().get_matches()
}

/// The command line definition of the headless driver
pub fn app() -> App<'static, 'static> {
    let preset_option = Arg::with_name("preset")
        .long("preset")
        .short("p")
        .takes_value(true)
        .possible_values(&["saturn", "sun", "kuiper"])
        .case_insensitive(true)
        .default_value("saturn");

    let frames_option = Arg::with_name("frames")
        .long("frames")
        .short("n")
        .takes_value(true)
        .default_value("600");

    let population_option = Arg::with_name("population")
        .long("population")
        .short("c")
        .takes_value(true)
        .help("overrides the preset's body count");

    let per_worker_option = Arg::with_name("perworker")
        .long("perworker")
        .short("w")
        .takes_value(true)
        .help("bodies stepped by each worker thread");

    let seed_option = Arg::with_name("seed")
        .long("seed")
        .short("s")
        .takes_value(true)
        .default_value("0");

    let frequency_option = Arg::with_name("frequency")
        .long("frequency")
        .short("f")
        .takes_value(true)
        .help("print every n frames");

    App::new("beltsim")
        .version("0.1")
        .author("Jeremy T. Hatcher")
        .about("Steps an asteroid belt headless and reports each frame")
        .arg(preset_option)
        .arg(frames_option)
        .arg(population_option)
        .arg(per_worker_option)
        .arg(seed_option)
        .arg(frequency_option)
        .arg(Arg::with_name("shield").long("shield").help("sweeps a shield through the belt"))
        .arg(Arg::with_name("laser").long("laser").help("fires a laser across the belt"))
}

impl RunConfig {
    pub fn from_matches(matches: &ArgMatches) -> Result<RunConfig, clap::Error> {
        let preset = matches.value_of("preset")
            .and_then(BeltPreset::from_name)
            .unwrap_or(BeltPreset::Saturn);

        let mut belt = preset.config();
        if matches.is_present("population") {
            belt.population = value_t!(matches, "population", usize)?;
        }

        let mut params = SimParams::default();
        if matches.is_present("perworker") {
            params.bodies_per_worker = value_t!(matches, "perworker", usize)?;
        }

        let frequency = if matches.is_present("frequency") {
            OutputFrequency::Frames(value_t!(matches, "frequency", usize)?)
        } else {
            OutputFrequency::EveryFrame
        };

        Ok(RunConfig {
            preset: preset,
            belt: belt,
            params: params,
            frames: value_t!(matches, "frames", usize)?,
            seed: value_t!(matches, "seed", u64)?,
            frequency: frequency,
            shield: matches.is_present("shield"),
            laser: matches.is_present("laser"),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn matches(args: &[&str]) -> ArgMatches<'static> {
        app().get_matches_from(args.to_vec())
    }

    #[test]
    fn test_defaults() {
        let config = RunConfig::from_matches(&matches(&["beltsim"])).unwrap();
        assert_eq!(config.preset, BeltPreset::Saturn);
        assert_eq!(config.belt.population, 5000);
        assert_eq!(config.frames, 600);
        assert_eq!(config.frequency, OutputFrequency::EveryFrame);
        assert!(!config.shield && !config.laser);
    }

    #[test]
    fn test_overrides() {
        let config = RunConfig::from_matches(&matches(&[
            "beltsim", "--preset", "kuiper", "--population", "120", "--perworker", "50",
            "--seed", "42", "--frequency", "10", "--laser",
        ])).unwrap();
        assert_eq!(config.preset, BeltPreset::Kuiper);
        assert_eq!(config.belt.population, 120);
        assert_eq!(config.belt.orbit_factor, 5.0);
        assert_eq!(config.params.bodies_per_worker, 50);
        assert_eq!(config.seed, 42);
        assert_eq!(config.frequency, OutputFrequency::Frames(10));
        assert!(config.laser);
    }

    #[test]
    fn test_preset_names() {
        let config = RunConfig::from_matches(&matches(&["beltsim", "-p", "SUN"])).unwrap();
        assert_eq!(config.preset, BeltPreset::Sun);
        assert_eq!(config.belt.population, 10000);

        let config = RunConfig::from_matches(&matches(&["beltsim", "--preset", "Kuiper"])).unwrap();
        assert_eq!(config.preset, BeltPreset::Kuiper);

        let result = app().get_matches_from_safe(vec!["beltsim", "--preset", "pluto"]);
        assert_eq!(result.map(|_| ()).unwrap_err().kind, clap::ErrorKind::InvalidValue);
    }

    #[test]
    fn test_short_flags() {
        let config = RunConfig::from_matches(&matches(&["beltsim", "-n", "12", "-c", "40", "-w", "8", "-s", "3", "-f", "2", "--shield"])).unwrap();
        assert_eq!(config.frames, 12);
        assert_eq!(config.belt.population, 40);
        assert_eq!(config.params.bodies_per_worker, 8);
        assert_eq!(config.seed, 3);
        assert_eq!(config.frequency, OutputFrequency::Frames(2));
        assert!(config.shield && !config.laser);
    }

    #[test]
    fn test_bad_number() {
        assert!(RunConfig::from_matches(&matches(&["beltsim", "--frames", "lots"])).is_err());
    }
}
