//! Command-line front end: parses a small set of flags, loads a volume,
//! extracts an isosurface, and writes it as a legacy VTK polydata file.

use std::path::PathBuf;
use std::process::ExitCode;

use mcubes_core::{extract, load_volume, write_mesh, Volume};

struct CliArgs {
    input: Option<PathBuf>,
    vtk: Option<PathBuf>,
    iso: f32,
    stats: bool,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            input: None,
            vtk: None,
            iso: 0.5,
            stats: false,
        }
    }
}

fn print_usage() {
    eprintln!(
        "usage:\n  \
         mcubes --input <path> --iso <value> --vtk <path> [--stats]\n\n\
         arguments:\n  \
         --input <path>  input NPY file, shape (D,H,W) or (1,D,H,W)\n  \
         --iso <value>   isovalue (floating point)\n  \
         --vtk <path>    output legacy VTK PolyData file (required)\n  \
         --stats         print min/max/mean of the loaded volume before extraction\n  \
         -h, --help      print this message"
    );
}

fn parse_args(raw: impl Iterator<Item = String>) -> Result<CliArgs, String> {
    let mut args = CliArgs::default();
    let mut iter = raw.peekable();
    iter.next(); // skip argv[0]

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--input" => {
                let value = iter.next().ok_or("--input requires a value")?;
                args.input = Some(PathBuf::from(value));
            }
            "--iso" => {
                let value = iter.next().ok_or("--iso requires a value")?;
                args.iso = value
                    .parse::<f32>()
                    .map_err(|_| format!("invalid --iso value '{value}'"))?;
            }
            "--vtk" => {
                let value = iter.next().ok_or("--vtk requires a value")?;
                args.vtk = Some(PathBuf::from(value));
            }
            "--stats" => args.stats = true,
            "-h" | "--help" => return Err(String::new()),
            other => return Err(format!("unknown argument: {other}")),
        }
    }

    Ok(args)
}

fn print_stats(volume: &Volume) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    let mut sum = 0.0f64;
    for &v in &volume.data {
        if v < min {
            min = v;
        }
        if v > max {
            max = v;
        }
        sum += f64::from(v);
    }
    let mean = sum / volume.data.len() as f64;
    println!("volume stats: min={min}, max={max}, mean={mean}");
}

fn run() -> Result<(), String> {
    let args = match parse_args(std::env::args()) {
        Ok(args) => args,
        Err(message) => {
            if !message.is_empty() {
                eprintln!("{message}");
            }
            print_usage();
            return Err(String::new());
        }
    };

    let Some(input) = args.input else {
        print_usage();
        return Err("missing required --input".to_string());
    };
    let Some(vtk) = args.vtk else {
        print_usage();
        return Err("missing required --vtk".to_string());
    };

    let volume = load_volume(&input).map_err(|e| e.to_string())?;
    log::info!(
        "loaded '{}': {}x{}x{}",
        input.display(),
        volume.nx,
        volume.ny,
        volume.nz
    );

    if args.stats {
        print_stats(&volume);
    }

    let mesh = extract(&volume, args.iso);
    write_mesh(&vtk, &mesh).map_err(|e| e.to_string())?;

    println!(
        "done. vertices: {}, triangles: {}",
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(())
}

fn main() -> ExitCode {
    let _ = env_logger::try_init();
    log::info!("mcubes-cli starting");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            if !message.is_empty() {
                log::error!("{message}");
                eprintln!("{message}");
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        std::iter::once("mcubes".to_string())
            .chain(v.iter().map(|s| s.to_string()))
            .collect()
    }

    #[test]
    fn parses_full_flag_set() {
        let parsed = parse_args(
            args(&["--input", "a.npy", "--iso", "0.25", "--vtk", "out.vtk", "--stats"]).into_iter(),
        )
        .unwrap();
        assert_eq!(parsed.input, Some(PathBuf::from("a.npy")));
        assert_eq!(parsed.vtk, Some(PathBuf::from("out.vtk")));
        assert!((parsed.iso - 0.25).abs() < 1e-6);
        assert!(parsed.stats);
    }

    #[test]
    fn defaults_iso_and_stats() {
        let parsed = parse_args(args(&["--input", "a.npy", "--vtk", "out.vtk"]).into_iter()).unwrap();
        assert!((parsed.iso - 0.5).abs() < 1e-6);
        assert!(!parsed.stats);
    }

    #[test]
    fn rejects_unknown_flag() {
        let err = parse_args(args(&["--bogus"]).into_iter()).unwrap_err();
        assert!(err.contains("unknown argument"));
    }

    #[test]
    fn rejects_missing_value() {
        let err = parse_args(args(&["--input"]).into_iter()).unwrap_err();
        assert!(err.contains("requires a value"));
    }

    #[test]
    fn help_flag_short_circuits_with_empty_message() {
        let err = parse_args(args(&["--help"]).into_iter()).unwrap_err();
        assert!(err.is_empty());
    }
}
