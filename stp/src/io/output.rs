//! Output formatting and logging utilities

use color_eyre::eyre::{Result, WrapErr};
use nalgebra::Vector2;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::SystemTime as StdSystemTime;
use tracing::info;
use tracing_subscriber::{
    fmt::format::Writer, fmt::layer, fmt::time::FormatTime, layer::SubscriberExt,
    util::SubscriberInitExt, Registry,
};

/// Custom time formatter that shows only seconds
struct SecondPrecisionTimer;

impl FormatTime for SecondPrecisionTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let now = StdSystemTime::now();
        let duration = now
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default();

        let total_seconds = duration.as_secs();
        let hours = (total_seconds / 3600) % 24;
        let minutes = (total_seconds / 60) % 60;
        let seconds = total_seconds % 60;

        write!(w, "{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

/// Setup output logging to file or stdout
pub fn setup_output(output_path: Option<&String>) {
    match output_path {
        Some(path) => {
            if let Ok(log) = File::create(path) {
                let file_layer = layer()
                    .with_writer(log)
                    .with_timer(SecondPrecisionTimer)
                    .with_ansi(false);
                Registry::default().with(file_layer).init();
                info!("Output will be written to: {}", path);
            } else {
                eprintln!("Could not create output file: {}", path);
            }
        }
        None => {
            let stdout_layer = layer()
                .with_writer(std::io::stdout)
                .with_timer(SecondPrecisionTimer)
                .with_ansi(true);
            Registry::default().with(stdout_layer).init();
            info!("Output will be printed to stdout");
        }
    }
}

/// Write `r g(r)` pairs, one bin per line
pub fn write_rdf_table<W: Write>(writer: &mut W, radii: &[f64], g_of_r: &[f64]) -> Result<()> {
    writeln!(writer, "# r g(r)")?;
    for (r, g) in radii.iter().zip(g_of_r) {
        writeln!(writer, "{:.6} {:.8}", r, g)?;
    }
    Ok(())
}

/// Write `x y` coordinates, one particle per line
pub fn write_positions<W: Write>(writer: &mut W, positions: &[Vector2<f64>]) -> Result<()> {
    writeln!(writer, "# x y")?;
    for pos in positions {
        writeln!(writer, "{:.10} {:.10}", pos.x, pos.y)?;
    }
    Ok(())
}

/// Create `path` and hand a buffered writer to `write`
pub fn write_to_file<F>(path: &str, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let file = File::create(path).wrap_err_with(|| format!("Unable to create file: {}", path))?;
    let mut writer = BufWriter::new(file);
    write(&mut writer)?;
    writer
        .flush()
        .wrap_err_with(|| format!("Unable to write file: {}", path))?;
    info!("Wrote {}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_rdf_table_format() {
        let mut buffer = Vec::new();
        write_rdf_table(&mut buffer, &[0.0, 0.1], &[0.0, 1.25]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, ["# r g(r)", "0.000000 0.00000000", "0.100000 1.25000000"]);
    }

    #[test]
    fn test_positions_round_trip_through_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("positions.dat");
        let path = path.to_str().unwrap();
        let positions = [Vector2::new(2.5, 2.5), Vector2::new(7.5, 0.125)];

        write_to_file(path, |w| write_positions(w, &positions)).unwrap();

        let text = std::fs::read_to_string(path).unwrap();
        let parsed: Vec<Vec<f64>> = text
            .lines()
            .skip(1)
            .map(|line| {
                line.split_whitespace()
                    .map(|v| v.parse().unwrap())
                    .collect()
            })
            .collect();
        assert_eq!(parsed, vec![vec![2.5, 2.5], vec![7.5, 0.125]]);
    }

    #[test]
    fn test_unwritable_path_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("gr.dat");
        let result = write_to_file(path.to_str().unwrap(), |w| write_rdf_table(w, &[], &[]));
        assert!(result.is_err());
    }
}
