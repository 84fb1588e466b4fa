use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::IsingError;
use crate::lattice::Lattice;
use crate::observables;
use crate::scan::ScanRow;

pub const SERIES_HEADER: &str =
    "temperature,total_energy,total_magnetization,specific_heat,susceptibility";

/// Writes one trajectory: a time-series CSV plus one lattice snapshot per
/// sweep, all under a single output directory.
pub struct TrajectoryWriter {
    dir: PathBuf,
    base: String,
    series_path: PathBuf,
    series: BufWriter<File>,
}

impl TrajectoryWriter {
    /// Create the output directory (if needed) and the `{base}.csv` series
    /// file with its header.
    pub fn create(dir: impl AsRef<Path>, base: &str) -> Result<Self, IsingError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(IsingError::io(&dir))?;

        let series_path = dir.join(format!("{base}.csv"));
        let file = File::create(&series_path).map_err(IsingError::io(&series_path))?;
        let mut series = BufWriter::new(file);
        writeln!(series, "{SERIES_HEADER}").map_err(IsingError::io(&series_path))?;

        Ok(Self {
            dir,
            base: base.to_string(),
            series_path,
            series,
        })
    }

    /// Write the full lattice state to `{base}_{step:05}.csv`, one row per
    /// site in row-major order. Coordinates are normalized to [0, 1] by
    /// dividing by `extent - 1` (a degenerate single-site axis maps to 0).
    pub fn write_snapshot(&self, lattice: &Lattice, step: usize) -> Result<(), IsingError> {
        let path = self.dir.join(format!("{}_{:05}.csv", self.base, step));
        let file = File::create(&path).map_err(IsingError::io(&path))?;
        let mut out = BufWriter::new(file);

        let grid = lattice.grid();
        let header = if grid.n_dims == 3 {
            "X,Y,Z,Spin"
        } else {
            "X,Y,Spin"
        };
        writeln!(out, "{header}").map_err(IsingError::io(&path))?;

        let spans: Vec<f64> = grid
            .shape
            .iter()
            .map(|&extent| extent.saturating_sub(1).max(1) as f64)
            .collect();

        for site in 0..grid.n_sites {
            let coords = grid.coords_of(site);
            for (d, &c) in coords.iter().enumerate() {
                write!(out, "{},", c as f64 / spans[d]).map_err(IsingError::io(&path))?;
            }
            writeln!(out, "{}", lattice.get_spin(&coords)).map_err(IsingError::io(&path))?;
        }
        out.flush().map_err(IsingError::io(&path))
    }

    /// Append one observables row for the lattice's current state.
    pub fn append_series_row(&mut self, lattice: &Lattice) -> Result<(), IsingError> {
        let r = observables::measure(lattice);
        writeln!(
            self.series,
            "{},{},{},{},{}",
            lattice.temperature(),
            r.energy,
            r.magnetization,
            r.specific_heat,
            r.susceptibility
        )
        .map_err(IsingError::io(&self.series_path))
    }

    /// Flush the series file.
    pub fn finish(mut self) -> Result<(), IsingError> {
        self.series.flush().map_err(IsingError::io(&self.series_path))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Write one temperature-scan table: the canonical header plus one row per
/// temperature.
pub fn write_scan_csv(path: impl AsRef<Path>, rows: &[ScanRow]) -> Result<(), IsingError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(IsingError::io(path))?;
    let mut out = BufWriter::new(file);
    writeln!(out, "{SERIES_HEADER}").map_err(IsingError::io(path))?;
    for row in rows {
        writeln!(
            out,
            "{},{},{},{},{}",
            row.temperature,
            row.result.energy,
            row.result.magnetization,
            row.result.specific_heat,
            row.result.susceptibility
        )
        .map_err(IsingError::io(path))?;
    }
    out.flush().map_err(IsingError::io(path))
}
