use validator::{Validate, ValidationError};

fn validate_lattice_config(cfg: &LatticeConfig) -> Result<(), ValidationError> {
    if cfg.shape.len() != 2 && cfg.shape.len() != 3 {
        return Err(ValidationError::new("shape must have 2 or 3 axes"));
    }
    if cfg.shape.iter().any(|&extent| extent < 2) {
        return Err(ValidationError::new("every extent must be >= 2"));
    }
    if cfg.anisotropy.len() != cfg.shape.len() {
        return Err(ValidationError::new(
            "anisotropy must have one factor per axis",
        ));
    }
    if cfg.anisotropy.iter().any(|f| !f.is_finite() || *f <= 0.0) {
        return Err(ValidationError::new(
            "anisotropy factors must be finite and > 0",
        ));
    }
    Ok(())
}

/// Lattice extents and per-axis anisotropy factors.
#[derive(Debug, Clone, Validate)]
#[validate(schema(function = "validate_lattice_config"))]
pub struct LatticeConfig {
    pub shape: Vec<usize>,
    pub anisotropy: Vec<f64>,
}

impl LatticeConfig {
    /// Isotropic lattice of the given extents.
    pub fn isotropic(shape: Vec<usize>) -> Self {
        let anisotropy = vec![1.0; shape.len()];
        Self { shape, anisotropy }
    }
}

fn validate_run_config(cfg: &RunConfig) -> Result<(), ValidationError> {
    if cfg.n_steps < 1 {
        return Err(ValidationError::new("n_steps must be >= 1"));
    }
    if !cfg.convergence_threshold.is_finite() || cfg.convergence_threshold < 0.0 {
        return Err(ValidationError::new(
            "convergence_threshold must be finite and >= 0",
        ));
    }
    if !(0.0..=1.0).contains(&cfg.init_probability) {
        return Err(ValidationError::new(
            "init_probability must be in [0, 1]",
        ));
    }
    Ok(())
}

/// One bounded-with-convergence simulation run.
#[derive(Debug, Clone, Copy, Validate)]
#[validate(schema(function = "validate_run_config"))]
pub struct RunConfig {
    /// Sweep cap; the run may stop earlier on convergence.
    pub n_steps: usize,
    /// Stop once the flipped-spin ratio or the relative energy change drops
    /// below this value.
    pub convergence_threshold: f64,
    /// Up-spin probability for the random initial state.
    pub init_probability: f64,
}

fn validate_trajectory_config(cfg: &TrajectoryConfig) -> Result<(), ValidationError> {
    if cfg.n_steps < 1 {
        return Err(ValidationError::new("n_steps must be >= 1"));
    }
    if !cfg.temperature.is_finite() || cfg.temperature <= 0.0 {
        return Err(ValidationError::new("temperature must be finite and > 0"));
    }
    if !(0.0..=1.0).contains(&cfg.init_probability) {
        return Err(ValidationError::new(
            "init_probability must be in [0, 1]",
        ));
    }
    Ok(())
}

/// One bounded-with-export run: exactly `n_steps` sweeps, a snapshot and a
/// time-series row per sweep.
#[derive(Debug, Clone, Copy, Validate)]
#[validate(schema(function = "validate_trajectory_config"))]
pub struct TrajectoryConfig {
    pub n_steps: usize,
    pub temperature: f64,
    pub init_probability: f64,
}

fn validate_scan_config(cfg: &ScanConfig) -> Result<(), ValidationError> {
    if !cfg.t_min.is_finite() || cfg.t_min <= 0.0 {
        return Err(ValidationError::new("t_min must be finite and > 0"));
    }
    if !cfg.t_max.is_finite() || cfg.t_max < cfg.t_min {
        return Err(ValidationError::new("t_max must be >= t_min"));
    }
    if !cfg.t_step.is_finite() || cfg.t_step <= 0.0 {
        return Err(ValidationError::new("t_step must be finite and > 0"));
    }
    Ok(())
}

/// A temperature scan: one independent run per sample in `[t_min, t_max]`.
#[derive(Debug, Clone, Validate)]
#[validate(schema(function = "validate_scan_config"))]
pub struct ScanConfig {
    pub t_min: f64,
    pub t_max: f64,
    pub t_step: f64,
    #[validate]
    pub run: RunConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lattice_config_rejects_bad_shapes() {
        assert!(LatticeConfig::isotropic(vec![4]).validate().is_err());
        assert!(LatticeConfig::isotropic(vec![4, 0]).validate().is_err());
        assert!(LatticeConfig::isotropic(vec![4, 4, 4, 4]).validate().is_err());
        assert!(LatticeConfig::isotropic(vec![4, 4]).validate().is_ok());
        assert!(LatticeConfig::isotropic(vec![4, 4, 4]).validate().is_ok());

        let cfg = LatticeConfig {
            shape: vec![4, 4],
            anisotropy: vec![1.0],
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_run_config_bounds() {
        let mut cfg = RunConfig {
            n_steps: 20_000,
            convergence_threshold: 1e-6,
            init_probability: 0.8,
        };
        assert!(cfg.validate().is_ok());

        cfg.n_steps = 0;
        assert!(cfg.validate().is_err());
        cfg.n_steps = 1;
        cfg.init_probability = 1.5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_trajectory_config_rejects_zero_temperature() {
        let cfg = TrajectoryConfig {
            n_steps: 100,
            temperature: 0.0,
            init_probability: 0.45,
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_scan_config_rejects_bad_range() {
        let run = RunConfig {
            n_steps: 100,
            convergence_threshold: 1e-6,
            init_probability: 0.8,
        };
        let mut cfg = ScanConfig {
            t_min: 0.1,
            t_max: 1.0,
            t_step: 0.1,
            run,
        };
        assert!(cfg.validate().is_ok());

        cfg.t_step = 0.0;
        assert!(cfg.validate().is_err());
        cfg.t_step = 0.1;
        cfg.t_max = 0.05;
        assert!(cfg.validate().is_err());
        cfg.t_max = 1.0;
        cfg.t_min = -0.1;
        assert!(cfg.validate().is_err());

        // Nested run validation is applied too
        cfg.t_min = 0.1;
        cfg.run.n_steps = 0;
        assert!(cfg.validate().is_err());
    }
}
