//! Helfrich mesh - diagnostics entry point
//!
//! Builds an icosphere, optionally perturbs it, evaluates the bending forces
//! and checks one force component against a finite difference of the energy.
//!
//! CLI Usage:
//!   cargo run                                  # Level-2 icosphere, K = 1
//!   cargo run -- -s 4 --kappa 20 --parallel    # Finer mesh, parallel kernels
//!   cargo run -- --perturb 0.05 --json         # Rough surface, JSON summary

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use glam::DVec3;
use helfrich_mesh::{
    BoxDim, ExecutionMode, ForceCompute, GeneratedMesh, HelfrichConfig, HelfrichMeshForceCompute,
    ParticleData, SystemState,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Diagnostics options
struct Options {
    subdivisions: u32,
    kappa: f64,
    perturb: f64,
    seed: u64,
    parallel: bool,
    json: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            subdivisions: 2,
            kappa: 1.0,
            perturb: 0.02,
            seed: 42,
            parallel: false,
            json: false,
        }
    }
}

/// Parse CLI arguments
fn parse_args() -> Result<Options> {
    let args: Vec<String> = std::env::args().collect();
    let mut opts = Options::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-s" | "--subdivisions" => {
                i += 1;
                opts.subdivisions = value(&args, i)?;
            }
            "-k" | "--kappa" => {
                i += 1;
                opts.kappa = value(&args, i)?;
            }
            "-p" | "--perturb" => {
                i += 1;
                opts.perturb = value(&args, i)?;
            }
            "--seed" => {
                i += 1;
                opts.seed = value(&args, i)?;
            }
            "--parallel" => opts.parallel = true,
            "--json" => opts.json = true,
            "--help" | "-h" => {
                println!("Helfrich mesh diagnostics");
                println!();
                println!("Usage: helfrich-mesh [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -s, --subdivisions N  Icosphere subdivision level (default: 2)");
                println!("  -k, --kappa K         Bending modulus (default: 1.0)");
                println!("  -p, --perturb A       Random vertex displacement amplitude (default: 0.02)");
                println!("  --seed S              Seed for the perturbation (default: 42)");
                println!("  --parallel            Evaluate edge kernels on the rayon pool");
                println!("  --json                Print the summary as JSON");
                println!("  --help, -h            Show this help");
                std::process::exit(0);
            }
            other => log::warn!("ignoring unknown argument '{}'", other),
        }
        i += 1;
    }

    Ok(opts)
}

fn value<T: std::str::FromStr>(args: &[String], i: usize) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = args
        .get(i)
        .with_context(|| format!("missing value after '{}'", args[i - 1]))?;
    raw.parse()
        .with_context(|| format!("invalid value '{}' for '{}'", raw, args[i - 1]))
}

fn main() -> Result<()> {
    env_logger::init();
    let opts = parse_args()?;

    let generated = GeneratedMesh::icosphere(1.0, opts.subdivisions)?;
    let mesh = Arc::new(generated.mesh);
    log::info!(
        "icosphere level {}: {} vertices, {} bonds, {} triangles",
        opts.subdivisions,
        generated.positions.len(),
        mesh.n_bonds(),
        mesh.n_triangles()
    );

    let mut rng = StdRng::seed_from_u64(opts.seed);
    let positions = generated
        .positions
        .iter()
        .map(|&p| {
            let jitter = DVec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            p + opts.perturb * jitter
        })
        .collect::<Vec<_>>();

    let config = HelfrichConfig {
        execution: if opts.parallel {
            ExecutionMode::Parallel
        } else {
            ExecutionMode::Serial
        },
        ..Default::default()
    };
    let mut compute = HelfrichMeshForceCompute::new(Arc::clone(&mesh), config);
    compute.set_params(0, opts.kappa)?;

    let mut system = SystemState::new(ParticleData::new(positions), BoxDim::cube(10.0)).with_virial();

    let start = Instant::now();
    compute.compute(0, &system)?;
    let elapsed = start.elapsed();

    let summary = compute.summary();
    if opts.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("=== Helfrich Mesh Diagnostics ===\n");
        println!("Bonds: {}", summary.n_bonds);
        println!("Bending energy: {:.6e}", summary.total_energy);
        println!("Max |F|: {:.6e}", summary.max_force);
        println!(
            "Net force: ({:.3e}, {:.3e}, {:.3e})",
            summary.net_force[0], summary.net_force[1], summary.net_force[2]
        );
        println!(
            "Virial trace: {:.3e}",
            summary.total_virial[0] + summary.total_virial[3] + summary.total_virial[5]
        );
        println!("Degenerate vertices: {}", summary.degenerate_vertices);
        println!("Evaluation time: {:.3} ms", elapsed.as_secs_f64() * 1e3);
    }

    // Central difference of the energy along x for tag 0
    let h = 1e-6;
    let analytic = compute.force_energy()[0].force.x;
    let origin = system.particles.positions()[0];

    system.particles.set_position(0, origin + DVec3::X * h)?;
    compute.compute(1, &system)?;
    let e_plus = compute.total_energy();

    system.particles.set_position(0, origin - DVec3::X * h)?;
    compute.compute(2, &system)?;
    let e_minus = compute.total_energy();

    let numeric = -(e_plus - e_minus) / (2.0 * h);
    let rel = (analytic - numeric).abs() / numeric.abs().max(1e-12);
    log::info!("finite difference check: analytic {:.6e}, numeric {:.6e}", analytic, numeric);
    if !opts.json {
        println!("\nF_x(tag 0): analytic {:.6e}, finite difference {:.6e} (rel. err {:.2e})", analytic, numeric, rel);
    }

    Ok(())
}
