use std::borrow::Cow;
use std::error::Error;
use std::io;
use std::path::{Path, PathBuf};

use ballistics_zero::{
    celsius_to_kelvin, get_drag_coefficient, mps_to_fps, radians_to_moa, sample_trajectory,
    solve_trajectory, speed_to_mach, zero_table, zero_tolerance_for_distance, BulletData,
    DragModel, DragTable, EnvironmentData, FiringData, SolverParams, SolverScheme,
    TrajectoryDataPoint, TrajectorySummary, ZeroResult, ZeroStatus,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::warn;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "ballistics-cli")]
#[command(version)]
#[command(about = "Point-mass trajectory and rifle zero calculator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate a single trajectory
    Trajectory {
        #[command(flatten)]
        bullet: BulletArgs,

        #[command(flatten)]
        environment: EnvironmentArgs,

        /// Launch angle (degrees), ignored with --zero-distance
        #[arg(short = 'a', long, default_value = "0.0")]
        angle: f64,

        /// Zero at this distance (m) before solving
        #[arg(short = 'z', long)]
        zero_distance: Option<f64>,

        /// Zero tolerance (m), defaults to 2 cm per 100 m
        #[arg(long)]
        tolerance: Option<f64>,

        /// Stop once this horizontal distance is reached (m), 0 = until impact
        #[arg(long, default_value = "0.0")]
        max_range: f64,

        /// Time step (seconds)
        #[arg(long, default_value = "0.01")]
        time_step: f64,

        /// Maximum flight time (seconds)
        #[arg(long, default_value = "10.0")]
        max_time: f64,

        /// Integration scheme for the flight speed
        #[arg(long, value_enum, default_value = "hybrid-rk4")]
        scheme: SchemeArg,

        /// Distance between rows in table output (m)
        #[arg(long, default_value = "50.0")]
        sample_step: f64,

        /// Output format
        #[arg(short = 'o', long, value_enum, default_value = "table")]
        output: OutputFormat,
    },

    /// Find the zero angle for one or more distances
    Zero {
        #[command(flatten)]
        bullet: BulletArgs,

        #[command(flatten)]
        environment: EnvironmentArgs,

        /// Zero distance (m), repeat for several
        #[arg(short = 'd', long = "distance", required = true)]
        distances: Vec<f64>,

        /// Zero tolerance (m) used for every distance, defaults to 2 cm per 100 m
        #[arg(long)]
        tolerance: Option<f64>,

        /// Output format
        #[arg(short = 'o', long, value_enum, default_value = "table")]
        output: OutputFormat,
    },

    /// Look up the drag coefficient for a speed
    Drag {
        /// Speed (m/s)
        #[arg(short = 's', long)]
        speed: f64,

        /// Temperature (Celsius)
        #[arg(long, default_value = "15.0", allow_hyphen_values = true)]
        temperature: f64,

        /// Standard drag table
        #[arg(long, value_enum, default_value = "g7")]
        drag_model: DragModelArg,

        /// Custom drag table (CSV with mach,cd columns)
        #[arg(long)]
        drag_table: Option<PathBuf>,
    },

    /// Display ballistics information
    Info,
}

#[derive(Args)]
struct BulletArgs {
    /// Bullet mass (grains)
    #[arg(short = 'm', long, default_value = "155.0")]
    mass: f64,

    /// Muzzle velocity (m/s)
    #[arg(short = 'v', long, default_value = "871.42")]
    velocity: f64,

    /// Caliber (mm)
    #[arg(short = 'c', long, default_value = "7.62")]
    caliber: f64,

    /// Muzzle height above the ground datum (m)
    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    height: f64,

    /// Standard drag table
    #[arg(long, value_enum, default_value = "g7")]
    drag_model: DragModelArg,

    /// Custom drag table (CSV with mach,cd columns), overrides --drag-model
    #[arg(long)]
    drag_table: Option<PathBuf>,
}

#[derive(Args)]
struct EnvironmentArgs {
    /// Temperature (Celsius)
    #[arg(long, default_value = "15.0", allow_hyphen_values = true)]
    temperature: f64,

    /// Pressure (hPa)
    #[arg(long, default_value = "1013.25")]
    pressure: f64,

    /// Gravitational acceleration (m/s², negative is down)
    #[arg(long, default_value = "-9.80665", allow_hyphen_values = true)]
    gravity: f64,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
    Table,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DragModelArg {
    G1,
    G7,
}

impl From<DragModelArg> for DragModel {
    fn from(arg: DragModelArg) -> Self {
        match arg {
            DragModelArg::G1 => DragModel::G1,
            DragModelArg::G7 => DragModel::G7,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SchemeArg {
    HybridRk4,
    Euler,
}

impl From<SchemeArg> for SolverScheme {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::HybridRk4 => SolverScheme::HybridRk4,
            SchemeArg::Euler => SolverScheme::Euler,
        }
    }
}

#[derive(Debug, Serialize)]
struct TrajectoryPoint {
    time: f64,
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    velocity: f64,
    energy: f64,
}

impl TrajectoryPoint {
    fn new(p: &TrajectoryDataPoint, mass_kg: f64) -> Self {
        Self {
            time: p.t,
            x: p.position.x,
            y: p.position.y,
            vx: p.velocity.x,
            vy: p.velocity.y,
            velocity: p.speed(),
            energy: p.kinetic_energy(mass_kg),
        }
    }
}

#[derive(Debug, Serialize)]
struct TrajectoryResult {
    drag_table: String,
    zero_angle_rad: f64,
    max_range: f64,
    max_height: f64,
    time_of_flight: f64,
    impact_velocity: f64,
    impact_energy: f64,
    trajectory: Vec<TrajectoryPoint>,
}

#[derive(Debug, Serialize)]
struct ZeroRow {
    distance_m: f64,
    status: String,
    angle_rad: f64,
    angle_deg: f64,
    angle_moa: f64,
    angle_mrad: f64,
    iterations: usize,
}

impl ZeroRow {
    fn new(distance_m: f64, result: &ZeroResult) -> Self {
        Self {
            distance_m,
            status: result.status.to_string(),
            angle_rad: result.angle_rad,
            angle_deg: result.angle_deg(),
            angle_moa: result.angle_moa(),
            angle_mrad: result.angle_mrad(),
            iterations: result.iterations,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Trajectory {
            bullet,
            environment,
            angle,
            zero_distance,
            tolerance,
            max_range,
            time_step,
            max_time,
            scheme,
            sample_step,
            output,
        } => {
            let table = load_drag_table(bullet.drag_model, bullet.drag_table.as_deref())?;
            let env = environment.to_environment();
            let mut firing = bullet.to_firing().with_zero_angle(angle.to_radians());

            if let Some(distance) = zero_distance {
                firing.zero_distance_m = distance;
                let tolerance = tolerance.unwrap_or_else(|| zero_tolerance_for_distance(distance));
                let zero = firing.zero_in(&table, tolerance, &env)?;
                if zero.status == ZeroStatus::IterationLimit {
                    return Err(format!("could not zero at {distance} m ({})", zero.status).into());
                }
            }

            let params = SolverParams {
                time_step,
                max_time,
                max_x: max_range,
                scheme: scheme.into(),
            };
            let points = solve_trajectory(&table, &firing, &env, &params)?;
            let summary = TrajectorySummary::from_points(&points, firing.bullet.mass_kg())
                .ok_or("muzzle is below the ground datum, no trajectory to report")?;

            let label = match &bullet.drag_table {
                Some(path) => path.display().to_string(),
                None => DragModel::from(bullet.drag_model).to_string(),
            };
            display_trajectory(&label, &firing, &points, &summary, sample_step, output)?;
        }

        Commands::Zero {
            bullet,
            environment,
            distances,
            tolerance,
            output,
        } => {
            let table = load_drag_table(bullet.drag_model, bullet.drag_table.as_deref())?;
            let env = environment.to_environment();
            let firing = bullet.to_firing();

            let results = match tolerance {
                None => zero_table(&firing, &table, &env, &distances)?,
                Some(tolerance) => distances
                    .iter()
                    .map(|&d| firing.clone().with_zero_distance(d).zero_in(&table, tolerance, &env))
                    .collect::<Result<Vec<_>, _>>()?,
            };
            for (distance, result) in distances.iter().zip(&results) {
                if !result.is_success() {
                    warn!("no zero found for {distance} m: {}", result.status);
                }
            }

            let rows: Vec<ZeroRow> = distances
                .iter()
                .zip(&results)
                .map(|(&d, r)| ZeroRow::new(d, r))
                .collect();
            display_zeros(&rows, output)?;
        }

        Commands::Drag {
            speed,
            temperature,
            drag_model,
            drag_table,
        } => {
            let table = load_drag_table(drag_model, drag_table.as_deref())?;
            let temperature_k = celsius_to_kelvin(temperature);
            let mach = speed_to_mach(speed, temperature_k);
            let cd = get_drag_coefficient(&table, speed, temperature_k);

            println!("Speed:   {:.2} m/s ({:.1} ft/s)", speed, mps_to_fps(speed));
            println!("Mach:    {:.4}", mach);
            println!("Cd:      {:.4}", cd);
            if mach > table.max_mach() {
                println!("(beyond the table's last breakpoint at Mach {:.2})", table.max_mach());
            }
        }

        Commands::Info => {
            println!("╔════════════════════════════════════════╗");
            println!("║      BALLISTICS ZERO v{:<17}║", env!("CARGO_PKG_VERSION"));
            println!("╠════════════════════════════════════════╣");
            println!("║ Point-mass trajectory and rifle zero   ║");
            println!("║ calculator.                            ║");
            println!("╠════════════════════════════════════════╣");
            println!("║ Features:                              ║");
            println!("║ • G1 / G7 drag table interpolation     ║");
            println!("║ • Hybrid RK4 / Euler integration       ║");
            println!("║ • Bisection zero search                ║");
            println!("║ • Table, JSON and CSV output           ║");
            println!("╚════════════════════════════════════════╝");
        }
    }

    Ok(())
}

impl BulletArgs {
    fn to_firing(&self) -> FiringData {
        let bullet = BulletData {
            mass_gr: self.mass,
            muzzle_velocity_ms: self.velocity,
            caliber_mm: self.caliber,
            ..BulletData::default()
        };
        FiringData::new(bullet).with_height(self.height)
    }
}

impl EnvironmentArgs {
    fn to_environment(&self) -> EnvironmentData {
        EnvironmentData::new(
            celsius_to_kelvin(self.temperature),
            self.pressure * 100.0,
            self.gravity,
        )
    }
}

fn load_drag_table(
    model: DragModelArg,
    path: Option<&Path>,
) -> Result<Cow<'static, DragTable>, Box<dyn Error>> {
    match path {
        Some(path) => Ok(Cow::Owned(DragTable::from_csv_path(path)?)),
        None => Ok(Cow::Borrowed(DragModel::from(model).table())),
    }
}

fn display_trajectory(
    drag_table: &str,
    firing: &FiringData,
    points: &[TrajectoryDataPoint],
    summary: &TrajectorySummary,
    sample_step: f64,
    format: OutputFormat,
) -> Result<(), Box<dyn Error>> {
    let mass_kg = firing.bullet.mass_kg();

    match format {
        OutputFormat::Json => {
            let result = TrajectoryResult {
                drag_table: drag_table.to_string(),
                zero_angle_rad: firing.zero_angle_rad,
                max_range: summary.max_range_m,
                max_height: summary.max_height_m,
                time_of_flight: summary.time_of_flight_s,
                impact_velocity: summary.impact_velocity_mps,
                impact_energy: summary.impact_energy_j,
                trajectory: points.iter().map(|p| TrajectoryPoint::new(p, mass_kg)).collect(),
            };
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(io::stdout());
            for p in points {
                writer.serialize(TrajectoryPoint::new(p, mass_kg))?;
            }
            writer.flush()?;
        }

        OutputFormat::Table => {
            let samples = sample_trajectory(points, mass_kg, sample_step)?;

            println!("╔════════════════════════════════════════╗");
            println!("║         TRAJECTORY RESULTS             ║");
            println!("╠════════════════════════════════════════╣");
            println!("║ Drag Table:        {:>8}            ║", drag_table);
            println!("║ Zero Angle:        {:>8.3} MOA        ║", radians_to_moa(firing.zero_angle_rad));
            println!("║ Max Range:         {:>8.2} m          ║", summary.max_range_m);
            println!("║ Max Height:        {:>8.2} m          ║", summary.max_height_m);
            println!("║ Time of Flight:    {:>8.3} s          ║", summary.time_of_flight_s);
            println!("║ Impact Velocity:   {:>8.2} m/s        ║", summary.impact_velocity_mps);
            println!("║ Impact Energy:     {:>8.2} J          ║", summary.impact_energy_j);
            println!("╚════════════════════════════════════════╝");

            println!("\nTrajectory Points (every {:.0} m):", sample_step);
            println!("┌──────────┬──────────┬──────────┬──────────┬──────────┬────────────────┐");
            println!("│  X (m)   │  Y (m)   │ Time (s) │ Vel(m/s) │ Energy(J)│ Flags          │");
            println!("├──────────┼──────────┼──────────┼──────────┼──────────┼────────────────┤");
            for s in &samples {
                let flags: Vec<&str> = s.flags.iter().map(|f| f.as_str()).collect();
                println!(
                    "│ {:>8.1} │ {:>8.3} │ {:>8.3} │ {:>8.2} │ {:>8.1} │ {:<14} │",
                    s.distance_m,
                    s.height_m,
                    s.time_s,
                    s.velocity_mps,
                    s.energy_j,
                    flags.join(",")
                );
            }
            println!("└──────────┴──────────┴──────────┴──────────┴──────────┴────────────────┘");
        }
    }

    Ok(())
}

fn display_zeros(rows: &[ZeroRow], format: OutputFormat) -> Result<(), Box<dyn Error>> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(rows)?);
        }

        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(io::stdout());
            for row in rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }

        OutputFormat::Table => {
            println!("┌──────────┬────────────┬──────────┬──────────┬──────────┬─────────────────┐");
            println!("│ Dist (m) │ Angle(rad) │ Deg      │ MOA      │ mrad     │ Status          │");
            println!("├──────────┼────────────┼──────────┼──────────┼──────────┼─────────────────┤");
            for row in rows {
                println!(
                    "│ {:>8.1} │ {:>10.7} │ {:>8.4} │ {:>8.3} │ {:>8.3} │ {:<15} │",
                    row.distance_m, row.angle_rad, row.angle_deg, row.angle_moa, row.angle_mrad, row.status
                );
            }
            println!("└──────────┴────────────┴──────────┴──────────┴──────────┴─────────────────┘");
        }
    }

    Ok(())
}
