use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use marchlight_assets::{LoadedScene, SceneManifest};
use marchlight_camera::FlyCamera;
use marchlight_common::DemoConfig;
use marchlight_input::{FrameClock, InputMapper, Key, ManualClock};
use marchlight_render::{DebugTextRenderer, RenderView, Renderer};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "marchlight-cli", about = "CLI tool for marchlight operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and camera defaults
    Info,
    /// Fly the camera headlessly with scripted input and print the last frame
    Simulate(SimulateArgs),
    /// Print the effective configuration as YAML
    Config,
    /// Load a scene manifest without a GPU and report what it contains
    CheckScene {
        /// Path to the scene manifest
        manifest: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
struct SimulateArgs {
    /// Number of frames to simulate
    #[arg(short, long, default_value = "60")]
    frames: u64,
    /// Seconds per frame
    #[arg(long, default_value = "0.016666667")]
    dt: f64,
    /// Keys held for the whole run: w a s d, ' ' (up), ^ (down), + (speed up)
    #[arg(short, long, default_value = "")]
    keys: String,
    /// Pointer travel per frame in pixels (x), with the look button held
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    drag_x: f64,
    /// Pointer travel per frame in pixels (y), with the look button held
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    drag_y: f64,
    /// Scroll lines per frame
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    scroll: f32,
    /// Print the final view as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn parse_keys(script: &str) -> anyhow::Result<Vec<Key>> {
    script
        .chars()
        .map(|c| Key::from_script_char(c).with_context(|| format!("unknown key '{c}'")))
        .collect()
}

/// Drive the camera through `args.frames` frames of a manual clock and
/// return the view the renderer would see after the last one.
fn simulate(config: &DemoConfig, args: &SimulateArgs) -> anyhow::Result<RenderView> {
    if !(args.dt.is_finite() && args.dt >= 0.0) {
        bail!("dt must be a non-negative number of seconds, got {}", args.dt);
    }
    let keys = parse_keys(&args.keys)?;

    let source = ManualClock::new();
    let mut clock = FrameClock::new(&source);
    let mut camera = FlyCamera::from_config(&config.camera);
    let mut input = InputMapper::from_config(&config.controls);

    for key in keys {
        input.key_event(key, true);
    }
    let dragging = args.drag_x != 0.0 || args.drag_y != 0.0;
    if dragging {
        input.pointer_button(input.look_button, true);
    }

    let step = Duration::try_from_secs_f64(args.dt)
        .with_context(|| format!("dt of {} seconds is out of range", args.dt))?;
    let fits = step.is_zero()
        || u32::try_from(args.frames)
            .ok()
            .and_then(|frames| step.checked_mul(frames))
            .is_some();
    if !fits {
        bail!(
            "{} frames of {} seconds overflow the simulation clock",
            args.frames,
            args.dt
        );
    }
    let mut cursor = camera.last_cursor();
    for frame in 0..args.frames {
        source.advance(step);
        let elapsed = clock.tick();
        if dragging {
            cursor.x += args.drag_x;
            cursor.y += args.drag_y;
            input.pointer_moved(&mut camera, cursor.x, cursor.y);
        }
        if args.scroll != 0.0 {
            input.scrolled(&mut camera, args.scroll);
        }
        input.apply_movement(&mut camera, elapsed);
        tracing::debug!(
            frame,
            yaw = camera.yaw(),
            pitch = camera.pitch(),
            "simulated frame"
        );
    }

    Ok(RenderView::capture(
        &camera,
        config.window.resolution(),
        clock.total(),
    ))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = DemoConfig::load_or_default(cli.config.as_deref())
        .context("failed to load configuration")?;

    match cli.command {
        Commands::Info => {
            let camera = FlyCamera::from_config(&config.camera);
            println!("marchlight-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "window: {}x{} \"{}\"",
                config.window.width, config.window.height, config.window.title
            );
            println!(
                "camera: yaw={:.1} pitch={:.1} speed={} sensitivity={} fov={}",
                camera.yaw(),
                camera.pitch(),
                camera.movement_speed,
                camera.mouse_sensitivity,
                camera.fov()
            );
            let f = camera.front();
            println!("front: ({:.3}, {:.3}, {:.3})", f.x, f.y, f.z);
        }
        Commands::Simulate(args) => {
            let view = simulate(&config, &args)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print!("{}", DebugTextRenderer::new().render(&view));
            }
        }
        Commands::Config => {
            print!("{}", config.to_yaml()?);
        }
        Commands::CheckScene { manifest } => {
            let parsed = SceneManifest::load(&manifest)
                .with_context(|| format!("reading {}", manifest.display()))?;
            let scene = LoadedScene::load(&parsed)?;
            println!("scene: {}", scene.name);
            println!(
                "shader: {} ({} bytes)",
                scene.shader.label,
                scene.shader.code.len()
            );
            for (i, texture) in scene.textures.iter().enumerate() {
                println!(
                    "texture{i}: {} {}x{} ({} mips)",
                    texture.label,
                    texture.width(),
                    texture.height(),
                    texture.mip_level_count()
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> SimulateArgs {
        SimulateArgs {
            frames: 60,
            dt: 1.0 / 60.0,
            keys: String::new(),
            drag_x: 0.0,
            drag_y: 0.0,
            scroll: 0.0,
            json: false,
        }
    }

    #[test]
    fn idle_run_keeps_pose_and_advances_time() {
        let view = simulate(&DemoConfig::default(), &args()).unwrap();
        assert_eq!(view.position.to_array(), [0.0, 0.0, 4.0]);
        assert!((view.time - 1.0).abs() < 1e-4);
    }

    #[test]
    fn holding_w_for_one_second_moves_fifty_units() {
        let view = simulate(
            &DemoConfig::default(),
            &SimulateArgs {
                keys: "w".into(),
                ..args()
            },
        )
        .unwrap();
        assert!((view.position.z - (4.0 - 50.0)).abs() < 1e-2);
    }

    #[test]
    fn drag_right_turns_left_in_yaw() {
        let view = simulate(
            &DemoConfig::default(),
            &SimulateArgs {
                frames: 10,
                drag_x: 10.0,
                ..args()
            },
        )
        .unwrap();
        // 100 px at 0.1 deg/px: yaw 90 -> 80, front swings towards +X.
        assert!(view.front.x > 0.0);
        assert!((view.front.x - 10f32.to_radians().sin()).abs() < 1e-3);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = simulate(
            &DemoConfig::default(),
            &SimulateArgs {
                keys: "wq".into(),
                ..args()
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("'q'"));
    }

    #[test]
    fn negative_dt_is_rejected() {
        let result = simulate(
            &DemoConfig::default(),
            &SimulateArgs {
                dt: -1.0,
                ..args()
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn huge_dt_is_rejected_instead_of_panicking() {
        let result = simulate(
            &DemoConfig::default(),
            &SimulateArgs {
                dt: 1e30,
                ..args()
            },
        );
        assert!(result.unwrap_err().to_string().contains("out of range"));
    }

    #[test]
    fn run_longer_than_the_clock_can_hold_is_rejected() {
        let result = simulate(
            &DemoConfig::default(),
            &SimulateArgs {
                frames: 4,
                dt: 1e19,
                ..args()
            },
        );
        assert!(result.unwrap_err().to_string().contains("overflow"));
    }

    #[test]
    fn cli_parses_simulate_flags() {
        let cli = Cli::try_parse_from([
            "marchlight-cli",
            "simulate",
            "--frames",
            "5",
            "--keys",
            "w+",
            "--drag-x",
            "-3",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Simulate(a) => {
                assert_eq!(a.frames, 5);
                assert_eq!(a.keys, "w+");
                assert_eq!(a.drag_x, -3.0);
                assert!(a.json);
            }
            _ => panic!("expected simulate"),
        }
    }
}
