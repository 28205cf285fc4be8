use anyhow::{bail, Context};
use facegate::camera::{StillImageSource, VideoSource};
use facegate::config::FaceGateConfig;
use facegate::detector::{ExternalProcessDetector, FaceDetector};
use facegate::permissions::check_permission_detailed;
use facegate::quality::{average_luminance, MIN_LUMINANCE};
use facegate::raster::grab_frame;
use facegate::verify::{FaceVerifier, HttpFaceVerifier, VerifiedUser};
use facegate::{FaceCaptureError, FaceCaptureSession, FaceDescriptor, SessionOptions};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const USAGE: &str = "Usage: facegate-cli <command> [args] [--config <path>] [--image <path>] [--device <index>] [--json]

Commands:
  doctor                 check camera permission and configuration
  capture                capture and validate a face, no network
  login <email>          capture a face and log in with it
  analyze <image>        report lighting for a still image
  config-init [path]     write a default configuration file";

struct Options {
    positional: Vec<String>,
    config_path: PathBuf,
    image: Option<PathBuf>,
    device: Option<u32>,
    json: bool,
}

fn parse_args(args: &[String]) -> anyhow::Result<Options> {
    let mut options = Options {
        positional: Vec::new(),
        config_path: FaceGateConfig::default_path(),
        image: None,
        device: None,
        json: false,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                options.config_path = args.get(i).context("--config needs a path")?.into();
            }
            "--image" => {
                i += 1;
                options.image = Some(args.get(i).context("--image needs a path")?.into());
            }
            "--device" => {
                i += 1;
                let value = args.get(i).context("--device needs an index")?;
                options.device = Some(value.parse().context("--device must be a number")?);
            }
            "--json" => options.json = true,
            other => options.positional.push(other.to_string()),
        }
        i += 1;
    }
    Ok(options)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let options = parse_args(&args)?;
    let Some(command) = options.positional.first().cloned() else {
        eprintln!("{}", USAGE);
        std::process::exit(1);
    };

    match command.as_str() {
        "doctor" => cmd_doctor(&options).await,
        "capture" => cmd_capture(&options).await,
        "login" => cmd_login(&options).await,
        "analyze" => cmd_analyze(&options),
        "config-init" => cmd_config_init(&options),
        _ => {
            eprintln!("Unknown command: {}\n\n{}", command, USAGE);
            std::process::exit(1);
        }
    }
}

fn load_config(options: &Options) -> anyhow::Result<FaceGateConfig> {
    let mut config = FaceGateConfig::load_layered(&options.config_path)
        .with_context(|| format!("loading {}", options.config_path.display()))?;
    if let Some(device) = options.device {
        config.camera.device_index = device;
    }
    Ok(config)
}

fn open_source(options: &Options, config: &FaceGateConfig) -> anyhow::Result<Box<dyn VideoSource>> {
    if let Some(image) = &options.image {
        return Ok(Box::new(StillImageSource::from_path(image)));
    }

    #[cfg(feature = "native-camera")]
    {
        let [width, height] = config.camera.requested_resolution;
        let format = facegate::types::CameraFormat::new(width, height, config.camera.fps as f32);
        Ok(Box::new(facegate::camera::NokhwaSource::new(
            config.camera.device_index,
            format,
        )))
    }

    #[cfg(not(feature = "native-camera"))]
    {
        let _ = config;
        bail!("built without the native-camera feature; pass --image <path>")
    }
}

async fn build_session(
    options: &Options,
    config: &FaceGateConfig,
    verifier: Arc<dyn FaceVerifier>,
) -> anyhow::Result<FaceCaptureSession> {
    let detector = Arc::new(ExternalProcessDetector::new(
        &config.detector.program,
        config.detector.args.clone(),
    ));
    let source = open_source(options, config)?;
    Ok(FaceCaptureSession::open(
        source,
        detector,
        verifier,
        SessionOptions::from(&config.capture),
    )
    .await?)
}

/// Verifier for capture-only runs; never called.
struct NoDispatch;

#[async_trait::async_trait]
impl FaceVerifier for NoDispatch {
    async fn verify(
        &self,
        _identifier: &str,
        _descriptor: &FaceDescriptor,
    ) -> Result<Option<VerifiedUser>, FaceCaptureError> {
        Err(FaceCaptureError::RemoteVerificationFailed(
            "verification disabled for capture".to_string(),
        ))
    }
}

fn report_failure(e: &FaceCaptureError, json: bool) {
    if json {
        let body = serde_json::json!({ "ok": false, "error": e.to_string(), "message": e.user_message() });
        println!("{}", body);
    } else {
        eprintln!("{}", e.user_message());
        log::debug!("{}", e);
    }
}

async fn cmd_doctor(options: &Options) -> anyhow::Result<()> {
    let info = facegate::get_info();
    let permission = check_permission_detailed();
    let config = FaceGateConfig::load_layered(&options.config_path);

    // the helper is probed only when the configuration is usable
    let detector_check = match &config {
        Ok(c) => {
            let detector = ExternalProcessDetector::new(&c.detector.program, c.detector.args.clone());
            let ready = detector.initialize().await;
            Some((detector.program().display().to_string(), ready))
        }
        Err(_) => None,
    };

    if options.json {
        let body = serde_json::json!({
            "crate": info,
            "permission": permission,
            "config_ok": config.is_ok(),
            "config_error": config.as_ref().err().map(|e| e.to_string()),
            "detector": detector_check.as_ref().map(|(program, _)| program),
            "detector_ready": detector_check.as_ref().map(|(_, ready)| ready.is_ok()),
            "detector_error": detector_check
                .as_ref()
                .and_then(|(_, ready)| ready.as_ref().err().map(|e| e.to_string())),
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        println!("{} {} (native camera: {})", info.name, info.version, info.native_camera);
        println!("camera permission: {} - {}", permission.status, permission.message);
        for device in &permission.devices {
            println!("  device: {}", device);
        }
        match &config {
            Ok(c) => println!(
                "config: ok (width {}, endpoint {})",
                c.capture.target_width, c.verification.endpoint
            ),
            Err(e) => println!("config: {}", e),
        }
        if let Some((program, ready)) = &detector_check {
            match ready {
                Ok(()) => println!("detector: {} ready", program),
                Err(e) => println!("detector: {} not ready - {}", program, e),
            }
        }
    }
    Ok(())
}

async fn cmd_capture(options: &Options) -> anyhow::Result<()> {
    let config = load_config(options)?;
    let session = build_session(options, &config, Arc::new(NoDispatch)).await?;

    let result = session.capture_descriptor().await;
    session.close().await;

    match result {
        Ok(report) => {
            if options.json {
                println!("{}", serde_json::to_string(&report)?);
            } else {
                println!(
                    "face ok: luminance {:.1}, face covers {:.1}% of {}x{} frame",
                    report.capture.luminance,
                    report.capture.face_ratio * 100.0,
                    report.capture.frame_width,
                    report.capture.frame_height
                );
            }
            Ok(())
        }
        Err(e) => {
            report_failure(&e, options.json);
            std::process::exit(2);
        }
    }
}

async fn cmd_login(options: &Options) -> anyhow::Result<()> {
    let Some(email) = options.positional.get(1) else {
        bail!("Usage: facegate-cli login <email>");
    };
    let config = load_config(options)?;
    let verifier = HttpFaceVerifier::new(
        &config.verification.endpoint,
        config.verification.request_timeout_ms.map(Duration::from_millis),
    )?;
    log::info!("Verifying against {}", verifier.endpoint());
    let session = build_session(options, &config, Arc::new(verifier)).await?;

    let result = session.login(email).await;
    session.close().await;

    match result {
        Ok(outcome) => {
            if options.json {
                println!("{}", serde_json::to_string(&outcome)?);
            } else {
                let name = outcome
                    .user
                    .as_ref()
                    .and_then(|u| u.name.clone().or_else(|| u.email.clone()))
                    .unwrap_or_else(|| outcome.identifier.clone());
                println!("logged in as {}", name);
            }
            Ok(())
        }
        Err(e) => {
            report_failure(&e, options.json);
            std::process::exit(2);
        }
    }
}

fn cmd_analyze(options: &Options) -> anyhow::Result<()> {
    let Some(path) = options.positional.get(1) else {
        bail!("Usage: facegate-cli analyze <image>");
    };
    let config = load_config(options)?;

    let mut source = StillImageSource::from_path(path);
    source.open()?;
    let frame = source.grab()?;
    let raster = grab_frame(&frame, config.capture.target_width)?;
    let luminance = average_luminance(&raster);
    let lighting_ok = luminance >= MIN_LUMINANCE;

    if options.json {
        let body = serde_json::json!({
            "source": [frame.width, frame.height],
            "raster": [raster.width(), raster.height()],
            "luminance": luminance,
            "lighting_ok": lighting_ok,
        });
        println!("{}", body);
    } else {
        println!(
            "{}x{} -> {}x{}, luminance {:.1} ({})",
            frame.width,
            frame.height,
            raster.width(),
            raster.height(),
            luminance,
            if lighting_ok { "ok" } else { "too dark" }
        );
    }
    Ok(())
}

fn cmd_config_init(options: &Options) -> anyhow::Result<()> {
    let path = options
        .positional
        .get(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| options.config_path.clone());
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    FaceGateConfig::default().save_to_file(&path)?;
    println!("wrote {}", path.display());
    Ok(())
}
