mod app;
mod ui;
mod viewport;

// Re-export library modules so that `crate::build`, `crate::camera`, etc.
// resolve to the lib crate types everywhere in the binary.
pub use cg_engine_lib::build;
pub use cg_engine_lib::camera;
pub use cg_engine_lib::state;

use std::path::PathBuf;

use app::{CgApp, StartupOptions};
use camera::ProfileId;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cg_engine=info,cg_engine_lib=info".into()),
        )
        .init();

    let options = match parse_args(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{e}");
            eprintln!(
                "usage: cg-engine [--world <file.json>] [--patch <file.patch>] \
                 [--profile fps|explorer]"
            );
            std::process::exit(2);
        }
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("cg-engine")
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([640.0, 400.0]),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "cg-engine",
        native_options,
        Box::new(move |cc| Ok(Box::new(CgApp::new(cc, options)))),
    ) {
        tracing::error!("Failed to start application: {e}");
    }
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<StartupOptions, String> {
    let mut options = StartupOptions::default();
    let mut args = args;
    while let Some(arg) = args.next() {
        let mut value = |flag: &str| args.next().ok_or_else(|| format!("{flag} needs a value"));
        match arg.as_str() {
            "--world" => options.world = Some(PathBuf::from(value("--world")?)),
            "--patch" => options.patches.push(PathBuf::from(value("--patch")?)),
            "--profile" => {
                let name = value("--profile")?;
                let id: ProfileId = name.parse().map_err(|e| format!("{e}"))?;
                options.profile = Some(id);
            }
            other => return Err(format!("unknown argument '{other}'")),
        }
    }
    Ok(options)
}
