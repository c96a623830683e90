use pug_engine::device::GpuInit;
use pug_engine::logging::{init_logging, LoggingConfig};
use pug_engine::shader::ShaderPaths;
use pug_engine::window::{Runtime, RuntimeConfig, StartupError};

/// Exit code reported when startup fails.
const STARTUP_FAILURE: i32 = -1;

fn main() {
    init_logging(LoggingConfig::default());

    let code = match Runtime::run(
        RuntimeConfig::default(),
        GpuInit::default(),
        ShaderPaths::locate(),
    ) {
        Ok(code) => code,
        Err(err) => {
            report_startup_failure(&err);
            STARTUP_FAILURE
        }
    };

    std::process::exit(code);
}

/// Blocks on an error dialog naming the failed startup step.
fn report_startup_failure(err: &StartupError) {
    log::error!("startup failed: {}: {:#}", err.stage, err.source);

    rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Error)
        .set_title("Error")
        .set_description(err.stage.message())
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
}
