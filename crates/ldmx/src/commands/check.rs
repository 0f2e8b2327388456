//! Connection check handler.

use serde::Serialize;

use ldmx_core::Engine;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct CheckReport {
    engine: String,
    status: &'static str,
}

pub async fn handle(engine: &Engine, global: &GlobalOpts) -> Result<(), CliError> {
    engine.start().await;

    if !engine.check().await? {
        return Err(CliError::Protocol {
            message: "connection check was not answered with `ok`".into(),
        });
    }

    let report = CheckReport {
        engine: format!("{}:{}", engine.config().host, engine.config().port),
        status: "ok",
    };
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output_format(),
        &report,
        |r| format!("{}: {}", r.engine, output::status(r.status, true, color)),
        |r| r.status.to_owned(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
