use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use layerquote_core::export::QuoteExport;
use layerquote_core::render::format_money;

use crate::commands::quote::compute;
use crate::commands::{CommandResult, SelectionArgs};

pub fn run(args: &SelectionArgs, output: Option<&Path>) -> CommandResult {
    let (config, quote) = match compute("export", args) {
        Ok(priced) => priced,
        Err(result) => return result,
    };

    let document = QuoteExport::from(&quote);
    let rendered = match document.to_json(config.export.pretty) {
        Ok(rendered) => rendered,
        Err(error) => return CommandResult::from_error("export", &error),
    };

    let target = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&config.export.file_name));
    if let Err(error) = write_document(&target, &rendered) {
        return CommandResult::failure("export", "export", format!("{error:#}"), 4);
    }

    tracing::info!(
        event_name = "quote.exported",
        path = %target.display(),
        grand_total = %quote.grand_total_cost,
        "quote export written"
    );

    let mut message = format!(
        "wrote `{}` (grand total {}, {} business days, finish {})",
        target.display(),
        format_money(quote.grand_total_cost, &quote.currency),
        quote.total_business_days,
        quote.finish_date
    );
    if !quote.diagnostics.is_empty() {
        message.push_str(&format!("; {} warning(s)", quote.diagnostics.len()));
    }
    CommandResult::success("export", message)
}

fn write_document(target: &Path, rendered: &str) -> anyhow::Result<()> {
    if let Some(parent) = target.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory `{}`", parent.display()))?;
    }
    fs::write(target, format!("{rendered}\n"))
        .with_context(|| format!("failed to write export to `{}`", target.display()))
}
