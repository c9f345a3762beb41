use layerquote_core::config::AppConfig;
use layerquote_core::cpq::{DeterministicQuoteRuntime, QuoteRuntime};
use layerquote_core::domain::quote::QuoteResult;
use layerquote_core::errors::{ApplicationError, QuoteDiagnostic};
use layerquote_core::render::{
    cost_breakdown, render_text, schedule_line, timeline_sentence, BreakdownLine,
};
use serde::Serialize;

use crate::commands::{load_workspace, CommandResult, SelectionArgs};

#[derive(Debug, Serialize)]
struct QuoteReport<'a> {
    command: &'static str,
    status: &'static str,
    breakdown: [BreakdownLine; 5],
    timeline: String,
    schedule: String,
    quote: &'a QuoteResult,
}

pub fn run(args: &SelectionArgs, json_output: bool) -> CommandResult {
    let quote = match compute("quote", args) {
        Ok((_, quote)) => quote,
        Err(result) => return result,
    };

    if !json_output {
        return CommandResult::text(render_text(&quote));
    }

    let report = QuoteReport {
        command: "quote",
        status: "ok",
        breakdown: cost_breakdown(&quote),
        timeline: timeline_sentence(&quote),
        schedule: schedule_line(&quote),
        quote: &quote,
    };
    match serde_json::to_string_pretty(&report) {
        Ok(output) => CommandResult::text(output),
        Err(error) => CommandResult::failure("quote", "serialization", error.to_string(), 5),
    }
}

/// Shared by `quote` and `export`: loads config and spec, then prices the
/// selection with the configured scheduling. A rejected specification file is
/// reported as the first warning of a quote priced on the builtin document.
pub(crate) fn compute(
    command: &str,
    args: &SelectionArgs,
) -> Result<(AppConfig, QuoteResult), CommandResult> {
    let to_result = |error: ApplicationError| CommandResult::from_error(command, &error);
    let workspace = load_workspace(args.overrides()).map_err(to_result)?;
    let selection = args.to_selection().map_err(to_result)?;

    let runtime = DeterministicQuoteRuntime::default()
        .with_scheduling(workspace.config.timeline.source_scheduling);
    let mut quote = runtime.compute(&workspace.spec, &selection);
    if let Some(error) = workspace.spec_error {
        quote
            .diagnostics
            .insert(0, QuoteDiagnostic::SpecificationRejected { reason: error.to_string() });
    }
    Ok((workspace.config, quote))
}
