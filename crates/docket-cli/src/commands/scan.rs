//! Scan command implementation.

use crate::cli::ScanArgs;
use crate::config::OutputFormat;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use docket_domain::{DocType, DocTypeRegistry, RepairContext};
use docket_extractor::parser::{json_body, parse_record};
use docket_extractor::resolver::resolve;
use docket_extractor::scanner::truncate_to_complete;
use serde::Serialize;

/// What the scanner and resolver make of one response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    /// The response already parses
    pub complete: bool,
    /// Longest prefix holding only complete list elements
    pub cleaned: String,
    /// Where recovery would resume, for types that support it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<RepairContext>,
    /// Why there is no context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Execute the scan command.
pub async fn execute_scan(args: ScanArgs, formatter: &Formatter) -> Result<()> {
    let text = tokio::fs::read_to_string(&args.file).await?;
    let doc_type = match args.doc_type.as_deref() {
        Some(label) => Some(DocType::parse(label).ok_or_else(|| {
            CliError::InvalidInput(format!("unknown document type `{}`", label))
        })?),
        None => None,
    };
    let report = scan_text(&text, doc_type, &DocTypeRegistry::builtin());

    match formatter.format() {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Quiet => println!("{}", report.cleaned),
        OutputFormat::Table => {
            if report.complete {
                println!("{}", formatter.success("Response is complete JSON"));
                return Ok(());
            }
            println!("{}", report.cleaned);
            println!();
            match (&report.context, &report.note) {
                (Some(context), _) => {
                    println!("{}", formatter.info(&formatter.repair_context(context)))
                }
                (None, Some(note)) => println!("{}", formatter.warning(note)),
                (None, None) => {}
            }
        }
    }
    Ok(())
}

/// Scan a response and, when a type is given, resolve its repair context
pub fn scan_text(text: &str, doc_type: Option<DocType>, registry: &DocTypeRegistry) -> ScanReport {
    let body = json_body(text);
    if parse_record(body).is_ok() {
        return ScanReport {
            complete: true,
            cleaned: body.to_string(),
            context: None,
            note: None,
        };
    }

    let cleaned = truncate_to_complete(body);
    let (context, note) = match doc_type {
        None => (None, None),
        Some(doc_type) => match registry.get(doc_type).map(|p| p.repair.as_ref()) {
            Err(e) => (None, Some(e.to_string())),
            Ok(None) => (None, Some(format!("{} does not support reprocessing", doc_type))),
            Ok(Some(repair)) => match resolve(&cleaned, repair) {
                Ok(context) => (Some(context), None),
                Err(e) => (None, Some(e.to_string())),
            },
        },
    };

    ScanReport {
        complete: false,
        cleaned,
        context,
        note,
    }
}
