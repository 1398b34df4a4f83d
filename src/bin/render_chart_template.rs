use std::fs;
use std::path::PathBuf;

use chart_templates::api::{ChartContainer, ChartEngine, ChartPayload};
use chart_templates::render::SvgRenderer;
use chart_templates::{ChartError, TemplateKind, telemetry};

const USAGE: &str = "usage: render_chart_template [--template <kind>] --input <payload.json> --output <chart.svg> [--container <selector>]";

#[derive(Debug)]
struct CliArgs {
    template: Option<String>,
    input: PathBuf,
    output: PathBuf,
    container: String,
}

fn main() {
    let _ = telemetry::init_default_tracing();
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

/// Returns whether the chart was drawn; failures still write the error markup.
fn run() -> Result<bool, String> {
    let args = parse_args()?;
    let raw = fs::read_to_string(&args.input)
        .map_err(|err| format!("failed to read `{}`: {err}", args.input.display()))?;

    let mut container = ChartContainer::new(args.container.clone());
    let drawn = match resolve_request(&args, &raw) {
        Ok((kind, payload)) => {
            let mut engine = ChartEngine::<SvgRenderer>::svg().map_err(|err| err.to_string())?;
            let chart = engine.make_chart(&mut container, kind, &payload);
            if let Some(chart) = &chart {
                eprintln!(
                    "rendered {kind} chart: {} primitives -> {}",
                    chart.frame.primitive_count(),
                    args.output.display()
                );
            }
            chart.is_some()
        }
        Err(err) => {
            let template = args.template.as_deref().unwrap_or("unknown");
            container.report_failure(template, &err);
            false
        }
    };

    fs::write(&args.output, container.content())
        .map_err(|err| format!("failed to write `{}`: {err}", args.output.display()))?;
    if !drawn {
        eprintln!("error: {}", strip_markup(container.content()));
    }
    Ok(drawn)
}

fn resolve_request(args: &CliArgs, raw: &str) -> Result<(TemplateKind, ChartPayload), ChartError> {
    let (envelope_kind, payload) = ChartPayload::from_json_compat_str(raw)?;
    let kind = match (&args.template, envelope_kind) {
        (Some(name), _) => name.parse()?,
        (None, Some(kind)) => kind,
        (None, None) => {
            return Err(ChartError::InvalidData(
                "no template given: pass --template or use a request envelope".to_owned(),
            ));
        }
    };
    Ok((kind, payload))
}

fn strip_markup(markup: &str) -> String {
    let mut text = String::with_capacity(markup.len());
    let mut in_tag = false;
    for c in markup.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text
}

fn parse_args() -> Result<CliArgs, String> {
    let mut args = std::env::args().skip(1);
    let mut template = None::<String>;
    let mut input = None::<PathBuf>;
    let mut output = None::<PathBuf>;
    let mut container = "#chart".to_owned();

    while let Some(flag) = args.next() {
        match flag.as_str() {
            "--template" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --template".to_owned())?;
                template = Some(value);
            }
            "--input" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --input".to_owned())?;
                input = Some(PathBuf::from(value));
            }
            "--output" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --output".to_owned())?;
                output = Some(PathBuf::from(value));
            }
            "--container" => {
                container = args
                    .next()
                    .ok_or_else(|| "missing value for --container".to_owned())?;
            }
            "--help" | "-h" => return Err(USAGE.to_owned()),
            other => return Err(format!("unknown argument `{other}`\n{USAGE}")),
        }
    }

    Ok(CliArgs {
        template,
        input: input.ok_or_else(|| format!("missing --input\n{USAGE}"))?,
        output: output.ok_or_else(|| format!("missing --output\n{USAGE}"))?,
        container,
    })
}
