//! Export an iCal file as a static HTML page
//!
//! Usage: `calutils-export <input.ics> [output.html] [settings.json]`

use std::path::Path;

use calutils::config::Locale;
use calutils::html_export::{HtmlExport, HtmlExportSettings};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let (input, output, settings_file) = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(usage) => {
            eprintln!("{}", usage);
            std::process::exit(1);
        },
    };

    if let Err(err) = export(input, output, settings_file) {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

/// The input file, output file and settings file, or the usage message when the input is missing
fn parse_args(args: &[String]) -> Result<(&str, Option<&str>, Option<&str>), String> {
    let program = args.first().map(String::as_str).unwrap_or("calutils-export");
    match args.get(1) {
        None => Err(format!("Usage: {} <input.ics> [output.html] [settings.json]", program)),
        Some(input) => Ok((input.as_str(), args.get(2).map(String::as_str), args.get(3).map(String::as_str))),
    }
}

fn export(input: &str, output: Option<&str>, settings_file: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let content = match std::fs::read_to_string(input) {
        Err(err) => return Err(format!("Unable to read file {:?}: {}", input, err).into()),
        Ok(content) => content,
    };
    let calendar = calutils::ical::parse_calendar(&content)?;
    log::debug!("Parsed {} incidences from {}", calendar.incidences().len(), input);

    let mut settings = match settings_file {
        Some(path) => HtmlExportSettings::from_file(Path::new(path))?,
        None => HtmlExportSettings::default(),
    };
    if settings_file.is_none() && calendar.name().is_empty() == false {
        settings.title = calendar.name().to_string();
    }

    let export = HtmlExport::new(&calendar, settings, Locale::default());
    if export.save(output.map(Path::new)) == false {
        return Err("Unable to write the HTML page".into());
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let args: Vec<String> = vec!["export".into(), "in.ics".into(), "out.html".into()];
        assert_eq!(parse_args(&args), Ok(("in.ics", Some("out.html"), None)));

        let usage = parse_args(&["export".to_string()]).unwrap_err();
        assert!(usage.starts_with("Usage: export <input.ics>"));

        let usage = parse_args(&[]).unwrap_err();
        assert!(usage.starts_with("Usage: calutils-export <input.ics>"));
    }
}
