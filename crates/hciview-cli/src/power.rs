use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use time::format_description::well_known::Rfc3339;

use hciview_core::{PowerSampleSource, Pt5Parser};

use crate::CliError;
use crate::hci::{resolve_output_path, validate_input_file};

pub(crate) fn cmd_summary(input: &Path) -> Result<(), CliError> {
    validate_input_file(input)?;
    let parser = open_parser(input)?;

    println!(" Sample Count    : {}", parser.sample_count());
    println!(" Period          : {} s", parser.period_seconds());
    println!(" Average Current : {:.3} mA", parser.average_current_ma());
    println!(
        " Capture Date    : {}",
        parser
            .capture_date()
            .and_then(|date| date.format(&Rfc3339).ok())
            .unwrap_or_else(|| "n/a".to_string())
    );

    Ok(())
}

pub(crate) fn cmd_extract(input: &Path, out: Option<PathBuf>) -> Result<(), CliError> {
    validate_input_file(input)?;
    let mut parser = open_parser(input)?;

    let path = resolve_output_path(input, out, "csv");
    let file = File::create(&path)
        .with_context(|| format!("Failed to create output: {}", path.display()))
        .map_err(CliError::from)?;
    let mut writer = BufWriter::new(file);

    write_csv(&mut parser, &mut writer)
        .with_context(|| format!("Failed to write output: {}", path.display()))
        .map_err(CliError::from)?;

    println!(" Output          : {}", path.display());
    Ok(())
}

fn write_csv<S: PowerSampleSource>(parser: &mut S, writer: &mut impl Write) -> anyhow::Result<()> {
    writeln!(writer, "timestamp_s,current_ma")?;
    for index in 0..parser.sample_count() {
        let timestamp = parser.timestamp_seconds(index);
        match parser.try_current_ma(index)? {
            Some(current) => writeln!(writer, "{timestamp},{current}")?,
            // Dropped samples keep their row so timestamps stay dense.
            None => writeln!(writer, "{timestamp},")?,
        }
    }
    writer.flush()?;
    Ok(())
}

fn open_parser(input: &Path) -> Result<Pt5Parser<File>, CliError> {
    Pt5Parser::open(input)
        .with_context(|| format!("Failed to read power trace: {}", input.display()))
        .map_err(CliError::from)
}
