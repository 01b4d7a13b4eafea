use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use time::format_description::well_known::Rfc3339;

use hciview_core::{
    BtsnoopReader, DecodeStatus, DecodedResult, HciDecoder, HciPacket, parse_packet,
    summarize_btsnoop_file,
};

use crate::filter::{self, FilterSpec};
use crate::{CliError, OutputMode};

pub(crate) fn cmd_summary(input: &Path) -> Result<(), CliError> {
    validate_input_file(input)?;

    let summary = summarize_btsnoop_file(input)
        .with_context(|| format!("Failed to read capture: {}", input.display()))
        .map_err(CliError::from)?;

    println!(" Record Count    : {}", summary.record_count);
    println!(" Total Bytes     : {}", summary.total_payload_bytes);
    println!(" First (UTC)     : {}", summary.time_first.as_deref().unwrap_or("n/a"));
    println!(" Last  (UTC)     : {}", summary.time_last.as_deref().unwrap_or("n/a"));
    println!(
        " Duration        : {}",
        summary
            .duration_micros
            .map(format_duration_micros)
            .unwrap_or_else(|| "n/a".to_string())
    );
    println!(" Commands        : {}", summary.commands);
    println!(" Events          : {}", summary.events);
    println!(" ACL             : {}", summary.acl);
    println!(" SCO             : {}", summary.sco);
    println!(" ISO             : {}", summary.iso);
    println!(" Unknown         : {}", summary.unknown);

    Ok(())
}

fn format_duration_micros(micros: i64) -> String {
    let total_seconds = micros / 1_000_000;
    let sub_micros = (micros % 1_000_000).unsigned_abs();
    format!(
        "{:02}:{:02}:{:02}.{:06}",
        total_seconds / 3600,
        (total_seconds / 60) % 60,
        total_seconds % 60,
        sub_micros
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PacketKind {
    Cmd,
    Acl,
    Sco,
    Evt,
    Iso,
}

fn parse_types(input: &str) -> Result<Vec<PacketKind>, String> {
    let mut kinds = Vec::new();
    for value in input.split([',', ';']) {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        let kind = match value.to_ascii_lowercase().as_str() {
            "cmd" | "command" => PacketKind::Cmd,
            "evt" | "event" => PacketKind::Evt,
            "acl" => PacketKind::Acl,
            "sco" => PacketKind::Sco,
            "iso" => PacketKind::Iso,
            other => return Err(format!("Unknown type '{other}'. Use cmd,acl,sco,evt,iso.")),
        };
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    if kinds.is_empty() {
        return Err("--types must include one or more of: cmd,acl,sco,evt,iso.".to_string());
    }
    Ok(kinds)
}

#[derive(Debug, Serialize)]
struct ExtractResult {
    file: String,
    record_count: u64,
    parse_failures: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    cmd_frames: Option<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    evt_frames: Option<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    acl_frames: Option<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sco_frames: Option<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    iso_frames: Option<Vec<u64>>,
}

pub(crate) fn cmd_extract(
    input: &Path,
    mode: OutputMode,
    out: Option<PathBuf>,
    types: &str,
) -> Result<(), CliError> {
    validate_input_file(input)?;
    validate_output_mode(mode, out.as_deref())?;
    let selected = parse_types(types)
        .map_err(|message| CliError::new(message, Some("example: --types cmd,evt".to_string())))?;

    let mut cmd = selected.contains(&PacketKind::Cmd).then(Vec::new);
    let mut evt = selected.contains(&PacketKind::Evt).then(Vec::new);
    let mut acl = selected.contains(&PacketKind::Acl).then(Vec::new);
    let mut sco = selected.contains(&PacketKind::Sco).then(Vec::new);
    let mut iso = selected.contains(&PacketKind::Iso).then(Vec::new);

    let mut record_count = 0u64;
    let mut parse_failures = 0u64;
    let mut frame_number = 1u64;

    let mut reader = open_reader(input)?;
    while let Some(record) = next_record(&mut reader, input)? {
        record_count += 1;
        match parse_packet(&record.payload) {
            HciPacket::Command(_) => push_frame(&mut cmd, frame_number),
            HciPacket::Event(_) => push_frame(&mut evt, frame_number),
            HciPacket::Acl(_) => push_frame(&mut acl, frame_number),
            HciPacket::Sco(_) => push_frame(&mut sco, frame_number),
            HciPacket::Iso(_) => push_frame(&mut iso, frame_number),
            HciPacket::Unknown(_) => parse_failures += 1,
        }
        frame_number += 1;
    }

    let result = ExtractResult {
        file: file_name(input),
        record_count,
        parse_failures,
        cmd_frames: cmd,
        evt_frames: evt,
        acl_frames: acl,
        sco_frames: sco,
        iso_frames: iso,
    };

    match mode {
        OutputMode::Console => {
            println!(" Record Count   : {}", result.record_count);
            println!(" Parse Failures : {}", result.parse_failures);
            print_frame_list("cmd", &result.cmd_frames);
            print_frame_list("evt", &result.evt_frames);
            print_frame_list("acl", &result.acl_frames);
            print_frame_list("sco", &result.sco_frames);
            print_frame_list("iso", &result.iso_frames);
            Ok(())
        }
        OutputMode::Json => {
            let path = resolve_output_path(input, out, "json");
            write_json(&path, &result)?;
            println!(" Output          : {}", path.display());
            Ok(())
        }
    }
}

fn push_frame(frames: &mut Option<Vec<u64>>, frame_number: u64) {
    if let Some(frames) = frames {
        frames.push(frame_number);
    }
}

fn print_frame_list(label: &str, frames: &Option<Vec<u64>>) {
    let Some(frames) = frames else {
        return;
    };
    let value = if frames.is_empty() {
        "n/a".to_string()
    } else {
        frames
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    println!(" {label} : {value}");
}

pub(crate) struct FilterOptions {
    pub set: Option<u32>,
    pub ogf: Option<String>,
    pub ocf: Option<String>,
    pub opcode: Option<String>,
    pub eventcode: Option<String>,
    pub le_subevent: Option<String>,
}

#[derive(Debug, Serialize)]
struct FilterEntry {
    frame: u64,
    kind: &'static str,
    code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    #[serde(flatten)]
    decoded: DecodedResult,
}

#[derive(Debug, Serialize)]
struct FilterOutput {
    file: String,
    record_count: u64,
    entry_count: u64,
    entries: Vec<FilterEntry>,
}

pub(crate) fn cmd_filter(
    input: &Path,
    mode: OutputMode,
    out: Option<PathBuf>,
    options: FilterOptions,
) -> Result<(), CliError> {
    validate_input_file(input)?;
    validate_output_mode(mode, out.as_deref())?;
    let spec = build_filter_spec(&options)?;

    let decoder = HciDecoder::new();
    let mut entries = Vec::new();
    let mut record_count = 0u64;
    let mut frame_number = 1u64;

    let mut reader = open_reader(input)?;
    while let Some(record) = next_record(&mut reader, input)? {
        record_count += 1;
        let timestamp = record
            .timestamp_utc()
            .and_then(|utc| utc.format(&Rfc3339).ok());

        match parse_packet(&record.payload) {
            HciPacket::Command(command) if spec.matches_command(command.opcode) => {
                entries.push(FilterEntry {
                    frame: frame_number,
                    kind: "cmd",
                    code: command.opcode.to_string(),
                    timestamp,
                    decoded: decoder.decode_command(&command),
                });
            }
            HciPacket::Event(event) if spec.matches_event(&event) => {
                entries.push(FilterEntry {
                    frame: frame_number,
                    kind: "evt",
                    code: event.event_code.to_string(),
                    timestamp,
                    decoded: decoder.decode_event(&event),
                });
            }
            _ => {}
        }
        frame_number += 1;
    }

    let output = FilterOutput {
        file: file_name(input),
        record_count,
        entry_count: entries.len() as u64,
        entries,
    };

    match mode {
        OutputMode::Console => {
            println!(" Record Count : {}", output.record_count);
            println!(" Matches      : {}", output.entry_count);
            for entry in &output.entries {
                println!(
                    "#{} {} {} {} [{}]",
                    entry.frame,
                    entry.kind,
                    entry.code,
                    entry.decoded.name,
                    status_label(entry.decoded.status)
                );
                for field in &entry.decoded.fields {
                    println!("    {} : {}", field.name, field.value);
                }
            }
            Ok(())
        }
        OutputMode::Json => {
            let path = resolve_output_path(input, out, "hci.json");
            write_json(&path, &output)?;
            println!(" Output          : {}", path.display());
            Ok(())
        }
    }
}

fn build_filter_spec(options: &FilterOptions) -> Result<FilterSpec, CliError> {
    let mut spec = FilterSpec::default();

    if let Some(id) = options.set {
        let Some(set) = filter::preset(id) else {
            return Err(CliError::new(
                format!("unknown filter set id {id}"),
                Some(format!("known sets: {}", filter::describe_known_sets())),
            ));
        };
        spec = spec.merge(set.spec);
    }

    if let Some(ogf) = &options.ogf {
        spec.ogfs.extend(parse_filter_list::<u8>(ogf, "ogf")?);
    }
    if let Some(ocf) = &options.ocf {
        spec.ocfs.extend(parse_filter_list::<u16>(ocf, "ocf")?);
    }
    if let Some(opcode) = &options.opcode {
        spec.opcodes.extend(parse_filter_list::<u16>(opcode, "opcode")?);
    }
    if let Some(eventcode) = &options.eventcode {
        spec.event_codes.extend(parse_filter_list::<u8>(eventcode, "eventcode")?);
    }
    if let Some(le_subevent) = &options.le_subevent {
        spec.le_subevents.extend(parse_filter_list::<u8>(le_subevent, "le-subevent")?);
    }

    Ok(spec)
}

fn parse_filter_list<T>(input: &str, label: &str) -> Result<std::collections::HashSet<T>, CliError>
where
    T: TryFrom<u32> + std::hash::Hash + Eq,
{
    filter::parse_hex_list(input, label).map_err(|message| {
        CliError::new(message, Some("use comma-separated hex values like 0x04".to_string()))
    })
}

fn status_label(status: DecodeStatus) -> &'static str {
    match status {
        DecodeStatus::Success => "success",
        DecodeStatus::Invalid => "invalid",
        DecodeStatus::Unknown => "unknown",
    }
}

fn open_reader(input: &Path) -> Result<BtsnoopReader<std::fs::File>, CliError> {
    BtsnoopReader::open(input)
        .with_context(|| format!("Failed to read capture: {}", input.display()))
        .map_err(CliError::from)
}

fn next_record(
    reader: &mut BtsnoopReader<std::fs::File>,
    input: &Path,
) -> Result<Option<hciview_core::CaptureRecord>, CliError> {
    reader
        .next_record()
        .with_context(|| format!("Failed to read capture: {}", input.display()))
        .map_err(CliError::from)
}

pub(crate) fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("check the path".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("pass a capture file".to_string()),
        ));
    }
    Ok(())
}

fn validate_output_mode(mode: OutputMode, out: Option<&Path>) -> Result<(), CliError> {
    if mode == OutputMode::Console && out.is_some() {
        return Err(CliError::new(
            "--out should not be specified when --mode=console",
            Some("use --mode json with --out".to_string()),
        ));
    }
    Ok(())
}

pub(crate) fn resolve_output_path(
    input: &Path,
    out: Option<PathBuf>,
    extension: &str,
) -> PathBuf {
    out.unwrap_or_else(|| input.with_extension(extension))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory: {}", parent.display()))
                .map_err(CliError::from)?;
        }
    }
    let json = serde_json::to_string_pretty(value)
        .context("JSON serialization failed")
        .map_err(CliError::from)?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write output: {}", path.display()))
        .map_err(CliError::from)
}

fn file_name(input: &Path) -> String {
    input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string())
}
