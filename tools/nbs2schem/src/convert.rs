//! File-level conversion

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use nether_nbs::{DecodeOptions, PresenceTimelines, note_name, parse_nbs_with, render_timeline};
use nether_schem::{Layout, SchemConfig, pack_song, schematic_bytes};

/// Extension of the written schematic
pub const SCHEMATIC_EXTENSION: &str = "schem";

/// Settings for one conversion
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub decode: DecodeOptions,
    pub config: SchemConfig,
}

/// Summary of a finished conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertReport {
    pub output: PathBuf,
    pub events: usize,
    /// Lowest note value (key relative to the F#3 offset), `None` for an empty song
    pub lowest_value: Option<i16>,
    pub highest_value: Option<i16>,
    /// Distinct keys between lowest and highest, inclusive
    pub key_range: usize,
    /// Distinct (key, instrument) combinations
    pub unique_notes: usize,
    pub instruments: usize,
    pub timelines: usize,
    pub chests: usize,
    pub bytes: usize,
}

/// `song.nbs` → `song.schem`, next to the input
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension(SCHEMATIC_EXTENSION)
}

/// Load a palette config file, or the defaults when no path is given
pub fn load_config(path: Option<&Path>) -> Result<SchemConfig> {
    let Some(path) = path else {
        return Ok(SchemConfig::default());
    };

    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config = SchemConfig::from_toml(&text)
        .with_context(|| format!("Invalid config: {}", path.display()))?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Convert one song file into a schematic file
///
/// The whole schematic is built in memory first; nothing is written when
/// any stage fails.
pub fn convert_file(input: &Path, output: &Path, options: &ConvertOptions) -> Result<ConvertReport> {
    let data =
        fs::read(input).with_context(|| format!("Failed to read song: {}", input.display()))?;
    let song = parse_nbs_with(&data, options.decode)
        .with_context(|| format!("Failed to decode song: {}", input.display()))?;

    let stats = song.stats();
    tracing::info!(
        "Song '{}' by '{}': {} ticks, {} layers, {} notes",
        song.header.name,
        song.header.author,
        song.tick_count(),
        song.notes.layers(),
        stats.events
    );
    if let (Some(lowest), Some(highest)) = (stats.lowest_value(), stats.highest_value()) {
        tracing::debug!(
            "Note values {}..={} (range {}), {} unique notes",
            lowest,
            highest,
            stats.key_range(),
            stats.unique_notes
        );
    }
    if song.skipped_custom > 0 {
        tracing::warn!(
            "Skipped {} notes using custom instruments",
            song.skipped_custom
        );
    }

    let timelines = PresenceTimelines::from_song(&song)?;
    if timelines.is_empty() {
        tracing::warn!("Song has no playable notes; the schematic will be empty");
    }
    log_timelines(&timelines);

    let packed = pack_song(&timelines)?;
    let layout = Layout::build(&packed)?;
    let bytes = schematic_bytes(&layout, &options.config, None)?;

    fs::write(output, &bytes)
        .with_context(|| format!("Failed to write schematic: {}", output.display()))?;

    let report = ConvertReport {
        output: output.to_path_buf(),
        events: stats.events,
        lowest_value: stats.lowest_value(),
        highest_value: stats.highest_value(),
        key_range: stats.key_range(),
        unique_notes: stats.unique_notes,
        instruments: packed.instruments().len(),
        timelines: timelines.len(),
        chests: layout.chests().len(),
        bytes: bytes.len(),
    };
    tracing::info!(
        "Wrote {} ({} instruments, {} notes, {} chests, {} bytes)",
        output.display(),
        report.instruments,
        report.timelines,
        report.chests,
        report.bytes
    );
    Ok(report)
}

fn log_timelines(timelines: &PresenceTimelines) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }
    for (instrument, value, timeline) in timelines.iter() {
        tracing::debug!(
            "instrument {:>2} note {:>2} {:<2} {}",
            instrument,
            value,
            note_name(value),
            render_timeline(timeline)
        );
    }
}
