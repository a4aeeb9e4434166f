use spy_config::{ReportConfig, ReportFormat};
use spy_core::{Snapshot, TypeSummary};
use tracing::{info, warn};

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Log one report of `snapshot` in the configured format.
pub fn log(snapshot: Option<&Snapshot>, config: &ReportConfig) {
    let Some(snapshot) = snapshot else {
        return;
    };

    match config.format {
        ReportFormat::Json => match snapshot.to_json() {
            Ok(json) => info!(target: "spy::report", "{json}"),
            Err(e) => warn!("Cannot serialize snapshot: {e}"),
        },
        ReportFormat::Text => {
            for line in render_text(snapshot, config.top) {
                info!(target: "spy::report", "{line}");
            }
        }
    }
}

/// Header plus one line per type, busiest first: min / max / current and a
/// sparkline scaled to the type's chart ceiling.
pub fn render_text(snapshot: &Snapshot, top: usize) -> Vec<String> {
    let taken = snapshot
        .latest_timestamp()
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());

    let mut summaries = snapshot.summaries();
    summaries.sort_by(|a, b| {
        b.current
            .cmp(&a.current)
            .then_with(|| a.display_name.cmp(&b.display_name))
    });

    let mut lines = vec![format!(
        "{} types over {} samples at {taken} (min / max / current)",
        summaries.len(),
        snapshot.num_samples()
    )];
    lines.extend(
        summaries
            .iter()
            .take(top)
            .map(|summary| render_line(snapshot, summary)),
    );
    lines
}

fn render_line(snapshot: &Snapshot, summary: &TypeSummary) -> String {
    let samples = snapshot.padded(&summary.type_name).unwrap_or_default();
    format!(
        "{}: {} / {} / {} {}",
        summary.display_name,
        summary.min,
        summary.max,
        summary.current,
        sparkline(&samples, summary.chart_ceiling())
    )
}

/// One bar glyph per sample, scaled so `ceiling` would be a full block.
/// Slots not yet sampled render as blanks, keeping every line the same width.
pub fn sparkline(samples: &[Option<u64>], ceiling: u64) -> String {
    let ceiling = u128::from(ceiling.max(1));
    let top = (BARS.len() - 1) as u128;
    samples
        .iter()
        .map(|s| match s {
            Some(s) => BARS[(u128::from(*s).min(ceiling) * top / ceiling) as usize],
            None => ' ',
        })
        .collect()
}
