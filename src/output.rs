//! Terminal rendering of registry results

use crate::registry::types::{
    HierarchyNode, HotEntry, IdentifierMetadata, RegistryStats, Suggestion, Trend,
};
use crate::utils::now_millis;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

fn stdout(color: bool) -> StandardStream {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

/// Print suggestions with the matched span highlighted
pub fn print_suggestions(suggestions: &[Suggestion], color: bool) -> io::Result<()> {
    let mut out = stdout(color);

    for suggestion in suggestions {
        print_highlighted_id(&mut out, &suggestion.id, suggestion.matched_span)?;
        out.set_color(ColorSpec::new().set_dimmed(true))?;
        writeln!(
            out,
            "  freq={} seen {}",
            suggestion.metadata.frequency,
            format_age(suggestion.metadata.last_seen)
        )?;
        out.reset()?;
    }
    Ok(())
}

/// Print the hot list with trend markers
pub fn print_hot(entries: &[HotEntry], color: bool) -> io::Result<()> {
    let mut out = stdout(color);

    for (position, entry) in entries.iter().enumerate() {
        write!(out, "{:>3}. ", position + 1)?;

        let (marker, marker_color) = match entry.trend {
            Trend::Rising => ("+", Color::Green),
            Trend::Stable => ("=", Color::Cyan),
            Trend::Falling => ("-", Color::Red),
        };
        out.set_color(ColorSpec::new().set_fg(Some(marker_color)).set_bold(true))?;
        write!(out, "{marker} ")?;
        out.reset()?;

        write!(out, "{}", entry.id)?;
        out.set_color(ColorSpec::new().set_dimmed(true))?;
        writeln!(out, "  score={:.3}", entry.score)?;
        out.reset()?;
    }
    Ok(())
}

/// Print the recent list, most-recent-first
pub fn print_recent(records: &[IdentifierMetadata], color: bool) -> io::Result<()> {
    let mut out = stdout(color);

    for record in records {
        write!(out, "{}", record.id)?;
        out.set_color(ColorSpec::new().set_dimmed(true))?;
        writeln!(out, "  freq={} seen {}", record.frequency, format_age(record.last_seen))?;
        out.reset()?;
    }
    Ok(())
}

/// Print the namespace hierarchy as an indented tree
pub fn print_hierarchy(nodes: &[HierarchyNode], color: bool) -> io::Result<()> {
    let mut out = stdout(color);

    for node in nodes {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)).set_bold(true))?;
        writeln!(out, "{}", node.namespace)?;
        out.reset()?;

        for (group, subgroups) in &node.children {
            out.set_color(ColorSpec::new().set_bold(true))?;
            writeln!(out, "  {group}")?;
            out.reset()?;

            for (subgroup, ids) in subgroups {
                writeln!(out, "    {subgroup} ({})", ids.len())?;
                for id in ids {
                    out.set_color(ColorSpec::new().set_dimmed(true))?;
                    writeln!(out, "      {id}")?;
                    out.reset()?;
                }
            }
        }
    }
    Ok(())
}

pub fn print_stats(stats: &RegistryStats) -> io::Result<()> {
    let mut out = io::stdout();
    writeln!(out, "records:     {}", stats.records)?;
    writeln!(out, "recent:      {}", stats.recent)?;
    writeln!(out, "index keys:  {}", stats.index_keys)?;
    writeln!(out, "index nodes: {}", stats.index_nodes)?;
    Ok(())
}

fn print_highlighted_id(
    out: &mut StandardStream,
    id: &str,
    (start, len): (usize, usize),
) -> io::Result<()> {
    let end = start + len;
    // Spans are computed on the lowercased key; fall back to a plain
    // print if the offsets don't land on char boundaries of the
    // canonical id.
    let splittable =
        len > 0 && end <= id.len() && id.is_char_boundary(start) && id.is_char_boundary(end);

    if splittable {
        write!(out, "{}", &id[..start])?;
        out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        write!(out, "{}", &id[start..end])?;
        out.reset()?;
        write!(out, "{}", &id[end..])?;
    } else {
        write!(out, "{id}")?;
    }
    Ok(())
}

/// Compact "how long ago" rendering of a millisecond timestamp
fn format_age(last_seen: u64) -> String {
    if last_seen == 0 {
        return "never".to_string();
    }
    let elapsed_secs = now_millis().saturating_sub(last_seen) / 1000;
    match elapsed_secs {
        0..60 => format!("{elapsed_secs}s ago"),
        60..3600 => format!("{}m ago", elapsed_secs / 60),
        3600..86400 => format!("{}h ago", elapsed_secs / 3600),
        _ => format!("{}d ago", elapsed_secs / 86400),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_age_buckets() {
        let now = now_millis();
        assert_eq!(format_age(0), "never");
        assert!(format_age(now).ends_with("s ago"));
        assert!(format_age(now - 5 * 60 * 1000).ends_with("m ago"));
        assert!(format_age(now - 5 * 3600 * 1000).ends_with("h ago"));
        assert!(format_age(now - 5 * 86400 * 1000).ends_with("d ago"));
    }
}
