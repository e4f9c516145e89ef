//! Terminal rendering of a session.
//!
//! `ConsoleRenderer` writes plain text to any `Write`: stdout in the binary,
//! a byte buffer in tests.

use std::io::{self, Write};

use chrono::Local;
use tracing::warn;

use crate::broker::message::InboundMessage;
use crate::session::{ActivityEntry, Banner, BannerArea, Renderer};
use crate::subscription::SubscriptionRecord;

const HEADERS: [&str; 5] = ["PATTERN", "STATUS", "MESSAGES", "LAST", "ERROR"];
const NEVER: &str = "—";

pub struct ConsoleRenderer<W: Write> {
    out: W,
}

impl ConsoleRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, text: &str) {
        let written = writeln!(self.out, "{text}").and_then(|_| self.out.flush());
        if let Err(err) = written {
            warn!("Failed to write to console: {}", err);
        }
    }
}

impl<W: Write> Renderer for ConsoleRenderer<W> {
    fn subscriptions_changed(&mut self, records: &[SubscriptionRecord]) {
        let table = format_table(records);
        self.write(&table);
    }

    fn banner(&mut self, banner: Banner) {
        self.write(&format!("[{}] {}: {}", banner.level, banner.title, banner.hint));
    }

    // Printed banners scroll away with the rest of the output.
    fn clear_banner(&mut self, _area: BannerArea) {}

    fn activity(&mut self, entry: &ActivityEntry) {
        self.write(&entry.to_string());
    }

    fn message_received(&mut self, message: &InboundMessage) {
        let at = message.timestamp.with_timezone(&Local).format("%H:%M:%S");
        let payload = message.pretty_payload();
        let text = if payload.contains('\n') {
            format!("{at} [{}]\n{payload}", message.topic)
        } else {
            format!("{at} [{}] {payload}", message.topic)
        };
        self.write(&text);
    }
}

/// Lays the records out in aligned columns, one row per pattern.
pub fn format_table(records: &[SubscriptionRecord]) -> String {
    if records.is_empty() {
        return "(no subscriptions)".to_string();
    }

    let rows: Vec<[String; 5]> = records
        .iter()
        .map(|record| {
            [
                record.pattern().to_string(),
                record.state().label().to_string(),
                record.message_count().to_string(),
                record
                    .last_received_at()
                    .map(|at| at.with_timezone(&Local).format("%H:%M:%S").to_string())
                    .unwrap_or_else(|| NEVER.to_string()),
                record.last_error().unwrap_or_default().to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|header| header.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header = HEADERS.map(str::to_string);
    std::iter::once(&header)
        .chain(&rows)
        .map(|row| {
            row.iter()
                .zip(widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
