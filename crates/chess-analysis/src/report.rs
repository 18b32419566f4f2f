//! Plain-text game summary.

use std::fmt::Write;

use crate::{GameAnalysis, IndexKind, Severity};

const LABELS: [Severity; 8] = [
    Severity::Best,
    Severity::VeryGood,
    Severity::Good,
    Severity::Interesting,
    Severity::Neutral,
    Severity::Inaccuracy,
    Severity::Mistake,
    Severity::Blunder,
];

impl GameAnalysis {
    /// Renders the statistics as a fixed-width table.
    ///
    /// ```
    /// use chess_analysis::GameAnalysis;
    ///
    /// let summary = GameAnalysis::default().summary();
    /// assert!(summary.contains("Average loss"));
    /// ```
    pub fn summary(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_summary(&mut out);
        out
    }

    fn write_summary(&self, out: &mut String) -> std::fmt::Result {
        let (w, b) = (&self.white, &self.black);
        writeln!(out, "{:<20} {:>8} {:>8}", "", "White", "Black")?;
        for severity in LABELS {
            let name = format!("{} {}", severity, severity.glyph());
            writeln!(
                out,
                "{:<20} {:>8} {:>8}",
                name.trim_end(),
                w.count(severity),
                b.count(severity)
            )?;
        }
        writeln!(out, "{:<20} {:>8} {:>8}", "book", w.book, b.book)?;
        writeln!(out, "{:<20} {:>8} {:>8}", "not analysed", w.not_analyzed, b.not_analyzed)?;
        writeln!(
            out,
            "{:<20} {:>8.2} {:>8.2}",
            "Average loss",
            w.average_cp_lost(),
            b.average_cp_lost()
        )?;
        writeln!(
            out,
            "{:<20} {:>7.1}% {:>7.1}%",
            "Domination",
            w.domination_percent(),
            b.domination_percent()
        )?;

        writeln!(out)?;
        writeln!(out, "{:<20} {:>8} {:>8} {:>8}", "Index", "White", "Black", "Total")?;
        for kind in IndexKind::ALL {
            let total = self.index_total(kind);
            writeln!(
                out,
                "{:<20} {:>8.1} {:>8.1} {:>8.1}  {}",
                kind.name(),
                w.index_average(kind),
                b.index_average(kind),
                total,
                kind.label(total)
            )?;
        }
        Ok(())
    }
}
