//! Flat delimited-text export of the event history.
//!
//! Produces the spreadsheet the community treasurer actually reads: one
//! header line, one comma-separated line per event, with date and time
//! derived from `occurred_at` at formatting time rather than stored
//! separately.
//!
//! No quoting or escaping is performed. Member names come from a controlled
//! registry and contain no commas; revisit this if the registry ever becomes
//! user-editable.

use crate::event::UsageEvent;
use chrono::NaiveDate;
use std::fmt::Write as _;

/// Column headers, in export order.
pub const EXPORT_HEADERS: [&str; 6] = ["Fecha", "Hora", "Vecino", "ID Vecino", "Mes", "Año"];

/// Formats the event set as comma-separated text with a header line.
///
/// Rows appear in the order given, which for a ledger snapshot means most
/// recent first.
///
/// # Examples
///
/// ```
/// use llavero_core::export::to_delimited_text;
///
/// let text = to_delimited_text(&[]);
/// assert_eq!(text, "Fecha,Hora,Vecino,ID Vecino,Mes,Año\n");
/// ```
#[must_use]
pub fn to_delimited_text(events: &[UsageEvent]) -> String {
    let mut out = String::new();
    out.push_str(&EXPORT_HEADERS.join(","));
    out.push('\n');

    for event in events {
        let date = event.occurred_at.format("%d/%m/%Y");
        let time = event.occurred_at.format("%H:%M:%S");
        // Infallible for String; the let binding keeps clippy satisfied.
        let _ = writeln!(
            out,
            "{date},{time},{name},{id},{label},{year}",
            name = event.member_name_snapshot,
            id = event.member_id,
            label = event.period_label,
            year = event.period_year,
        );
    }

    out
}

/// Deterministic export file name for the given date:
/// `registro_llave_YYYY-MM-DD.csv`.
#[must_use]
pub fn export_file_name(date: NaiveDate) -> String {
    format!("registro_llave_{}.csv", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

    use super::*;
    use crate::environment::ActorId;
    use crate::event::{EventId, UsageEvent};
    use crate::member::MemberId;
    use chrono::{TimeZone, Utc};

    fn sample_events() -> Vec<UsageEvent> {
        let mk = |n: u32, id: &str, name: &str, month: u32, day: u32| {
            UsageEvent::record(
                EventId::new(format!("evt-{n}")),
                MemberId::new(id),
                name,
                ActorId::new("op"),
                Utc.with_ymd_and_hms(2026, month, day, 14, 30, 5).unwrap(),
            )
        };
        vec![
            mk(1, "vecino_03", "Japa", 8, 26),
            mk(2, "vecino_01", "Dina", 8, 25),
            mk(3, "vecino_06", "Koki", 7, 2),
        ]
    }

    #[test]
    fn header_then_one_line_per_event() {
        let events = sample_events();
        let text = to_delimited_text(&events);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 1 + events.len());
        assert_eq!(lines[0], "Fecha,Hora,Vecino,ID Vecino,Mes,Año");
        assert_eq!(lines[1], "26/08/2026,14:30:05,Japa,vecino_03,agosto,2026");
    }

    #[test]
    fn export_roundtrip_preserves_fields() {
        let events = sample_events();
        let text = to_delimited_text(&events);

        for (line, event) in text.lines().skip(1).zip(&events) {
            let fields: Vec<&str> = line.split(',').collect();
            assert_eq!(fields.len(), EXPORT_HEADERS.len());
            assert_eq!(fields[0], event.occurred_at.format("%d/%m/%Y").to_string());
            assert_eq!(fields[1], event.occurred_at.format("%H:%M:%S").to_string());
            assert_eq!(fields[2], event.member_name_snapshot);
            assert_eq!(fields[3], event.member_id.as_str());
            assert_eq!(fields[4], event.period_label);
            assert_eq!(fields[5], event.period_year.to_string());
        }
    }

    #[test]
    fn file_name_is_date_stamped() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 26).unwrap();
        assert_eq!(export_file_name(date), "registro_llave_2026-08-26.csv");
    }
}
