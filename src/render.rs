//! Text rendering of the capture record.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use sniper_protocols::{CaptureState, CaptureStatus};

/// Status line shown for a record, as the control panel words it.
pub(crate) fn status_line(state: Option<&CaptureState>, now: DateTime<Utc>) -> String {
    let Some(state) = state else {
        return "Ready to start".to_string();
    };

    let fallback = match state.status {
        CaptureStatus::Sniper => {
            if let Some(at) = state.scheduled_at {
                let remaining = (at - now).num_seconds();
                if remaining <= 0 {
                    return "Starting...".to_string();
                }
                return format!("Scheduled: {remaining}s remaining...");
            }
            "Waiting for scheduled time..."
        }
        CaptureStatus::Running => "Processing...",
        CaptureStatus::Paused => "Paused",
        CaptureStatus::Error => "Error",
        CaptureStatus::Done => "Finished",
    };

    if state.message.is_empty() {
        fallback.to_string()
    } else {
        state.message.clone()
    }
}

/// Full multi-line view of a record: status, run details and applied coupons.
pub(crate) fn render(state: Option<&CaptureState>, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let status = state.map_or("IDLE".to_string(), |s| s.status.to_string());
    let _ = writeln!(out, "[{status}] {}", status_line(state, now));

    if let Some(state) = state {
        let _ = writeln!(out, "  tab:       {}", state.tab_id);
        if !state.filter.is_empty() {
            let _ = writeln!(out, "  filter:    {}", state.filter);
        }
        if let Some(run_id) = &state.run_id {
            let _ = writeln!(out, "  run:       {run_id}");
        }
        if let Some(until) = state.pause_until.filter(|_| state.status == CaptureStatus::Paused) {
            let _ = writeln!(out, "  resumes:   {}", until.format("%H:%M:%S UTC"));
        }
        let _ = writeln!(out, "  applied:   {}", state.processed_total);
        let _ = writeln!(out, "  pages:     {}", state.visited_pages.len());
    }

    let logs = state.map(|s| s.logs.as_slice()).unwrap_or_default();
    if logs.is_empty() {
        let _ = writeln!(out, "No coupons applied yet.");
    } else {
        for name in logs {
            let _ = writeln!(out, "  + {name}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use sniper_protocols::TabId;

    fn running() -> CaptureState {
        let mut state =
            CaptureState::scheduled(TabId::from("T1"), "Frete", "09:00:00", Utc::now());
        state.status = CaptureStatus::Running;
        state.scheduled_at = None;
        state.message = "Processing: 2/5".to_string();
        state.processed_total = 3;
        state.logs = vec!["Frete grátis".to_string(), "10% OFF".to_string()];
        state
    }

    #[test]
    fn test_idle() {
        let now = Utc::now();
        assert_eq!(status_line(None, now), "Ready to start");
        let text = render(None, now);
        assert!(text.starts_with("[IDLE] Ready to start"));
        assert!(text.contains("No coupons applied yet."));
    }

    #[test]
    fn test_sniper_countdown() {
        let now = Utc::now();
        let state = CaptureState::scheduled(
            TabId::from("T1"),
            "",
            "09:00:00",
            now + TimeDelta::seconds(90),
        );
        assert_eq!(status_line(Some(&state), now), "Scheduled: 90s remaining...");
        assert_eq!(
            status_line(Some(&state), now + TimeDelta::seconds(91)),
            "Starting..."
        );
    }

    #[test]
    fn test_message_wins_over_fallback() {
        let mut state = running();
        assert_eq!(status_line(Some(&state), Utc::now()), "Processing: 2/5");
        state.message.clear();
        assert_eq!(status_line(Some(&state), Utc::now()), "Processing...");
    }

    #[test]
    fn test_render_lists_logs_in_order() {
        let text = render(Some(&running()), Utc::now());
        assert!(text.starts_with("[RUNNING] Processing: 2/5"));
        assert!(text.contains("filter:    frete"));
        assert!(text.contains("applied:   3"));
        let first = text.find("Frete grátis").unwrap();
        let second = text.find("10% OFF").unwrap();
        assert!(first < second);
    }
}
