//! Plain-text rendering of stack events and change-set entries.
//!
//! Coloring is left to the caller; everything here is uncolored so the
//! output is stable under test.

use cform_core::types::{ResourceChange, StackEvent};

/// Timestamp layout for event lines.
pub const EVENT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z %Z";

/// Placeholder for a change field the service left empty.
pub const NOT_AVAILABLE: &str = "<NA>";

/// One tab-separated, column-padded line for a stack event (no newline).
pub fn event_line(event: &StackEvent) -> String {
    let timestamp = event.timestamp.format(EVENT_TIME_FORMAT).to_string();
    format!(
        "{:<25}\t{:<20}\t{:<30}\t{:<20}\t{}",
        timestamp,
        event.resource_status,
        event.resource_type,
        event.logical_resource_id,
        event.resource_status_reason.as_deref().unwrap_or(""),
    )
}

/// `<LogicalId> (<Type>)`
pub fn change_header(change: &ResourceChange) -> String {
    format!("{} ({})", change.logical_resource_id, change.resource_type)
}

/// The indented detail lines under a change header, each ending in `\n`,
/// followed by a blank line.
pub fn change_details(change: &ResourceChange) -> String {
    let physical = change
        .physical_resource_id
        .as_deref()
        .unwrap_or(NOT_AVAILABLE);
    let replacement = change.replacement.as_deref().unwrap_or(NOT_AVAILABLE);
    format!(
        "\t{:<15}: {}\n\t{:<15}: {}\n\t{:<15}: {}\n\n",
        "action", change.action, "physical-id", physical, "replacement", replacement,
    )
}

/// Header plus details for every change, in service order.
///
/// `style` receives each change with its plain header and returns the text
/// to print in its place, e.g. the header wrapped in terminal colours.
pub fn render_changes<F>(changes: &[ResourceChange], style: F) -> String
where
    F: Fn(&ResourceChange, String) -> String,
{
    let mut out = String::new();
    for change in changes {
        out.push_str(&style(change, change_header(change)));
        out.push('\n');
        out.push_str(&change_details(change));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use cform_core::types::ChangeAction;

    fn bucket_change() -> ResourceChange {
        ResourceChange {
            action: ChangeAction::Modify,
            logical_resource_id: "Bucket".into(),
            resource_type: "AWS::S3::Bucket".into(),
            physical_resource_id: Some("my-bucket-123".into()),
            replacement: Some("False".into()),
        }
    }

    #[test]
    fn event_line_pads_columns() {
        let event = StackEvent {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
            resource_status: "CREATE_COMPLETE".into(),
            resource_type: "AWS::S3::Bucket".into(),
            logical_resource_id: "Bucket".into(),
            resource_status_reason: None,
        };
        let line = event_line(&event);
        let cols: Vec<&str> = line.split('\t').collect();
        assert_eq!(cols.len(), 5);
        assert_eq!(cols[0], format!("{:<25}", "2024-05-01 12:30:00 +0000 UTC"));
        assert_eq!(cols[1].len(), 20);
        assert_eq!(cols[1].trim_end(), "CREATE_COMPLETE");
        assert_eq!(cols[2].len(), 30);
        assert_eq!(cols[3].trim_end(), "Bucket");
        assert_eq!(cols[4], "");
    }

    #[test]
    fn event_line_includes_reason() {
        let event = StackEvent {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
            resource_status: "CREATE_FAILED".into(),
            resource_type: "AWS::SQS::Queue".into(),
            logical_resource_id: "Queue".into(),
            resource_status_reason: Some("Resource limit exceeded".into()),
        };
        assert!(event_line(&event).ends_with("\tResource limit exceeded"));
    }

    #[test]
    fn renders_change_with_all_fields() {
        assert_eq!(change_header(&bucket_change()), "Bucket (AWS::S3::Bucket)");
        assert_eq!(
            change_details(&bucket_change()),
            "\taction         : Modify\n\tphysical-id    : my-bucket-123\n\treplacement    : False\n\n"
        );
    }

    #[test]
    fn missing_fields_render_as_na() {
        let change = ResourceChange {
            action: ChangeAction::Add,
            logical_resource_id: "Queue".into(),
            resource_type: "AWS::SQS::Queue".into(),
            physical_resource_id: None,
            replacement: None,
        };
        let details = change_details(&change);
        assert!(details.contains("physical-id    : <NA>\n"));
        assert!(details.contains("replacement    : <NA>\n"));
    }

    #[test]
    fn render_changes_keeps_service_order() {
        let mut second = bucket_change();
        second.logical_resource_id = "Alpha".into();
        let out = render_changes(&[bucket_change(), second], |_, header| header);
        let bucket = out.find("Bucket (").unwrap();
        let alpha = out.find("Alpha (").unwrap();
        assert!(bucket < alpha);
        assert!(render_changes(&[], |_, header| header).is_empty());
    }

    #[test]
    fn render_changes_applies_header_style() {
        let out = render_changes(&[bucket_change()], |change, header| {
            format!("[{}] {header}", change.action)
        });
        assert_eq!(
            out,
            "[Modify] Bucket (AWS::S3::Bucket)\n\taction         : Modify\n\tphysical-id    : my-bucket-123\n\treplacement    : False\n\n"
        );
    }
}
