//! Markdown rendering of a [`RecoveryContext`] (spec.md §4.4 step 5).
//!
//! Fixed section order: Session header -> Your Previous Work -> Recent
//! Messages -> Key Decisions -> Current Task Status -> a closing
//! instruction. A section is omitted entirely when it has nothing to say;
//! if every section is empty the whole prompt is `""` (step 6).

use crate::types::RecoveryContext;

pub fn render(ctx: &RecoveryContext) -> String {
    let mut sections: Vec<String> = Vec::new();

    if let Some(previous_work) = render_previous_work(ctx) {
        sections.push(previous_work);
    }
    if let Some(messages) = render_messages(ctx) {
        sections.push(messages);
    }
    if let Some(decisions) = render_decisions(ctx) {
        sections.push(decisions);
    }
    if let Some(status) = render_status(ctx) {
        sections.push(status);
    }

    if sections.is_empty() {
        return String::new();
    }

    let mut out = String::from("## Session Recovery\n\n");
    out.push_str(&sections.join("\n\n"));
    out.push_str("\n\nContinue where you left off.\n");
    out
}

fn render_previous_work(ctx: &RecoveryContext) -> Option<String> {
    let in_progress_bead = ctx.in_progress.first();
    if ctx.checkpoint.is_none() && in_progress_bead.is_none() && ctx.file_reservations.is_empty() {
        return None;
    }

    let mut out = String::from("### Your Previous Work\n");
    if let Some(checkpoint) = &ctx.checkpoint {
        out.push_str(&format!("\n{checkpoint}\n"));
    }
    if let Some(bead) = in_progress_bead {
        out.push_str(&format!("\nIn progress: {} ({})\n", bead.title, bead.id));
    }
    if !ctx.file_reservations.is_empty() {
        out.push_str("\nFile reservations:\n");
        for reservation in &ctx.file_reservations {
            out.push_str(&format!("- {} ({})\n", reservation.path, reservation.bead_id));
        }
    }
    Some(out)
}

fn render_messages(ctx: &RecoveryContext) -> Option<String> {
    if ctx.messages.is_empty() {
        return None;
    }
    let mut out = String::from("### Recent Messages\n\n");
    for message in &ctx.messages {
        out.push_str(&format!(
            "- [{}] {}: {}\n",
            message.sent_at, message.from, message.body
        ));
    }
    Some(out)
}

fn render_decisions(ctx: &RecoveryContext) -> Option<String> {
    if ctx.rules.is_empty() && ctx.anti_patterns.is_empty() {
        return None;
    }
    let mut out = String::from("### Key Decisions\n\n");
    for rule in &ctx.rules {
        out.push_str(&format!("- {}: {}\n", rule.title, rule.body));
    }
    for anti_pattern in &ctx.anti_patterns {
        out.push_str(&format!("- Avoid — {}: {}\n", anti_pattern.title, anti_pattern.body));
    }
    Some(out)
}

fn render_status(ctx: &RecoveryContext) -> Option<String> {
    if ctx.completed.is_empty() && ctx.in_progress.is_empty() && ctx.blocked.is_empty() {
        return None;
    }
    let mut out = String::from("### Current Task Status\n\n");
    render_bead_list(&mut out, "Completed", &ctx.completed);
    render_bead_list(&mut out, "In progress", &ctx.in_progress);
    render_bead_list(&mut out, "Blocked", &ctx.blocked);
    Some(out)
}

fn render_bead_list(out: &mut String, label: &str, beads: &[ntm_core::collaborators::Bead]) {
    if beads.is_empty() {
        return;
    }
    out.push_str(&format!("{label}:\n"));
    for bead in beads {
        out.push_str(&format!("- {} ({})\n", bead.title, bead.id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ntm_core::collaborators::{Bead, FileReservation, InboxMessage};

    #[test]
    fn test_empty_context_renders_empty_string() {
        let ctx = RecoveryContext::default();
        assert_eq!(render(&ctx), "");
    }

    #[test]
    fn test_checkpoint_only_renders_previous_work_section() {
        let ctx = RecoveryContext {
            checkpoint: Some("left off mid-refactor".to_string()),
            ..Default::default()
        };
        let rendered = render(&ctx);
        assert!(rendered.contains("### Your Previous Work"));
        assert!(rendered.contains("left off mid-refactor"));
        assert!(!rendered.contains("### Recent Messages"));
    }

    #[test]
    fn test_section_order_is_fixed() {
        let ctx = RecoveryContext {
            checkpoint: Some("checkpoint".to_string()),
            messages: vec![InboxMessage {
                from: "lead".into(),
                body: "hi".into(),
                sent_at: "2026-01-01T00:00:00Z".into(),
            }],
            completed: vec![Bead {
                id: "b1".into(),
                title: "Done thing".into(),
                status: "completed".into(),
            }],
            ..Default::default()
        };
        let rendered = render(&ctx);
        let work_pos = rendered.find("Your Previous Work").unwrap();
        let messages_pos = rendered.find("Recent Messages").unwrap();
        let status_pos = rendered.find("Current Task Status").unwrap();
        assert!(work_pos < messages_pos);
        assert!(messages_pos < status_pos);
        assert!(rendered.ends_with("Continue where you left off.\n"));
    }

    #[test]
    fn test_file_reservations_render_under_previous_work() {
        let ctx = RecoveryContext {
            file_reservations: vec![FileReservation {
                path: "src/main.rs".into(),
                bead_id: "b1".into(),
            }],
            ..Default::default()
        };
        let rendered = render(&ctx);
        assert!(rendered.contains("### Your Previous Work"));
        assert!(rendered.contains("src/main.rs"));
    }
}
