//! Parallel fan-out, graceful degradation, and token-budgeted truncation
//! (spec.md §4.4 steps 1-4, step 6).

use std::time::Duration;

use ntm_core::collaborators::{Bead, MailClient, MemoryClient, ScanClient};
use ntm_config::RecoveryConfig;
use tracing::warn;

use crate::formatter::render;
use crate::types::{Diagnostic, RecoveryContext};

const CHARS_PER_TOKEN: u64 = 4;
const FORMATTING_OVERHEAD_CHARS: u64 = 500;
const MAX_BEADS_PER_STATUS: usize = 10;
const MAX_MESSAGES: usize = 10;
const MAX_MEMORIES_PER_KIND: usize = 10;

/// Everything [`build`] needs: which session/project to fetch for, the
/// tuning knobs from `[recovery]`, an already-resolved checkpoint (no
/// checkpoint file shape is specified in spec.md §6, so callers own
/// reading it), and the three optional collaborator seams.
pub struct BuildRequest<'a> {
    pub session: &'a str,
    pub project: &'a str,
    pub config: &'a RecoveryConfig,
    pub checkpoint: Option<String>,
    pub per_source_timeout: Duration,
    pub scan: &'a dyn ScanClient,
    pub mail: &'a dyn MailClient,
    pub memory: &'a dyn MemoryClient,
}

/// Build a (possibly empty) recovery context for an agent joining
/// `request.session` (spec.md §4.4).
pub async fn build(request: BuildRequest<'_>) -> RecoveryContext {
    if !request.config.enabled() {
        return RecoveryContext::default();
    }

    let mut ctx = RecoveryContext {
        checkpoint: request.checkpoint,
        ..Default::default()
    };

    // Step 2: fan out in parallel, each source under its own timeout.
    let (beads_result, mail_result, memory_result) = tokio::join!(
        fetch_beads(&request),
        fetch_mail(&request),
        fetch_memories(&request),
    );

    match beads_result {
        Ok((in_progress, completed, blocked)) => {
            ctx.in_progress = in_progress;
            ctx.completed = completed;
            ctx.blocked = blocked;
        }
        Err(diag) => {
            warn!(event = "recovery.source_failed", source = "beads", message = %diag.message);
            ctx.diagnostics.push(diag);
        }
    }

    match mail_result {
        Ok((messages, reservations)) => {
            ctx.messages = messages;
            ctx.file_reservations = reservations;
        }
        Err(diag) => {
            warn!(event = "recovery.source_failed", source = "mail", message = %diag.message);
            ctx.diagnostics.push(diag);
        }
    }

    match memory_result {
        Ok((rules, anti_patterns)) => {
            ctx.rules = rules;
            ctx.anti_patterns = anti_patterns;
        }
        Err(diag) => {
            warn!(event = "recovery.source_failed", source = "memory", message = %diag.message);
            ctx.diagnostics.push(diag);
        }
    }

    // Step 4: token-budgeted truncation, in priority order.
    let max_tokens = request.config.max_tokens();
    truncate_to_budget(&mut ctx, max_tokens);

    // Step 5: render. Step 6: an all-empty context renders to "".
    ctx.prompt = render(&ctx);
    ctx.estimated_tokens = estimate_tokens(&ctx);
    ctx
}

type BeadsByStatus = (Vec<Bead>, Vec<Bead>, Vec<Bead>);

async fn fetch_beads(request: &BuildRequest<'_>) -> Result<BeadsByStatus, Diagnostic> {
    if !request.config.include_beads() {
        return Ok((Vec::new(), Vec::new(), Vec::new()));
    }

    let fetch_one = |status: &'static str| async move {
        with_timeout(
            request.per_source_timeout,
            "beads",
            request
                .scan
                .beads_by_status(request.session, status, MAX_BEADS_PER_STATUS),
        )
        .await
    };

    let in_progress = fetch_one("in_progress").await?;
    let completed = fetch_one("completed").await?;
    let blocked = fetch_one("blocked").await?;
    Ok((in_progress, completed, blocked))
}

type MailFetch = (
    Vec<ntm_core::collaborators::InboxMessage>,
    Vec<ntm_core::collaborators::FileReservation>,
);

async fn fetch_mail(request: &BuildRequest<'_>) -> Result<MailFetch, Diagnostic> {
    if !request.config.include_mail() {
        return Ok((Vec::new(), Vec::new()));
    }

    let messages = with_timeout(
        request.per_source_timeout,
        "mail",
        request.mail.recent_messages(request.session, MAX_MESSAGES),
    )
    .await?;
    let reservations = with_timeout(
        request.per_source_timeout,
        "mail",
        request.mail.file_reservations(request.session),
    )
    .await?;
    Ok((messages, reservations))
}

type MemoryFetch = (
    Vec<ntm_core::collaborators::MemoryNote>,
    Vec<ntm_core::collaborators::MemoryNote>,
);

async fn fetch_memories(request: &BuildRequest<'_>) -> Result<MemoryFetch, Diagnostic> {
    if !request.config.include_memories() {
        return Ok((Vec::new(), Vec::new()));
    }

    let rules = with_timeout(
        request.per_source_timeout,
        "memory",
        request
            .memory
            .rules(request.project, MAX_MEMORIES_PER_KIND),
    )
    .await?;
    let anti_patterns = with_timeout(
        request.per_source_timeout,
        "memory",
        request
            .memory
            .anti_patterns(request.project, MAX_MEMORIES_PER_KIND),
    )
    .await?;
    Ok((rules, anti_patterns))
}

async fn with_timeout<T, E: std::fmt::Display>(
    timeout: Duration,
    source: &str,
    fut: impl std::future::Future<Output = Result<T, E>>,
) -> Result<T, Diagnostic> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(Diagnostic::partial_recovery(source, e.to_string())),
        Err(_) => Err(Diagnostic::partial_recovery(source, "timed out")),
    }
}

/// Truncate `ctx` in place until it fits `max_tokens`, following spec.md
/// §4.4 step 4's priority order: completed+blocked beads first, then
/// memories, then messages capped at 5, then at 2. A `max_tokens` of 0
/// means "no budget" (unlimited).
fn truncate_to_budget(ctx: &mut RecoveryContext, max_tokens: u64) {
    if max_tokens == 0 || estimate_content_tokens(ctx) <= max_tokens {
        return;
    }

    ctx.completed.clear();
    ctx.blocked.clear();
    if estimate_content_tokens(ctx) <= max_tokens {
        return;
    }

    ctx.rules.clear();
    ctx.anti_patterns.clear();
    if estimate_content_tokens(ctx) <= max_tokens {
        return;
    }

    if ctx.messages.len() > 5 {
        ctx.messages.truncate(5);
    }
    if estimate_content_tokens(ctx) <= max_tokens {
        return;
    }

    if ctx.messages.len() > 2 {
        ctx.messages.truncate(2);
    }
}

/// `~4 characters per token plus a fixed 500-character formatting
/// overhead`, applied to the raw collected content (spec.md §4.4 step 4) —
/// used to decide *whether* to truncate, before the markdown is rendered.
fn estimate_content_tokens(ctx: &RecoveryContext) -> u64 {
    let mut chars: u64 = FORMATTING_OVERHEAD_CHARS;
    chars += ctx.checkpoint.as_deref().map_or(0, |s| s.len() as u64);
    for bead in ctx
        .in_progress
        .iter()
        .chain(&ctx.completed)
        .chain(&ctx.blocked)
    {
        chars += bead.title.len() as u64;
    }
    for message in &ctx.messages {
        chars += (message.from.len() + message.body.len()) as u64;
    }
    for reservation in &ctx.file_reservations {
        chars += reservation.path.len() as u64;
    }
    for note in ctx.rules.iter().chain(&ctx.anti_patterns) {
        chars += (note.title.len() + note.body.len()) as u64;
    }
    chars / CHARS_PER_TOKEN
}

/// Same heuristic, applied to the final rendered prompt — what callers see
/// as `RecoveryContext::estimated_tokens`.
fn estimate_tokens(ctx: &RecoveryContext) -> u64 {
    (ctx.prompt.len() as u64 + FORMATTING_OVERHEAD_CHARS) / CHARS_PER_TOKEN
}
