//! Rewriting unlinked mentions into wiki-links.

use std::fs;
use std::path::Path;

use chrono::{SecondsFormat, Utc};

use super::scanner::{MentionScanner, find_unlinked_mentions};
use super::types::{
    AppliedNote, ApplyOptions, ApplyOutcome, ApplyReport, CandidatePreview, MentionMatch,
    MentionSnippet, NoteFailure, PREVIEW_SNIPPETS, RetroError, RetroPreview, RetroTarget,
    UnlinkedMention,
};
use crate::frontmatter::{self, Frontmatter, ParsedDocument};
use crate::index::IndexDb;
use crate::vault::{NoteReadError, read_note, write_document};

/// Preview retroactive linking for `target` without touching any file.
pub fn preview_retroactive_links(
    db: &IndexDb,
    target: &RetroTarget,
) -> Result<RetroPreview, RetroError> {
    let mentions = find_unlinked_mentions(db, target)?;
    Ok(build_preview(target, &mentions))
}

/// Link unlinked mentions of `target` across the vault.
///
/// Without `options.confirm` this only returns the preview. Confirmed calls
/// rewrite at most `options.max_notes` candidates, one after another. A
/// failing note is recorded in the report and the batch continues.
pub fn apply_retroactive_links_with_confirmation(
    db: &IndexDb,
    vault_root: &Path,
    target: &RetroTarget,
    options: &ApplyOptions,
) -> Result<ApplyOutcome, RetroError> {
    let mentions = find_unlinked_mentions(db, target)?;

    if !options.confirm {
        return Ok(ApplyOutcome::Preview(build_preview(target, &mentions)));
    }

    let scanner = MentionScanner::new(target);
    let mut report = ApplyReport {
        remaining: mentions.len().saturating_sub(options.max_notes),
        ..Default::default()
    };

    for candidate in mentions.iter().take(options.max_notes) {
        match apply_to_note(db, vault_root, target, &scanner, &candidate.path) {
            Ok(applied) => report.applied.push(applied),
            Err(e) => {
                tracing::warn!("retroactive linking failed for {}: {}", candidate.path.display(), e);
                report
                    .errors
                    .push(NoteFailure { path: candidate.path.clone(), error: e.to_string() });
            }
        }
    }

    tracing::info!(
        "linked {} mentions of {:?} in {} notes ({} failed, {} remaining)",
        report.links_added(),
        target.title,
        report.applied.len(),
        report.errors.len(),
        report.remaining
    );
    Ok(ApplyOutcome::Applied(report))
}

fn build_preview(target: &RetroTarget, mentions: &[UnlinkedMention]) -> RetroPreview {
    let candidates: Vec<CandidatePreview> = mentions
        .iter()
        .map(|m| {
            let mut snippets: Vec<MentionSnippet> = Vec::new();
            for hit in &m.matches {
                if snippets.len() == PREVIEW_SNIPPETS {
                    break;
                }
                if snippets.last().is_some_and(|s| s.line == hit.line) {
                    continue;
                }
                snippets.push(MentionSnippet { line: hit.line, text: hit.context.clone() });
            }

            CandidatePreview {
                path: m.path.clone(),
                title: m.title.clone(),
                mention_count: m.mention_count,
                snippets,
            }
        })
        .collect();

    RetroPreview {
        target: target.clone(),
        total_mentions: candidates.iter().map(|c| c.mention_count).sum(),
        candidates,
    }
}

/// Rewrite one note from its current file content, then reindex it.
fn apply_to_note(
    db: &IndexDb,
    vault_root: &Path,
    target: &RetroTarget,
    scanner: &MentionScanner,
    path: &Path,
) -> Result<AppliedNote, RetroError> {
    let abs = vault_root.join(path);
    let raw = fs::read_to_string(&abs)
        .map_err(|e| NoteReadError::Read { path: abs.clone(), source: e })?;
    let parsed = frontmatter::parse(&raw)
        .map_err(|e| RetroError::Frontmatter { path: path.to_path_buf(), source: e })?;

    // The file may have changed since the index was scanned.
    let matches = scanner.scan(&parsed.body);
    if matches.is_empty() {
        return Ok(AppliedNote { path: path.to_path_buf(), links_added: 0, related_added: false });
    }

    let body = splice_links(&parsed.body, &matches, &target.title);

    let mut fm = parsed.frontmatter.unwrap_or_default();
    let related_added = add_related(&mut fm, &target.title);
    fm.modified = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));

    let indexed_version = db.get_note_by_path(path)?.map(|n| n.palace_version).unwrap_or(1);
    fm.palace_version = Some(fm.palace_version.unwrap_or(1).max(indexed_version) + 1);

    write_document(vault_root, path, &ParsedDocument { frontmatter: Some(fm), body })?;

    let note = read_note(vault_root, path)?;
    db.index_note(&note)?;

    tracing::debug!("linked {} mentions in {}", matches.len(), path.display());
    Ok(AppliedNote { path: path.to_path_buf(), links_added: matches.len(), related_added })
}

/// Replace every match with a link to `title`, bottom-up so earlier offsets
/// stay valid.
pub(crate) fn splice_links(body: &str, matches: &[MentionMatch], title: &str) -> String {
    let line_starts: Vec<usize> = std::iter::once(0)
        .chain(body.split_inclusive('\n').scan(0, |offset, line| {
            *offset += line.len();
            Some(*offset)
        }))
        .collect();

    let mut ordered: Vec<&MentionMatch> = matches.iter().collect();
    ordered.sort_by(|a, b| (b.line, b.byte_offset).cmp(&(a.line, a.byte_offset)));

    let mut out = body.to_string();
    for m in ordered {
        let Some(&line_start) = line_starts.get(m.line - 1) else {
            continue;
        };
        let start = line_start + m.byte_offset;
        let end = start + m.matched_text.len();
        if out.get(start..end) != Some(m.matched_text.as_str()) {
            continue;
        }
        out.replace_range(start..end, &link_text(title, &m.matched_text));
    }

    out
}

fn link_text(title: &str, matched: &str) -> String {
    if matched == title { format!("[[{}]]", title) } else { format!("[[{}|{}]]", title, matched) }
}

/// Append `[[title]]` to `related` unless an equivalent entry exists.
fn add_related(fm: &mut Frontmatter, title: &str) -> bool {
    let key = |s: &str| s.trim().trim_start_matches("[[").trim_end_matches("]]").trim().to_lowercase();
    let wanted = key(title);

    if fm.related.iter().any(|r| key(r) == wanted) {
        return false;
    }
    fm.related.push(format!("[[{}]]", title));
    true
}
