use std::collections::HashMap;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::cli::AnchorsArgs;
use crate::commands::split::load_outline;
use crate::model::{
    AnchorAuditEntry, AnchorAuditReport, AnchorAuditSummary, AnchorStatus, OutlineNode,
};
use crate::sections::FilingDocument;
use crate::util::{now_utc_string, read_file_bytes, write_json_pretty};

pub fn run(args: AnchorsArgs) -> Result<()> {
    info!(
        html = %args.html_path.display(),
        outline = %args.outline_path.display(),
        "starting anchor audit"
    );

    let outline = load_outline(&args.outline_path)?;
    let html_raw = read_file_bytes(&args.html_path)?;
    let document = FilingDocument::parse(&String::from_utf8_lossy(&html_raw))
        .with_context(|| format!("failed to load {}", args.html_path.display()))?;

    let entries = audit_outline(&document, &outline.parts);
    let summary = summarize(&entries);

    for entry in &entries {
        match entry.status {
            AnchorStatus::Unresolved => warn!(
                path = %entry.path,
                anchor_id = %entry.anchor_id.as_deref().unwrap_or_default(),
                "anchor not found in document"
            ),
            AnchorStatus::Resolved if entry.precedes_parent || entry.precedes_previous_sibling => {
                warn!(
                    path = %entry.path,
                    position = entry.document_position.unwrap_or_default(),
                    precedes_parent = entry.precedes_parent,
                    precedes_previous_sibling = entry.precedes_previous_sibling,
                    "anchor out of outline order"
                )
            }
            _ => {}
        }
    }
    for anchor_id in &summary.duplicate_anchor_ids {
        warn!(anchor_id = %anchor_id, "anchor shared by several outline nodes");
    }

    info!(
        outline_nodes = summary.outline_nodes,
        resolved = summary.resolved_count,
        unresolved = summary.unresolved_count,
        absent = summary.absent_count,
        out_of_order = summary.out_of_order_count,
        "anchor audit complete"
    );

    let unresolved_count = summary.unresolved_count;

    if let Some(report_path) = &args.report_path {
        let report = AnchorAuditReport {
            report_version: 1,
            generated_at: now_utc_string(),
            html_path: args.html_path.display().to_string(),
            outline_path: args.outline_path.display().to_string(),
            summary,
            entries,
        };
        write_json_pretty(report_path, &report)?;
        info!(path = %report_path.display(), "wrote anchor audit report");
    }

    if args.fail_on_unresolved && unresolved_count > 0 {
        bail!("{unresolved_count} outline anchor(s) not found in document");
    }

    Ok(())
}

pub fn audit_outline(document: &FilingDocument, outline: &[OutlineNode]) -> Vec<AnchorAuditEntry> {
    let mut entries = Vec::new();
    audit_level(document, outline, "", 1, None, &mut entries);
    entries
}

fn audit_level(
    document: &FilingDocument,
    nodes: &[OutlineNode],
    parent_path: &str,
    depth: usize,
    parent_position: Option<usize>,
    entries: &mut Vec<AnchorAuditEntry>,
) {
    let mut previous_position = None::<usize>;

    for node in nodes {
        let path = if parent_path.is_empty() {
            node.name.clone()
        } else {
            format!("{} > {}", parent_path, node.name)
        };

        let position = node
            .anchor()
            .and_then(|anchor| document.anchor_position(anchor));
        let status = match (node.anchor(), position) {
            (None, _) => AnchorStatus::Absent,
            (Some(_), None) => AnchorStatus::Unresolved,
            (Some(_), Some(_)) => AnchorStatus::Resolved,
        };

        let precedes = |reference: Option<usize>| match (position, reference) {
            (Some(own), Some(other)) => own < other,
            _ => false,
        };

        entries.push(AnchorAuditEntry {
            path: path.clone(),
            depth,
            anchor_id: node.anchor().map(ToOwned::to_owned),
            status,
            document_position: position,
            precedes_parent: precedes(parent_position),
            precedes_previous_sibling: precedes(previous_position),
        });

        audit_level(
            document,
            &node.children,
            &path,
            depth + 1,
            position.or(parent_position),
            entries,
        );

        if position.is_some() {
            previous_position = position;
        }
    }
}

pub fn summarize(entries: &[AnchorAuditEntry]) -> AnchorAuditSummary {
    let mut summary = AnchorAuditSummary {
        outline_nodes: entries.len(),
        ..Default::default()
    };
    let mut anchor_uses = HashMap::<&str, usize>::new();

    for entry in entries {
        match entry.status {
            AnchorStatus::Absent => summary.absent_count += 1,
            AnchorStatus::Unresolved => summary.unresolved_count += 1,
            AnchorStatus::Resolved => summary.resolved_count += 1,
        }
        if entry.precedes_parent || entry.precedes_previous_sibling {
            summary.out_of_order_count += 1;
        }
        if let Some(anchor_id) = entry.anchor_id.as_deref() {
            *anchor_uses.entry(anchor_id).or_default() += 1;
        }
    }

    let mut duplicates = anchor_uses
        .into_iter()
        .filter(|(_, uses)| *uses > 1)
        .map(|(anchor_id, _)| anchor_id.to_string())
        .collect::<Vec<_>>();
    duplicates.sort();
    summary.duplicate_anchor_ids = duplicates;

    summary
}
