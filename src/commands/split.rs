use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use crate::cli::SplitArgs;
use crate::model::{
    AnnotatedNode, OutlineNode, SplitCounts, SplitInputs, SplitOutputs, SplitRunManifest,
    TableOfContents,
};
use crate::sections::{FilingDocument, assign_outline, render_markdown};
use crate::util::{
    now_utc_string, read_file_bytes, sha256_bytes, utc_compact_string, write_json_pretty,
    write_text,
};

pub fn run(args: SplitArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("split-{}", utc_compact_string(started_ts));

    info!(
        html = %args.html_path.display(),
        outline = %args.outline_path.display(),
        run_id = %run_id,
        "starting split"
    );

    let html_raw = read_file_bytes(&args.html_path)?;
    let outline_raw = read_file_bytes(&args.outline_path)?;

    let outline = parse_outline_json(&outline_raw)
        .with_context(|| format!("failed to parse outline {}", args.outline_path.display()))?;
    let html = String::from_utf8_lossy(&html_raw);

    let document = FilingDocument::parse(&html)
        .with_context(|| format!("failed to load {}", args.html_path.display()))?;
    let sections = assign_outline(&document, &outline.parts)?;
    let markdown = render_markdown(&sections);

    let warnings = collect_unresolved_warnings(&document, &outline.parts);
    for warning in &warnings {
        warn!(warning = %warning, "outline anchor unresolved");
    }

    let mut counts = count_sections(&document, &outline.parts, &sections);
    counts.markdown_bytes = markdown.len();

    if args.dry_run {
        info!(
            outline_nodes = counts.outline_nodes,
            resolved_anchors = counts.resolved_anchors,
            missing_anchors = counts.missing_anchors,
            markdown_bytes = counts.markdown_bytes,
            "split dry-run complete"
        );
        return Ok(());
    }

    write_text(&args.output, &markdown)?;
    info!(path = %args.output.display(), "wrote markdown");

    if let Some(tree_json_path) = &args.tree_json_path {
        write_json_pretty(tree_json_path, &sections)?;
        info!(path = %tree_json_path.display(), "wrote annotated outline tree");
    }

    if let Some(manifest_path) = &args.manifest_path {
        let manifest = SplitRunManifest {
            manifest_version: 1,
            run_id: run_id.clone(),
            status: "completed".to_string(),
            started_at,
            completed_at: now_utc_string(),
            inputs: SplitInputs {
                html_path: args.html_path.display().to_string(),
                html_sha256: sha256_bytes(&html_raw),
                outline_path: args.outline_path.display().to_string(),
                outline_sha256: sha256_bytes(&outline_raw),
            },
            outputs: SplitOutputs {
                markdown_path: args.output.display().to_string(),
                tree_json_path: args
                    .tree_json_path
                    .as_ref()
                    .map(|path| path.display().to_string()),
            },
            counts: counts.clone(),
            warnings,
        };
        write_json_pretty(manifest_path, &manifest)?;
        info!(path = %manifest_path.display(), "wrote split manifest");
    }

    info!(
        run_id = %run_id,
        outline_nodes = counts.outline_nodes,
        nodes_with_content = counts.nodes_with_content,
        missing_anchors = counts.missing_anchors,
        "split completed"
    );

    Ok(())
}

pub fn load_outline(path: &Path) -> Result<TableOfContents> {
    let raw = read_file_bytes(path)?;
    parse_outline_json(&raw).with_context(|| format!("failed to parse outline {}", path.display()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OutlineDocument {
    Parts(Vec<OutlineNode>),
    Contents(TableOfContents),
}

pub fn parse_outline_json(raw: &[u8]) -> Result<TableOfContents> {
    let document: OutlineDocument =
        serde_json::from_slice(raw).context("outline is neither a node list nor a parts object")?;

    Ok(match document {
        OutlineDocument::Parts(parts) => TableOfContents { parts },
        OutlineDocument::Contents(contents) => contents,
    })
}

pub fn count_sections(
    document: &FilingDocument,
    outline: &[OutlineNode],
    sections: &[AnnotatedNode],
) -> SplitCounts {
    let mut counts = SplitCounts {
        document_nodes: document.node_count(),
        document_anchors: document.anchor_count(),
        html_parse_errors: document.parse_error_count(),
        ..Default::default()
    };

    for (node, section) in outline.iter().zip(sections) {
        count_node(document, node, section, 1, &mut counts);
    }

    counts
}

fn count_node(
    document: &FilingDocument,
    node: &OutlineNode,
    section: &AnnotatedNode,
    depth: usize,
    counts: &mut SplitCounts,
) {
    counts.outline_nodes += 1;
    counts.max_depth = counts.max_depth.max(depth);

    if let Some(anchor) = node.anchor() {
        counts.anchored_nodes += 1;
        if document.contains_anchor(anchor) {
            counts.resolved_anchors += 1;
        } else {
            counts.missing_anchors += 1;
        }
    }
    if !section.content.is_empty() {
        counts.nodes_with_content += 1;
    }

    for (child, child_section) in node.children.iter().zip(&section.children) {
        count_node(document, child, child_section, depth + 1, counts);
    }
}

fn collect_unresolved_warnings(document: &FilingDocument, outline: &[OutlineNode]) -> Vec<String> {
    let mut warnings = Vec::new();
    let mut stack = outline.iter().rev().collect::<Vec<_>>();

    while let Some(node) = stack.pop() {
        if let Some(anchor) = node.anchor() {
            if !document.contains_anchor(anchor) {
                warnings.push(format!(
                    "anchor '{}' for '{}' not found in document",
                    anchor, node.name
                ));
            }
        }
        stack.extend(node.children.iter().rev());
    }

    warnings
}
