use super::*;

pub fn assign_outline(
    document: &FilingDocument,
    outline: &[OutlineNode],
) -> Result<Vec<AnnotatedNode>> {
    outline
        .iter()
        .map(|node| assign_node(document, node, outline))
        .collect()
}

fn assign_node(
    document: &FilingDocument,
    node: &OutlineNode,
    siblings: &[OutlineNode],
) -> Result<AnnotatedNode> {
    let mut boundary_ids = HashSet::<&str>::new();
    collect_descendant_anchors(node, &mut boundary_ids);
    if boundary_ids.is_empty() {
        boundary_ids = sibling_anchors(node, siblings);
    }

    let content = extract_content(document, node, &boundary_ids)
        .with_context(|| format!("failed to extract content for outline node '{}'", node.name))?;

    let children = node
        .children
        .iter()
        .map(|child| assign_node(document, child, &node.children))
        .collect::<Result<Vec<_>>>()?;

    Ok(AnnotatedNode {
        name: node.name.clone(),
        anchor_id: node.anchor_id.clone(),
        content,
        children,
    })
}

fn collect_descendant_anchors<'a>(node: &'a OutlineNode, anchors: &mut HashSet<&'a str>) {
    for child in &node.children {
        if let Some(anchor) = child.anchor() {
            anchors.insert(anchor);
        }
        collect_descendant_anchors(child, anchors);
    }
}

fn sibling_anchors<'a>(node: &OutlineNode, siblings: &'a [OutlineNode]) -> HashSet<&'a str> {
    siblings
        .iter()
        .filter(|sibling| !std::ptr::eq(*sibling, node))
        .filter_map(OutlineNode::anchor)
        .collect()
}

fn extract_content(
    document: &FilingDocument,
    node: &OutlineNode,
    boundary_ids: &HashSet<&str>,
) -> Result<ContentBlock> {
    let Some(anchor) = node.anchor() else {
        return Ok(ContentBlock::default());
    };

    let Some(start) = document.anchor_position(anchor) else {
        debug!(anchor_id = anchor, name = %node.name, "anchor not found in document");
        return Ok(ContentBlock::default());
    };

    let stop = document.first_boundary_after(start, boundary_ids);
    let slice = document.content_slice(start, stop);

    debug!(
        anchor_id = anchor,
        start,
        stop = ?stop,
        slice_nodes = slice.len(),
        "assigned content slice"
    );

    Ok(ContentBlock::new(document.slice_markdown(&slice)?))
}
