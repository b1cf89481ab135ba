use super::*;

const SILENT_ELEMENTS: [&str; 2] = ["script", "style"];

struct FlatNode {
    handle: Handle,
    subtree_end: usize,
}

enum IndexStep {
    Enter(Handle),
    Exit(usize),
}

// Pre-order node list; a node's subtree occupies position..subtree_end.
pub struct FilingDocument {
    nodes: Vec<FlatNode>,
    anchors: HashMap<String, usize>,
    parse_error_count: usize,
}

impl FilingDocument {
    pub fn parse(html: &str) -> Result<Self> {
        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())
            .context("failed to parse HTML document")?;

        let parse_error_count = dom.errors.borrow().len();
        let mut document = Self {
            nodes: Vec::new(),
            anchors: HashMap::new(),
            parse_error_count,
        };
        document.index_nodes(&dom.document);

        debug!(
            nodes = document.nodes.len(),
            anchors = document.anchors.len(),
            parse_errors = parse_error_count,
            "indexed html document"
        );

        Ok(document)
    }

    // Strips inline styles while assigning positions.
    fn index_nodes(&mut self, root: &Handle) {
        let mut stack = vec![IndexStep::Enter(root.clone())];

        while let Some(step) = stack.pop() {
            let handle = match step {
                IndexStep::Enter(handle) => handle,
                IndexStep::Exit(position) => {
                    self.nodes[position].subtree_end = self.nodes.len();
                    continue;
                }
            };
            let position = self.nodes.len();

            if let NodeData::Element { attrs, .. } = &handle.data {
                let mut attrs = attrs.borrow_mut();
                attrs.retain(|attr| !(&*attr.name.local).eq_ignore_ascii_case("style"));

                if let Some(id_attr) = attrs.iter().find(|attr| &*attr.name.local == "id") {
                    let id: &str = &id_attr.value;
                    if !id.is_empty() {
                        self.anchors.entry(id.to_owned()).or_insert(position);
                    }
                }
            }

            stack.push(IndexStep::Exit(position));
            stack.extend(
                handle
                    .children
                    .borrow()
                    .iter()
                    .rev()
                    .map(|child| IndexStep::Enter(child.clone())),
            );

            self.nodes.push(FlatNode {
                handle,
                subtree_end: position + 1,
            });
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn anchor_count(&self) -> usize {
        self.anchors.len()
    }

    pub fn parse_error_count(&self) -> usize {
        self.parse_error_count
    }

    pub fn anchor_position(&self, anchor_id: &str) -> Option<usize> {
        self.anchors.get(anchor_id).copied()
    }

    pub fn contains_anchor(&self, anchor_id: &str) -> bool {
        self.anchors.contains_key(anchor_id)
    }

    pub fn first_boundary_after(&self, start: usize, boundary_ids: &HashSet<&str>) -> Option<usize> {
        boundary_ids
            .iter()
            .filter_map(|id| self.anchor_position(id))
            .filter(|&position| position > start)
            .min()
    }

    // Whole nodes in start..stop; nodes containing stop are descended into.
    pub fn content_slice(&self, start: usize, stop: Option<usize>) -> Vec<usize> {
        let stop = stop.unwrap_or(self.nodes.len()).min(self.nodes.len());
        let mut slice = Vec::new();
        let mut cursor = start;

        while cursor < stop {
            let subtree_end = self.nodes[cursor].subtree_end;
            if subtree_end <= stop {
                slice.push(cursor);
                cursor = subtree_end;
            } else {
                cursor += 1;
            }
        }

        slice
    }

    pub fn slice_markdown(&self, slice: &[usize]) -> Result<String> {
        let mut segments = Vec::<String>::new();

        for &position in slice {
            let mut segment = String::new();
            push_inline(&self.nodes[position].handle, &mut segment)?;

            let segment = segment.trim();
            if !segment.is_empty() {
                segments.push(segment.to_string());
            }
        }

        Ok(segments.join("\n\n"))
    }
}

fn push_inline(root: &Handle, out: &mut String) -> Result<()> {
    let mut stack = vec![root.clone()];

    while let Some(handle) = stack.pop() {
        let descend = match &handle.data {
            NodeData::Text { contents } => {
                out.push_str(&contents.borrow());
                false
            }
            NodeData::Element { name, .. } => {
                let tag: &str = &name.local;
                if tag.eq_ignore_ascii_case("table") {
                    out.push_str("\n\n");
                    out.push_str(&table_passthrough(&handle)?);
                    out.push_str("\n\n");
                    false
                } else {
                    !SILENT_ELEMENTS.contains(&tag)
                }
            }
            NodeData::Document => true,
            _ => false,
        };

        if descend {
            stack.extend(handle.children.borrow().iter().rev().cloned());
        }
    }

    Ok(())
}

fn table_passthrough(handle: &Handle) -> Result<String> {
    let mut buf = Vec::new();
    let serializable = SerializableHandle::from(handle.clone());
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };

    serialize(&mut buf, &serializable, opts).context("failed to serialize table element")?;
    String::from_utf8(buf).context("serialized table is not valid UTF-8")
}
