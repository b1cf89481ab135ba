use super::*;

pub fn render_markdown(sections: &[AnnotatedNode]) -> String {
    sections
        .iter()
        .map(|section| section.to_markdown(1))
        .collect::<Vec<_>>()
        .join("\n\n")
}

impl AnnotatedNode {
    pub fn to_markdown(&self, level: usize) -> String {
        let mut parts = vec![heading_line(level, &self.name)];

        let content = self.content.to_markdown();
        if !content.is_empty() {
            parts.push(content.to_string());
        }

        let children = self
            .children
            .iter()
            .map(|child| child.to_markdown(level + 1))
            .filter(|child| !child.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");
        if !children.is_empty() {
            parts.push(children);
        }

        parts.join("\n\n").trim().to_string()
    }
}

fn heading_line(level: usize, name: &str) -> String {
    format!("{} {}", "#".repeat(level), name)
}
