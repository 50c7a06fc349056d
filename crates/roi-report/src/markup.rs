//! Line-oriented report markup.
//!
//! ```text
//! @logo                   brand logo
//! # Title                 page title
//! > Lead text             muted paragraph
//! ! Callout               boxed notice
//! ## Panel heading        starts a panel; an optional first plain line is its
//! Subtitle                subtitle, then `label | value` rows until a blank line
//! Label | value
//! = Label | value         large centered highlight
//! ---                     horizontal rule
//! _ Footer                pinned to the bottom of the page
//! ```
//!
//! Any other line is a plain paragraph. Parsing never fails.

use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Row {
    pub label: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "block", content = "data", rename_all = "snake_case")]
pub enum Block {
    Logo,
    Title(String),
    Lead(String),
    Callout(String),
    Panel {
        heading: String,
        subtitle: Option<String>,
        rows: Vec<Row>,
    },
    Highlight { label: String, value: String },
    Rule,
    Text(String),
    Footer(String),
}

fn marker<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(prefix)?;
    if rest.is_empty() || rest.starts_with(' ') {
        Some(rest.trim())
    } else {
        None
    }
}

fn split_pair(text: &str) -> Option<(String, String)> {
    text.rsplit_once('|')
        .map(|(l, v)| (l.trim().to_string(), v.trim().to_string()))
}

pub fn parse(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut panel: Option<Block> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            blocks.extend(panel.take());
            continue;
        }

        if let Some(Block::Panel { subtitle, rows, .. }) = panel.as_mut() {
            if !is_marked(line) {
                if let Some((label, value)) = split_pair(line) {
                    rows.push(Row { label, value });
                    continue;
                }
                if subtitle.is_none() && rows.is_empty() {
                    *subtitle = Some(line.to_string());
                    continue;
                }
            }
        }
        blocks.extend(panel.take());

        let block = if line == "@logo" {
            Block::Logo
        } else if line.starts_with("---") {
            Block::Rule
        } else if let Some(h) = marker(line, "##") {
            panel = Some(Block::Panel {
                heading: h.to_string(),
                subtitle: None,
                rows: Vec::new(),
            });
            continue;
        } else if let Some(t) = marker(line, "#") {
            Block::Title(t.to_string())
        } else if let Some(t) = marker(line, ">") {
            Block::Lead(t.to_string())
        } else if let Some(t) = marker(line, "!") {
            Block::Callout(t.to_string())
        } else if let Some(t) = marker(line, "=") {
            let (label, value) = split_pair(t).unwrap_or_else(|| (String::new(), t.to_string()));
            Block::Highlight { label, value }
        } else if let Some(t) = marker(line, "_") {
            Block::Footer(t.to_string())
        } else {
            Block::Text(line.to_string())
        };
        blocks.push(block);
    }
    blocks.extend(panel);
    blocks
}

fn is_marked(line: &str) -> bool {
    line == "@logo"
        || line.starts_with("---")
        || ["##", "#", ">", "!", "=", "_"]
            .iter()
            .any(|m| marker(line, m).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_block_kind() {
        let text = "@logo\n# Title\n> lead\n! note\n## Data\nsub\nA | 1\nB | $2\n\n= Net | $5\n---\nplain\n_ foot | er";
        let blocks = parse(text);
        assert_eq!(
            blocks,
            vec![
                Block::Logo,
                Block::Title("Title".into()),
                Block::Lead("lead".into()),
                Block::Callout("note".into()),
                Block::Panel {
                    heading: "Data".into(),
                    subtitle: Some("sub".into()),
                    rows: vec![
                        Row { label: "A".into(), value: "1".into() },
                        Row { label: "B".into(), value: "$2".into() },
                    ],
                },
                Block::Highlight { label: "Net".into(), value: "$5".into() },
                Block::Rule,
                Block::Text("plain".into()),
                Block::Footer("foot | er".into()),
            ]
        );
    }

    #[test]
    fn panel_ends_at_next_marker() {
        let blocks = parse("## P\nx | 1\n## Q\ny | 2");
        assert_eq!(blocks.len(), 2);
        assert!(matches!(&blocks[1], Block::Panel { heading, .. } if heading == "Q"));
    }

    #[test]
    fn second_plain_line_leaves_the_panel() {
        let blocks = parse("## P\nsub\nx | 1\nafter");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1], Block::Text("after".into()));
    }

    #[test]
    fn markers_need_a_space() {
        assert_eq!(parse("#hashtag"), vec![Block::Text("#hashtag".into())]);
        assert_eq!(parse("= $9"), vec![Block::Highlight { label: String::new(), value: "$9".into() }]);
    }

    #[test]
    fn builtin_templates_parse() {
        use roi_core::CalculatorKind;
        let blocks = parse(crate::template::builtin_template(CalculatorKind::Support));
        let panels = blocks
            .iter()
            .filter(|b| matches!(b, Block::Panel { .. }))
            .count();
        assert_eq!(panels, 2);
        assert_eq!(blocks.first(), Some(&Block::Logo));
        assert!(matches!(blocks.last(), Some(Block::Footer(_))));
    }
}
