//! Owned statement arena for the native adapter.
//!
//! Statements are stored verbatim. Everything between two statements
//! (blank lines, comments, separators) lives in the gap of the following
//! item, so rendering an untouched tree reproduces the source byte for byte.

use std::ops::Range;

/// Handle into a [`SyntaxTree`] arena. Only meaningful for the tree that
/// issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub name: String,
    pub asname: Option<String>,
}

impl Alias {
    /// Name the alias binds in the importing scope.
    pub fn bound_name(&self) -> &str {
        self.asname.as_deref().unwrap_or(&self.name)
    }

    fn render(&self) -> String {
        match &self.asname {
            Some(asname) => format!("{} as {}", self.name, asname),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStmt {
    /// `Some` for `from` imports, including relative dots.
    pub module: Option<String>,
    pub aliases: Vec<Alias>,
    pub wildcard: bool,
}

impl ImportStmt {
    /// Whitespace-normalized text used for deduplication and for rebuilding
    /// a statement after one alias is dropped.
    pub fn canonical(&self) -> String {
        let names = if self.wildcard {
            "*".to_string()
        } else {
            self.aliases
                .iter()
                .map(Alias::render)
                .collect::<Vec<_>>()
                .join(", ")
        };
        match &self.module {
            Some(module) => format!("from {module} import {names}"),
            None => format!("import {names}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Definable { name: String },
    Binding { targets: Vec<String> },
    Import(ImportStmt),
    Other,
}

#[derive(Debug, Clone)]
pub enum Content {
    Leaf(String),
    Compound {
        header: String,
        body: Block,
        trailer: String,
    },
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: &'static str,
    pub shape: Shape,
    /// 1-based inclusive.
    pub lines: (usize, usize),
    pub span: Range<usize>,
    pub column: usize,
    pub tag: Option<String>,
    pub entry_guard: bool,
    pub docstring: bool,
    pub content: Content,
}

impl Node {
    /// Statement text spliced in by an edit. Position data is filled in
    /// when the edited source is lowered again.
    pub fn grafted(text: String, shape: Shape) -> Self {
        Node {
            kind: "Grafted",
            shape,
            lines: (0, 0),
            span: 0..0,
            column: 0,
            tag: None,
            entry_guard: false,
            docstring: false,
            content: Content::Leaf(text),
        }
    }

    pub fn is_definable(&self) -> bool {
        matches!(self.shape, Shape::Definable { .. })
    }

    pub fn body(&self) -> Option<&Block> {
        match &self.content {
            Content::Compound { body, .. } => Some(body),
            Content::Leaf(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Item {
    /// Text between the previous statement (or the block start) and this one.
    pub gap: String,
    pub node: NodeId,
}

#[derive(Debug, Clone, Default)]
pub struct Block {
    /// Column of the block's statements.
    pub indent: usize,
    pub items: Vec<Item>,
}

/// Parent of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Module,
    Node(NodeId),
}

#[derive(Debug, Clone, Default)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    pub module: Block,
    /// Text after the last top-level statement.
    pub trailer: String,
}

impl SyntaxTree {
    pub fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn block(&self, owner: Owner) -> Option<&Block> {
        match owner {
            Owner::Module => Some(&self.module),
            Owner::Node(id) => self.node(id).body(),
        }
    }

    pub fn block_mut(&mut self, owner: Owner) -> Option<&mut Block> {
        match owner {
            Owner::Module => Some(&mut self.module),
            Owner::Node(id) => match &mut self.node_mut(id).content {
                Content::Compound { body, .. } => Some(body),
                Content::Leaf(_) => None,
            },
        }
    }

    /// Find the block holding `id` and its position there. Compared by
    /// handle, never by content.
    pub fn locate(&self, id: NodeId) -> Option<(Owner, usize)> {
        if let Some(pos) = self.module.items.iter().position(|i| i.node == id) {
            return Some((Owner::Module, pos));
        }
        self.nodes.iter().enumerate().find_map(|(owner, node)| {
            let pos = node.body()?.items.iter().position(|i| i.node == id)?;
            Some((Owner::Node(NodeId(owner)), pos))
        })
    }

    /// Top-level statements in order.
    pub fn top_level(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.module.items.iter().map(|i| (i.node, self.node(i.node)))
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_block(&self.module, &mut out);
        out.push_str(&self.trailer);
        out
    }

    fn render_block(&self, block: &Block, out: &mut String) {
        for item in &block.items {
            out.push_str(&item.gap);
            self.render_node(item.node, out);
        }
    }

    fn render_node(&self, id: NodeId, out: &mut String) {
        match &self.node(id).content {
            Content::Leaf(text) => out.push_str(text),
            Content::Compound {
                header,
                body,
                trailer,
            } => {
                out.push_str(header);
                self.render_block(body, out);
                out.push_str(trailer);
            }
        }
    }
}
