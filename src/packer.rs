//! Growing binary-tree rectangle packing for texture atlases.
//!
//! Blackpawn-style packing: free space lives in the leaves of a split tree,
//! and when nothing fits the canvas grows along whichever side keeps it
//! squarish. No rotation, no overlap.

use glam::UVec2;

/// An input rectangle annotated with its packed position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PackedRect {
    pub position: UVec2,
    pub size: UVec2,
    /// Caller-supplied token identifying the sub-image.
    pub reference: usize,
}

struct Node {
    position: UVec2,
    size: UVec2,
    leaf: bool,
    children: [Option<Box<Node>>; 2],
}

impl Node {
    fn new(position: UVec2, size: UVec2) -> Box<Self> {
        Box::new(Self {
            position,
            size,
            leaf: true,
            children: [None, None],
        })
    }
}

/// Packs heterogeneous rectangles into one growing canvas.
#[derive(Default)]
pub struct TexturePacker {
    rects: Vec<PackedRect>,
    canvas: UVec2,
}

impl TexturePacker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_rect(&mut self, size: UVec2, reference: usize) {
        self.rects.push(PackedRect {
            position: UVec2::ZERO,
            size,
            reference,
        });
    }

    /// The canvas size computed by the last [`TexturePacker::pack`] call.
    pub fn canvas_size(&self) -> UVec2 {
        self.canvas
    }

    pub fn rects(&self) -> &[PackedRect] {
        &self.rects
    }

    /// Place every rectangle and return the annotated list.
    pub fn pack(&mut self) -> &[PackedRect] {
        if self.rects.is_empty() {
            return &self.rects;
        }

        // Largest area first; big rects anchor the canvas.
        self.rects
            .sort_by(|a, b| (b.size.x * b.size.y).cmp(&(a.size.x * a.size.y)));

        self.canvas = self.rects[0].size;
        let mut root = Node::new(UVec2::ZERO, self.canvas);

        let mut i = 0;
        while i < self.rects.len() {
            let size = self.rects[i].size;
            if let Some(node) = find_node(&mut root, size) {
                self.rects[i].position = split_node(node, size);
                i += 1;
            } else if let Some(new_root) = self.grow(root, size) {
                root = new_root;
            } else {
                // Nothing fits and the canvas cannot grow; stop rather
                // than loop forever.
                log::debug!("texture packer stuck on {}x{} rect", size.x, size.y);
                break;
            }
        }

        &self.rects
    }

    fn grow(&mut self, root: Box<Node>, size: UVec2) -> Option<Box<Node>> {
        let can_grow_down = size.x <= root.size.x;
        let can_grow_right = size.y <= root.size.y;

        // Prefer the direction that keeps the canvas squarish.
        let should_grow_right = can_grow_right && root.size.y >= root.size.x + size.x;
        let should_grow_down = can_grow_down && root.size.x >= root.size.y + size.y;

        if should_grow_right {
            Some(self.grow_right(root, size))
        } else if should_grow_down {
            Some(self.grow_down(root, size))
        } else if can_grow_right {
            Some(self.grow_right(root, size))
        } else if can_grow_down {
            Some(self.grow_down(root, size))
        } else {
            None
        }
    }

    fn grow_right(&mut self, root: Box<Node>, size: UVec2) -> Box<Node> {
        let old_size = root.size;
        self.canvas = UVec2::new(self.canvas.x + size.x, self.canvas.y);
        log::trace!("growing atlas right to {}x{}", self.canvas.x, self.canvas.y);

        let mut new_root = Node::new(UVec2::ZERO, self.canvas);
        new_root.leaf = false;
        new_root.children[0] = Some(root);
        new_root.children[1] = Some(Node::new(
            UVec2::new(old_size.x, 0),
            UVec2::new(size.x, self.canvas.y),
        ));
        new_root
    }

    fn grow_down(&mut self, root: Box<Node>, size: UVec2) -> Box<Node> {
        let old_size = root.size;
        self.canvas = UVec2::new(self.canvas.x, self.canvas.y + size.y);
        log::trace!("growing atlas down to {}x{}", self.canvas.x, self.canvas.y);

        let mut new_root = Node::new(UVec2::ZERO, self.canvas);
        new_root.leaf = false;
        new_root.children[0] = Some(Node::new(
            UVec2::new(0, old_size.y),
            UVec2::new(self.canvas.x, size.y),
        ));
        new_root.children[1] = Some(root);
        new_root
    }
}

fn find_node<'a>(node: &'a mut Node, size: UVec2) -> Option<&'a mut Node> {
    if !node.leaf {
        for child in node.children.iter_mut().flatten() {
            if let Some(found) = find_node(child, size) {
                return Some(found);
            }
        }
        None
    } else if size.x <= node.size.x && size.y <= node.size.y {
        Some(node)
    } else {
        None
    }
}

/// Turn a fitting leaf into an internal node, placing the rect at its
/// origin; the leftover area becomes a bottom strip and a right strip.
fn split_node(node: &mut Node, size: UVec2) -> UVec2 {
    node.leaf = false;

    let below = node.size.y - size.y;
    if below > 0 {
        node.children[0] = Some(Node::new(
            UVec2::new(node.position.x, node.position.y + size.y),
            UVec2::new(node.size.x, below),
        ));
    }

    let right = node.size.x - size.x;
    if right > 0 {
        node.children[1] = Some(Node::new(
            UVec2::new(node.position.x + size.x, node.position.y),
            UVec2::new(right, size.y),
        ));
    }

    node.position
}
