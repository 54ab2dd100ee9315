//! Renderer-agnostic scene graph the overlays write into.
//!
//! Nodes are kept in an append-only arena; a `NodeId` handed out by
//! [`Scene::push`] stays valid for the life of the scene. Overlay components
//! hold on to ids and mutate node transforms in place instead of re-adding
//! geometry every event.

use crate::geom::Transform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const RED: Self = Self::new(1.0, 0.0, 0.0);
    pub const BLUE: Self = Self::new(0.0, 0.0, 1.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    Sphere { radius: f32 },
    /// Cylinder extruded along the local +Y axis, centered on the origin.
    Cylinder { radius: f32, height: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub geometry: Geometry,
    pub color: Color,
    pub transform: Transform,
}

impl Node {
    pub fn sphere(name: impl Into<String>, radius: f32, color: Color) -> Self {
        Self {
            name: name.into(),
            geometry: Geometry::Sphere { radius },
            color,
            transform: Transform::IDENTITY,
        }
    }

    pub fn cylinder(name: impl Into<String>, radius: f32, height: f32, color: Color) -> Self {
        Self {
            name: name.into(),
            geometry: Geometry::Cylinder { radius, height },
            color,
            transform: Transform::IDENTITY,
        }
    }
}

#[derive(Debug, Default)]
pub struct Scene {
    nodes: Vec<Node>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }
}
