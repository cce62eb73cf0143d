//! Generational layout of the family tree.
//!
//! Coordinates follow the drawing surface: `x` is a percentage of the width,
//! `y` is in pixels from the top. The upper generations sit at fixed spots; only
//! descendants of `Child` are placed from the store.

use crate::family::FamilyTree;

/// Relation whose descendants get laid out in the bottom row.
pub const DESCENDANT_ANCHOR: &str = "Child";

const DESCENDANT_ROW_Y: f64 = 220.0;
const DESCENDANT_X_START: f64 = 45.0;
const DESCENDANT_X_STEP: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub label: String,
    pub x_percent: f64,
    pub y: f64,
    /// Drawn as the filled box used for the subject.
    pub highlighted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connector {
    pub from: (f64, f64),
    pub to: (f64, f64),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FamilyLayout {
    pub nodes: Vec<LayoutNode>,
    pub connectors: Vec<Connector>,
}

fn node(label: &str, x_percent: f64, y: f64) -> LayoutNode {
    LayoutNode {
        label: label.to_string(),
        x_percent,
        y,
        highlighted: false,
    }
}

fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Connector {
    Connector {
        from: (x1, y1),
        to: (x2, y2),
    }
}

impl FamilyLayout {
    #[must_use]
    pub fn compute(tree: &FamilyTree) -> Self {
        let mut me = node(clara_types::MY_NAME, 50.0, 100.0);
        me.highlighted = true;

        let mut layout = Self {
            nodes: vec![
                node("Mom", 40.0, 30.0),
                node("Dad", 60.0, 30.0),
                me,
                node("Spouse", 70.0, 100.0),
                node(DESCENDANT_ANCHOR, 50.0, 170.0),
            ],
            connectors: vec![
                line(45.0, 40.0, 55.0, 40.0),
                line(50.0, 40.0, 50.0, 80.0),
                line(55.0, 100.0, 65.0, 100.0),
                line(50.0, 110.0, 50.0, 150.0),
            ],
        };

        for (index, person) in tree.indexed_children_of(DESCENDANT_ANCHOR) {
            let x = DESCENDANT_X_START + index as f64 * DESCENDANT_X_STEP;
            layout
                .nodes
                .push(node(person.name.as_str(), x, DESCENDANT_ROW_Y));
            layout
                .connectors
                .push(line(50.0, 180.0, x, DESCENDANT_ROW_Y - 10.0));
        }

        layout
    }

    /// Nodes in the bottom row.
    pub fn descendants(&self) -> impl Iterator<Item = &LayoutNode> {
        self.nodes
            .iter()
            .filter(|n| (n.y - DESCENDANT_ROW_Y).abs() < f64::EPSILON)
    }
}
