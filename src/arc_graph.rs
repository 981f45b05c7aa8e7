use crate::arc_templates;
use crate::graph_host::{GraphHandle, GraphHost};
use crate::models::{clamp_y_position, ArcBeat, CharacterArc};
use serde::Serialize;

pub const BEAT_SPACING_PX: f64 = 200.0;
pub const PIXELS_PER_POINT: f64 = 10.0;
pub const LINKED_NODE_SIZE: u32 = 25;
pub const UNLINKED_NODE_SIZE: u32 = 15;
pub const NEUTRAL_NODE_FILL: &str = "#ffffff";
pub const EDGE_OPACITY: f32 = 0.6;

pub const MSG_NO_CONTAINER: &str = "Arc graph container not found.";
pub const MSG_NO_ARC: &str = "No character arc defined. Choose an arc template to get started.";
pub const MSG_NO_BEATS: &str = "No beats yet. Add beats to see the arc graph.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub title: Option<String>,
    pub x: f64,
    pub y: f64,
    pub size: u32,
    pub fill: String,
    pub border: String,
    pub linked: bool,
    pub fixed_x: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub id: String,
    pub from: String,
    pub to: String,
    pub color: String,
    pub opacity: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

pub fn pixel_x(index: usize) -> f64 {
    index as f64 * BEAT_SPACING_PX
}

// Screen y grows downward, so higher positions are more negative.
pub fn pixel_y(y_position: u8) -> f64 {
    -(f64::from(y_position) * PIXELS_PER_POINT)
}

pub fn position_from_pixel(pixel_y: f64) -> u8 {
    clamp_y_position(-(pixel_y / PIXELS_PER_POINT))
}

pub fn prepare_graph(beats: &[ArcBeat], color: &str) -> GraphData {
    let nodes = beats
        .iter()
        .enumerate()
        .map(|(index, beat)| {
            let linked = beat.is_linked();
            GraphNode {
                id: beat.id.clone(),
                label: if beat.name.trim().is_empty() {
                    format!("Beat {}", index + 1)
                } else {
                    beat.name.clone()
                },
                title: tooltip(beat),
                x: pixel_x(index),
                y: pixel_y(beat.y_position),
                size: if linked { LINKED_NODE_SIZE } else { UNLINKED_NODE_SIZE },
                fill: if linked { color.to_string() } else { NEUTRAL_NODE_FILL.to_string() },
                border: color.to_string(),
                linked,
                fixed_x: true,
            }
        })
        .collect();

    let edges = beats
        .windows(2)
        .map(|pair| GraphEdge {
            id: format!("{}->{}", pair[0].id, pair[1].id),
            from: pair[0].id.clone(),
            to: pair[1].id.clone(),
            color: color.to_string(),
            opacity: EDGE_OPACITY,
        })
        .collect();

    GraphData { nodes, edges }
}

fn tooltip(beat: &ArcBeat) -> Option<String> {
    let parts: Vec<&str> = [beat.description.trim(), beat.emotional_state.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphState {
    Uninitialized,
    Placeholder,
    Rendered(GraphHandle),
    Destroyed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered { nodes: usize, edges: usize },
    Placeholder(String),
    Failed(String),
    Skipped,
}

type BeatClickCallback = Box<dyn FnMut(&ArcBeat)>;
type BeatDragCallback = Box<dyn FnMut(&ArcBeat, u8)>;

/// Click and drag handlers are single-slot: registering a handler replaces
/// the previous one.
///
/// `render` keeps its own copy of the beats, so drags move that copy. Write
/// them back from the drag handler or with [`ArcGraph::copy_positions_to`].
pub struct ArcGraph<H: GraphHost> {
    host: H,
    container_id: String,
    state: GraphState,
    beats: Vec<ArcBeat>,
    color: &'static str,
    on_click: Option<BeatClickCallback>,
    on_drag: Option<BeatDragCallback>,
}

impl<H: GraphHost> ArcGraph<H> {
    pub fn new(host: H, container_id: impl Into<String>) -> Self {
        Self {
            host,
            container_id: container_id.into(),
            state: GraphState::Uninitialized,
            beats: Vec::new(),
            color: arc_templates::FALLBACK_ARC_COLOR,
            on_click: None,
            on_drag: None,
        }
    }

    pub fn state(&self) -> GraphState {
        self.state
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn beats(&self) -> &[ArcBeat] {
        &self.beats
    }

    // Returns how many beats changed.
    pub fn copy_positions_to(&self, arc: &mut CharacterArc) -> usize {
        let mut changed = 0;
        for beat in &self.beats {
            if let Some(target) = arc.beat_mut(&beat.id) {
                if target.y_position != beat.y_position {
                    target.y_position = beat.y_position;
                    changed += 1;
                }
            }
        }
        changed
    }

    pub fn color(&self) -> &'static str {
        self.color
    }

    pub fn on_beat_click(&mut self, callback: impl FnMut(&ArcBeat) + 'static) {
        self.on_click = Some(Box::new(callback));
    }

    pub fn on_beat_drag(&mut self, callback: impl FnMut(&ArcBeat, u8) + 'static) {
        self.on_drag = Some(Box::new(callback));
    }

    // Host errors become an error message in the container.
    pub fn render(&mut self, arc: Option<&CharacterArc>) -> RenderOutcome {
        if self.state == GraphState::Destroyed {
            return RenderOutcome::Skipped;
        }
        self.teardown();

        if !self.host.has_container(&self.container_id) {
            tracing::warn!(container = %self.container_id, "arc graph container missing");
            self.state = GraphState::Placeholder;
            return RenderOutcome::Placeholder(MSG_NO_CONTAINER.to_string());
        }

        let Some(arc) = arc else {
            return self.placeholder(MSG_NO_ARC.to_string());
        };
        if arc.beats.is_empty() {
            return self.placeholder(MSG_NO_BEATS.to_string());
        }

        self.color = arc_templates::arc_color(Some(arc.template_type.as_str()));
        self.beats = arc.beats.clone();
        let data = prepare_graph(&self.beats, self.color);

        match self.host.create_graph(&self.container_id, &data) {
            Ok(handle) => {
                self.host.fit(handle);
                self.state = GraphState::Rendered(handle);
                tracing::debug!(
                    container = %self.container_id,
                    nodes = data.nodes.len(),
                    edges = data.edges.len(),
                    "arc graph rendered"
                );
                RenderOutcome::Rendered {
                    nodes: data.nodes.len(),
                    edges: data.edges.len(),
                }
            }
            Err(error) => {
                tracing::warn!(container = %self.container_id, error = %error, "arc graph construction failed");
                self.beats.clear();
                let message = format!("Error rendering arc graph: {error}");
                self.host.show_placeholder(&self.container_id, &message);
                self.state = GraphState::Placeholder;
                RenderOutcome::Failed(message)
            }
        }
    }

    pub fn handle_click(&mut self, node_id: &str) -> bool {
        let GraphState::Rendered(handle) = self.state else {
            return false;
        };
        let Some(beat) = self.beats.iter().find(|beat| beat.id == node_id) else {
            return false;
        };
        self.host.select_node(handle, node_id);
        if let Some(callback) = self.on_click.as_mut() {
            callback(beat);
        }
        true
    }

    pub fn handle_drag_end(&mut self, node_id: &str) -> Option<u8> {
        let GraphState::Rendered(handle) = self.state else {
            return None;
        };
        let Some((_, pixel_y)) = self.host.node_position(handle, node_id) else {
            tracing::warn!(node_id = %node_id, "dragged node has no position");
            return None;
        };
        self.apply_drag(node_id, pixel_y)
    }

    pub fn apply_drag(&mut self, node_id: &str, pixel_y: f64) -> Option<u8> {
        if !matches!(self.state, GraphState::Rendered(_)) || !pixel_y.is_finite() {
            return None;
        }
        let beat = self.beats.iter_mut().find(|beat| beat.id == node_id)?;
        let value = position_from_pixel(pixel_y);
        beat.y_position = value;
        if let Some(callback) = self.on_drag.as_mut() {
            callback(&*beat, value);
        }
        Some(value)
    }

    pub fn select_beat(&mut self, beat_id: &str) -> bool {
        match self.state {
            GraphState::Rendered(handle) if self.beats.iter().any(|beat| beat.id == beat_id) => {
                self.host.select_node(handle, beat_id);
                true
            }
            _ => false,
        }
    }

    pub fn clear_selection(&mut self) {
        if let GraphState::Rendered(handle) = self.state {
            self.host.clear_selection(handle);
        }
    }

    pub fn fit(&mut self) {
        if let GraphState::Rendered(handle) = self.state {
            self.host.fit(handle);
        }
    }

    pub fn destroy(&mut self) {
        self.teardown();
        self.on_click = None;
        self.on_drag = None;
        self.state = GraphState::Destroyed;
    }

    fn teardown(&mut self) {
        if let GraphState::Rendered(handle) = self.state {
            self.host.destroy_graph(handle);
            self.state = GraphState::Uninitialized;
        }
        self.beats.clear();
    }

    fn placeholder(&mut self, message: String) -> RenderOutcome {
        self.host.show_placeholder(&self.container_id, &message);
        self.state = GraphState::Placeholder;
        RenderOutcome::Placeholder(message)
    }
}
