use crate::arc_graph::GraphData;
use crate::errors::{AppError, AppResult};
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub type GraphHandle = u64;

pub trait GraphHost {
    fn has_container(&self, container_id: &str) -> bool;
    fn show_placeholder(&mut self, container_id: &str, message: &str);
    fn create_graph(&mut self, container_id: &str, graph: &GraphData) -> AppResult<GraphHandle>;
    fn destroy_graph(&mut self, handle: GraphHandle);
    fn fit(&mut self, handle: GraphHandle);
    fn select_node(&mut self, handle: GraphHandle, node_id: &str);
    fn clear_selection(&mut self, handle: GraphHandle);
    fn node_position(&self, handle: GraphHandle, node_id: &str) -> Option<(f64, f64)>;
}

#[derive(Debug, Clone)]
pub struct HeadlessGraph {
    pub container_id: String,
    pub data: GraphData,
    pub positions: HashMap<String, (f64, f64)>,
    pub selected: Option<String>,
    pub fitted: bool,
}

#[derive(Debug, Default)]
pub struct HeadlessGraphHost {
    containers: BTreeSet<String>,
    placeholders: HashMap<String, String>,
    graphs: BTreeMap<GraphHandle, HeadlessGraph>,
    next_handle: GraphHandle,
    fail_next_create: Option<String>,
    destroyed: usize,
}

impl HeadlessGraphHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_container(container_id: &str) -> Self {
        let mut host = Self::new();
        host.add_container(container_id);
        host
    }

    pub fn add_container(&mut self, container_id: &str) {
        self.containers.insert(container_id.to_string());
    }

    pub fn fail_next_create(&mut self, message: &str) {
        self.fail_next_create = Some(message.to_string());
    }

    pub fn placeholder(&self, container_id: &str) -> Option<&str> {
        self.placeholders.get(container_id).map(String::as_str)
    }

    pub fn graph(&self, handle: GraphHandle) -> Option<&HeadlessGraph> {
        self.graphs.get(&handle)
    }

    pub fn graphs_in(&self, container_id: &str) -> Vec<&HeadlessGraph> {
        self.graphs
            .values()
            .filter(|graph| graph.container_id == container_id)
            .collect()
    }

    pub fn live_graphs(&self) -> usize {
        self.graphs.len()
    }

    pub fn destroyed_graphs(&self) -> usize {
        self.destroyed
    }

    pub fn drag_node(&mut self, handle: GraphHandle, node_id: &str, pixel_y: f64) -> bool {
        let Some(position) = self
            .graphs
            .get_mut(&handle)
            .and_then(|graph| graph.positions.get_mut(node_id))
        else {
            return false;
        };
        position.1 = pixel_y;
        true
    }
}

impl GraphHost for HeadlessGraphHost {
    fn has_container(&self, container_id: &str) -> bool {
        self.containers.contains(container_id)
    }

    fn show_placeholder(&mut self, container_id: &str, message: &str) {
        self.placeholders.insert(container_id.to_string(), message.to_string());
    }

    fn create_graph(&mut self, container_id: &str, graph: &GraphData) -> AppResult<GraphHandle> {
        if let Some(message) = self.fail_next_create.take() {
            return Err(AppError::Render(message));
        }
        if !self.has_container(container_id) {
            return Err(AppError::NotFound(format!("container {container_id}")));
        }

        self.next_handle += 1;
        let handle = self.next_handle;
        let positions = graph
            .nodes
            .iter()
            .map(|node| (node.id.clone(), (node.x, node.y)))
            .collect();
        self.placeholders.remove(container_id);
        self.graphs.insert(
            handle,
            HeadlessGraph {
                container_id: container_id.to_string(),
                data: graph.clone(),
                positions,
                selected: None,
                fitted: false,
            },
        );
        Ok(handle)
    }

    fn destroy_graph(&mut self, handle: GraphHandle) {
        if self.graphs.remove(&handle).is_some() {
            self.destroyed += 1;
        }
    }

    fn fit(&mut self, handle: GraphHandle) {
        if let Some(graph) = self.graphs.get_mut(&handle) {
            graph.fitted = true;
        }
    }

    fn select_node(&mut self, handle: GraphHandle, node_id: &str) {
        if let Some(graph) = self.graphs.get_mut(&handle) {
            graph.selected = Some(node_id.to_string());
        }
    }

    fn clear_selection(&mut self, handle: GraphHandle) {
        if let Some(graph) = self.graphs.get_mut(&handle) {
            graph.selected = None;
        }
    }

    fn node_position(&self, handle: GraphHandle, node_id: &str) -> Option<(f64, f64)> {
        self.graphs
            .get(&handle)
            .and_then(|graph| graph.positions.get(node_id))
            .copied()
    }
}
