// src/graph/engine.rs
// Eager autodiff engine. Every node is evaluated as soon as the operation
// is applied; backward walks the graph in reverse topological order and
// dispatches to gradient functions through the GradientRegistry.

use crate::backend::{SimnetF, Tensor};
use crate::graph::registry::{GradientContext, GradientRegistry};
use crate::ops::Operator;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Atomic auto-incrementing id for all nodes.
static NODE_COUNTER: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn new() -> Self {
        let id = NODE_COUNTER.fetch_add(1, Ordering::SeqCst);
        Self(id)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// A graph node. Leaves carry no operator; computed nodes remember the
/// operator that produced them and their input nodes so backward can
/// reconstruct the call.
#[derive(Debug)]
pub struct Node<T>
where
    T: SimnetF,
{
    pub id: NodeId,
    pub tensor: Tensor<T>,
    pub op: Option<Box<dyn Operator<T>>>,
    pub inputs: Vec<NodeId>,
    pub requires_grad: bool,
}

impl<T> Node<T>
where
    T: SimnetF,
{
    pub fn new_leaf(tensor: Tensor<T>, requires_grad: bool) -> Self {
        Self {
            id: NodeId::new(),
            tensor,
            op: None,
            inputs: Vec::new(),
            requires_grad,
        }
    }

    pub fn new_computed(tensor: Tensor<T>, op: Box<dyn Operator<T>>, inputs: Vec<NodeId>) -> Self {
        Self {
            id: NodeId::new(),
            tensor,
            op: Some(op),
            inputs,
            requires_grad: true,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.op.is_none()
    }
}

/// Main computational graph engine.
#[derive(Debug)]
pub struct AutodiffEngine<T>
where
    T: SimnetF,
{
    nodes: HashMap<NodeId, Node<T>>,
    gradients: HashMap<NodeId, Tensor<T>>,
    registry: GradientRegistry<T>,
    training_mode: bool,
}

impl<T> Default for AutodiffEngine<T>
where
    T: SimnetF,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> AutodiffEngine<T>
where
    T: SimnetF,
{
    /// Engine with the crate's default gradient registry installed.
    pub fn new() -> Self {
        Self::with_registry(GradientRegistry::with_defaults())
    }

    pub fn with_registry(registry: GradientRegistry<T>) -> Self {
        Self {
            nodes: HashMap::new(),
            gradients: HashMap::new(),
            registry,
            training_mode: true,
        }
    }

    pub fn set_training(&mut self, training: bool) {
        self.training_mode = training;
    }

    pub fn is_training(&self) -> bool {
        self.training_mode
    }

    pub fn registry(&self) -> &GradientRegistry<T> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut GradientRegistry<T> {
        &mut self.registry
    }

    /// Creates a new leaf node in the computational graph.
    pub fn create_variable(&mut self, tensor: Tensor<T>, requires_grad: bool) -> NodeId {
        let node = Node::new_leaf(tensor, requires_grad);
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    pub fn get_tensor(&self, node_id: NodeId) -> Option<&Tensor<T>> {
        self.nodes.get(&node_id).map(|node| &node.tensor)
    }

    pub fn get_gradient(&self, node_id: NodeId) -> Option<&Tensor<T>> {
        self.gradients.get(&node_id)
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Clean up gradients.
    pub fn zero_gradients(&mut self) {
        self.gradients.clear();
    }

    fn validate_inputs(
        &self,
        op: &dyn Operator<T>,
        input_ids: &[NodeId],
    ) -> Result<(), String> {
        for &input_id in input_ids {
            if !self.nodes.contains_key(&input_id) {
                return Err(format!("Input node {} not found", input_id.0));
            }
        }

        if input_ids.len() != op.num_inputs() {
            return Err(format!(
                "Operation {} expects {} inputs, got {}",
                op.name(),
                op.num_inputs(),
                input_ids.len()
            ));
        }

        Ok(())
    }

    /// Applies an operation to existing nodes, evaluating it immediately.
    pub fn apply_operation(
        &mut self,
        op: Box<dyn Operator<T>>,
        input_ids: Vec<NodeId>,
    ) -> Result<NodeId, String> {
        self.validate_inputs(op.as_ref(), &input_ids)?;

        let input_tensors: Vec<&Tensor<T>> = input_ids
            .iter()
            .map(|&input_id| &self.nodes[&input_id].tensor)
            .collect();

        let result_tensor = op.compute(&input_tensors)?;

        let node = Node::new_computed(result_tensor, op, input_ids);
        let id = node.id;
        self.nodes.insert(id, node);
        Ok(id)
    }

    fn accumulate_gradient(&mut self, node_id: NodeId, grad: Tensor<T>) -> Result<(), String> {
        match self.gradients.remove(&node_id) {
            Some(existing_grad) => {
                let accumulated = existing_grad.add(&grad)?;
                self.gradients.insert(node_id, accumulated);
            }
            None => {
                self.gradients.insert(node_id, grad);
            }
        }
        Ok(())
    }

    /// Backpropagates from `loss_id` through the whole graph, accumulating
    /// gradients into every reachable node that requires them.
    pub fn backward(&mut self, loss_id: NodeId) -> Result<(), String> {
        if !self.training_mode {
            return Ok(());
        }

        let loss_tensor = self
            .get_tensor(loss_id)
            .ok_or_else(|| format!("Loss node {} not found", loss_id.0))?;
        let ones_grad = Tensor::ones(loss_tensor.shape());
        self.gradients.insert(loss_id, ones_grad);

        let mut visited = HashSet::new();
        let mut topo_order = Vec::new();
        self.topological_sort(loss_id, &mut visited, &mut topo_order);

        topo_order.reverse();

        for &node_id in &topo_order {
            self.backward_node(node_id)?;
        }

        Ok(())
    }

    /// Backward for a single node.
    fn backward_node(&mut self, node_id: NodeId) -> Result<(), String> {
        // Take ownership of the gradient data.
        let grad_output = match self.gradients.remove(&node_id) {
            Some(grad) => grad,
            None => return Ok(()),
        };

        let (op, input_ids, output) = {
            let node = self
                .nodes
                .get(&node_id)
                .ok_or_else(|| format!("Node {} not found", node_id.0))?;

            match &node.op {
                Some(op) => (op.clone_op(), node.inputs.clone(), node.tensor.clone()),
                None => {
                    // Leaf node. The gradient stops here.
                    self.gradients.insert(node_id, grad_output);
                    return Ok(());
                }
            }
        };

        let grad_fn = self.registry.lookup(op.name()).ok_or_else(|| {
            format!("No gradient registered for operation {}", op.name())
        })?;

        let input_grads = {
            let inputs: Vec<&Tensor<T>> = input_ids
                .iter()
                .map(|&input_id| {
                    self.get_tensor(input_id)
                        .ok_or_else(|| format!("Input node {} not found", input_id.0))
                })
                .collect::<Result<_, String>>()?;

            let ctx = GradientContext {
                op: op.as_ref(),
                inputs: &inputs,
                output: &output,
                grad_output: &grad_output,
            };
            grad_fn(&ctx)?
        };

        if input_grads.len() != input_ids.len() {
            return Err(format!(
                "Gradient for operation {} returned {} gradients for {} inputs",
                op.name(),
                input_grads.len(),
                input_ids.len()
            ));
        }

        for (input_id, input_grad) in input_ids.iter().zip(input_grads) {
            self.accumulate_gradient(*input_id, input_grad)?;
        }

        Ok(())
    }

    /// Topological sorting so gradients propagate parents-first.
    fn topological_sort(
        &self,
        node_id: NodeId,
        visited: &mut HashSet<NodeId>,
        topo_order: &mut Vec<NodeId>,
    ) {
        if visited.contains(&node_id) {
            return;
        }
        visited.insert(node_id);

        if let Some(node) = self.nodes.get(&node_id) {
            for &input_id in &node.inputs {
                self.topological_sort(input_id, visited, topo_order);
            }
        }

        topo_order.push(node_id);
    }
}
