//! System tree and world stepping
//!
//! A [`World`] owns an arena of [`SystemNode`]s, one per gravitationally
//! dominant body, plus flat registries for free rigid bodies and particle
//! systems. Nodes address each other through stable [`NodeId`] indices, so
//! subtree deletion never invalidates surviving handles.
//!
//! Stepping is depth-first with the parent strictly before its children: a
//! child's analytic position is an offset from the parent's freshly updated
//! absolute position. Within one node the bound rigid bodies are integrated
//! first, against the node's pre-update position.
//!
//! Exact analytic solves are expensive next to a linear coast, so each
//! non-root body re-fixes only every `fixation_period` ticks and coasts on
//! the chord velocity in between; the periodic re-fix keeps the coast from
//! drifting.

use crate::body::AstroBody;
use crate::clock::SimClock;
use crate::error::SimError;
use crate::gravity::compute_gravity;
use crate::handles::{ParticleSystem, RenderRef};
use crate::rigid::{RigidBody, RigidBodyIntegrator, SemiImplicitEuler};
use nalgebra::Vector3;
use orrery_core::coordinates::LargeWorldCoord;

/// Stable handle to a system node in the world arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Stable handle to a rigid body in the world registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RigidId(usize);

/// One orbit in the hierarchy: a dominant body, the sub-orbits inside its
/// gravity well, and the free rigid bodies currently bound to it.
pub struct SystemNode {
    pub name: String,
    /// None only at the root
    pub parent: Option<NodeId>,
    pub body: AstroBody,
    /// Orbital period around the parent, seconds
    pub orbital_period: f64,
    /// Sub-orbits, in insertion order
    pub children: Vec<NodeId>,
    /// Free rigid bodies currently orbiting here
    pub rigid_bodies: Vec<RigidId>,
    /// Drawable for the orbital path, re-based on the parent each tick
    pub orbit_path: Option<RenderRef>,
}

pub struct World {
    pub name: String,
    nodes: Vec<Option<SystemNode>>,
    free_nodes: Vec<usize>,
    root: NodeId,
    rigids: Vec<Option<RigidBody>>,
    free_rigids: Vec<usize>,
    particles: Vec<Box<dyn ParticleSystem>>,
    clock: SimClock,
    integrator: Box<dyn RigidBodyIntegrator>,
}

impl World {
    /// Create a world around its root body. The root is pinned to the
    /// coordinate-frame origin and never orbits anything.
    pub fn new(name: &str, root_body: AstroBody) -> Self {
        let root_node = SystemNode {
            name: root_body.name.clone(),
            parent: None,
            body: root_body,
            orbital_period: 0.0,
            children: Vec::new(),
            rigid_bodies: Vec::new(),
            orbit_path: None,
        };

        Self {
            name: name.to_owned(),
            nodes: vec![Some(root_node)],
            free_nodes: Vec::new(),
            root: NodeId(0),
            rigids: Vec::new(),
            free_rigids: Vec::new(),
            particles: Vec::new(),
            clock: SimClock::new(),
            integrator: Box::new(SemiImplicitEuler),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&SystemNode> {
        self.nodes.get(id.0).and_then(|slot| slot.as_ref())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SystemNode> {
        self.nodes.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    pub fn rigid(&self, id: RigidId) -> Option<&RigidBody> {
        self.rigids.get(id.0).and_then(|slot| slot.as_ref())
    }

    pub fn rigid_mut(&mut self, id: RigidId) -> Option<&mut RigidBody> {
        self.rigids.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut SimClock {
        &mut self.clock
    }

    /// Live node count (vacated slots excluded).
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn rigid_count(&self) -> usize {
        self.rigids.iter().filter(|slot| slot.is_some()).count()
    }

    /// Replace the rigid-body integrator collaborator.
    pub fn set_integrator(&mut self, integrator: Box<dyn RigidBodyIntegrator>) {
        self.integrator = integrator;
    }

    pub fn add_particle_system(&mut self, particles: Box<dyn ParticleSystem>) {
        self.particles.push(particles);
    }

    /// Append a sub-orbit under `parent` and sync its position to the
    /// current simulation time.
    pub fn add_child_system(
        &mut self,
        parent: NodeId,
        body: AstroBody,
        orbital_period: f64,
    ) -> Result<NodeId, SimError> {
        if self.node(parent).is_none() {
            return Err(SimError::Configuration(format!(
                "parent node {:?} does not exist",
                parent
            )));
        }

        let node = SystemNode {
            name: body.name.clone(),
            parent: Some(parent),
            body,
            orbital_period,
            children: Vec::new(),
            rigid_bodies: Vec::new(),
            orbit_path: None,
        };
        let id = self.alloc_node(node);

        if let Some(parent_node) = self.nodes[parent.0].as_mut() {
            parent_node.children.push(id);
        }
        self.set_current_position(id);
        Ok(id)
    }

    /// Register a rigid body and bind it to the node it currently orbits.
    /// The registry owns the body; the node only references it.
    pub fn add_rigid_body(&mut self, node: NodeId, body: RigidBody) -> Result<RigidId, SimError> {
        if self.node(node).is_none() {
            return Err(SimError::Configuration(format!(
                "node {:?} does not exist",
                node
            )));
        }

        let id = match self.free_rigids.pop() {
            Some(slot) => {
                self.rigids[slot] = Some(body);
                RigidId(slot)
            }
            None => {
                self.rigids.push(Some(body));
                RigidId(self.rigids.len() - 1)
            }
        };

        if let Some(node) = self.nodes[node.0].as_mut() {
            node.rigid_bodies.push(id);
        }
        Ok(id)
    }

    /// Resolve a slash-delimited path like "Sol/Earth/Luna". The first
    /// segment must equal the root's name; each further segment is matched
    /// case-sensitively against the current node's children in order.
    pub fn lookup(&self, path: &str) -> Option<NodeId> {
        let mut segments = path.split('/');
        let first = segments.next()?;

        let root = self.node(self.root)?;
        if first != root.name {
            return None;
        }

        let mut current = self.root;
        for segment in segments {
            let node = self.node(current)?;
            current = *node
                .children
                .iter()
                .find(|child| self.node(**child).is_some_and(|n| n.name == segment))?;
        }
        Some(current)
    }

    /// Current absolute position of the body at `path`, meters.
    pub fn body_position(&self, path: &str) -> Option<Vector3<f64>> {
        let node = self.node(self.lookup(path)?)?;
        Some(node.body.global_position())
    }

    /// Current velocity of the body at `path`, m/s. The root is at rest in
    /// its own frame; orbiting bodies report the analytic estimate.
    pub fn body_velocity(&self, path: &str) -> Option<Vector3<f64>> {
        let node = self.node(self.lookup(path)?)?;
        let elements = match &node.body.elements {
            Some(elements) => elements,
            None => return Some(Vector3::zeros()),
        };
        let parent = self.node(node.parent?)?;
        let gm = parent.body.gm + node.body.gm;
        Some(elements.velocity_estimate(gm, self.clock.seconds()))
    }

    /// All slash-delimited body paths, depth-first from the root.
    pub fn body_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_paths(self.root, "", &mut paths);
        paths
    }

    fn collect_paths(&self, id: NodeId, prefix: &str, out: &mut Vec<String>) {
        let Some(node) = self.node(id) else { return };
        let path = if prefix.is_empty() {
            node.name.clone()
        } else {
            format!("{}/{}", prefix, node.name)
        };
        out.push(path.clone());
        for child in &node.children {
            self.collect_paths(*child, &path, out);
        }
    }

    /// Advance the whole world by `dt` seconds: one atomic tick.
    pub fn step(&mut self, dt: f64) {
        self.clock.advance(dt);
        let t = self.clock.seconds();

        self.clear_forces();
        self.step_node(self.root, t, dt);
        self.push_render_state();

        for particles in &mut self.particles {
            particles.step(dt);
        }
    }

    /// Zero every rigid body's force and torque accumulators.
    pub fn clear_forces(&mut self) {
        for rigid in self.rigids.iter_mut().flatten() {
            rigid.clear_forces();
        }
    }

    /// Re-sync every node to the exact analytic position for the current
    /// simulation time. Call after construction or a clock jump.
    pub fn init(&mut self) {
        self.init_node(self.root);
    }

    fn init_node(&mut self, id: NodeId) {
        self.set_current_position(id);
        let children = match self.node(id) {
            Some(node) => node.children.clone(),
            None => return,
        };
        for child in children {
            self.init_node(child);
        }
    }

    /// Place one node exactly on its analytic orbit at the current time and
    /// force a re-fix on the next tick. No-op at the root.
    pub fn set_current_position(&mut self, id: NodeId) {
        let t = self.clock.seconds();

        let Some((parent_gm, parent_pos)) = self.parent_state(id) else {
            return;
        };
        let Some(node) = self.nodes[id.0].as_mut() else {
            return;
        };

        let gm = parent_gm + node.body.gm;
        let offset = match node.body.elements.as_ref() {
            Some(elements) => elements.position_at(gm, t),
            None => {
                tracing::warn!(name = %node.name, "non-root body without orbital elements, skipping");
                return;
            }
        };

        node.body.position = parent_pos;
        node.body.position.translate(offset);
        node.body.orientation = node.body.sidereal_orientation_at(t);
        node.body.fixation = 0;
    }

    /// Remove a node and every descendant. Slots return to the free list;
    /// sibling subtrees and their ids are untouched. The root cannot be
    /// removed — dropping the world releases it.
    pub fn remove_subtree(&mut self, id: NodeId) {
        if id == self.root {
            return;
        }
        if let Some(parent) = self.node(id).and_then(|node| node.parent) {
            if let Some(parent_node) = self.nodes[parent.0].as_mut() {
                parent_node.children.retain(|child| *child != id);
            }
        }
        self.release_subtree(id);
    }

    fn release_subtree(&mut self, id: NodeId) {
        let Some(node) = self.nodes[id.0].take() else {
            return;
        };
        self.free_nodes.push(id.0);
        for child in node.children {
            self.release_subtree(child);
        }
    }

    fn alloc_node(&mut self, node: SystemNode) -> NodeId {
        match self.free_nodes.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                NodeId(slot)
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    /// Parent GM and position, or None at the root.
    fn parent_state(&self, id: NodeId) -> Option<(f64, LargeWorldCoord)> {
        let parent = self.node(id)?.parent?;
        let parent_node = self.node(parent)?;
        Some((parent_node.body.gm, parent_node.body.position))
    }

    fn step_node(&mut self, id: NodeId, t: f64, dt: f64) {
        // 1. Gravity on the bound rigid bodies, from this node's body and
        //    its parent's, evaluated at the node's pre-update position, then
        //    one delegated integration step each
        let (parent, rigid_ids) = match self.node(id) {
            Some(node) => (node.parent, node.rigid_bodies.clone()),
            None => return,
        };

        for rigid_id in rigid_ids {
            let (target_pos, target_mass) = match self.rigids[rigid_id.0].as_ref() {
                Some(rigid) => (rigid.position, rigid.mass),
                None => continue,
            };

            let mut force = match self.node(id) {
                Some(node) => compute_gravity(&node.body, &target_pos, target_mass),
                None => continue,
            };
            if let Some(parent_node) = parent.and_then(|p| self.node(p)) {
                force += compute_gravity(&parent_node.body, &target_pos, target_mass);
            }

            if let Some(rigid) = self.rigids[rigid_id.0].as_mut() {
                rigid.apply_force(force);
                self.integrator.step(rigid, dt);
            }
        }

        // 2. The node's own fixation update
        self.update_node_position(id, t, dt);

        // 3. Children, in child-list order
        let children = match self.node(id) {
            Some(node) => node.children.clone(),
            None => return,
        };
        for child in children {
            self.step_node(child, t, dt);
        }
    }

    /// The fixation state machine. The root has no parent and returns
    /// immediately: it is pinned to the frame origin.
    fn update_node_position(&mut self, id: NodeId, t: f64, dt: f64) {
        let Some((parent_gm, parent_pos)) = self.parent_state(id) else {
            return;
        };
        let Some(node) = self.nodes[id.0].as_mut() else {
            return;
        };

        if node.body.fixation > 0 {
            // Coast: linear extrapolation along the chord velocity
            let delta = node.body.velocity * dt;
            node.body.position.translate(delta);
            node.body.orientation = node.body.sidereal_orientation_at(t);
            node.body.fixation -= 1;
        } else {
            // Re-fix: exact solve now and one fixation window ahead; the
            // chord between them is the coast velocity until the next fix
            let gm = parent_gm + node.body.gm;
            let window = node.body.fixation_period as f64 * dt;
            let (now_pos, ahead_pos) = match node.body.elements.as_ref() {
                Some(elements) => (
                    elements.position_at(gm, t),
                    elements.position_at(gm, t + window),
                ),
                None => {
                    tracing::warn!(name = %node.name, "non-root body without orbital elements, skipping");
                    return;
                }
            };

            node.body.velocity = (ahead_pos - now_pos) / window;
            node.body.position = parent_pos;
            node.body.position.translate(now_pos);
            node.body.orientation = node.body.sidereal_orientation_at(t);
            node.body.fixation = node.body.fixation_period;
        }
    }

    /// Push updated positions and orientations out through the render
    /// handles: astro bodies, their lights, orbit paths, then the rigid
    /// bodies.
    fn push_render_state(&self) {
        self.push_node_render(self.root);

        for rigid in self.rigids.iter().flatten() {
            if let Some(handle) = &rigid.render {
                let mut handle = handle.borrow_mut();
                handle.set_position(&rigid.position);
                handle.set_orientation(&rigid.orientation);
            }
        }
    }

    fn push_node_render(&self, id: NodeId) {
        let Some(node) = self.node(id) else { return };

        if let Some(light) = &node.body.light {
            light.borrow_mut().set_position(&node.body.position);
        }
        if let Some(handle) = &node.body.render {
            let mut handle = handle.borrow_mut();
            handle.set_orientation(&node.body.orientation);
            handle.set_position(&node.body.position);
        }
        // The orbit path is drawn around the orbited body
        if let (Some(parent), Some(path)) = (node.parent, &node.orbit_path) {
            if let Some(parent_node) = self.node(parent) {
                path.borrow_mut().set_position(&parent_node.body.position);
            }
        }

        for child in &node.children {
            self.push_node_render(*child);
        }
    }
}
