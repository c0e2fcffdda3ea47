//! Force-directed layout on top of the `force_graph` engine.
//!
//! The two algorithm choices differ only in how their tuning knobs map onto
//! [`SimulationParameters`]; both run the same engine. Gravity has no engine
//! counterpart and is applied after every step as a pull toward the origin.

mod label_adjust;

use std::f64::consts::PI;
use std::fmt;
use std::time::{Duration, Instant};

use force_graph::{EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::{debug, info};

use crate::graph::{Graph, NodeIndex};

pub use label_adjust::{LabelAdjustRun, LabelBox, adjust_labels, label_box};

/// Simulated seconds per engine step.
pub const STEP_SECONDS: f32 = 0.016;

/// Radius of the circle nodes start on when the graph has no positions yet.
const INITIAL_RADIUS: f64 = 100.0;
const BASE_MASS: f32 = 10.0;
const BASE_CHARGE: f32 = 150.0;
const BASE_SPRING: f32 = 0.05;
const BASE_SPEED: f32 = 3000.0;
const BASE_DAMPING: f32 = 0.9;
/// Fraction of the distance to the origin removed per simulated second at
/// gravity 1.
const GRAVITY_PULL: f32 = 0.05;

/// Layout algorithm with its tuning knobs. Non-positive knobs keep the
/// algorithm default.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LayoutAlgorithm {
	/// ForceAtlas: fixed attraction, repulsion from the scaling ratio.
	ForceAtlas {
		/// Pull toward the origin.
		gravity: f64,
		/// Repulsion is 100 times this.
		scaling_ratio: f64,
		/// Node speed multiplier.
		speed: f64,
		/// Fraction of velocity lost per step.
		inertia: f64,
	},
	/// ForceAtlas2: repulsion scaled directly, damping from the jitter
	/// tolerance.
	ForceAtlas2 {
		/// Pull toward the origin.
		gravity: f64,
		/// Repulsion relative to the default of 5.
		scaling_ratio: f64,
		/// Higher values damp less.
		jitter_tolerance: f64,
	},
}

impl Default for LayoutAlgorithm {
	fn default() -> Self {
		Self::ForceAtlas2 {
			gravity: 1.0,
			scaling_ratio: 5.0,
			jitter_tolerance: 1.0,
		}
	}
}

impl fmt::Display for LayoutAlgorithm {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::ForceAtlas { .. } => "force_atlas",
			Self::ForceAtlas2 { .. } => "force_atlas2",
		})
	}
}

/// Value of a [`LayoutProperty`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PropertyValue {
	/// An on/off switch.
	Bool(bool),
	/// A numeric knob.
	Number(f64),
}

/// A named tuning knob as the layout algorithm knows it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutProperty {
	/// camelCase knob name.
	pub name: &'static str,
	/// Knob setting.
	pub value: PropertyValue,
}

impl LayoutProperty {
	fn number(name: &'static str, value: f64) -> Self {
		Self {
			name,
			value: PropertyValue::Number(value),
		}
	}

	fn flag(name: &'static str, value: bool) -> Self {
		Self {
			name,
			value: PropertyValue::Bool(value),
		}
	}
}

impl LayoutAlgorithm {
	/// Tuning properties in the order they are applied. Non-positive
	/// optional knobs are left at the algorithm default and not listed.
	pub fn properties(&self) -> Vec<LayoutProperty> {
		let mut props = vec![LayoutProperty::flag("adjustSizes", true)];
		let optional = match *self {
			Self::ForceAtlas2 {
				gravity,
				scaling_ratio,
				jitter_tolerance,
			} => [
				("gravity", gravity),
				("scalingRatio", scaling_ratio),
				("jitterTolerance", jitter_tolerance),
			],
			Self::ForceAtlas {
				gravity,
				scaling_ratio,
				speed,
				inertia,
			} => {
				props.push(LayoutProperty::number("attractionStrength", 10.0));
				props.push(LayoutProperty::number(
					"repulsionStrength",
					10.0 * 10.0 * scaling_ratio,
				));
				[("gravity", gravity), ("speed", speed), ("inertia", inertia)]
			}
		};
		props.extend(
			optional
				.into_iter()
				.filter(|&(_, value)| value > 0.0)
				.map(|(name, value)| LayoutProperty::number(name, value)),
		);
		props
	}

	/// Engine parameters derived from [`Self::properties`].
	pub fn simulation_parameters(&self) -> SimulationParameters {
		let mut params = SimulationParameters {
			force_charge: BASE_CHARGE,
			force_spring: BASE_SPRING,
			force_max: 100.0,
			node_speed: BASE_SPEED,
			damping_factor: BASE_DAMPING,
		};
		let is_atlas2 = matches!(self, Self::ForceAtlas2 { .. });
		for prop in self.properties() {
			let PropertyValue::Number(value) = prop.value else {
				continue;
			};
			let value = value as f32;
			match prop.name {
				"scalingRatio" => params.force_charge = BASE_CHARGE * value / 5.0,
				"repulsionStrength" => params.force_charge = BASE_CHARGE * value / 500.0,
				"attractionStrength" => params.force_spring = BASE_SPRING * value / 10.0,
				"jitterTolerance" if is_atlas2 => {
					params.damping_factor = (1.0 - 0.1 / value).clamp(0.0, 0.99)
				}
				"speed" => params.node_speed = BASE_SPEED * value,
				"inertia" => params.damping_factor = (1.0 - value).clamp(0.0, 0.99),
				_ => {}
			}
		}
		params
	}

	/// Gravity knob, clamped at zero.
	pub fn gravity(&self) -> f64 {
		match *self {
			Self::ForceAtlas { gravity, .. } | Self::ForceAtlas2 { gravity, .. } => gravity.max(0.0),
		}
	}
}

/// How long a layout or label-adjust stage may run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutBudget {
	/// Wall-clock limit.
	pub duration: Duration,
	/// Caps the number of steps regardless of the wall clock.
	pub max_steps: Option<usize>,
}

impl LayoutBudget {
	/// A budget limited by time only.
	pub fn new(duration: Duration) -> Self {
		Self {
			duration,
			max_steps: None,
		}
	}

	/// Adds or clears the step cap.
	pub fn with_max_steps(mut self, max_steps: Option<usize>) -> Self {
		self.max_steps = max_steps;
		self
	}

	/// Whether a stage that started at `start` and made `steps` steps is done.
	pub(crate) fn spent(&self, start: Instant, steps: usize) -> bool {
		self.max_steps.is_some_and(|max| steps >= max) || start.elapsed() >= self.duration
	}
}

/// Outcome of [`run_layout`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayoutRun {
	/// Engine steps taken.
	pub steps: usize,
	/// Wall-clock time spent.
	pub elapsed: Duration,
}

/// Engine state for one graph. Each engine node carries the index of the
/// graph node it mirrors.
pub struct Simulation {
	engine: ForceGraph<NodeIndex, ()>,
	gravity: f32,
	steps: usize,
}

impl Simulation {
	/// Loads `graph` into the engine. Existing positions are kept; a graph
	/// with none starts on a circle. Self-loops are left out.
	pub fn new(graph: &Graph, algorithm: &LayoutAlgorithm) -> Self {
		let mut engine = ForceGraph::new(algorithm.simulation_parameters());
		let placed = graph.nodes().any(|(_, n)| n.x != 0.0 || n.y != 0.0);
		let count = graph.node_count().max(1) as f64;

		let mut handles = std::collections::HashMap::with_capacity(graph.node_count());
		for (i, (idx, node)) in graph.nodes().enumerate() {
			let (x, y) = if placed {
				(node.x, node.y)
			} else {
				let angle = i as f64 * 2.0 * PI / count;
				(INITIAL_RADIUS * angle.cos(), INITIAL_RADIUS * angle.sin())
			};
			let handle = engine.add_node(NodeData {
				x: x as f32,
				y: y as f32,
				// adjustSizes: bigger nodes push harder and move slower.
				mass: BASE_MASS + node.visual.size as f32,
				is_anchor: false,
				user_data: idx,
			});
			handles.insert(idx, handle);
		}
		for edge in graph.edges() {
			if edge.source == edge.target {
				continue;
			}
			if let (Some(&src), Some(&tgt)) = (handles.get(&edge.source), handles.get(&edge.target)) {
				engine.add_edge(src, tgt, EdgeData::default());
			}
		}

		Self {
			engine,
			gravity: algorithm.gravity() as f32,
			steps: 0,
		}
	}

	/// Advances the simulation by `dt` seconds, then applies gravity.
	pub fn step(&mut self, dt: f32) {
		self.engine.update(dt);
		if self.gravity > 0.0 {
			let pull = (self.gravity * GRAVITY_PULL * dt).min(1.0);
			self.engine.visit_nodes_mut(|node| {
				if !node.data.is_anchor {
					node.data.x -= node.data.x * pull;
					node.data.y -= node.data.y * pull;
				}
			});
		}
		self.steps += 1;
	}

	/// Steps taken so far.
	pub fn steps(&self) -> usize {
		self.steps
	}

	/// Calls `f` with every node's index and current position.
	pub fn visit_positions(&self, mut f: impl FnMut(NodeIndex, f64, f64)) {
		self.engine.visit_nodes(|node| {
			f(node.data.user_data, node.x() as f64, node.y() as f64);
		});
	}

	/// Endpoints of every simulated edge.
	pub fn visit_edges(&self, mut f: impl FnMut((f64, f64), (f64, f64))) {
		self.engine.visit_edges(|n1, n2, _| {
			f((n1.x() as f64, n1.y() as f64), (n2.x() as f64, n2.y() as f64));
		});
	}

	/// Copies simulated positions onto the graph's nodes.
	pub fn write_back(&self, graph: &mut Graph) {
		self.visit_positions(|idx, x, y| {
			if let Some(node) = graph.node_mut(idx) {
				node.x = x;
				node.y = y;
			}
		});
	}
}

/// Runs `algorithm` on `graph` until the budget is spent and stores the
/// final positions on the nodes.
pub fn run_layout(graph: &mut Graph, algorithm: &LayoutAlgorithm, budget: &LayoutBudget) -> LayoutRun {
	let start = Instant::now();
	if graph.node_count() == 0 {
		return LayoutRun::default();
	}
	debug!("layout properties: {:?}", algorithm.properties());
	let mut sim = Simulation::new(graph, algorithm);
	while !budget.spent(start, sim.steps()) {
		sim.step(STEP_SECONDS);
	}
	sim.write_back(graph);
	let run = LayoutRun {
		steps: sim.steps(),
		elapsed: start.elapsed(),
	};
	info!(
		"{algorithm} layout ran {} steps in {:.1}s",
		run.steps,
		run.elapsed.as_secs_f64()
	);
	run
}

#[cfg(test)]
mod tests {
	use super::*;

	fn names(algorithm: LayoutAlgorithm) -> Vec<&'static str> {
		algorithm.properties().iter().map(|p| p.name).collect()
	}

	fn ring(n: usize) -> Graph {
		let mut graph = Graph::new();
		let nodes: Vec<_> = (0..n).map(|i| graph.add_node(i.to_string())).collect();
		for i in 0..n {
			graph.add_edge(nodes[i], nodes[(i + 1) % n], 1.0);
		}
		graph
	}

	fn steps_only(steps: usize) -> LayoutBudget {
		LayoutBudget::new(Duration::from_secs(60)).with_max_steps(Some(steps))
	}

	#[test]
	fn atlas2_lists_positive_knobs() {
		assert_eq!(
			names(LayoutAlgorithm::default()),
			["adjustSizes", "gravity", "scalingRatio", "jitterTolerance"]
		);
		let no_gravity = LayoutAlgorithm::ForceAtlas2 {
			gravity: 0.0,
			scaling_ratio: 2.0,
			jitter_tolerance: -1.0,
		};
		assert_eq!(names(no_gravity), ["adjustSizes", "scalingRatio"]);
	}

	#[test]
	fn atlas_derives_repulsion_from_scaling() {
		let algorithm = LayoutAlgorithm::ForceAtlas {
			gravity: 1.0,
			scaling_ratio: 5.0,
			speed: 1.0,
			inertia: 0.1,
		};
		let props = algorithm.properties();
		assert_eq!(
			props.iter().map(|p| p.name).collect::<Vec<_>>(),
			[
				"adjustSizes",
				"attractionStrength",
				"repulsionStrength",
				"gravity",
				"speed",
				"inertia"
			]
		);
		assert_eq!(props[2].value, PropertyValue::Number(500.0));
	}

	#[test]
	fn defaults_map_to_engine_baseline() {
		let params = LayoutAlgorithm::default().simulation_parameters();
		assert!((params.force_charge - BASE_CHARGE).abs() < 1e-3);
		assert!((params.damping_factor - 0.9).abs() < 1e-6);

		let atlas = LayoutAlgorithm::ForceAtlas {
			gravity: 1.0,
			scaling_ratio: 5.0,
			speed: 2.0,
			inertia: 0.1,
		}
		.simulation_parameters();
		assert!((atlas.force_charge - BASE_CHARGE).abs() < 1e-3);
		assert!((atlas.force_spring - BASE_SPRING).abs() < 1e-6);
		assert!((atlas.node_speed - 2.0 * BASE_SPEED).abs() < 1e-3);
		assert!((atlas.damping_factor - 0.9).abs() < 1e-6);
	}

	#[test]
	fn step_cap_bounds_run() {
		let mut graph = ring(12);
		let run = run_layout(&mut graph, &LayoutAlgorithm::default(), &steps_only(25));
		assert_eq!(run.steps, 25);
		assert!(graph.nodes().all(|(_, n)| n.x.is_finite() && n.y.is_finite()));
		assert!(graph.nodes().any(|(_, n)| n.x != 0.0 || n.y != 0.0));
	}

	#[test]
	fn empty_graph_is_noop() {
		let mut graph = Graph::new();
		let run = run_layout(&mut graph, &LayoutAlgorithm::default(), &steps_only(10));
		assert_eq!(run.steps, 0);
	}

	#[test]
	fn zero_duration_runs_no_steps() {
		let mut graph = ring(4);
		let budget = LayoutBudget::new(Duration::ZERO);
		let run = run_layout(&mut graph, &LayoutAlgorithm::default(), &budget);
		assert_eq!(run.steps, 0);
	}

	#[test]
	fn weakly_connected_nodes_end_on_periphery() {
		const CORE: usize = 100;
		const OUTLIERS: usize = 10;
		let mut graph = Graph::new();
		let core: Vec<_> = (0..CORE).map(|i| graph.add_node(i.to_string())).collect();
		for &a in &core {
			for &b in &core {
				if a != b {
					graph.add_edge(a, b, 1.0);
				}
			}
		}
		let outliers: Vec<_> = (CORE..CORE + OUTLIERS)
			.map(|i| graph.add_node(i.to_string()))
			.collect();
		for &outlier in &outliers {
			for &anchor in &core[..3] {
				graph.add_edge(outlier, anchor, 1.0);
				graph.add_edge(anchor, outlier, 1.0);
			}
		}

		run_layout(&mut graph, &LayoutAlgorithm::default(), &steps_only(400));

		let mean_distance = |nodes: &[NodeIndex]| {
			nodes
				.iter()
				.map(|&idx| {
					let node = graph.node(idx).unwrap();
					node.x.hypot(node.y)
				})
				.sum::<f64>()
				/ nodes.len() as f64
		};
		let (core_mean, outlier_mean) = (mean_distance(&core), mean_distance(&outliers));
		assert!(
			core_mean + 100.0 < outlier_mean,
			"core {core_mean:.1}, outliers {outlier_mean:.1}"
		);
	}

	#[test]
	fn gravity_contracts_isolated_nodes() {
		let mut graph = Graph::new();
		let a = graph.add_node("a");
		let b = graph.add_node("b");
		for (idx, x) in [(a, 400.0), (b, -400.0)] {
			let node = graph.node_mut(idx).unwrap();
			node.x = x;
			node.y = 0.0;
		}
		let strong = LayoutAlgorithm::ForceAtlas2 {
			gravity: 50.0,
			scaling_ratio: 0.01,
			jitter_tolerance: 1.0,
		};
		run_layout(&mut graph, &strong, &steps_only(50));
		assert!(graph.node(a).unwrap().x.abs() < 400.0);
		assert!(graph.node(b).unwrap().x.abs() < 400.0);
	}
}
