use leptos::prelude::*;

use crate::components::force_graph::ForceGraphCanvas;
use crate::config::DiagramConfig;
use crate::error::Result;
use crate::graph::Graph;
use crate::pipeline::RunContext;

/// Random tree with a degree-based `centrality`, ten communities and names.
fn generate_sample_graph(n: usize) -> Graph {
	let mut graph = Graph::new();
	let nodes: Vec<_> = (0..n).map(|i| graph.add_node(i.to_string())).collect();
	for i in 1..n {
		let target = (rand_simple(i) * i as f64) as usize;
		graph.add_edge(nodes[i], nodes[target], 1.0);
	}
	for (i, &idx) in nodes.iter().enumerate() {
		let degree = graph.degree(idx) as f64;
		graph.set_attr(idx, "centrality", degree);
		graph.set_attr(idx, "community", format!("group {}", i % 10));
		graph.set_attr(idx, "name", format!("Node {i}"));
	}
	graph
}

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

fn sample_config() -> DiagramConfig {
	let mut config = DiagramConfig::default();
	config.style.min_node_size = 6.0;
	config.style.max_node_size = 30.0;
	config.style.label_percentile = 90.0;
	config.palette.count = 9;
	config
}

/// Filters and styles the sample graph; the canvas runs the layout live.
fn sample_diagram() -> Result<(Graph, DiagramConfig)> {
	let config = sample_config();
	let mut ctx = RunContext::new(&config, generate_sample_graph(150))?;
	ctx.prepare()?;
	let graph = ctx.graph;
	Ok((graph, config))
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>
			{move || {
				sample_diagram()
					.map(|(graph, config)| {
						let graph = Signal::derive(move || graph.clone());
						view! {
							<div class="fullscreen-graph">
								<ForceGraphCanvas graph=graph config=config fullscreen=true />
								<div class="graph-overlay">
									<h1>"Force Diagram"</h1>
									<p class="subtitle">"Scroll to zoom. Drag to pan."</p>
								</div>
							</div>
						}
					})
			}}
		</ErrorBoundary>
	}
}
