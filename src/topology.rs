//! Fetches the topology graph the user picks junctions from.

use log::info;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use crate::components::graph_view::GraphData;
use crate::error::TopologyError;

fn request_error(value: JsValue) -> TopologyError {
	TopologyError::Request(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}

fn body_error(value: JsValue) -> TopologyError {
	TopologyError::Body(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}

/// Fetch `path` from the current origin and decode it as a topology payload.
pub async fn load(path: &str) -> Result<GraphData, TopologyError> {
	let window = web_sys::window().ok_or(TopologyError::NoWindow)?;

	let init = RequestInit::new();
	init.set_method("GET");
	init.set_mode(RequestMode::SameOrigin);
	let request = Request::new_with_str_and_init(path, &init).map_err(request_error)?;

	let response: Response = JsFuture::from(window.fetch_with_request(&request))
		.await
		.map_err(request_error)?
		.dyn_into()
		.map_err(request_error)?;
	if !response.ok() {
		return Err(TopologyError::Status(response.status()));
	}

	let text = JsFuture::from(response.text().map_err(body_error)?)
		.await
		.map_err(body_error)?
		.as_string()
		.ok_or_else(|| TopologyError::Body("response body is not text".into()))?;

	let data = parse(&text)?;
	info!(
		"Loaded topology from {}: {} nodes, {} edges",
		path,
		data.nodes.len(),
		data.edges.len()
	);
	Ok(data)
}

/// Decode a `{ "nodes": [...], "edges": [...] }` document.
pub fn parse(text: &str) -> Result<GraphData, TopologyError> {
	Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_nodes_and_edges_ignoring_extra_fields() {
		let data = parse(
			r#"{
				"nodes": [
					{ "id": "nersc-mr2", "label": "nersc-mr2", "group": "router", "title": "x" },
					{ "id": "star-cr5" }
				],
				"edges": [
					{ "id": "e1", "from": "nersc-mr2", "to": "star-cr5", "value": 100 },
					{ "from": "star-cr5", "to": "nersc-mr2" }
				]
			}"#,
		)
		.unwrap();

		assert_eq!(data.nodes.len(), 2);
		assert_eq!(data.nodes[0].group.as_deref(), Some("router"));
		assert_eq!(data.nodes[1].label, None);
		assert_eq!(data.edges[0].key(), "e1");
		assert_eq!(data.edges[1].key(), "star-cr5 -- nersc-mr2");
	}

	#[test]
	fn missing_sections_default_to_empty() {
		let data = parse("{}").unwrap();
		assert!(data.nodes.is_empty());
		assert!(data.edges.is_empty());
	}

	#[test]
	fn malformed_payload_is_a_parse_error() {
		assert!(matches!(parse("<html>"), Err(TopologyError::Parse(_))));
		assert!(matches!(
			parse(r#"{ "nodes": [ { "label": "no id" } ] }"#),
			Err(TopologyError::Parse(_))
		));
	}
}
