//! App configuration.
//!
//! Defaults reproduce the stock layout. A host page may override any field by
//! embedding a JSON document:
//!
//! ```html
//! <script id="app-config" type="application/json">
//!   { "topology_path": "/viz/topology/multilayer", "sandbox": { "height": 400 } }
//! </script>
//! ```
//!
//! Nested option blocks fall back to [`GraphOptions::default`] for the fields
//! they leave out.

use log::{info, warn};
use serde::Deserialize;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

use crate::error::ConfigError;

pub const CONFIG_ELEMENT_ID: &str = "app-config";
pub const DEFAULT_TOPOLOGY_PATH: &str = "/viz/topology/multilayer";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
	pub topology_path: String,
	pub network: GraphOptions,
	pub sandbox: GraphOptions,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			topology_path: DEFAULT_TOPOLOGY_PATH.into(),
			network: GraphOptions::network(),
			sandbox: GraphOptions::sandbox(),
		}
	}
}

impl AppConfig {
	pub fn parse(json: &str) -> Result<Self, ConfigError> {
		Ok(serde_json::from_str(json)?)
	}

	/// Read the embedded config, falling back to defaults when it is absent
	/// or malformed.
	pub fn load() -> Self {
		let Some(json) = embedded_config() else {
			return Self::default();
		};
		match Self::parse(&json) {
			Ok(config) => {
				info!("Loaded app config from #{}", CONFIG_ELEMENT_ID);
				config
			}
			Err(e) => {
				warn!("Ignoring app config: {}", e);
				Self::default()
			}
		}
	}
}

fn embedded_config() -> Option<String> {
	let window: Window = web_sys::window()?;
	let element = window.document()?.get_element_by_id(CONFIG_ELEMENT_ID)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Rendering and interaction options for one graph view.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GraphOptions {
	/// Canvas height in CSS pixels. Width follows the parent element.
	pub height: f64,
	pub interaction: InteractionOptions,
	pub physics: PhysicsOptions,
	pub nodes: NodeStyle,
	pub manipulation: ManipulationOptions,
}

impl Default for GraphOptions {
	fn default() -> Self {
		Self {
			height: 400.0,
			interaction: InteractionOptions::default(),
			physics: PhysicsOptions::default(),
			nodes: NodeStyle::default(),
			manipulation: ManipulationOptions::default(),
		}
	}
}

impl GraphOptions {
	/// Read-only topology map.
	pub fn network() -> Self {
		Self {
			height: 450.0,
			interaction: InteractionOptions {
				hover: false,
				navigation_buttons: true,
				..InteractionOptions::default()
			},
			..Self::default()
		}
	}

	/// Editable draft reservation.
	pub fn sandbox() -> Self {
		Self {
			height: 300.0,
			interaction: InteractionOptions {
				select_connected_edges: false,
				..InteractionOptions::default()
			},
			manipulation: ManipulationOptions {
				enabled: true,
				add_edge: true,
				delete_edge: true,
				delete_node: true,
			},
			..Self::default()
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct InteractionOptions {
	pub hover: bool,
	pub navigation_buttons: bool,
	pub zoom_view: bool,
	pub drag_view: bool,
	/// Selecting a node also selects the edges touching it.
	pub select_connected_edges: bool,
	/// Ctrl/Cmd/Shift-click adds to the selection instead of replacing it.
	pub multiselect: bool,
}

impl Default for InteractionOptions {
	fn default() -> Self {
		Self {
			hover: true,
			navigation_buttons: false,
			zoom_view: true,
			drag_view: true,
			select_connected_edges: true,
			multiselect: true,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PhysicsOptions {
	/// Settle the layout before the first frame is drawn.
	pub stabilization: bool,
	pub charge: f32,
	pub spring: f32,
	pub damping: f32,
}

impl Default for PhysicsOptions {
	fn default() -> Self {
		Self {
			stabilization: true,
			charge: 150.0,
			spring: 0.05,
			damping: 0.9,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct NodeStyle {
	pub background: String,
}

impl Default for NodeStyle {
	fn default() -> Self {
		Self {
			background: "white".into(),
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ManipulationOptions {
	pub enabled: bool,
	pub add_edge: bool,
	pub delete_edge: bool,
	pub delete_node: bool,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_match_stock_layout() {
		let config = AppConfig::default();
		assert_eq!(config.topology_path, "/viz/topology/multilayer");
		assert_eq!(config.network.height, 450.0);
		assert!(config.network.interaction.navigation_buttons);
		assert!(!config.network.interaction.hover);
		assert!(!config.network.manipulation.enabled);
		assert_eq!(config.sandbox.height, 300.0);
		assert!(!config.sandbox.interaction.select_connected_edges);
		assert!(config.sandbox.manipulation.add_edge);
	}

	#[test]
	fn partial_document_overrides_only_named_fields() {
		let config = AppConfig::parse(r#"{ "topology_path": "/topo.json" }"#).unwrap();
		assert_eq!(config.topology_path, "/topo.json");
		assert_eq!(config.sandbox, GraphOptions::sandbox());
	}

	#[test]
	fn nested_block_falls_back_to_generic_defaults() {
		let config = AppConfig::parse(r#"{ "sandbox": { "height": 500 } }"#).unwrap();
		assert_eq!(config.sandbox.height, 500.0);
		assert_eq!(config.sandbox.physics, PhysicsOptions::default());
		assert_eq!(config.network, GraphOptions::network());
	}

	#[test]
	fn unrecognised_manipulation_keys_are_ignored() {
		let config = AppConfig::parse(
			r#"{ "sandbox": { "manipulation": { "enabled": true, "add_node": true, "delete_node": true } } }"#,
		)
		.unwrap();
		assert_eq!(
			config.sandbox.manipulation,
			ManipulationOptions {
				enabled: true,
				add_edge: false,
				delete_edge: false,
				delete_node: true,
			}
		);
	}

	#[test]
	fn malformed_document_is_an_error() {
		assert!(matches!(
			AppConfig::parse("{ nope"),
			Err(ConfigError::Parse(_))
		));
	}
}
