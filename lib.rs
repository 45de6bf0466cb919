/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Document model for a node-graph editor.
//!
//! - `graph`: nodes, components, pins, connections and groups
//! - `history`: reversible actions and the bounded undo/redo log
//! - `store`: `GraphStore`, the single mutation entry point, plus paste and
//!   gesture sessions
//! - `persistence`: the line-oriented document format and atomic save/load
//! - `registries`: template registry injected into the store
//! - `prefs`: editor configuration

pub mod graph;
pub mod history;
pub mod persistence;
pub mod prefs;
pub mod registries;
pub mod store;

pub use graph::{Graph, Node, NodeId, PinAddress, PinSlot, PinType};
pub use history::{ActionLog, EditorAction};
pub use persistence::{LoadReport, PersistenceError};
pub use prefs::EditorConfig;
pub use registries::{TemplateCatalog, TemplateRegistry};
pub use store::GraphStore;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
