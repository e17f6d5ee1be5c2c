// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared application services for DAE Stage tools (config, prefs, notices).
//! Keeps the viewer and host adapters thin and framework-agnostic.

pub mod config;
pub mod config_port;
pub mod notice;
pub mod prefs;
pub mod render_port;
