//! # Transmitter Architecture
//!
//! A transmitter lets many independent widgets share **one** logical
//! configuration. Any widget may change it; every joined widget receives the
//! merged result. The configuration can also be mirrored into an external
//! medium so that it survives a reload or can be shared as a link.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Widgets (widget.rs)                                        │
//! │  - Receive full snapshots via `update`                      │
//! │  - Push changes upstream via the `on_changed` callback      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Broadcaster (broadcast.rs)                                 │
//! │  - Merge, default overlay, fan-out in join order            │
//! │  - Default-diffing serialization                            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Persistence (store/)                                       │
//! │  - Backend trait                                            │
//! │  - Memory, AddressState (lockable), AttributeState          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Host capabilities (host/)                                  │
//! │  - Location, Document, Element traits                       │
//! │  - In-memory implementations                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: Injected Host
//!
//! Nothing in this crate reaches for a global page, address bar or DOM.
//! The host hands in a [`host::Location`] or a [`host::Document`]; the same
//! broadcaster therefore runs headless in tests with
//! [`host::MemoryLocation`] / [`host::MemoryDocument`].
//!
//! ## Quick Start
//!
//! ```
//! use std::rc::Rc;
//! use transmitter::host::MemoryLocation;
//! use transmitter::{Config, Transmitter};
//!
//! let location = Rc::new(MemoryLocation::new("https://example.org/chart#year=2021"));
//! let transmitter = Transmitter::address(location);
//! transmitter.with_defaults(Config::new().with("units", "kg").with("year", 2020));
//!
//! transmitter.update("scope=full");
//!
//! assert_eq!(transmitter.serialize(), "scope=full&year=2021");
//! ```
//!
//! ## Module Overview
//!
//! - [`broadcast`]: the [`Transmitter`] itself
//! - [`store`]: the [`store::Backend`] capability and its three implementations
//! - [`host`]: injected host capabilities and in-memory doubles
//! - [`model`]: [`Config`] and [`Value`]
//! - [`codec`]: text form of a config
//! - [`widget`]: the widget capability and registry
//! - [`settings`]: tunable behaviour, loaded from TOML and the environment
//! - [`error`]: error types

pub mod broadcast;
pub mod codec;
pub mod error;
pub mod host;
pub mod model;
pub mod settings;
pub mod store;
pub mod widget;

pub use broadcast::{Change, Transmitter};
pub use codec::{Codec, FormCodec};
pub use error::{Result, TransmitterError};
pub use model::{Config, SequenceEquality, Value};
pub use settings::Settings;
pub use store::{AddressBackend, AttributeBackend, Backend, Lock, MemoryBackend, MemoryTransmitter};
pub use widget::{ChangeCallback, Widget, WidgetId};
