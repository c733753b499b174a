//! Chat interface for snapshelf:
//! - **Events** (`events`) - inbound message/reaction model and dispatch
//! - **Commands** (`commands`) - call-command tokenizer
//! - **Controller** (`controller`) - the menu/paging state machine
//! - **Render** (`render`) - user-visible message text
//! - **Gateway** (`gateway`) - transport loop and outbound delivery
//!
//! # Architecture
//!
//! ```text
//! Chat Events → EventDispatcher → AlbumController → AlbumStore
//!                     ↓
//!              RenderActions → Messenger
//! ```
//!
//! The controller never talks to the transport directly: it returns
//! [`RenderAction`](controller::RenderAction) values that the gateway
//! executes, so every transition is testable without a live backend.

pub mod commands;
pub mod controller;
pub mod events;
pub mod gateway;
pub mod render;
