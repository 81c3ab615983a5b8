#![forbid(unsafe_code)]

//! titlefit
//!
//! A text-fit animated transition engine for title badges: small boxes or
//! ribbons that fit one or two pieces of text to a target width and animate
//! between open, closed and differing text.
//!
//! # Key Components
//!
//! - [`Badge`] - One configured badge; the host-facing entry point
//! - [`TransitionMachine`] - Owns state and drivers, turns input into frames
//! - [`transition`] - Pure `(state, request) -> (state, effects)` function
//! - [`compute_layout`] - Scale and gap for measured text
//! - [`AnimationDriver`] - Spring, timeline and pass-through interpolation
//! - [`Choreography`] - Per-variant animation design
//! - [`VisibilityController`] - Render gate derived from state
//!
//! # Role in titlefit
//! `titlefit` is the engine. It consumes the interpolation primitives of
//! `titlefit-core` and exposes frames of named values to a presentation
//! layer that draws them. Measuring text is the host's job, through a
//! [`BoundingBoxProvider`].
//!
//! # How it fits in the system
//! The host drives everything: it forwards prop changes, performs requested
//! measurements, ticks the badge once per frame and drains [`BadgeEvent`]s.
//! There is no hidden clock and no threading.

pub mod badge;
pub mod choreography;
pub mod config;
pub mod driver;
pub mod error;
pub mod label;
pub mod layout;
pub mod machine;
pub mod measure;
pub mod spec;
pub mod state;
pub mod visibility;

pub use badge::{Badge, BadgeFrame, SlotView};
pub use choreography::{Choreography, UnknownVariant, Variant};
pub use config::{BadgeConfig, SpringConfig};
pub use driver::{AnimationDriver, Backend, PassThroughDriver, RunId, Settled, SpringDriver, TimelineDriver};
pub use error::{ConfigError, Result};
pub use label::{Label, LabelSet, Segment};
pub use layout::{ClipBands, LayoutFrame, LayoutParams, compute_layout, layouts_trusted};
pub use machine::{BadgeEvent, Props, TransitionMachine};
pub use measure::{BoundingBoxProvider, MeasureOutcome, MeasureRequest, MeasureTicket, MeasuredBox};
pub use spec::{AnimationSpec, Channel, Frame, Key, Prop, Track};
pub use state::{Effect, Generation, Lane, Motion, Phase, Request, Slot, SlotId, Transition, TransitionState, transition};
pub use visibility::{RenderMode, VisibilityController};

pub use titlefit_core::animation::{Direction, SpringParams};
