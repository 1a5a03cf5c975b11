//! Output format emitters.
//!
//! This module renders accumulated mesh data as Java/GL source or DirectX
//! `.x` text.

pub mod directx;
pub mod format;
pub mod java;

pub use java::JavaDocument;
