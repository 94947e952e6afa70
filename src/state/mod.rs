/// State management module
///
/// This module handles all in-process application state:
/// - Shared data structures (data.rs)
/// - The in-memory photo collection (store.rs)
/// - Screen navigation and the preview draft (flow.rs)

pub mod data;
pub mod flow;
pub mod store;
