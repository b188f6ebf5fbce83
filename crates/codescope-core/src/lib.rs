//! Codescope Core Library
//!
//! Core types, traits, and storage abstractions for the Codescope project
//! analyzer and chat proxy.

pub mod analyzer;
pub mod config;
pub mod conversation;
pub mod error;
pub mod file;
pub mod ignore;
pub mod imports;
pub mod model;
pub mod stack;
pub mod storage;
pub mod tree;

#[cfg(test)]
pub mod testutils;

pub use analyzer::{AnalyzerOptions, ProjectAnalysis, ProjectAnalyzer, ProjectSummary};
pub use config::Config;
pub use conversation::{Conversation, ConversationSummary, Message, Role};
pub use error::{Error, Result};
pub use file::AnalyzedFile;
pub use ignore::IgnoreRules;
pub use imports::{DependencyMap, ImportExtractor};
pub use model::{GenerateRequest, GenerateResponse, ModelClient, ModelInfo};
pub use stack::{PackageManifest, TechStack, Technology};
pub use tree::{FileTree, FileTreeNode};
