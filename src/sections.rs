use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use html5ever::parse_document;
use html5ever::serialize::{SerializeOpts, TraversalScope, serialize};
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};
use tracing::debug;

use crate::model::{AnnotatedNode, ContentBlock, OutlineNode};

mod assign;
mod document;
mod render;

pub use assign::assign_outline;
pub use document::FilingDocument;
pub use render::render_markdown;
